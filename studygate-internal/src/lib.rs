// This is an internal crate, so we're the only consumers of
// traits with async fns for now.
#![expect(async_fn_in_trait)]

pub mod config_parser; // studygate.toml config file
pub mod endpoints; // API endpoints
pub mod error; // error handling
pub mod gateway_util; // utilities for gateway
pub mod inference; // summarization providers
pub mod observability; // logs and metrics
pub mod prompt; // study-notes prompt construction
mod testing;
pub mod usage; // monthly usage metering and quota gate
