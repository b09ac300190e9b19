#![cfg(test)]

use std::sync::Arc;

use crate::config_parser::Config;
use crate::gateway_util::AppStateData;
use crate::inference::providers::dummy::DummyProvider;
use crate::inference::SummaryBackend;
use crate::usage::{QuotaGate, UsageStore};

/// Builds an `AppStateData` wired to the dummy provider and an in-memory
/// usage store, plus a handle to that store for assertions. `provider_model`
/// selects the dummy provider's behavior ("good", "empty", "error").
pub fn get_unit_test_app_state_data(provider_model: &str) -> (AppStateData, UsageStore) {
    let config = Arc::new(Config::default());
    let store = UsageStore::new_memory();
    let quota_gate = Arc::new(QuotaGate::new(store.clone(), config.limits.free_monthly));

    let app_state = AppStateData {
        config,
        http_client: reqwest::Client::new(),
        provider: Arc::new(SummaryBackend::Dummy(DummyProvider::new(
            provider_model.to_string(),
        ))),
        quota_gate,
    };

    (app_state, store)
}
