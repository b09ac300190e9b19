use clap::ValueEnum;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, ErrorDetails};

/// Log format for all gateway logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

fn default_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,gateway=info,studygate_internal=info"))
}

/// Installs the global tracing subscriber. Call once, before anything logs.
pub fn setup_observability(log_format: LogFormat) -> Result<(), Error> {
    let registry = tracing_subscriber::registry().with(default_env_filter());
    match log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
    .map_err(|e| {
        Error::new(ErrorDetails::AppState {
            message: format!("Failed to initialize tracing subscriber: {e}"),
        })
    })
}

/// Installs the Prometheus metrics recorder and returns the handle the
/// `/metrics` route renders from.
pub fn setup_metrics() -> Result<PrometheusHandle, Error> {
    PrometheusBuilder::new().install_recorder().map_err(|e| {
        Error::new(ErrorDetails::AppState {
            message: format!("Failed to install Prometheus metrics recorder: {e}"),
        })
    })
}
