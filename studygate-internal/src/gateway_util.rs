use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Json, Request};
use axum::routing::{get, post};
use axum::Router;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tracing::instrument;

use crate::config_parser::Config;
use crate::endpoints;
use crate::error::{Error, ErrorDetails};
use crate::inference::SummaryBackend;
use crate::usage::{QuotaGate, UsageStore};

/// State for the API
#[derive(Clone)]
pub struct AppStateData {
    pub config: Arc<Config>,
    pub http_client: Client,
    pub provider: Arc<SummaryBackend>,
    pub quota_gate: Arc<QuotaGate>,
}
pub type AppState = axum::extract::State<AppStateData>;

impl AppStateData {
    pub fn new(config: Arc<Config>) -> Result<Self, Error> {
        let http_client = setup_http_client()?;
        let provider = Arc::new(SummaryBackend::new(&config.provider)?);
        let store = UsageStore::new(&config.storage);
        let quota_gate = Arc::new(QuotaGate::new(store, config.limits.free_monthly));

        Ok(Self {
            config,
            http_client,
            provider,
            quota_gate,
        })
    }
}

/// Matches the original deployment's `express.json({limit: "1mb"})`.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Builds the application router. The caller (or test) supplies the state;
/// the binary adds its metrics route and trace layer on top.
pub fn build_router(app_state: AppStateData) -> Router {
    Router::new()
        .route("/summarize", post(endpoints::summarize::summarize_handler))
        .route("/status", get(endpoints::status::status_handler))
        .route("/health", get(endpoints::status::health_handler))
        .fallback(endpoints::fallback::handle_404)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        // The caller is a browser extension, so cross-origin requests are the
        // normal case.
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Custom Axum extractor that validates the JSON body and deserializes it into a custom type
///
/// When this extractor is present, we don't check if the `Content-Type` header is `application/json`,
/// and instead simply assume that the request body is a JSON object.
pub struct StructuredJson<T>(pub T);

impl<S, T> FromRequest<S> for StructuredJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: Send + Sync + DeserializeOwned,
{
    type Rejection = Error;

    #[instrument(skip_all, level = "trace", name = "StructuredJson::from_request")]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Retrieve the request body as Bytes before deserializing it
        let bytes = bytes::Bytes::from_request(req, state).await.map_err(|e| {
            Error::new(ErrorDetails::JsonRequest {
                message: format!("{} ({})", e, e.status()),
            })
        })?;

        // Convert the entire body into `serde_json::Value`
        let value = Json::<serde_json::Value>::from_bytes(&bytes)
            .map_err(|e| {
                Error::new(ErrorDetails::JsonRequest {
                    message: format!("{} ({})", e, e.status()),
                })
            })?
            .0;

        // Now use `serde_path_to_error::deserialize` to attempt deserialization into `T`
        let deserialized: T = serde_path_to_error::deserialize(&value).map_err(|e| {
            Error::new(ErrorDetails::JsonRequest {
                message: e.to_string(),
            })
        })?;

        Ok(StructuredJson(deserialized))
    }
}

// This is set high enough that it should never be hit for a normal provider
// response.
pub const DEFAULT_HTTP_CLIENT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5 * 60);

pub fn setup_http_client() -> Result<Client, Error> {
    Client::builder()
        .timeout(DEFAULT_HTTP_CLIENT_TIMEOUT)
        .build()
        .map_err(|e| {
            Error::new(ErrorDetails::AppState {
                message: format!("Failed to build HTTP client: {e}"),
            })
        })
}
