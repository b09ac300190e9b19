use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub const STUDYGATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Liveness probe consumed by the extension client.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn status_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": STUDYGATE_VERSION,
    }))
}
