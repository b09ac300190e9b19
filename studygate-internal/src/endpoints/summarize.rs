use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorDetails};
use crate::gateway_util::{AppState, AppStateData, StructuredJson};
use crate::inference::{SummarizationProvider, SummaryRequest};
use crate::prompt::{
    build_prompt, cap_text, SummaryMode, MAX_INPUT_CHARS, SUMMARY_TEMPERATURE, SYSTEM_INSTRUCTION,
};
use crate::usage::QuotaDecision;

/// Returned verbatim when the provider comes back with no usable content.
pub const NO_SUMMARY_FALLBACK: &str = "No summary returned.";

/// The expected payload is a JSON object with the following fields:
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    // Opaque client-generated identifier. Kept as a raw JSON value and
    // validated by hand so that a missing or mistyped field maps to the
    // documented 400 message instead of a serde error.
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    // The selected text to summarize. Same raw-value treatment as `userId`.
    #[serde(default)]
    pub text: Option<Value>,
    // Optional focus keyword; blank after trimming counts as absent.
    #[serde(default)]
    pub keyword: Option<String>,
    // "essay" or "exam"; anything unrecognized falls back to essay.
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub metadata: SummaryMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub original_length: usize,
    pub processed_length: usize,
    pub was_capped: bool,
    pub keyword: Option<String>,
    pub user_id: String,
    pub timestamp: String,
}

fn require_non_empty_string(value: Option<Value>, field: &str) -> Result<String, Error> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(Error::new(ErrorDetails::InvalidRequest {
            message: format!("Missing or invalid {field}"),
        })),
    }
}

/// Orchestrates a summarization request: validate, gate on quota, build the
/// prompt, call the provider, shape the response.
///
/// The quota increment persists before the provider call, so a provider
/// failure still consumes one request from the month's allowance.
pub async fn summarize_handler(
    State(AppStateData {
        http_client,
        provider,
        quota_gate,
        ..
    }): AppState,
    StructuredJson(params): StructuredJson<Params>,
) -> Result<Json<SummarizeResponse>, Error> {
    counter!("summarize_requests_total").increment(1);

    // Validation order is part of the contract: userId first, then text,
    // both before any quota mutation.
    let user_id = require_non_empty_string(params.user_id, "userId")?;
    let text = require_non_empty_string(params.text, "text")?;

    let original_length = text.chars().count();
    let (processed_text, was_capped) = cap_text(&text);
    let processed_length = if was_capped {
        MAX_INPUT_CHARS
    } else {
        original_length
    };
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);
    let mode = SummaryMode::parse_lossy(params.mode.as_deref());

    match quota_gate.check_and_consume(&user_id).await? {
        QuotaDecision::Allowed => {}
        QuotaDecision::Denied { limit, month } => {
            counter!("summarize_quota_denied_total").increment(1);
            return Err(Error::new(ErrorDetails::QuotaExceeded { limit, month }));
        }
    }

    let prompt = build_prompt(processed_text, mode, keyword.as_deref());
    let request = SummaryRequest {
        system: SYSTEM_INSTRUCTION,
        prompt: &prompt,
        temperature: SUMMARY_TEMPERATURE,
    };
    let response = provider.summarize(&request, &http_client).await?;

    let summary = response
        .content
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_SUMMARY_FALLBACK.to_string());

    Ok(Json(SummarizeResponse {
        summary,
        metadata: SummaryMetadata {
            original_length,
            processed_length,
            was_capped,
            keyword,
            user_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }))
}
