use crate::error::{Error, ErrorDetails};
use crate::inference::{ProviderSummaryResponse, SummarizationProvider, SummaryRequest};

const PROVIDER_TYPE: &str = "dummy";

/// Canned output returned by the dummy provider for ordinary model names.
pub const DUMMY_SUMMARY: &str = "• The passage introduces its central topic and the period it covers.\n• Key figures are listed together with the outcomes they produced.";

/// Deterministic provider for tests and local development. Behavior is keyed
/// off the configured model name:
/// - `"error"`: always fails with an inference client error
/// - `"empty"`: returns a completion with no content
/// - anything else: returns `DUMMY_SUMMARY`
#[derive(Debug)]
pub struct DummyProvider {
    model_name: String,
}

impl DummyProvider {
    pub fn new(model_name: String) -> Self {
        DummyProvider { model_name }
    }
}

impl SummarizationProvider for DummyProvider {
    async fn summarize(
        &self,
        _request: &SummaryRequest<'_>,
        _http_client: &reqwest::Client,
    ) -> Result<ProviderSummaryResponse, Error> {
        match self.model_name.as_str() {
            "error" => Err(Error::new(ErrorDetails::InferenceClient {
                message: "Dummy provider error".to_string(),
                status_code: None,
                provider_type: PROVIDER_TYPE.to_string(),
                raw_request: None,
                raw_response: None,
            })),
            "empty" => Ok(ProviderSummaryResponse { content: None }),
            _ => Ok(ProviderSummaryResponse {
                content: Some(DUMMY_SUMMARY.to_string()),
            }),
        }
    }
}
