use crate::config_parser::ProviderConfig;
use crate::error::Error;

pub mod providers;

use providers::dummy::DummyProvider;
use providers::openai::OpenAIProvider;

/// A single summarization request as sent to a provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
}

/// Raw provider output: the first completion's text content, if any. The
/// endpoint decides what to do when nothing comes back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderSummaryResponse {
    pub content: Option<String>,
}

pub trait SummarizationProvider {
    async fn summarize(
        &self,
        request: &SummaryRequest<'_>,
        http_client: &reqwest::Client,
    ) -> Result<ProviderSummaryResponse, Error>;
}

/// The configured provider backend. Enum dispatch so `AppStateData` holds a
/// concrete type.
#[derive(Debug)]
pub enum SummaryBackend {
    OpenAI(OpenAIProvider),
    Dummy(DummyProvider),
}

impl SummaryBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self, Error> {
        match config {
            ProviderConfig::OpenAI {
                model_name,
                api_base,
                api_key_env,
            } => Ok(SummaryBackend::OpenAI(OpenAIProvider::new(
                model_name.clone(),
                api_base.clone(),
                api_key_env,
            )?)),
            ProviderConfig::Dummy { model_name } => {
                Ok(SummaryBackend::Dummy(DummyProvider::new(model_name.clone())))
            }
        }
    }

    /// Short name for startup logging.
    pub fn provider_type(&self) -> &'static str {
        match self {
            SummaryBackend::OpenAI(_) => "openai",
            SummaryBackend::Dummy(_) => "dummy",
        }
    }
}

impl SummarizationProvider for SummaryBackend {
    async fn summarize(
        &self,
        request: &SummaryRequest<'_>,
        http_client: &reqwest::Client,
    ) -> Result<ProviderSummaryResponse, Error> {
        match self {
            SummaryBackend::OpenAI(provider) => provider.summarize(request, http_client).await,
            SummaryBackend::Dummy(provider) => provider.summarize(request, http_client).await,
        }
    }
}
