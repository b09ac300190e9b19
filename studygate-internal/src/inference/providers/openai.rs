use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DisplayOrDebugGateway, Error, ErrorDetails};
use crate::inference::{ProviderSummaryResponse, SummarizationProvider, SummaryRequest};

const PROVIDER_NAME: &str = "OpenAI";
const PROVIDER_TYPE: &str = "openai";

/// Chat-completions client for OpenAI and OpenAI-compatible servers.
#[derive(Debug)]
pub struct OpenAIProvider {
    model_name: String,
    api_base: Url,
    credentials: OpenAICredentials,
}

#[derive(Clone, Debug)]
pub enum OpenAICredentials {
    Static(SecretString),
    None,
}

impl OpenAIProvider {
    /// The API key is resolved from `api_key_env` once, at startup. A missing
    /// variable is tolerated here (compatible servers may not need one) and
    /// only becomes an error when a request is actually made.
    pub fn new(model_name: String, api_base: Url, api_key_env: &str) -> Result<Self, Error> {
        let credentials = match std::env::var(api_key_env) {
            Ok(key) => OpenAICredentials::Static(SecretString::from(key)),
            Err(std::env::VarError::NotPresent) => {
                tracing::warn!(
                    "Environment variable `{api_key_env}` is not set; requests to {PROVIDER_NAME} will fail until it is provided"
                );
                OpenAICredentials::None
            }
            Err(e) => {
                return Err(Error::new(ErrorDetails::Config {
                    message: format!("Failed to read environment variable `{api_key_env}`: {e}"),
                }));
            }
        };

        // Check if the api_base has the `/chat/completions` suffix and warn if it does
        check_api_base_suffix(&api_base);

        Ok(OpenAIProvider {
            model_name,
            api_base,
            credentials,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn check_api_base_suffix(api_base: &Url) {
    let path = api_base.path();
    if path.ends_with("/chat/completions") || path.ends_with("/chat/completions/") {
        tracing::warn!(
            "The `api_base` for the {PROVIDER_NAME} provider should not end with `/chat/completions`: {api_base}"
        );
    }
}

fn get_chat_url(api_base: &Url) -> Result<Url, Error> {
    let mut url = api_base.clone();
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    url.join("chat/completions").map_err(|e| {
        Error::new(ErrorDetails::Config {
            message: format!("Failed to build chat completions URL from {api_base}: {e}"),
        })
    })
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIRequestMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIResponseChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl<'a> OpenAIRequest<'a> {
    fn new(model: &'a str, request: &SummaryRequest<'a>) -> Self {
        OpenAIRequest {
            model,
            messages: vec![
                OpenAIRequestMessage {
                    role: "system",
                    content: request.system,
                },
                OpenAIRequestMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            temperature: request.temperature,
        }
    }
}

impl SummarizationProvider for OpenAIProvider {
    async fn summarize(
        &self,
        request: &SummaryRequest<'_>,
        http_client: &reqwest::Client,
    ) -> Result<ProviderSummaryResponse, Error> {
        let api_key = match &self.credentials {
            OpenAICredentials::Static(key) => key,
            OpenAICredentials::None => {
                return Err(Error::new(ErrorDetails::ApiKeyMissing {
                    provider_name: PROVIDER_NAME.to_string(),
                }));
            }
        };
        let request_body = OpenAIRequest::new(&self.model_name, request);
        let raw_request = serde_json::to_string(&request_body).map_err(|e| {
            Error::new(ErrorDetails::Serialization {
                message: format!(
                    "Error serializing {PROVIDER_NAME} request: {}",
                    DisplayOrDebugGateway::new(e)
                ),
            })
        })?;
        let request_url = get_chat_url(&self.api_base)?;

        let res = http_client
            .post(request_url)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                let status_code = e.status();
                Error::new(ErrorDetails::InferenceClient {
                    message: format!("Error sending request: {}", DisplayOrDebugGateway::new(e)),
                    status_code,
                    provider_type: PROVIDER_TYPE.to_string(),
                    raw_request: Some(raw_request.clone()),
                    raw_response: None,
                })
            })?;

        if res.status().is_success() {
            let raw_response = res.text().await.map_err(|e| {
                Error::new(ErrorDetails::InferenceServer {
                    message: format!("Error reading response: {}", DisplayOrDebugGateway::new(e)),
                    provider_type: PROVIDER_TYPE.to_string(),
                    raw_request: Some(raw_request.clone()),
                    raw_response: None,
                })
            })?;
            let response: OpenAIResponse = serde_json::from_str(&raw_response).map_err(|e| {
                Error::new(ErrorDetails::InferenceServer {
                    message: format!("Error parsing response: {}", DisplayOrDebugGateway::new(e)),
                    provider_type: PROVIDER_TYPE.to_string(),
                    raw_request: Some(raw_request.clone()),
                    raw_response: Some(raw_response.clone()),
                })
            })?;
            let content = response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content);
            Ok(ProviderSummaryResponse { content })
        } else {
            let status = res.status();
            let raw_response = res.text().await.map_err(|e| {
                Error::new(ErrorDetails::InferenceServer {
                    message: format!(
                        "Error reading error response: {}",
                        DisplayOrDebugGateway::new(e)
                    ),
                    provider_type: PROVIDER_TYPE.to_string(),
                    raw_request: Some(raw_request.clone()),
                    raw_response: None,
                })
            })?;
            Err(Error::new(ErrorDetails::InferenceClient {
                message: format!("Provider returned error status: {status}"),
                status_code: Some(status),
                provider_type: PROVIDER_TYPE.to_string(),
                raw_request: Some(raw_request),
                raw_response: Some(raw_response),
            }))
        }
    }
}
