use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, ErrorDetails};

/// Top-level gateway configuration, loaded from a `studygate.toml` file.
///
/// Every section is optional; an absent file section falls back to defaults
/// that match the original deployment (free limit 5, `db.json` store,
/// OpenAI provider with `gpt-4o-mini`).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    pub async fn load_from_path(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::new(ErrorDetails::Config {
                message: format!("Failed to read config file {}: {e}", path.display()),
            })
        })?;
        toml::from_str(&contents).map_err(|e| {
            Error::new(ErrorDetails::Config {
                message: format!("Failed to parse config file {}: {e}", path.display()),
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Socket address to bind to. Defaults to 0.0.0.0:3000.
    pub bind_address: Option<SocketAddr>,
    /// Include raw provider request/response details in error logs.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Accepted summarization requests per user per calendar month before
    /// quota gating triggers. Pro users are exempt.
    #[serde(default = "default_free_monthly")]
    pub free_monthly: u32,
}

fn default_free_monthly() -> u32 {
    5
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_monthly: default_free_monthly(),
        }
    }
}

/// Where the usage document lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Single JSON document on disk, rewritten in full on every mutation.
    JsonFile {
        #[serde(default = "default_storage_path")]
        path: PathBuf,
    },
    /// Process-local store. Counters reset on restart; intended for tests
    /// and local development.
    Memory,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("db.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::JsonFile {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    #[serde(rename = "openai")]
    OpenAI {
        #[serde(default = "default_model_name")]
        model_name: String,
        #[serde(default = "default_api_base")]
        api_base: Url,
        /// Environment variable holding the API key.
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
    /// Deterministic provider for tests and local development.
    Dummy {
        #[serde(default = "default_dummy_model_name")]
        model_name: String,
    },
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

// The literal is well-formed, so the parse cannot fail.
#[expect(clippy::unwrap_used)]
fn default_api_base() -> Url {
    Url::parse("https://api.openai.com/v1").unwrap()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_dummy_model_name() -> String {
    "good".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAI {
            model_name: default_model_name(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.free_monthly, 5);
        assert!(config.gateway.bind_address.is_none());
        assert!(!config.gateway.debug);
        assert!(matches!(&config.storage, StorageConfig::JsonFile { .. }));
        if let StorageConfig::JsonFile { path } = &config.storage {
            assert_eq!(path, &PathBuf::from("db.json"));
        }
        assert!(matches!(&config.provider, ProviderConfig::OpenAI { .. }));
        if let ProviderConfig::OpenAI {
            model_name,
            api_base,
            api_key_env,
        } = &config.provider
        {
            assert_eq!(model_name, "gpt-4o-mini");
            assert_eq!(api_base.as_str(), "https://api.openai.com/v1");
            assert_eq!(api_key_env, "OPENAI_API_KEY");
        }
    }

    #[test]
    fn test_parse_full_config() -> anyhow::Result<()> {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            bind_address = "127.0.0.1:8080"
            debug = true

            [limits]
            free_monthly = 10

            [storage]
            type = "json_file"
            path = "/var/lib/studygate/usage.json"

            [provider]
            type = "openai"
            model_name = "gpt-4o"
            api_base = "https://example.com/v1"
            api_key_env = "MY_KEY"
            "#,
        )?;

        assert_eq!(
            config.gateway.bind_address,
            Some("127.0.0.1:8080".parse()?)
        );
        assert!(config.gateway.debug);
        assert_eq!(config.limits.free_monthly, 10);
        assert!(matches!(&config.provider, ProviderConfig::OpenAI { .. }));
        if let ProviderConfig::OpenAI { model_name, .. } = &config.provider {
            assert_eq!(model_name, "gpt-4o");
        }
        Ok(())
    }

    #[test]
    fn test_parse_dummy_provider() -> anyhow::Result<()> {
        let config: Config = toml::from_str(
            r#"
            [storage]
            type = "memory"

            [provider]
            type = "dummy"
            model_name = "empty"
            "#,
        )?;
        assert!(matches!(&config.provider, ProviderConfig::Dummy { .. }));
        if let ProviderConfig::Dummy { model_name } = &config.provider {
            assert_eq!(model_name, "empty");
        }
        assert!(matches!(config.storage, StorageConfig::Memory));
        Ok(())
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [gateway]
            bind_adress = "127.0.0.1:8080"
            "#,
        );
        assert!(result.is_err());
    }
}
