use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Model used when a request leaves the model name empty
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// API version sent to Azure deployments when none is configured
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// Connection settings for the chat completion API
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Wire dialect spoken by the endpoint
    #[serde(default)]
    pub api_type: ApiType,
    /// API version (Azure only)
    #[serde(default)]
    pub api_version: Option<String>,
    /// Organization sent with every request
    #[serde(default)]
    pub org_id: Option<String>,
    /// End-user identifier attached to every completion request
    #[serde(default)]
    pub user: Option<String>,
    /// Azure deployment serving the default model
    #[serde(default)]
    pub azure_deployment: Option<String>,
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Send a reproducibility seed with every live call
    #[serde(default)]
    pub set_seed: bool,
    /// Fixed cache-key base identity, replacing the derived one
    #[serde(default)]
    pub cache_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            api_type: ApiType::default(),
            api_version: None,
            org_id: None,
            user: None,
            azure_deployment: None,
            default_model: default_model(),
            set_seed: false,
            cache_key: None,
        }
    }
}

impl OpenAiConfig {
    /// API version to send, falling back to the Azure default for Azure endpoints
    pub fn effective_api_version(&self) -> Option<&str> {
        match (&self.api_version, self.api_type.is_azure()) {
            (Some(version), _) => Some(version.as_str()),
            (None, true) => Some(DEFAULT_AZURE_API_VERSION),
            (None, false) => None,
        }
    }
}

/// Supported endpoint dialects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    /// `OpenAI` or any compatible API
    #[default]
    OpenAi,
    /// Azure `OpenAI` with key authentication
    Azure,
    /// Azure `OpenAI` with Entra ID bearer tokens
    AzureAd,
}

impl ApiType {
    /// Whether requests are routed through Azure deployments
    pub const fn is_azure(self) -> bool {
        matches!(self, Self::Azure | Self::AzureAd)
    }
}

impl FromStr for ApiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open_ai" | "openai" => Ok(Self::OpenAi),
            "azure" => Ok(Self::Azure),
            "azure_ad" => Ok(Self::AzureAd),
            other => Err(format!("unknown api type `{other}` (valid: OPEN_AI, AZURE, AZURE_AD)")),
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAi => "OPEN_AI",
            Self::Azure => "AZURE",
            Self::AzureAd => "AZURE_AD",
        };
        f.write_str(name)
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}
