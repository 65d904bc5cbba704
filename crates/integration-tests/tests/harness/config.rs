//! Programmatic configuration builder for integration tests

use cachet_config::{ApiType, Config, OpenAiConfig};
use secrecy::SecretString;
use url::Url;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Configuration pointed at a mock backend with a test key
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config {
                openai: OpenAiConfig {
                    api_key: Some(SecretString::from("test-key")),
                    base_url: Some(Url::parse(base_url).unwrap()),
                    ..OpenAiConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Speak the Azure dialect with one deployment serving the default model
    pub fn with_azure(mut self, api_type: ApiType, deployment: &str) -> Self {
        self.config.openai.api_type = api_type;
        self.config.openai.azure_deployment = Some(deployment.to_owned());
        self
    }

    /// Override the default model
    pub fn with_default_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.openai.default_model);
        self
    }

    /// Seed every live call
    pub fn with_seed(mut self) -> Self {
        self.config.openai.set_seed = true;
        self
    }

    /// Attach an end-user identifier to every request
    pub fn with_user(mut self, user: &str) -> Self {
        self.config.openai.user = Some(user.to_owned());
        self
    }

    /// Send an organization header
    pub fn with_org(mut self, org_id: &str) -> Self {
        self.config.openai.org_id = Some(org_id.to_owned());
        self
    }

    /// Disable the response cache by default
    pub fn without_cache(mut self) -> Self {
        self.config.cache.enabled = Some(false);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}
