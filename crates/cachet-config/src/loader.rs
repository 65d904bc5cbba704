use std::path::Path;

use crate::{CacheBackendConfig, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads and deserializes the file, fills unset fields from the
    /// environment, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails,
    /// an environment fallback is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text, then apply environment fallbacks
    ///
    /// # Errors
    ///
    /// Returns an error if parsing, environment fallback, or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        crate::env::apply_env_fallbacks(&mut config)
            .map_err(|e| anyhow::anyhow!("environment fallback failed: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Build configuration purely from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value is malformed or validation fails
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        crate::env::apply_env_fallbacks(&mut config)
            .map_err(|e| anyhow::anyhow!("environment fallback failed: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if an Azure endpoint has no base URL, or the
    /// cache backend URL uses an unsupported scheme
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_openai_config()?;
        self.validate_cache_config()?;
        Ok(())
    }

    fn validate_openai_config(&self) -> anyhow::Result<()> {
        if self.openai.api_type.is_azure() && self.openai.base_url.is_none() {
            anyhow::bail!(
                "openai.base_url is required when api_type is {}",
                self.openai.api_type
            );
        }

        if self.openai.default_model.trim().is_empty() {
            anyhow::bail!("openai.default_model must not be empty");
        }

        Ok(())
    }

    fn validate_cache_config(&self) -> anyhow::Result<()> {
        if let CacheBackendConfig::Valkey(valkey) = &self.cache.backend
            && !matches!(valkey.url.scheme(), "redis" | "rediss")
        {
            anyhow::bail!(
                "cache.backend.url must use the redis or rediss scheme, got `{}`",
                valkey.url.scheme()
            );
        }

        Ok(())
    }
}
