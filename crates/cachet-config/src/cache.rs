use serde::Deserialize;
use url::Url;

/// Response cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Whether caching is enabled (defaults to on)
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Storage backend for cached chunk sequences
    #[serde(default)]
    pub backend: CacheBackendConfig,
}

impl CacheConfig {
    /// Resolved enable flag
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Where cached responses are kept
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheBackendConfig {
    /// Process-local map, lost on exit
    #[default]
    Memory,
    /// Shared Valkey (or Redis) instance
    Valkey(ValkeyCacheConfig),
}

/// Valkey backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValkeyCacheConfig {
    /// Valkey connection URL
    pub url: Url,
    /// Key prefix in Valkey
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    "cachet:cache".to_owned()
}
