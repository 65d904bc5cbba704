#![allow(clippy::must_use_candidate)]

pub mod cache;
mod env;
mod loader;
pub mod openai;
pub mod telemetry;

use serde::Deserialize;

pub use cache::*;
pub use openai::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level cachet configuration
///
/// Resolved once, before any client is built, and never re-read.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Completion API connection settings
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
