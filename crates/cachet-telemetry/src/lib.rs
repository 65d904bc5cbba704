//! Logging setup for cachet
//!
//! Installs a `tracing-subscriber` registry with an environment filter and a
//! text or JSON formatting layer.

use cachet_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither configuration nor `RUST_LOG` provides one
const DEFAULT_FILTER: &str = "info";

/// Initialize logging from configuration
///
/// `RUST_LOG`, when set, replaces the configured filter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>) -> anyhow::Result<()> {
    let filter = build_filter(config);
    let format = config.map(|c| c.format).unwrap_or_default();

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Resolve the log filter, preferring `RUST_LOG` over configuration
fn build_filter(config: Option<&TelemetryConfig>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = config.map_or(DEFAULT_FILTER, |c| c.log_filter.as_str());
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter `{directive}`: {e}, falling back to `{DEFAULT_FILTER}`");
        EnvFilter::new(DEFAULT_FILTER)
    })
}
