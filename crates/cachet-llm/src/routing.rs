//! Canonical model name to provider model name mapping

use cachet_config::OpenAiConfig;

/// Model mapping strategy, fixed at client construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRouter {
    /// Model names are sent as-is
    Passthrough,
    /// A single canonical model is served by a named deployment
    Deployment {
        /// Canonical model name the deployment serves
        model: String,
        /// Deployment name substituted for it
        deployment: String,
    },
}

impl ModelRouter {
    /// Build the router for a configured endpoint
    ///
    /// Azure endpoints with a named deployment map the default model to it.
    /// Without one, model names are used as deployment names.
    pub fn from_config(config: &OpenAiConfig) -> Self {
        match config.azure_deployment.as_deref() {
            Some(deployment) if config.api_type.is_azure() && !deployment.is_empty() => Self::Deployment {
                model: config.default_model.clone(),
                deployment: deployment.to_owned(),
            },
            _ => Self::Passthrough,
        }
    }

    /// Provider model name for a canonical one, `None` when unmapped
    pub fn map(&self, model: &str) -> Option<String> {
        match self {
            Self::Passthrough => Some(model.to_owned()),
            Self::Deployment { model: canonical, deployment } => (model == canonical).then(|| deployment.clone()),
        }
    }
}
