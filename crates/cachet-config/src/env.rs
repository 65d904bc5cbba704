use secrecy::SecretString;
use url::Url;

use crate::Config;

/// Fill unset configuration fields from `OPENAI_*` and `CACHET_*` variables
///
/// Values already present in the configuration file always win. Empty
/// variables count as unset.
pub fn apply_env_fallbacks(config: &mut Config) -> Result<(), String> {
    apply_fallbacks(config, |name| std::env::var(name).ok())
}

/// Fallback resolution over an arbitrary variable lookup
pub fn apply_fallbacks(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) -> Result<(), String> {
    let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
    let openai = &mut config.openai;

    if openai.api_key.is_none() {
        openai.api_key = var("OPENAI_API_KEY").map(SecretString::from);
    }

    if openai.base_url.is_none()
        && let Some(raw) = var("OPENAI_BASE_URL").or_else(|| var("OPENAI_URL"))
    {
        let url = Url::parse(&raw).map_err(|e| format!("invalid base URL `{raw}`: {e}"))?;
        openai.base_url = Some(url);
    }

    // The file default is indistinguishable from an explicit `open_ai`,
    // so only a non-default file value blocks the environment
    if !openai.api_type.is_azure()
        && let Some(raw) = var("OPENAI_API_TYPE")
    {
        openai.api_type = raw.parse()?;
    }

    first_set(&mut openai.api_version, || var("OPENAI_API_VERSION"));
    first_set(&mut openai.org_id, || var("OPENAI_ORG_ID"));
    first_set(&mut openai.user, || var("OPENAI_USER"));
    first_set(&mut openai.azure_deployment, || var("OPENAI_AZURE_DEPLOYMENT"));

    if config.cache.enabled.is_none()
        && let Some(raw) = var("CACHET_CACHE")
    {
        let enabled = raw
            .parse::<bool>()
            .map_err(|_| format!("CACHET_CACHE must be `true` or `false`, got `{raw}`"))?;
        config.cache.enabled = Some(enabled);
    }

    Ok(())
}

fn first_set(slot: &mut Option<String>, fallback: impl FnOnce() -> Option<String>) {
    if slot.is_none() {
        *slot = fallback();
    }
}
