//! Provider selection: builds the configured backend.
//!
//! The placeholder and the real Anthropic call sit behind the same trait, so
//! switching between them is a one-line config change.

use std::sync::Arc;

use cbc_tutor_config::TutorConfig;
use cbc_tutor_core::error::ProviderError;
use cbc_tutor_core::provider::Provider;
use tracing::info;

use crate::anthropic::AnthropicProvider;
use crate::placeholder::PlaceholderProvider;

/// Build the provider named by `config.provider`.
pub fn build_from_config(config: &TutorConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider: Arc<dyn Provider> = match config.provider.as_str() {
        "placeholder" => Arc::new(PlaceholderProvider::new()),
        "anthropic" => {
            let api_key = config.api_key_for("anthropic").ok_or_else(|| {
                ProviderError::NotConfigured(
                    "anthropic provider selected but no API key is configured".into(),
                )
            })?;

            let mut provider = AnthropicProvider::with_timeout(api_key, config.request_timeout())?;
            if let Some(url) = config.providers.get("anthropic").and_then(|p| p.api_url.as_ref()) {
                provider = provider.with_base_url(url);
            }
            Arc::new(provider)
        }
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "unknown provider '{other}'"
            )));
        }
    };

    info!(provider = provider.name(), model = %config.model, "Provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc_tutor_config::ProviderConfig;

    #[test]
    fn default_config_builds_placeholder() {
        let provider = build_from_config(&TutorConfig::default()).unwrap();
        assert_eq!(provider.name(), "placeholder");
    }

    #[test]
    fn anthropic_without_key_is_not_configured() {
        let config = TutorConfig {
            provider: "anthropic".into(),
            ..TutorConfig::default()
        };
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn anthropic_with_key_builds() {
        let mut config = TutorConfig {
            provider: "anthropic".into(),
            ..TutorConfig::default()
        };
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("sk-ant-test".into()),
                api_url: Some("http://localhost:9999/".into()),
            },
        );
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = TutorConfig {
            provider: "ollama".into(),
            ..TutorConfig::default()
        };
        assert!(build_from_config(&config).is_err());
    }
}
