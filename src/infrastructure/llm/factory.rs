use std::sync::Arc;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::config::LlmConfig;
use crate::domain::{DomainError, LlmProvider};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the configured provider, reading the API key from the environment
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DomainError::configuration(format!("{} is not set", config.api_key_env))
        })?;

        Self::create_with_key(config, api_key)
    }

    /// Create the configured provider with an explicit API key
    pub fn create_with_key(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DomainError::configuration("LLM API key is empty"));
        }

        let http_client = HttpClient::with_timeout(config.timeout())?;
        let provider = OpenAiProvider::with_base_url(http_client, api_key, &config.base_url);

        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_key() {
        let provider = LlmProviderFactory::create_with_key(&LlmConfig::default(), "sk-test").unwrap();
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_empty_key_is_configuration_error() {
        let err = LlmProviderFactory::create_with_key(&LlmConfig::default(), " ").unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_missing_env_var_is_configuration_error() {
        let config = LlmConfig {
            api_key_env: "LEGAL_RAG_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };

        let err = LlmProviderFactory::create(&config).unwrap_err();
        assert!(err.to_string().contains("LEGAL_RAG_TEST_UNSET_KEY"));
    }
}
