use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{MistralProvider, OllamaProvider};
use crate::config::{JudgeBackend, JudgeConfig};
use crate::domain::{CompletionProvider, CredentialProvider, CredentialType, DomainError};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::retry::RetryPolicy;

/// Factory for creating the judge backend. The backend is chosen once here;
/// callers only see [`CompletionProvider`].
#[derive(Debug)]
pub struct JudgeProviderFactory;

impl JudgeProviderFactory {
    /// Create the configured judge. A missing cloud credential is a
    /// configuration error, never a per-call failure.
    pub fn create(
        config: &JudgeConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<Arc<dyn CompletionProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        let retry = RetryPolicy::new(config.max_retries);

        let provider: Arc<dyn CompletionProvider> = match config.provider {
            JudgeBackend::Mistral => {
                let credential = credentials
                    .get_credential(&CredentialType::Mistral)
                    .map_err(|_| {
                        DomainError::configuration(
                            "Mistral judge selected but no API key found: set MISTRAL_API_KEY or judge.api_key",
                        )
                    })?;

                let provider = match config.base_url {
                    Some(ref base_url) => MistralProvider::with_base_url(
                        http_client,
                        credential.api_key(),
                        &config.model,
                        base_url,
                    ),
                    None => MistralProvider::new(http_client, credential.api_key(), &config.model),
                };
                Arc::new(provider.with_retry(retry))
            }

            JudgeBackend::Ollama => {
                let provider = match config.base_url {
                    Some(ref base_url) => {
                        OllamaProvider::with_base_url(http_client, &config.model, base_url)
                    }
                    None => OllamaProvider::new(http_client, &config.model),
                };
                Arc::new(provider.with_retry(retry))
            }
        };

        info!(
            provider = provider.provider_name(),
            model = provider.model(),
            "Judge backend configured"
        );

        Ok(provider)
    }
}
