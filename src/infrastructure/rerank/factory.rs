use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::JinaReranker;
use crate::config::RerankerConfig;
use crate::domain::{CredentialProvider, CredentialType, DomainError, Reranker};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::retry::RetryPolicy;

/// Why a reranker was built in passthrough mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    Configuration,
    HostedEnvironment,
    MissingCredential,
}

/// Factory for creating rerankers
#[derive(Debug)]
pub struct RerankerFactory;

impl RerankerFactory {
    /// Build the reranker described by `config`. Missing credentials and
    /// hosted environments yield a passthrough reranker rather than an error.
    pub fn create(
        config: &RerankerConfig,
        credentials: &dyn CredentialProvider,
    ) -> Result<Arc<dyn Reranker>, DomainError> {
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let env_present = |var: &str| std::env::var_os(var).is_some();

        let api_key = match Self::resolve(config, credentials, env_present) {
            Ok(api_key) => api_key,
            Err(reason) => {
                match reason {
                    DisabledReason::MissingCredential => {
                        warn!("Rerank API key not found, reranking disabled")
                    }
                    other => info!(reason = ?other, "Reranking disabled"),
                }
                return Ok(Arc::new(JinaReranker::disabled(http_client)));
            }
        };

        let reranker = JinaReranker::new(http_client, api_key)
            .with_api_url(&config.api_url)
            .with_model(&config.model)
            .with_retry(RetryPolicy::new(config.max_retries));

        info!(model = %config.model, url = %config.api_url, "Reranker configured");
        Ok(Arc::new(reranker))
    }

    /// Decide whether reranking can run and with which key
    pub fn resolve(
        config: &RerankerConfig,
        credentials: &dyn CredentialProvider,
        env_present: impl Fn(&str) -> bool,
    ) -> Result<String, DisabledReason> {
        if !config.enabled {
            return Err(DisabledReason::Configuration);
        }

        if config.disable_on_hosted && config.hosted_env_vars.iter().any(|v| env_present(v)) {
            return Err(DisabledReason::HostedEnvironment);
        }

        credentials
            .get_credential(&CredentialType::Jina)
            .map(|c| c.api_key().to_string())
            .map_err(|_| DisabledReason::MissingCredential)
    }
}
