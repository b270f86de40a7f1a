//! Evidence filter
//!
//! Relevance filtering for retrieved document chunks:
//! - Second-stage reranking through an external scoring service
//! - Per-chunk verification by a judge model with a confidence threshold
//! - Graceful degradation when the rerank service or a judge call fails

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use domain::{CredentialType, DomainError};
use infrastructure::{
    credentials::EnvCredentialProvider,
    llm::JudgeProviderFactory,
    rerank::RerankerFactory,
    verification::ChunkVerifier,
};

/// Credential provider reading `JINA_API_KEY` / `MISTRAL_API_KEY`, falling
/// back to the keys in `config`
pub fn create_credential_provider(config: &AppConfig) -> EnvCredentialProvider {
    EnvCredentialProvider::new()
        .with_defaults()
        .with_fallback(CredentialType::Jina, config.reranker.api_key.clone())
        .with_fallback(CredentialType::Mistral, config.judge.api_key.clone())
}

/// Build the verification pipeline described by `config`.
///
/// Fails only on misconfiguration (unusable judge backend, missing cloud
/// credential, invalid pipeline settings). An unavailable rerank service
/// yields a passthrough reranker instead.
pub fn create_verifier(config: &AppConfig) -> Result<ChunkVerifier, DomainError> {
    let credentials = create_credential_provider(config);

    let judge = JudgeProviderFactory::create(&config.judge, &credentials)?;
    let reranker = RerankerFactory::create(&config.reranker, &credentials)?;

    let verifier = ChunkVerifier::new(judge, config.verification_config())
        .map_err(|e| DomainError::configuration(e.to_string()))?;

    Ok(verifier.with_reranker(reranker))
}
