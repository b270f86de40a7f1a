//! Verification of chunks grouped by content kind

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ChunkVerifier;
use crate::domain::chunk::Chunk;
use crate::domain::{DomainError, VerificationOutcome, VerifiedChunk};

pub const GROUPED_TOP_K: usize = 8;

/// Retrieval output split by content kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupedChunks {
    #[serde(default)]
    pub text: Vec<Chunk>,
    #[serde(default)]
    pub images: Vec<Chunk>,
    #[serde(default)]
    pub tables: Vec<Chunk>,
}

impl GroupedChunks {
    fn groups(&self) -> [(&'static str, &[Chunk]); 3] {
        [
            ("text", self.text.as_slice()),
            ("images", self.images.as_slice()),
            ("tables", self.tables.as_slice()),
        ]
    }
}

/// Runs the verifier independently over each group
#[derive(Debug, Clone)]
pub struct ValidationService {
    verifier: ChunkVerifier,
    top_k: usize,
    threshold: Option<f32>,
    use_rerank: Option<bool>,
}

impl ValidationService {
    pub fn new(verifier: ChunkVerifier) -> Self {
        Self {
            verifier,
            top_k: GROUPED_TOP_K,
            threshold: None,
            use_rerank: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Override the configured acceptance threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Override the configured rerank flag
    pub fn with_rerank(mut self, use_rerank: bool) -> Self {
        self.use_rerank = Some(use_rerank);
        self
    }

    /// Accepted chunks per group. The result always has the `text`,
    /// `images` and `tables` keys.
    pub async fn validate_grouped(
        &self,
        query: &str,
        chunks: &GroupedChunks,
    ) -> Result<BTreeMap<String, Vec<VerifiedChunk>>, DomainError> {
        let outcomes = self.validate_grouped_detailed(query, chunks).await?;

        Ok(outcomes
            .into_iter()
            .map(|(key, outcome)| (key, outcome.into_accepted()))
            .collect())
    }

    /// Full outcome per group, same keys as [`Self::validate_grouped`]
    pub async fn validate_grouped_detailed(
        &self,
        query: &str,
        chunks: &GroupedChunks,
    ) -> Result<BTreeMap<String, VerificationOutcome>, DomainError> {
        let config = self.verifier.config();
        let threshold = self.threshold.unwrap_or(config.confidence_threshold);
        let use_rerank = self.use_rerank.unwrap_or(config.use_rerank);
        let mut outcomes = BTreeMap::new();

        for (key, group) in chunks.groups() {
            let outcome = self
                .verifier
                .verify_detailed(query, group, threshold, self.top_k, use_rerank)
                .await?;
            outcomes.insert(key.to_string(), outcome);
        }

        Ok(outcomes)
    }
}
