//! Reranker trait and ranking helpers

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;
use crate::domain::chunk::{Chunk, ScoredChunk};

/// Second-stage relevance scoring of retrieved chunks
#[async_trait]
pub trait Reranker: Send + Sync + Debug {
    /// Score `candidates` against `query` and return at most
    /// `min(top_k, candidates.len())` chunks ordered by non-increasing score.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError>;

    /// Whether calls reach the scoring service (false = passthrough)
    fn is_enabled(&self) -> bool;

    fn reranker_name(&self) -> &'static str;
}

/// Synthetic score for position `index` when no service scored the chunk
pub fn synthetic_score(index: usize) -> f32 {
    1.0 - (index as f32 * 0.1)
}

/// First `top_k` candidates in original order with descending synthetic scores
pub fn passthrough(candidates: &[Chunk], top_k: usize) -> Vec<ScoredChunk> {
    candidates
        .iter()
        .take(top_k)
        .enumerate()
        .map(|(i, chunk)| ScoredChunk::new(chunk.clone(), synthetic_score(i)))
        .collect()
}

/// Sort `(position, score)` pairs by non-increasing score and keep `top_k`.
/// Ties keep submission order.
pub fn rank_pairs(mut pairs: Vec<(usize, f32)>, top_k: usize) -> Vec<(usize, f32)> {
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.truncate(top_k);
    pairs
}
