//! Verification result types

use serde::{Deserialize, Serialize};

use super::Verdict;
use crate::domain::chunk::{Chunk, WorkingChunk};

/// A chunk that completed verification, with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
    /// Raw judge response text
    pub verification_response: String,
    /// Judge model identity
    pub verification_model: String,
    /// Parsed confidence, `None` when the heuristic decided
    pub verification_confidence: Option<f32>,
}

impl VerifiedChunk {
    pub fn new(
        working: WorkingChunk,
        response: impl Into<String>,
        model: impl Into<String>,
        verdict: &Verdict,
    ) -> Self {
        Self {
            chunk: working.chunk,
            rerank_score: working.rerank_score,
            verification_response: response.into(),
            verification_model: model.into(),
            verification_confidence: verdict.confidence,
        }
    }
}

/// Decision for a chunk whose judge call completed
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkVerification {
    Accepted(VerifiedChunk),
    Rejected(VerifiedChunk),
}

/// A chunk removed because its judge call failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedChunk {
    pub chunk_id: String,
    pub reason: String,
}

/// How the working set was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RerankStatus {
    /// Reranking was not requested or no reranker is configured
    Skipped,
    /// The reranker is disabled and returned candidates unchanged
    Passthrough,
    /// The scoring service ordered the working set
    Applied,
    /// The reranker failed and the original order was used
    Fallback { reason: String },
}

/// Everything a verification run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub accepted: Vec<VerifiedChunk>,
    pub rejected: Vec<VerifiedChunk>,
    pub dropped: Vec<DroppedChunk>,
    pub rerank: RerankStatus,
    pub working_set_size: usize,
}

impl VerificationOutcome {
    pub fn empty(rerank: RerankStatus) -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
            dropped: Vec::new(),
            rerank,
            working_set_size: 0,
        }
    }

    /// Merge per-chunk results gathered in working-set order
    pub fn from_results(
        results: Vec<Result<ChunkVerification, DroppedChunk>>,
        rerank: RerankStatus,
    ) -> Self {
        let mut outcome = Self::empty(rerank);
        outcome.working_set_size = results.len();

        for result in results {
            match result {
                Ok(ChunkVerification::Accepted(v)) => outcome.accepted.push(v),
                Ok(ChunkVerification::Rejected(v)) => outcome.rejected.push(v),
                Err(dropped) => outcome.dropped.push(dropped),
            }
        }

        outcome
    }

    pub fn has_evidence(&self) -> bool {
        !self.accepted.is_empty()
    }

    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary {
            total: self.working_set_size,
            accepted: self.accepted.len(),
            rejected: self.rejected.len(),
            dropped: self.dropped.len(),
        }
    }

    pub fn into_accepted(self) -> Vec<VerifiedChunk> {
        self.accepted
    }
}

/// Summary statistics for a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub dropped: usize,
}
