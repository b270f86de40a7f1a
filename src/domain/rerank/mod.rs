//! Rerank domain - second-stage relevance scoring

mod document;
mod reranker;

pub use document::{PreparedDocuments, RerankDocument};
pub use reranker::{Reranker, passthrough, rank_pairs, synthetic_score};

#[cfg(test)]
pub use reranker::mock::MockReranker;
