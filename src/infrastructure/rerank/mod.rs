//! Rerank service adapters

mod factory;
mod jina;

pub use factory::{DisabledReason, RerankerFactory};
pub use jina::{DEFAULT_API_URL, DEFAULT_MODEL, JinaReranker, parse_scores};
