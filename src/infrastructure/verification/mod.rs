//! Verification pipeline

mod validation_service;
mod verifier;

pub use validation_service::{GROUPED_TOP_K, GroupedChunks, ValidationService};
pub use verifier::ChunkVerifier;
