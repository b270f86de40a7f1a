//! Verification domain
//!
//! Types and pure functions for judging whether a retrieved chunk is useful
//! evidence for a query: configuration, prompt construction, verdict parsing
//! and the accepted/rejected/dropped outcome of a run.

mod config;
mod outcome;
mod prompt;
mod verdict;

pub use config::VerificationConfig;
pub use outcome::{
    ChunkVerification, DroppedChunk, RerankStatus, VerificationOutcome, VerificationSummary,
    VerifiedChunk,
};
pub use prompt::{MAX_EXCERPT_CHARS, build_verification_prompt};
pub use verdict::{Verdict, classify, parse_structured, parse_verdict};
