//! Verification configuration types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for a verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Minimum judge confidence for acceptance (inclusive)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Size of the working set submitted to the judge
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Rerank candidates before truncating to `top_k`
    #[serde(default = "default_true")]
    pub use_rerank: bool,
    /// Temperature for judge completions (lower = more deterministic)
    #[serde(default)]
    pub temperature: f32,
    /// Output token budget for the judge; backend default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Maximum number of judge calls in flight for one query
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Upper bound for a single judge call
    #[serde(default = "default_judge_timeout_ms")]
    pub judge_timeout_ms: u64,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_top_k() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_judge_timeout_ms() -> u64 {
    30_000
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            top_k: default_top_k(),
            use_rerank: default_true(),
            temperature: 0.0,
            max_output_tokens: None,
            concurrency: default_concurrency(),
            judge_timeout_ms: default_judge_timeout_ms(),
        }
    }
}

impl VerificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_rerank(mut self, use_rerank: bool) -> Self {
        self.use_rerank = use_rerank;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_judge_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.judge_timeout_ms = timeout_ms;
        self
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DomainError::validation(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if self.top_k == 0 {
            return Err(DomainError::validation("top_k must be at least 1"));
        }

        if self.concurrency == 0 {
            return Err(DomainError::validation("concurrency must be at least 1"));
        }

        if self.judge_timeout_ms == 0 {
            return Err(DomainError::validation("judge_timeout_ms must be positive"));
        }

        Ok(())
    }
}
