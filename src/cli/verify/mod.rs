//! Verify command - runs the rerank + judge pipeline over a candidates file

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::chunk::Chunk;
use crate::domain::{
    DomainError, DroppedChunk, RerankStatus, VerificationOutcome, VerificationSummary,
    VerifiedChunk,
};
use crate::infrastructure::logging;
use crate::infrastructure::verification::{GroupedChunks, ValidationService};

/// Arguments for the verify command
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Query the candidates were retrieved for
    #[arg(long)]
    pub query: String,

    /// JSON file holding an array of chunks, or an object with
    /// `text` / `images` / `tables` groups
    #[arg(long)]
    pub input: PathBuf,

    /// Minimum judge confidence for acceptance (overrides config)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Working-set size (overrides config)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Skip reranking and truncate in original order
    #[arg(long)]
    pub no_rerank: bool,

    /// Include rejected and dropped chunks in the output
    #[arg(long)]
    pub rejected: bool,
}

/// Candidates file contents
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CandidateInput {
    Flat(Vec<Chunk>),
    Grouped(GroupedChunks),
}

#[derive(Debug, Serialize)]
struct VerifyReport {
    accepted: Vec<VerifiedChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<Vec<VerifiedChunk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dropped: Option<Vec<DroppedChunk>>,
    rerank: RerankStatus,
    summary: VerificationSummary,
}

impl VerifyReport {
    fn new(outcome: VerificationOutcome, include_rejected: bool) -> Self {
        let summary = outcome.summary();

        Self {
            accepted: outcome.accepted,
            rejected: include_rejected.then_some(outcome.rejected),
            dropped: include_rejected.then_some(outcome.dropped),
            rerank: outcome.rerank,
            summary,
        }
    }
}

/// Run the verify command
pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        anyhow::anyhow!(
            "Invalid configuration: {}\n\
             Check config/default.* and config/local.*, and EVIDENCE__* environment variables.",
            e
        )
    })?;
    logging::init_logging(&config.logging).map_err(|e| anyhow::anyhow!(remediation(&e)))?;

    let verifier = crate::create_verifier(&config).map_err(|e| anyhow::anyhow!(remediation(&e)))?;

    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;
    let input: CandidateInput = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Invalid candidates file {}: {}", args.input.display(), e))?;

    let threshold = args.threshold.unwrap_or(verifier.config().confidence_threshold);
    let top_k = args.top_k.unwrap_or(verifier.config().top_k);
    let use_rerank = verifier.config().use_rerank && !args.no_rerank;

    let output = match input {
        CandidateInput::Flat(candidates) => {
            info!(
                candidates = candidates.len(),
                model = %verifier.judge_model(),
                "Verifying candidates"
            );

            let outcome = verifier
                .verify_detailed(&args.query, &candidates, threshold, top_k, use_rerank)
                .await?;

            if !outcome.has_evidence() {
                warn!("No candidate passed verification");
            }

            serde_json::to_string_pretty(&VerifyReport::new(outcome, args.rejected))?
        }
        CandidateInput::Grouped(groups) => {
            let mut service = ValidationService::new(verifier)
                .with_threshold(threshold)
                .with_rerank(use_rerank);
            if let Some(top_k) = args.top_k {
                service = service.with_top_k(top_k);
            }

            let outcomes = service
                .validate_grouped_detailed(&args.query, &groups)
                .await?;

            if args.rejected {
                let reports: BTreeMap<_, _> = outcomes
                    .into_iter()
                    .map(|(key, outcome)| (key, VerifyReport::new(outcome, true)))
                    .collect();
                serde_json::to_string_pretty(&reports)?
            } else {
                let accepted: BTreeMap<_, _> = outcomes
                    .into_iter()
                    .map(|(key, outcome)| (key, outcome.into_accepted()))
                    .collect();
                serde_json::to_string_pretty(&accepted)?
            }
        }
    };

    println!("{}", output);
    Ok(())
}

/// Message shown instead of a raw error when the pipeline cannot be built
pub fn remediation(error: &DomainError) -> String {
    match error {
        DomainError::Configuration { message } if message.contains("MISTRAL_API_KEY") => format!(
            "{}\nExport MISTRAL_API_KEY, set judge.api_key in config/local.toml, \
             or switch to the local backend with EVIDENCE__JUDGE__PROVIDER=ollama.",
            message
        ),
        DomainError::Configuration { message } => format!(
            "Configuration error: {}\nReview the [judge], [reranker] and [verification] \
             sections of config/local.toml or the matching EVIDENCE__* environment variables.",
            message
        ),
        DomainError::Credential { message } => format!(
            "Missing credential: {}\nExport the variable or set the key in config/local.toml.",
            message
        ),
        other => other.to_string(),
    }
}
