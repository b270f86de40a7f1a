//! Rerank-then-judge verification pipeline
//!
//! Candidates are optionally reranked and truncated to a working set, then
//! each working chunk is judged independently. Judge calls run with bounded
//! concurrency and are merged back in working-set order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::domain::chunk::{Chunk, WorkingChunk};
use crate::domain::verification::{build_verification_prompt, parse_verdict};
use crate::domain::{
    ChunkVerification, CompletionOptions, CompletionProvider, DomainError, DroppedChunk,
    RerankStatus, Reranker, Verdict, VerificationConfig, VerificationOutcome, VerifiedChunk,
};

/// Verifies retrieved chunks against a query with a judge model
#[derive(Debug, Clone)]
pub struct ChunkVerifier {
    judge: Arc<dyn CompletionProvider>,
    reranker: Option<Arc<dyn Reranker>>,
    config: VerificationConfig,
}

impl ChunkVerifier {
    /// Create a verifier around a constructed judge. Fails when `config` is
    /// invalid.
    pub fn new(
        judge: Arc<dyn CompletionProvider>,
        config: VerificationConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            judge,
            reranker: None,
            config,
        })
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    pub fn judge_model(&self) -> &str {
        self.judge.model()
    }

    /// Accepted chunks only
    pub async fn verify(
        &self,
        query: &str,
        candidates: &[Chunk],
        confidence_threshold: f32,
        top_k: usize,
        use_rerank: bool,
    ) -> Result<Vec<VerifiedChunk>, DomainError> {
        self.verify_detailed(query, candidates, confidence_threshold, top_k, use_rerank)
            .await
            .map(VerificationOutcome::into_accepted)
    }

    /// Accepted, rejected and dropped chunks plus how the working set was built.
    ///
    /// Only invalid arguments produce an error; rerank and judge failures are
    /// absorbed into the outcome.
    pub async fn verify_detailed(
        &self,
        query: &str,
        candidates: &[Chunk],
        confidence_threshold: f32,
        top_k: usize,
        use_rerank: bool,
    ) -> Result<VerificationOutcome, DomainError> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(DomainError::validation(format!(
                "confidence_threshold must be within [0, 1], got {}",
                confidence_threshold
            )));
        }

        if top_k == 0 {
            return Err(DomainError::validation("top_k must be at least 1"));
        }

        if candidates.is_empty() {
            debug!("No candidates to verify");
            return Ok(VerificationOutcome::empty(RerankStatus::Skipped));
        }

        let (working_set, rerank) = self.working_set(query, candidates, top_k, use_rerank).await;

        debug!(
            working_set = working_set.len(),
            concurrency = self.config.concurrency,
            "Verifying working set"
        );

        let results: Vec<_> = stream::iter(
            working_set
                .into_iter()
                .map(|working| self.verify_chunk(query, working, confidence_threshold)),
        )
        .buffered(self.config.concurrency)
        .collect()
        .await;

        let outcome = VerificationOutcome::from_results(results, rerank);
        let summary = outcome.summary();

        info!(
            candidates = candidates.len(),
            working_set = summary.total,
            accepted = summary.accepted,
            rejected = summary.rejected,
            dropped = summary.dropped,
            model = %self.judge.model(),
            "Verification completed"
        );

        Ok(outcome)
    }

    /// Prompt, judge and parse a single chunk without rerank or threshold.
    /// Returns the verdict and the raw judge response.
    pub async fn verify_one(
        &self,
        query: &str,
        chunk: &Chunk,
    ) -> Result<(Verdict, String), DomainError> {
        let response = self.judge(query, chunk).await?;
        Ok((parse_verdict(&response), response))
    }

    async fn working_set(
        &self,
        query: &str,
        candidates: &[Chunk],
        top_k: usize,
        use_rerank: bool,
    ) -> (Vec<WorkingChunk>, RerankStatus) {
        let reranker = match self.reranker {
            Some(ref reranker) if use_rerank => reranker,
            _ => return (truncate(candidates, top_k), RerankStatus::Skipped),
        };

        match reranker.rerank(query, candidates, top_k).await {
            Ok(scored) => {
                let status = if reranker.is_enabled() {
                    RerankStatus::Applied
                } else {
                    RerankStatus::Passthrough
                };
                (scored.into_iter().map(WorkingChunk::from).collect(), status)
            }
            Err(e) => {
                error!(
                    reranker = reranker.reranker_name(),
                    error = %e,
                    "Rerank failed, falling back to original order"
                );
                (
                    truncate(candidates, top_k),
                    RerankStatus::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    async fn verify_chunk(
        &self,
        query: &str,
        working: WorkingChunk,
        threshold: f32,
    ) -> Result<ChunkVerification, DroppedChunk> {
        let response = match self.judge(query, &working.chunk).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Dropping chunk {}: judge call failed: {}", working.chunk.id, e);
                return Err(DroppedChunk {
                    chunk_id: working.chunk.id.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let verdict = parse_verdict(&response);
        let accepted = verdict.is_accepted(threshold);

        debug!(
            chunk_id = %working.chunk.id,
            kind = %working.chunk.kind,
            useful = verdict.useful,
            confidence = ?verdict.confidence,
            accepted,
            "Chunk judged"
        );

        let verified = VerifiedChunk::new(working, response, self.judge.model(), &verdict);

        if accepted {
            Ok(ChunkVerification::Accepted(verified))
        } else {
            Ok(ChunkVerification::Rejected(verified))
        }
    }

    async fn judge(&self, query: &str, chunk: &Chunk) -> Result<String, DomainError> {
        let prompt = build_verification_prompt(query, chunk);
        let options = self.completion_options();
        let limit = Duration::from_millis(self.config.judge_timeout_ms);

        match tokio::time::timeout(limit, self.judge.complete(&prompt, &options)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(
                format!("judge call for chunk {}", chunk.id),
                self.config.judge_timeout_ms,
            )),
        }
    }

    fn completion_options(&self) -> CompletionOptions {
        let options = CompletionOptions::new().temperature(self.config.temperature);
        match self.config.max_output_tokens {
            Some(tokens) => options.max_output_tokens(tokens),
            None => options,
        }
    }
}

fn truncate(candidates: &[Chunk], top_k: usize) -> Vec<WorkingChunk> {
    candidates
        .iter()
        .take(top_k)
        .cloned()
        .map(WorkingChunk::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockCompletionProvider;
    use crate::domain::rerank::MockReranker;

    const USEFUL: &str = r#"{"useful": true, "confidence": 0.9}"#;
    const NOT_USEFUL: &str = r#"{"useful": false, "confidence": 0.8}"#;

    fn candidates(n: usize) -> Vec<Chunk> {
        (1..=n)
            .map(|i| {
                Chunk::text(format!("c{}", i), format!("marker-{} contenu", i)).with_page(i as u32)
            })
            .collect()
    }

    fn verifier(judge: MockCompletionProvider) -> ChunkVerifier {
        ChunkVerifier::new(Arc::new(judge), VerificationConfig::default()).unwrap()
    }

    fn ids(chunks: &[VerifiedChunk]) -> Vec<&str> {
        chunks.iter().map(|v| v.chunk.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_accepts_and_rejects_by_verdict() {
        let judge = MockCompletionProvider::new("llama3")
            .with_response_for("marker-1 ", USEFUL)
            .with_response_for("marker-2 ", NOT_USEFUL)
            .with_response(r#"{"useful": true, "confidence": 0.5}"#);
        let verifier = verifier(judge);

        let outcome = verifier
            .verify_detailed("q", &candidates(3), 0.7, 10, false)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.accepted), vec!["c1"]);
        assert_eq!(ids(&outcome.rejected), vec!["c2", "c3"]);
        assert_eq!(outcome.rerank, RerankStatus::Skipped);
        assert_eq!(outcome.accepted[0].verification_model, "llama3");
        assert_eq!(outcome.accepted[0].verification_response, USEFUL);
        assert_eq!(outcome.accepted[0].verification_confidence, Some(0.9));
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let judge = MockCompletionProvider::new("m")
            .with_response_for("marker-1 ", r#"{"useful": true, "confidence": 0.7}"#)
            .with_response_for("marker-2 ", r#"{"useful": true, "confidence": 0.69999}"#);
        let verifier = verifier(judge);

        let outcome = verifier
            .verify_detailed("q", &candidates(2), 0.7, 10, false)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.accepted), vec!["c1"]);
        assert_eq!(ids(&outcome.rejected), vec!["c2"]);
    }

    #[tokio::test]
    async fn test_heuristic_verdict_accepted_without_confidence() {
        let judge = MockCompletionProvider::new("m")
            .with_response_for("marker-1 ", "Oui, ce fragment est pertinent.")
            .with_response_for("marker-2 ", "Non");
        let verifier = verifier(judge);

        let outcome = verifier
            .verify_detailed("q", &candidates(2), 0.99, 10, false)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.accepted), vec!["c1"]);
        assert_eq!(outcome.accepted[0].verification_confidence, None);
        assert_eq!(ids(&outcome.rejected), vec!["c2"]);
    }

    #[tokio::test]
    async fn test_judge_failure_drops_only_that_chunk() {
        let judge = MockCompletionProvider::new("m")
            .with_error_for("marker-2 ", "connection reset")
            .with_response(USEFUL);
        let verifier = verifier(judge);

        let outcome = verifier
            .verify_detailed("q", &candidates(3), 0.7, 10, false)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.accepted), vec!["c1", "c3"]);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].chunk_id, "c2");
        assert!(outcome.dropped[0].reason.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_judge_timeout_drops_chunk() {
        let judge = MockCompletionProvider::new("m")
            .with_delay_for("marker-3 ", Duration::from_millis(500))
            .with_response(USEFUL);
        let config = VerificationConfig::default().with_judge_timeout_ms(50);
        let verifier = ChunkVerifier::new(Arc::new(judge), config).unwrap();

        let outcome = verifier
            .verify_detailed("q", &candidates(5), 0.7, 10, false)
            .await
            .unwrap();

        assert_eq!(ids(&outcome.accepted), vec!["c1", "c2", "c4", "c5"]);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.dropped[0].chunk_id, "c3");
        assert!(outcome.dropped[0].reason.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_rerank_orders_working_set() {
        let judge = MockCompletionProvider::new("m").with_response(USEFUL);
        let reranker = MockReranker::new()
            .with_score_for("c1", 0.1)
            .with_score_for("c2", 0.9)
            .with_score_for("c3", 0.5);
        let verifier = verifier(judge).with_reranker(Arc::new(reranker));

        let outcome = verifier
            .verify_detailed("q", &candidates(3), 0.7, 2, true)
            .await
            .unwrap();

        assert_eq!(outcome.rerank, RerankStatus::Applied);
        assert_eq!(ids(&outcome.accepted), vec!["c2", "c3"]);
        assert_eq!(outcome.accepted[0].rerank_score, Some(0.9));
    }

    #[tokio::test]
    async fn test_rerank_failure_falls_back_to_original_order() {
        let judge = MockCompletionProvider::new("m").with_response(USEFUL);
        let reranker = MockReranker::new().with_error("HTTP 503 Service Unavailable");
        let verifier = verifier(judge).with_reranker(Arc::new(reranker));

        let outcome = verifier
            .verify_detailed("q", &candidates(4), 0.7, 2, true)
            .await
            .unwrap();

        let RerankStatus::Fallback { ref reason } = outcome.rerank else {
            panic!("expected fallback, got {:?}", outcome.rerank);
        };
        assert!(reason.contains("503"));
        assert_eq!(ids(&outcome.accepted), vec!["c1", "c2"]);
        assert!(outcome.accepted.iter().all(|v| v.rerank_score.is_none()));
    }

    #[tokio::test]
    async fn test_use_rerank_false_skips_reranker() {
        let judge = MockCompletionProvider::new("m").with_response(USEFUL);
        let reranker = Arc::new(MockReranker::new());
        let verifier = verifier(judge).with_reranker(reranker.clone());

        let accepted = verifier.verify("q", &candidates(5), 0.7, 3, false).await.unwrap();

        assert_eq!(ids(&accepted), vec!["c1", "c2", "c3"]);
        assert_eq!(reranker.calls(), 0);
    }

    #[tokio::test]
    async fn test_disabled_reranker_is_passthrough() {
        let judge = MockCompletionProvider::new("m").with_response(USEFUL);
        let reranker = Arc::new(MockReranker::new().disabled());
        let verifier = verifier(judge).with_reranker(reranker.clone());

        let outcome = verifier
            .verify_detailed("q", &candidates(3), 0.7, 2, true)
            .await
            .unwrap();

        assert_eq!(outcome.rerank, RerankStatus::Passthrough);
        assert_eq!(ids(&outcome.accepted), vec!["c1", "c2"]);
        assert_eq!(reranker.calls(), 0);
        assert_eq!(outcome.accepted[0].chunk, candidates(1)[0]);
    }

    #[tokio::test]
    async fn test_empty_candidates_make_no_calls() {
        let judge = Arc::new(MockCompletionProvider::new("m").with_response(USEFUL));
        let verifier = ChunkVerifier::new(judge.clone(), VerificationConfig::default()).unwrap();

        let outcome = verifier.verify_detailed("q", &[], 0.7, 5, true).await.unwrap();

        assert!(!outcome.has_evidence());
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_rejected() {
        let verifier = verifier(MockCompletionProvider::new("m").with_response(USEFUL));

        assert!(verifier.verify("q", &candidates(1), 1.5, 5, false).await.is_err());
        assert!(verifier.verify("q", &candidates(1), 0.7, 0, false).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_construction() {
        let judge = Arc::new(MockCompletionProvider::new("m"));
        let config = VerificationConfig::default().with_concurrency(0);

        assert!(ChunkVerifier::new(judge, config).is_err());
    }

    #[tokio::test]
    async fn test_verification_is_idempotent() {
        let judge = MockCompletionProvider::new("m")
            .with_response(r#"{"useful": true, "confidence": 0.75}"#);
        let verifier = verifier(judge);
        let chunks = candidates(1);

        let first = verifier.verify("q", &chunks, 0.7, 1, false).await.unwrap();
        let second = verifier.verify("q", &chunks, 0.7, 1, false).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_verify_one_returns_raw_decision() {
        let judge = MockCompletionProvider::new("m")
            .with_response("```json\n{\"useful\": true, \"confidence\": 0.4}\n```");
        let verifier = verifier(judge);

        let (verdict, response) = verifier.verify_one("q", &candidates(1)[0]).await.unwrap();

        assert!(verdict.useful);
        assert_eq!(verdict.confidence, Some(0.4));
        assert!(response.starts_with("```json"));
    }

    #[tokio::test]
    async fn test_prompt_carries_chunk_identity() {
        let judge = Arc::new(MockCompletionProvider::new("m").with_response(USEFUL));
        let verifier = ChunkVerifier::new(judge.clone(), VerificationConfig::default()).unwrap();
        let chunk = Chunk::text("a", "Largeur 2,55 m")
            .with_document("R107.pdf")
            .with_source_code("R107")
            .with_page(12);

        verifier.verify_one("Largeur d'un bus ?", &chunk).await.unwrap();

        let prompt = &judge.prompts()[0];
        assert!(prompt.contains("Document: R107.pdf"));
        assert!(prompt.contains("Page: 12"));
        assert!(prompt.contains("Largeur d'un bus ?"));
    }

    #[tokio::test]
    async fn test_concurrent_run_preserves_order() {
        let judge = MockCompletionProvider::new("m")
            .with_delay_for("marker-1 ", Duration::from_millis(60))
            .with_delay_for("marker-2 ", Duration::from_millis(30))
            .with_response(USEFUL);
        let config = VerificationConfig::default().with_concurrency(4);
        let verifier = ChunkVerifier::new(Arc::new(judge), config).unwrap();

        let accepted = verifier.verify("q", &candidates(4), 0.7, 4, false).await.unwrap();

        assert_eq!(ids(&accepted), vec!["c1", "c2", "c3", "c4"]);
    }
}
