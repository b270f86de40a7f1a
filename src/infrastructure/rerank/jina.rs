//! HTTP rerank client for Jina-compatible scoring services

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::chunk::{Chunk, ScoredChunk};
use crate::domain::rerank::{PreparedDocuments, Reranker, passthrough, rank_pairs};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::retry::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://api.jina.ai/v1/rerank";
pub const DEFAULT_MODEL: &str = "jina-reranker-m0";

const SERVICE: &str = "rerank";

/// Reranker backed by a Jina-style `/rerank` endpoint.
///
/// A disabled instance never touches the network and returns candidates in
/// their original order with synthetic scores.
#[derive(Debug)]
pub struct JinaReranker<C: HttpClientTrait> {
    client: C,
    api_url: String,
    model: String,
    api_key: Option<String>,
    enabled: bool,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> JinaReranker<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: Some(api_key.into()),
            enabled: true,
            retry: RetryPolicy::default(),
        }
    }

    /// A reranker that always passes candidates through
    pub fn disabled(client: C) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            enabled: false,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(&self, query: &str, prepared: &PreparedDocuments<'_>) -> Value {
        serde_json::json!({
            "model": self.model,
            "query": query,
            "top_n": prepared.len(),
            "documents": prepared.documents,
            "return_documents": false,
        })
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| format!("Bearer {}", key))
    }

    async fn send(&self, body: &Value) -> Result<Value, DomainError> {
        let auth = self.auth_header();
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = auth {
            headers.push(("Authorization", auth.as_str()));
        }

        self.client
            .post_json(&self.api_url, headers, body)
            .await
            .map_err(|e| e.for_service(SERVICE))
    }
}

/// Normalize either response shape into `(position, score)` pairs.
///
/// `scores` is aligned with submission order; `results` entries carry an
/// `index` and a `relevance_score` (or `score`). Entries pointing outside
/// the submitted documents or missing a numeric score are skipped.
pub fn parse_scores(response: &Value, submitted: usize) -> Result<Vec<(usize, f32)>, DomainError> {
    if let Some(scores) = response.get("scores").and_then(Value::as_array) {
        return Ok(scores
            .iter()
            .take(submitted)
            .enumerate()
            .filter_map(|(i, score)| score.as_f64().map(|s| (i, s as f32)))
            .collect());
    }

    if let Some(results) = response.get("results").and_then(Value::as_array) {
        return Ok(results
            .iter()
            .filter_map(|item| {
                let index = item.get("index").and_then(Value::as_u64)? as usize;
                if index >= submitted {
                    return None;
                }
                let score = item
                    .get("relevance_score")
                    .and_then(Value::as_f64)
                    .or_else(|| item.get("score").and_then(Value::as_f64))?;
                Some((index, score as f32))
            })
            .collect());
    }

    Err(DomainError::external_service(
        SERVICE,
        "Unexpected response format: expected 'scores' or 'results'",
    ))
}

#[async_trait]
impl<C: HttpClientTrait> Reranker for JinaReranker<C> {
    async fn rerank(
        &self,
        query: &str,
        candidates: &[Chunk],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        if !self.enabled {
            debug!(candidates = candidates.len(), "Reranking disabled, passing through");
            return Ok(passthrough(candidates, top_k));
        }

        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let prepared = PreparedDocuments::prepare(candidates);
        if prepared.is_empty() {
            debug!(
                candidates = candidates.len(),
                "No candidate has a usable payload, skipping rerank call"
            );
            return Ok(Vec::new());
        }

        let body = self.build_request(query, &prepared);
        let response = self.retry.run(SERVICE, || self.send(&body)).await?;
        let pairs = parse_scores(&response, prepared.len())?;

        let ranked: Vec<ScoredChunk> = rank_pairs(pairs, top_k)
            .into_iter()
            .map(|(i, score)| ScoredChunk::new(prepared.chunks[i].clone(), score))
            .collect();

        info!(
            model = %self.model,
            submitted = prepared.len(),
            skipped = candidates.len() - prepared.len(),
            returned = ranked.len(),
            "Rerank completed"
        );

        Ok(ranked)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn reranker_name(&self) -> &'static str {
        "jina"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::{MockFailure, MockHttpClient};

    const URL: &str = "https://rerank.test/v1/rerank";

    fn candidates() -> Vec<Chunk> {
        vec![
            Chunk::text("a", "Largeur maximale 2,55 m"),
            Chunk::text("b", "Emissions sonores"),
            Chunk::text("c", "Freinage d'urgence"),
        ]
    }

    fn reranker(client: MockHttpClient) -> JinaReranker<MockHttpClient> {
        JinaReranker::new(client, "jina-key").with_api_url(URL)
    }

    #[tokio::test]
    async fn test_rerank_with_scores_shape() {
        let client = MockHttpClient::new()
            .with_response(URL, serde_json::json!({"scores": [0.2, 0.9, 0.5]}));
        let reranker = reranker(client);

        let ranked = reranker.rerank("bus", &candidates(), 2).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(ranked[0].rerank_score, 0.9);
    }

    #[tokio::test]
    async fn test_rerank_with_results_shape() {
        let client = MockHttpClient::new().with_response(
            URL,
            serde_json::json!({"results": [
                {"index": 2, "relevance_score": 0.8},
                {"index": 0, "score": 0.4},
                {"index": 7, "relevance_score": 0.99},
                {"index": 1}
            ]}),
        );
        let reranker = reranker(client);

        let ranked = reranker.rerank("bus", &candidates(), 10).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_request_body_and_headers() {
        let client = MockHttpClient::new()
            .with_response(URL, serde_json::json!({"scores": [0.1, 0.2, 0.3]}));
        let reranker = reranker(client).with_model("jina-reranker-v2");

        reranker.rerank("bus", &candidates(), 1).await.unwrap();

        let requests = reranker.client.requests();
        assert_eq!(requests.len(), 1);
        let body = &requests[0].body;
        assert_eq!(body["model"], "jina-reranker-v2");
        assert_eq!(body["query"], "bus");
        assert_eq!(body["top_n"], 3);
        assert_eq!(body["return_documents"], false);
        assert_eq!(body["documents"][0]["text"], "Largeur maximale 2,55 m");
        assert!(requests[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer jina-key".to_string())));
    }

    #[tokio::test]
    async fn test_unusable_chunks_are_not_submitted() {
        let client = MockHttpClient::new()
            .with_response(URL, serde_json::json!({"scores": [0.3, 0.6]}));
        let reranker = reranker(client);
        let chunks = vec![
            Chunk::text("a", "texte"),
            Chunk::image("bad", "file:///tmp/x.png"),
            Chunk::image("img", "https://cdn.test/fig.png"),
        ];

        let ranked = reranker.rerank("q", &chunks, 5).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["img", "a"]);
        let body = &reranker.client.requests()[0].body;
        assert_eq!(body["top_n"], 2);
        assert_eq!(body["documents"][1]["image"], "https://cdn.test/fig.png");
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let reranker = reranker(MockHttpClient::new());

        let ranked = reranker.rerank("q", &[], 5).await.unwrap();
        assert!(ranked.is_empty());

        let ranked = reranker
            .rerank("q", &[Chunk::image("x", "ftp://nope")], 5)
            .await
            .unwrap();
        assert!(ranked.is_empty());
        assert_eq!(reranker.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_passes_through_without_call() {
        let reranker = JinaReranker::disabled(MockHttpClient::new());

        let ranked = reranker.rerank("q", &candidates(), 2).await.unwrap();

        let ids: Vec<_> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(ranked[0].rerank_score, 1.0);
        assert!((ranked[1].rerank_score - 0.9).abs() < 1e-6);
        assert!(!reranker.is_enabled());
        assert_eq!(reranker.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_error_surfaces() {
        let client = MockHttpClient::new()
            .with_failure(URL, MockFailure::Status(503, "overloaded".to_string()));
        let reranker = reranker(client);

        let err = reranker.rerank("q", &candidates(), 2).await.unwrap_err();

        assert!(
            matches!(err, DomainError::ExternalService { ref service, .. } if service == "rerank")
        );
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_error() {
        let client = MockHttpClient::new().with_response(URL, serde_json::json!({"data": []}));
        let reranker = reranker(client);

        let err = reranker.rerank("q", &candidates(), 2).await.unwrap_err();
        assert!(err.to_string().contains("Unexpected response format"));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let client = MockHttpClient::new()
            .with_failure(URL, MockFailure::Status(503, "busy".to_string()))
            .with_response(URL, serde_json::json!({"scores": [0.1, 0.2, 0.3]}));
        let reranker = reranker(client).with_retry(RetryPolicy::new(1).with_initial_delay(1));

        let ranked = reranker.rerank("q", &candidates(), 3).await.unwrap();

        assert_eq!(ranked[0].chunk.id, "c");
        assert_eq!(reranker.client.call_count(), 2);
    }

    #[test]
    fn test_parse_scores_ignores_extra_positions() {
        let pairs = parse_scores(&serde_json::json!({"scores": [0.1, "x", 0.3, 0.9]}), 3).unwrap();
        assert_eq!(pairs, vec![(0, 0.1), (2, 0.3)]);
    }
}
