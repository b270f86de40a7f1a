use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{CompletionOptions, CompletionProvider, DomainError, Message};
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::retry::RetryPolicy;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Local models tend to open with a token or two of preamble
pub const OLLAMA_DEFAULT_NUM_PREDICT: u32 = 20;

/// Ollama `/api/chat` judge backend (local)
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    pub fn with_base_url(client: C, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn build_request(&self, prompt: &str, options: &CompletionOptions) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [Message::user(prompt)],
            "stream": false,
            "options": {
                "temperature": options.temperature,
                "num_predict": options.output_budget(OLLAMA_DEFAULT_NUM_PREDICT),
            },
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: OllamaChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::judge_invocation("ollama", format!("Failed to parse response: {}", e))
        })?;

        Ok(response.message.content.trim().to_string())
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for OllamaProvider<C> {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, DomainError> {
        let url = self.chat_url();
        let body = self.build_request(prompt, options);
        let headers = || vec![("Content-Type", "application/json")];

        let json = self
            .retry
            .run("ollama", || self.client.post_json(&url, headers(), &body))
            .await
            .map_err(|e| e.for_judge("ollama"))?;

        self.parse_response(json)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "http://localhost:11434/api/chat";

    fn chat(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": content},
            "done": true
        })
    }

    #[tokio::test]
    async fn test_ollama_complete() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, chat("{\"useful\": false, \"confidence\": 0.8}"));
        let provider = OllamaProvider::new(client, "llama3");

        let text = provider.complete("p", &CompletionOptions::new()).await.unwrap();

        assert_eq!(text, r#"{"useful": false, "confidence": 0.8}"#);
        assert_eq!(provider.provider_name(), "ollama");
    }

    #[tokio::test]
    async fn test_ollama_request_shape() {
        let client = MockHttpClient::new().with_response(TEST_URL, chat("oui"));
        let provider = OllamaProvider::new(client, "llama3");

        provider.complete("Q?", &CompletionOptions::new()).await.unwrap();

        let request = &provider.client.requests()[0];
        assert_eq!(request.body["model"], "llama3");
        assert_eq!(request.body["stream"], false);
        assert_eq!(request.body["messages"][0]["content"], "Q?");
        assert_eq!(request.body["options"]["num_predict"], OLLAMA_DEFAULT_NUM_PREDICT);
        assert_eq!(request.body["options"]["temperature"], 0.0);
        assert!(!request.headers.iter().any(|(k, _)| k == "Authorization"));
    }

    #[tokio::test]
    async fn test_ollama_transport_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "connection refused");
        let provider = OllamaProvider::new(client, "llama3");

        let err = provider.complete("p", &CompletionOptions::new()).await.unwrap_err();

        assert!(
            matches!(err, DomainError::JudgeInvocation { ref provider, .. } if provider == "ollama")
        );
    }

    #[tokio::test]
    async fn test_ollama_malformed_body() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({"done": true}));
        let provider = OllamaProvider::new(client, "llama3");

        assert!(provider.complete("p", &CompletionOptions::new()).await.is_err());
    }
}
