use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{CompletionOptions, CompletionProvider, DomainError, Message};
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::retry::RetryPolicy;

pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// Output budget when the caller does not set one; a verdict fits in a few tokens
pub const MISTRAL_DEFAULT_MAX_TOKENS: u32 = 10;

/// Mistral chat-completions judge backend (cloud)
#[derive(Debug)]
pub struct MistralProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> MistralProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, DEFAULT_MISTRAL_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt: &str, options: &CompletionOptions) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [Message::user(prompt)],
            "temperature": options.temperature,
            "max_tokens": options.output_budget(MISTRAL_DEFAULT_MAX_TOKENS),
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: MistralResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::judge_invocation("mistral", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::judge_invocation("mistral", "No choices in response"))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for MistralProvider<C> {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(prompt, options);

        let json = self
            .retry
            .run("mistral", || self.client.post_json(&url, self.headers(), &body))
            .await
            .map_err(|e| e.for_judge("mistral"))?;

        self.parse_response(json)
    }

    fn provider_name(&self) -> &'static str {
        "mistral"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct MistralResponse {
    choices: Vec<MistralChoice>,
}

#[derive(Debug, Deserialize)]
struct MistralChoice {
    message: MistralMessage,
}

#[derive(Debug, Deserialize)]
struct MistralMessage {
    content: Option<String>,
}
