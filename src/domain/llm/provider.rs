use async_trait::async_trait;
use std::fmt::Debug;

use super::CompletionOptions;
use crate::domain::DomainError;

/// Trait for judge model backends (Mistral, Ollama, ...)
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Complete a single-turn prompt and return the trimmed response text
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model identity stamped on every verified chunk
    fn model(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock completion provider for testing.
    ///
    /// Rules are matched in insertion order against the prompt text; the
    /// first rule whose marker appears in the prompt decides the outcome.
    #[derive(Debug)]
    pub struct MockCompletionProvider {
        model: String,
        default_response: Option<String>,
        rules: Vec<(String, Result<String, String>)>,
        delays_for: Vec<(String, Duration)>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockCompletionProvider {
        pub fn new(model: impl Into<String>) -> Self {
            Self {
                model: model.into(),
                default_response: None,
                rules: Vec::new(),
                delays_for: Vec::new(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, response: impl Into<String>) -> Self {
            self.default_response = Some(response.into());
            self
        }

        pub fn with_response_for(
            mut self,
            marker: impl Into<String>,
            response: impl Into<String>,
        ) -> Self {
            self.rules.push((marker.into(), Ok(response.into())));
            self
        }

        pub fn with_error_for(
            mut self,
            marker: impl Into<String>,
            error: impl Into<String>,
        ) -> Self {
            self.rules.push((marker.into(), Err(error.into())));
            self
        }

        /// Delay only prompts containing `marker`
        pub fn with_delay_for(mut self, marker: impl Into<String>, delay: Duration) -> Self {
            self.delays_for.push((marker.into(), delay));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for MockCompletionProvider {
        async fn complete(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            let delay = self
                .delays_for
                .iter()
                .find(|(marker, _)| prompt.contains(marker.as_str()))
                .map(|(_, d)| *d);

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            for (marker, outcome) in &self.rules {
                if prompt.contains(marker.as_str()) {
                    return outcome
                        .clone()
                        .map_err(|e| DomainError::judge_invocation("mock", e));
                }
            }

            self.default_response
                .clone()
                .ok_or_else(|| DomainError::judge_invocation("mock", "No mock response configured"))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn model(&self) -> &str {
            &self.model
        }
    }
}
