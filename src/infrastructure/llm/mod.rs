//! Judge backend implementations

mod factory;
mod mistral;
mod ollama;

pub use factory::JudgeProviderFactory;
pub use mistral::{DEFAULT_MISTRAL_BASE_URL, MISTRAL_DEFAULT_MAX_TOKENS, MistralProvider};
pub use ollama::{DEFAULT_OLLAMA_BASE_URL, OLLAMA_DEFAULT_NUM_PREDICT, OllamaProvider};
