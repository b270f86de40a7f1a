//! Infrastructure layer - External service implementations

pub mod credentials;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod rerank;
pub mod retry;
pub mod verification;
