//! Domain layer - Core types, traits and decision logic

pub mod chunk;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod rerank;
pub mod verification;

pub use chunk::{Chunk, ChunkKind, ChunkMetadata, ScoredChunk, WorkingChunk};
pub use credentials::{Credential, CredentialProvider, CredentialType};
pub use error::DomainError;
pub use llm::{CompletionOptions, CompletionProvider, Message, MessageRole};
pub use rerank::{PreparedDocuments, RerankDocument, Reranker};
pub use verification::{
    ChunkVerification, DroppedChunk, RerankStatus, Verdict, VerificationConfig,
    VerificationOutcome, VerificationSummary, VerifiedChunk,
};
