//! Chunk domain - retrieved content units and their scored forms

mod entity;

pub use entity::{Chunk, ChunkKind, ChunkMetadata, ScoredChunk, WorkingChunk};
