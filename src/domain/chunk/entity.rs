use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of retrieved content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    #[default]
    Text,
    Image,
    Table,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Table => "table",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source metadata attached to a chunk by the upstream retrieval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Name of the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    /// Regulation or source code the document belongs to
    #[serde(default, alias = "regulation_code", skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    /// Page the chunk was extracted from
    #[serde(default, alias = "page", skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Similarity score from the vector search, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Anything else the retrieval attached
    #[serde(flatten, default)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A unit of retrieved content (text passage, image reference, or table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier
    pub id: String,
    /// Content kind
    #[serde(rename = "type", default)]
    pub kind: ChunkKind,
    /// Text passage or tabular payload
    #[serde(default)]
    pub content: String,
    /// Remote URL or `data:image/...;base64,` reference for image chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Textual description of an image chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, ChunkKind::Text, content)
    }

    pub fn table(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, ChunkKind::Table, content)
    }

    pub fn image(id: impl Into<String>, image_url: impl Into<String>) -> Self {
        let mut chunk = Self::new(id, ChunkKind::Image, "");
        chunk.image_url = Some(image_url.into());
        chunk
    }

    fn new(id: impl Into<String>, kind: ChunkKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            image_url: None,
            description: None,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_document(mut self, name: impl Into<String>) -> Self {
        self.metadata.document_name = Some(name.into());
        self
    }

    pub fn with_source_code(mut self, code: impl Into<String>) -> Self {
        self.metadata.source_code = Some(code.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.metadata.page_number = Some(page);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Document name, page and content: what must survive both stages unchanged
    pub fn identity(&self) -> (Option<&str>, Option<u32>, &str) {
        (
            self.metadata.document_name.as_deref(),
            self.metadata.page_number,
            self.content.as_str(),
        )
    }

    /// Image reference, read from the top level or, as the retrieval emits
    /// it, from `metadata.image_url`
    pub fn image_reference(&self) -> Option<&str> {
        let top_level = self.image_url.as_deref().filter(|u| !u.trim().is_empty());

        top_level.or_else(|| {
            self.metadata
                .extra
                .get("image_url")
                .and_then(serde_json::Value::as_str)
                .filter(|u| !u.trim().is_empty())
        })
    }

    /// True when the chunk carries something that can be judged for relevance
    pub fn has_usable_payload(&self) -> bool {
        match self.kind {
            ChunkKind::Image => self.image_reference().is_some(),
            ChunkKind::Text | ChunkKind::Table => !self.content.trim().is_empty(),
        }
    }
}

/// A chunk with the score assigned by the reranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub rerank_score: f32,
}

impl ScoredChunk {
    pub fn new(chunk: Chunk, rerank_score: f32) -> Self {
        Self {
            chunk,
            rerank_score,
        }
    }
}

/// A member of the working set handed to per-chunk verification
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingChunk {
    pub chunk: Chunk,
    /// Present when the chunk went through the reranker
    pub rerank_score: Option<f32>,
}

impl From<ScoredChunk> for WorkingChunk {
    fn from(scored: ScoredChunk) -> Self {
        Self {
            chunk: scored.chunk,
            rerank_score: Some(scored.rerank_score),
        }
    }
}

impl From<Chunk> for WorkingChunk {
    fn from(chunk: Chunk) -> Self {
        Self {
            chunk,
            rerank_score: None,
        }
    }
}
