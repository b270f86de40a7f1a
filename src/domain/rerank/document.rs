use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::domain::chunk::Chunk;

const INLINE_IMAGE_PREFIX: &str = "data:image";

/// A document as submitted to the rerank service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RerankDocument {
    Text { text: String },
    Image { image: String },
    Bytes { bytes: String },
}

impl RerankDocument {
    /// Build the request document for a chunk, or `None` when the chunk has
    /// no payload the service could score.
    pub fn from_chunk(chunk: &Chunk) -> Option<Self> {
        if let Some(reference) = chunk.image_reference() {
            return Self::from_image_reference(reference);
        }

        if chunk.content.trim().is_empty() {
            return None;
        }

        Some(Self::Text {
            text: chunk.content.clone(),
        })
    }

    fn from_image_reference(reference: &str) -> Option<Self> {
        if reference.starts_with("http") {
            return Some(Self::Image {
                image: reference.to_string(),
            });
        }

        if reference.starts_with(INLINE_IMAGE_PREFIX) {
            let (_, payload) = reference.split_once(',')?;

            if payload.is_empty() || STANDARD.decode(payload).is_err() {
                return None;
            }

            return Some(Self::Bytes {
                bytes: payload.to_string(),
            });
        }

        None
    }
}

/// Documents prepared for one rerank call, with the chunk each came from
#[derive(Debug, Clone, Default)]
pub struct PreparedDocuments<'a> {
    pub documents: Vec<RerankDocument>,
    pub chunks: Vec<&'a Chunk>,
}

impl<'a> PreparedDocuments<'a> {
    /// Prepare documents in candidate order, skipping unusable chunks
    pub fn prepare(candidates: &'a [Chunk]) -> Self {
        let mut prepared = Self::default();

        for chunk in candidates {
            if let Some(document) = RerankDocument::from_chunk(chunk) {
                prepared.documents.push(document);
                prepared.chunks.push(chunk);
            }
        }

        prepared
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
