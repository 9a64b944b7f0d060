//! Vector store abstraction consumed by the RAG pipeline.
//!
//! The pipeline owns an injected [`VectorStore`] rather than reaching for a process-wide
//! handle, so tests can substitute an in-memory fake. The production backend is
//! [`crate::qdrant::QdrantStore`].

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by vector store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend was unreachable or rejected the request.
    #[error("Vector store unavailable: {0}")]
    Unavailable(String),
}

/// Metadata persisted alongside each chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Display name of the source document.
    pub filename: String,
    /// Zero-based position of the chunk within its document.
    pub chunk_index: usize,
}

/// A chunk read back from the store.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    /// Raw chunk text.
    pub text: String,
    /// Metadata persisted with the chunk.
    pub metadata: ChunkMetadata,
}

/// A chunk prepared for writing, keyed by its deterministic identifier.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Deterministic identifier (`{document_hash}_{chunk_index}`); colliding ids overwrite.
    pub chunk_id: String,
    /// Embedding vector produced for the chunk.
    pub embedding: Vec<f32>,
    /// Raw chunk text.
    pub text: String,
    /// Metadata persisted with the chunk.
    pub metadata: ChunkMetadata,
}

/// Similarity-searchable chunk storage.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite the entry at the record's `chunk_id`.
    async fn upsert(&self, record: ChunkRecord) -> Result<(), StoreError>;

    /// Return up to `limit` chunks ranked by ascending cosine distance from `embedding`.
    ///
    /// Returns fewer than `limit` entries when the store is smaller, and an empty vector
    /// when it is empty.
    async fn nearest_neighbors(
        &self,
        embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<StoredChunk>, StoreError>;

    /// Return every chunk whose filename matches, or all chunks when `filename` is `None`.
    ///
    /// Ordering follows the backend's scroll order and is not otherwise specified.
    async fn chunks_by_filename(
        &self,
        filename: Option<&str>,
    ) -> Result<Vec<StoredChunk>, StoreError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Delete every stored chunk; the store remains usable afterward.
    async fn clear(&self) -> Result<(), StoreError>;
}
