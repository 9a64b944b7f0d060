//! Core data types and error definitions for the RAG pipeline.

use crate::{
    embedding::EmbeddingClientError, extract::ExtractError, generation::GenerationClientError,
    processing::chunking::ChunkingError, store::StoreError,
};
use thiserror::Error;

/// Errors emitted while ingesting a document.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Document text could not be extracted.
    #[error("Failed to extract document text: {0}")]
    Extract(#[from] ExtractError),
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed to produce a vector for a chunk.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store rejected a write.
    #[error("Vector store request failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors emitted while answering a question.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Embedding provider failed to return a vector for the question.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Generation provider failed to produce an answer.
    #[error("Failed to generate answer: {0}")]
    Generation(#[from] GenerationClientError),
    /// Vector store search request failed.
    #[error("Vector store request failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors emitted while summarizing stored documents.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Generation provider failed to produce a summary.
    #[error("Failed to generate summary: {0}")]
    Generation(#[from] GenerationClientError),
    /// Vector store retrieval request failed.
    #[error("Vector store request failed: {0}")]
    Store(#[from] StoreError),
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Number of chunks written for the document.
    pub chunk_count: usize,
}

/// Result of answering a question against the stored corpus.
#[derive(Debug, Clone)]
pub enum AnswerOutcome {
    /// A grounded answer with the distinct source filenames that informed it.
    Answered {
        /// Generated answer text.
        text: String,
        /// Deduplicated source filenames, sorted for stable output.
        sources: Vec<String>,
    },
    /// The store held no chunks to answer from; not an error.
    NoDocuments,
}

/// Corpus statistics reported to callers.
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    /// Total number of chunks currently stored.
    pub total_chunks: u64,
}
