//! Retrieval-augmented generation pipeline: extraction, chunking, embedding, retrieval,
//! and prompt assembly.

pub mod chunking;
mod prompts;
mod service;
pub mod types;

pub use chunking::{ChunkingError, chunk_text};
pub use service::{RagApi, RagService};
pub use types::{
    AnswerError, AnswerOutcome, IngestError, IngestOutcome, StatsSnapshot, SummarizeError,
};
