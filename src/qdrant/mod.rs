//! Qdrant vector store integration.

pub mod client;
pub mod filters;
pub mod payload;
pub mod store;
pub mod types;

pub use client::QdrantService;
pub use filters::build_filename_filter;
pub use payload::{compute_document_hash, point_id_for_chunk};
pub use store::QdrantStore;
pub use types::{PointInsert, QdrantError, ScoredPoint};
