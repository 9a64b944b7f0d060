#![deny(missing_docs)]

//! Core library for the docrag document QA service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the Ollama adapter.
pub mod embedding;
/// Text extraction for PDF, DOCX, and plain-text documents.
pub mod extract;
/// Text generation client abstraction and the Ollama adapter.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Retrieval-augmented generation pipeline.
pub mod processing;
/// Qdrant vector store integration.
pub mod qdrant;
/// Vector store abstraction consumed by the pipeline.
pub mod store;
