//! RAG service coordinating extraction, chunking, embedding, retrieval, and generation.

use crate::{
    config::get_config,
    embedding::{EmbeddingClient, get_embedding_client},
    extract,
    generation::{GenerationClient, get_generation_client},
    metrics::{IngestionMetrics, MetricsSnapshot},
    processing::{
        chunking::chunk_text,
        prompts::{build_answer_prompt, build_summary_prompt},
        types::{
            AnswerError, AnswerOutcome, IngestError, IngestOutcome, StatsSnapshot, SummarizeError,
        },
    },
    qdrant::{QdrantStore, compute_document_hash},
    store::{ChunkMetadata, ChunkRecord, StoreError, VectorStore},
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Number of retrieved chunks used as answer context when the caller gives no limit.
const DEFAULT_ANSWER_LIMIT: usize = 5;
/// Hard cap on the number of chunk texts fed into a summary prompt.
const SUMMARY_SAMPLE_LIMIT: usize = 20;
/// Fixed summarize response when the store holds nothing to summarize.
const NO_DOCUMENTS_MESSAGE: &str = "No documents found.";

/// Coordinates the full pipeline: document extraction, chunking, embedding, vector storage,
/// and retrieval-augmented generation.
///
/// The service owns injected handles to the vector store and the embedding/generation
/// clients so the HTTP surface and tests share the same components. Construct it once near
/// process start and share it through an `Arc`.
pub struct RagService {
    store: Box<dyn VectorStore>,
    embedding_client: Box<dyn EmbeddingClient>,
    generation_client: Box<dyn GenerationClient>,
    metrics: Arc<IngestionMetrics>,
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Abstraction over the RAG pipeline used by external surfaces.
#[async_trait]
pub trait RagApi: Send + Sync {
    /// Extract, chunk, embed, and index the document at `path` under `filename`.
    async fn ingest_document(
        &self,
        path: &Path,
        filename: &str,
    ) -> Result<IngestOutcome, IngestError>;

    /// Answer a question from the stored corpus, citing source filenames.
    async fn answer(
        &self,
        question: &str,
        limit: Option<usize>,
    ) -> Result<AnswerOutcome, AnswerError>;

    /// Summarize one document, or the whole corpus when `filename` is `None`.
    async fn summarize(&self, filename: Option<&str>) -> Result<String, SummarizeError>;

    /// Report the total number of stored chunks.
    async fn stats(&self) -> Result<StatsSnapshot, StoreError>;

    /// Delete every stored chunk.
    async fn clear_documents(&self) -> Result<(), StoreError>;

    /// Retrieve the current ingestion metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl RagService {
    /// Build a new service from environment configuration, initializing backing services.
    pub async fn new() -> Self {
        let config = get_config();
        tracing::info!("Initializing embedding and generation clients");
        let embedding_client = get_embedding_client();
        let generation_client = get_generation_client();
        let store = QdrantStore::connect()
            .await
            .expect("Failed to connect to Qdrant");

        Self {
            store: Box::new(store),
            embedding_client,
            generation_client,
            metrics: Arc::new(IngestionMetrics::new()),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Assemble a service from explicit components; used by tests to inject fakes.
    pub fn from_parts(
        store: Box<dyn VectorStore>,
        embedding_client: Box<dyn EmbeddingClient>,
        generation_client: Box<dyn GenerationClient>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            store,
            embedding_client,
            generation_client,
            metrics: Arc::new(IngestionMetrics::new()),
            chunk_size,
            chunk_overlap,
        }
    }

    /// Extract, chunk, embed, and index a document.
    ///
    /// Chunks are written one at a time; a failure at chunk `i` aborts the call while
    /// chunks `0..i` stay persisted. Re-running the ingest overwrites them at the same ids.
    pub async fn ingest_document(
        &self,
        path: &Path,
        filename: &str,
    ) -> Result<IngestOutcome, IngestError> {
        tracing::info!(path = %path.display(), filename, "Ingesting document");
        let text = extract::extract_text(path)?;
        let chunks = chunk_text(&text, self.chunk_size, self.chunk_overlap)?;
        let document_hash = compute_document_hash(filename);

        for (index, chunk) in chunks.iter().enumerate() {
            let embedding = self.embedding_client.embed(chunk).await?;
            self.store
                .upsert(ChunkRecord {
                    chunk_id: format!("{document_hash}_{index}"),
                    embedding,
                    text: chunk.clone(),
                    metadata: ChunkMetadata {
                        filename: filename.to_string(),
                        chunk_index: index,
                    },
                })
                .await?;
        }

        self.metrics.record_document(chunks.len() as u64);
        tracing::info!(filename, chunks = chunks.len(), "Document ingested");

        Ok(IngestOutcome {
            chunk_count: chunks.len(),
        })
    }

    /// Answer a question using the nearest stored chunks as context.
    ///
    /// Returns [`AnswerOutcome::NoDocuments`] without touching the generation model when
    /// retrieval comes back empty.
    pub async fn answer(
        &self,
        question: &str,
        limit: Option<usize>,
    ) -> Result<AnswerOutcome, AnswerError> {
        let limit = limit.unwrap_or(DEFAULT_ANSWER_LIMIT);
        let embedding = self.embedding_client.embed(question).await?;
        let hits = self.store.nearest_neighbors(embedding, limit).await?;

        if hits.is_empty() {
            tracing::debug!("No stored chunks; skipping generation");
            return Ok(AnswerOutcome::NoDocuments);
        }

        let context = hits
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = build_answer_prompt(&context, question);
        let text = self.generation_client.generate(&prompt).await?;

        let sources: Vec<String> = hits
            .iter()
            .map(|chunk| chunk.metadata.filename.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::info!(hits = hits.len(), sources = sources.len(), "Question answered");
        Ok(AnswerOutcome::Answered { text, sources })
    }

    /// Summarize one document or the whole corpus.
    ///
    /// At most [`SUMMARY_SAMPLE_LIMIT`] chunk texts are fed to the generation model; the cap
    /// bounds prompt cost and must be preserved. An empty result set yields a fixed
    /// "no documents" message rather than an error.
    pub async fn summarize(&self, filename: Option<&str>) -> Result<String, SummarizeError> {
        let chunks = self.store.chunks_by_filename(filename).await?;

        if chunks.is_empty() {
            tracing::debug!(filename = ?filename, "Nothing to summarize");
            return Ok(NO_DOCUMENTS_MESSAGE.to_string());
        }

        let sample = chunks
            .iter()
            .take(SUMMARY_SAMPLE_LIMIT)
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = build_summary_prompt(&sample);
        let summary = self.generation_client.generate(&prompt).await?;

        tracing::info!(
            filename = ?filename,
            sampled = chunks.len().min(SUMMARY_SAMPLE_LIMIT),
            "Summary generated"
        );
        Ok(summary)
    }

    /// Report the total number of stored chunks.
    pub async fn stats(&self) -> Result<StatsSnapshot, StoreError> {
        Ok(StatsSnapshot {
            total_chunks: self.store.count().await?,
        })
    }

    /// Delete every stored chunk; the collection remains usable afterward.
    pub async fn clear_documents(&self) -> Result<(), StoreError> {
        self.store.clear().await?;
        tracing::info!("All documents cleared");
        Ok(())
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl RagApi for RagService {
    async fn ingest_document(
        &self,
        path: &Path,
        filename: &str,
    ) -> Result<IngestOutcome, IngestError> {
        RagService::ingest_document(self, path, filename).await
    }

    async fn answer(
        &self,
        question: &str,
        limit: Option<usize>,
    ) -> Result<AnswerOutcome, AnswerError> {
        RagService::answer(self, question, limit).await
    }

    async fn summarize(&self, filename: Option<&str>) -> Result<String, SummarizeError> {
        RagService::summarize(self, filename).await
    }

    async fn stats(&self) -> Result<StatsSnapshot, StoreError> {
        RagService::stats(self).await
    }

    async fn clear_documents(&self) -> Result<(), StoreError> {
        RagService::clear_documents(self).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        RagService::metrics_snapshot(self)
    }
}
