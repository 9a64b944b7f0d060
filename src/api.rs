//! HTTP surface for the docrag service.
//!
//! This module exposes a compact Axum router over the RAG pipeline:
//!
//! - `GET    /health` – Liveness probe.
//! - `POST   /documents` – Ingest a server-readable PDF/DOCX/TXT file into the index.
//! - `DELETE /documents` – Clear every stored chunk.
//! - `POST   /query` – Answer a question from the stored corpus with cited sources.
//! - `POST   /summarize` – Summarize one document or the whole corpus.
//! - `GET    /stats` – Report the total stored chunk count.
//! - `GET    /metrics` – Observe ingestion counters.
//!
//! The router holds no business logic: handlers call the pipeline through [`RagApi`] and map
//! its typed errors to status codes. An empty corpus on `/query` is a 404 with a fixed
//! message, never a 5xx.

use crate::metrics::MetricsSnapshot;
use crate::processing::{
    AnswerError, AnswerOutcome, IngestError, RagApi, SummarizeError,
};
use crate::{extract::ExtractError, store::StoreError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Message returned when a query finds no stored documents.
const NO_DOCUMENTS_HTTP_MESSAGE: &str = "No documents found. Please upload documents first.";

/// Build the HTTP router exposing the document QA surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: RagApi + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/documents",
            post(ingest_document::<S>).delete(clear_documents::<S>),
        )
        .route("/query", post(query::<S>))
        .route("/summarize", post(summarize::<S>))
        .route("/stats", get(get_stats::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Liveness response for `GET /health`.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Request body for the `POST /documents` endpoint.
#[derive(Deserialize)]
struct IngestRequest {
    /// Server-readable path of the document to ingest.
    path: String,
    /// Optional display name; defaults to the path's file name.
    #[serde(default)]
    filename: Option<String>,
}

/// Success response for the `POST /documents` endpoint.
#[derive(Serialize)]
struct IngestResponse {
    filename: String,
    chunks_indexed: usize,
}

/// Ingest a document into the index.
async fn ingest_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError>
where
    S: RagApi,
{
    let path = Path::new(&request.path);
    let filename = request.filename.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| request.path.clone())
    });

    let outcome = service.ingest_document(path, &filename).await?;
    tracing::info!(filename, chunks = outcome.chunk_count, "Ingest request completed");
    Ok(Json(IngestResponse {
        filename,
        chunks_indexed: outcome.chunk_count,
    }))
}

/// Request body for the `POST /query` endpoint.
#[derive(Deserialize)]
struct QueryRequest {
    /// Natural-language question to answer.
    question: String,
    /// Optional number of chunks to retrieve as context (defaults to 5).
    #[serde(default)]
    k: Option<usize>,
}

/// Success response for the `POST /query` endpoint.
#[derive(Serialize)]
struct QueryResponse {
    question: String,
    answer: String,
    sources: Vec<String>,
}

/// Answer a question from the stored corpus.
async fn query<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<QueryRequest>,
) -> Result<Response, AppError>
where
    S: RagApi,
{
    match service.answer(&request.question, request.k).await? {
        AnswerOutcome::Answered { text, sources } => Ok(Json(QueryResponse {
            question: request.question,
            answer: text,
            sources,
        })
        .into_response()),
        AnswerOutcome::NoDocuments => {
            Ok((StatusCode::NOT_FOUND, NO_DOCUMENTS_HTTP_MESSAGE).into_response())
        }
    }
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Optional filename restricting the summary to a single document.
    #[serde(default)]
    filename: Option<String>,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
    filename: String,
}

/// Summarize one document or the whole corpus.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: RagApi,
{
    let summary = service.summarize(request.filename.as_deref()).await?;
    Ok(Json(SummarizeResponse {
        summary,
        filename: request
            .filename
            .unwrap_or_else(|| "all documents".to_string()),
    }))
}

/// Response body for `GET /stats`.
#[derive(Serialize)]
struct StatsResponse {
    total_chunks: u64,
}

/// Report the total number of stored chunks.
async fn get_stats<S>(State(service): State<Arc<S>>) -> Result<Json<StatsResponse>, AppError>
where
    S: RagApi,
{
    let snapshot = service.stats().await?;
    Ok(Json(StatsResponse {
        total_chunks: snapshot.total_chunks,
    }))
}

/// Response body for `DELETE /documents`.
#[derive(Serialize)]
struct ClearResponse {
    message: String,
}

/// Delete every stored chunk.
async fn clear_documents<S>(State(service): State<Arc<S>>) -> Result<Json<ClearResponse>, AppError>
where
    S: RagApi,
{
    service.clear_documents().await?;
    Ok(Json(ClearResponse {
        message: "All documents cleared".to_string(),
    }))
}

/// Return ingestion counters for observability dashboards.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: RagApi,
{
    Json(service.metrics_snapshot())
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(error: IngestError) -> Self {
        let status = match &error {
            IngestError::Extract(ExtractError::UnsupportedFileType(_))
            | IngestError::Extract(ExtractError::Io(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<AnswerError> for AppError {
    fn from(error: AnswerError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<SummarizeError> for AppError {
    fn from(error: SummarizeError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}
