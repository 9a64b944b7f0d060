//! Helpers for constructing payloads and deterministic point identifiers.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Build the payload object stored alongside each indexed chunk.
pub(crate) fn build_payload(
    chunk_id: &str,
    text: &str,
    filename: &str,
    chunk_index: usize,
    timestamp_rfc3339: &str,
) -> Value {
    let mut payload = Map::new();
    payload.insert("chunk_id".into(), Value::String(chunk_id.to_string()));
    payload.insert("text".into(), Value::String(text.to_string()));
    payload.insert("filename".into(), Value::String(filename.to_string()));
    payload.insert("chunk_index".into(), Value::from(chunk_index));
    payload.insert(
        "timestamp".into(),
        Value::String(timestamp_rfc3339.to_string()),
    );
    Value::Object(payload)
}

/// Compute the deterministic SHA-256 digest of a document's filename.
pub fn compute_document_hash(filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// Project a chunk identifier onto a UUID accepted by Qdrant as a point id.
///
/// Qdrant only accepts integers or UUIDs as point ids, so the `{hash}_{index}` chunk id
/// lives in the payload and its UUIDv5 projection keys the point. The projection is
/// deterministic, preserving insert-or-overwrite semantics for colliding chunk ids.
pub fn point_id_for_chunk(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

/// Current timestamp formatted for payload storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
