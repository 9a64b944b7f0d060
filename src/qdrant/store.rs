//! [`VectorStore`] backend persisting chunks in a Qdrant collection.

use crate::config::get_config;
use crate::qdrant::{
    QdrantService, build_filename_filter,
    types::{PointInsert, QdrantError},
};
use crate::store::{ChunkMetadata, ChunkRecord, StoreError, StoredChunk, VectorStore};
use async_trait::async_trait;
use serde_json::{Map, Value};

impl From<QdrantError> for StoreError {
    fn from(error: QdrantError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

/// Qdrant-backed chunk store scoped to a single collection.
pub struct QdrantStore {
    service: QdrantService,
    collection: String,
    vector_size: u64,
}

impl QdrantStore {
    /// Wrap an existing client, targeting the named cosine-configured collection.
    pub fn new(service: QdrantService, collection: String, vector_size: u64) -> Self {
        Self {
            service,
            collection,
            vector_size,
        }
    }

    /// Connect using environment configuration, creating the collection when missing.
    pub async fn connect() -> Result<Self, StoreError> {
        let config = get_config();
        let service = QdrantService::new()?;
        let store = Self::new(
            service,
            config.qdrant_collection_name.clone(),
            config.embedding_dimension as u64,
        );
        store
            .service
            .create_collection_if_not_exists(&store.collection, store.vector_size)
            .await?;
        tracing::debug!(collection = %store.collection, "Document collection ready");
        Ok(store)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn upsert(&self, record: ChunkRecord) -> Result<(), StoreError> {
        let ChunkRecord {
            chunk_id,
            embedding,
            text,
            metadata,
        } = record;
        self.service
            .upsert_points(
                &self.collection,
                vec![PointInsert {
                    chunk_id,
                    vector: embedding,
                    text,
                    filename: metadata.filename,
                    chunk_index: metadata.chunk_index,
                }],
            )
            .await?;
        Ok(())
    }

    async fn nearest_neighbors(
        &self,
        embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<StoredChunk>, StoreError> {
        let hits = self
            .service
            .search_points(&self.collection, embedding, limit)
            .await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| hit.payload.and_then(map_payload))
            .collect())
    }

    async fn chunks_by_filename(
        &self,
        filename: Option<&str>,
    ) -> Result<Vec<StoredChunk>, StoreError> {
        let payloads = self
            .service
            .scroll_payloads(&self.collection, build_filename_filter(filename))
            .await?;
        Ok(payloads.into_iter().filter_map(map_payload).collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.service.count_points(&self.collection).await?)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.service.delete_collection(&self.collection).await?;
        self.service
            .create_collection(&self.collection, self.vector_size)
            .await?;
        tracing::info!(collection = %self.collection, "Collection cleared and recreated");
        Ok(())
    }
}

/// Map a stored payload into a chunk, dropping entries missing text or filename.
fn map_payload(mut payload: Map<String, Value>) -> Option<StoredChunk> {
    let text = match payload.remove("text") {
        Some(Value::String(value)) => value,
        _ => return None,
    };
    let filename = match payload.remove("filename") {
        Some(Value::String(value)) if !value.is_empty() => value,
        _ => return None,
    };
    let chunk_index = payload
        .get("chunk_index")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    Some(StoredChunk {
        text,
        metadata: ChunkMetadata {
            filename,
            chunk_index,
        },
    })
}
