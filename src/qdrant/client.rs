//! HTTP client wrapper for interacting with Qdrant.

use crate::config::get_config;
use crate::qdrant::{
    payload::{build_payload, current_timestamp_rfc3339, point_id_for_chunk},
    types::{CountResponse, PointInsert, QdrantError, QueryResponse, QueryResponseResult, ScoredPoint, ScrollResponse},
};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value, json};

/// Lightweight HTTP client for Qdrant operations.
pub struct QdrantService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl QdrantService {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, QdrantError> {
        let config = get_config();
        let client = Client::builder().user_agent("docrag/0.1").build()?;

        let base_url = normalize_base_url(&config.qdrant_url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %config
                .qdrant_api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.qdrant_api_key.clone(),
        })
    }

    /// Create a collection only when it is missing from Qdrant.
    pub async fn create_collection_if_not_exists(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        if self.collection_exists(collection_name).await? {
            return Ok(());
        }

        tracing::debug!(
            collection = collection_name,
            vector_size,
            "Creating collection"
        );
        self.create_collection(collection_name, vector_size).await
    }

    /// Create or update a collection configured for cosine similarity.
    ///
    /// The distance metric is fixed at creation time and changes ranking semantics, so every
    /// collection this service touches is cosine-configured.
    pub async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": "Cosine"
            }
        });

        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}"))?
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(collection = collection_name, "Collection ensured/created");
        })
        .await
    }

    /// Drop a collection and all of its points.
    pub async fn delete_collection(&self, collection_name: &str) -> Result<(), QdrantError> {
        let response = self
            .request(Method::DELETE, &format!("collections/{collection_name}"))?
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(collection = collection_name, "Collection deleted");
        })
        .await
    }

    /// Upload vectors to the given collection, overwriting points with colliding ids.
    pub async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<PointInsert>,
    ) -> Result<(), QdrantError> {
        if points.is_empty() {
            return Ok(());
        }

        let now = current_timestamp_rfc3339();
        let serialized: Vec<_> = points
            .into_iter()
            .map(|point| {
                let payload = build_payload(
                    &point.chunk_id,
                    &point.text,
                    &point.filename,
                    point.chunk_index,
                    &now,
                );
                json!({
                    "id": point_id_for_chunk(&point.chunk_id),
                    "vector": point.vector,
                    "payload": payload,
                })
            })
            .collect();

        let point_count = serialized.len();
        let response = self
            .request(
                Method::PUT,
                &format!("collections/{collection_name}/points"),
            )?
            .query(&[("wait", true)])
            .json(&json!({ "points": serialized }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(
                collection = collection_name,
                points = point_count,
                "Points upserted"
            );
        })
        .await
    }

    /// Perform a similarity search against a collection, returning scored payloads.
    ///
    /// Qdrant ranks by descending cosine similarity, which is ascending cosine distance.
    pub async fn search_points(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, QdrantError> {
        let body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/query"),
            )?
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(collection = collection_name, error = %error, "Qdrant search failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        let points = match payload.result {
            QueryResponseResult::Points(points) => points,
            QueryResponseResult::Object { points } => points,
        };
        let results = points
            .into_iter()
            .map(|point| ScoredPoint {
                score: point.score,
                payload: point.payload,
            })
            .collect();

        Ok(results)
    }

    /// Collect every payload in the collection matching an optional filter.
    ///
    /// Follows Qdrant's scroll pagination until the cursor is exhausted; results arrive in
    /// scroll order, which Qdrant leaves implementation-defined.
    pub async fn scroll_payloads(
        &self,
        collection: &str,
        filter: Option<Value>,
    ) -> Result<Vec<Map<String, Value>>, QdrantError> {
        let mut offset: Option<Value> = None;
        let mut payloads = Vec::new();
        let filter_body = filter.unwrap_or_else(|| json!({ "must": [] }));

        loop {
            let mut body = json!({
                "with_payload": true,
                "with_vector": false,
                "limit": 512,
                "offset": offset.clone().unwrap_or(Value::Null),
                "filter": filter_body.clone(),
            });

            if offset.is_none() {
                body.as_object_mut()
                    .expect("scroll body is object")
                    .remove("offset");
            }

            let response = self
                .request(
                    Method::POST,
                    &format!("collections/{collection}/points/scroll"),
                )?
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection, error = %error, "Failed to scroll payloads");
                return Err(error);
            }

            let ScrollResponse { result } = response.json().await?;
            for point in result.points {
                if let Some(payload) = point.payload {
                    payloads.push(payload);
                }
            }

            match result.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        Ok(payloads)
    }

    /// Exact number of points stored in the collection.
    pub async fn count_points(&self, collection_name: &str) -> Result<u64, QdrantError> {
        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/count"),
            )?
            .json(&json!({ "exact": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(collection = collection_name, error = %error, "Qdrant count failed");
            return Err(error);
        }

        let payload: CountResponse = response.json().await?;
        Ok(payload.result.count)
    }

    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError> {
        let response = self
            .request(Method::GET, &format!("collections/{collection_name}"))?
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Collection existence check failed");
                Err(error)
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, QdrantError> {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        Ok(req)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), QdrantError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qdrant::point_id_for_chunk;
    use httpmock::{Method::POST, Method::PUT, MockServer};
    use reqwest::Client;

    fn service_for(server: &MockServer) -> QdrantService {
        QdrantService {
            client: Client::builder()
                .user_agent("docrag-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn search_points_emits_expected_request() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/query")
                    .json_body(json!({
                        "query": [0.5, 0.25],
                        "limit": 3,
                        "with_payload": true,
                    }));
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": [
                        {
                            "id": "00000000-0000-0000-0000-000000000001",
                            "score": 0.92,
                            "payload": {
                                "text": "Example chunk",
                                "filename": "report.pdf",
                                "chunk_index": 0
                            }
                        }
                    ]
                }));
            })
            .await;

        let results = service_for(&server)
            .search_points("documents", vec![0.5, 0.25], 3)
            .await
            .expect("search request");

        mock.assert();

        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert!((hit.score - 0.92).abs() < f32::EPSILON);
        let payload = hit.payload.as_ref().expect("payload");
        assert_eq!(payload["filename"], Value::String("report.pdf".into()));
        assert_eq!(payload["text"], Value::String("Example chunk".into()));
    }

    #[tokio::test]
    async fn create_collection_requests_cosine_space() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/documents").json_body(json!({
                    "vectors": {
                        "size": 768,
                        "distance": "Cosine"
                    }
                }));
                then.status(200).json_body(json!({ "result": true }));
            })
            .await;

        service_for(&server)
            .create_collection("documents", 768)
            .await
            .expect("create request");

        mock.assert();
    }

    #[tokio::test]
    async fn upsert_points_uses_deterministic_ids() {
        let server = MockServer::start_async().await;

        let expected_id = point_id_for_chunk("abc_0");
        let mock = server
            .mock_async(move |when, then| {
                when.method(PUT)
                    .path("/collections/documents/points")
                    .query_param("wait", "true")
                    .body_contains(&expected_id)
                    .body_contains("\"chunk_id\":\"abc_0\"");
                then.status(200).json_body(json!({ "result": { "status": "acknowledged" } }));
            })
            .await;

        service_for(&server)
            .upsert_points(
                "documents",
                vec![PointInsert {
                    chunk_id: "abc_0".into(),
                    vector: vec![0.5, 0.5],
                    text: "chunk text".into(),
                    filename: "report.pdf".into(),
                    chunk_index: 0,
                }],
            )
            .await
            .expect("upsert request");

        mock.assert();
    }

    #[tokio::test]
    async fn count_points_parses_exact_count() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/count")
                    .json_body(json!({ "exact": true }));
                then.status(200)
                    .json_body(json!({ "result": { "count": 42 } }));
            })
            .await;

        let count = service_for(&server)
            .count_points("documents")
            .await
            .expect("count request");

        mock.assert();
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn scroll_payloads_applies_filename_filter() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll")
                    .body_contains("\"filename\"");
                then.status(200).json_body(json!({
                    "result": {
                        "points": [
                            { "id": 1, "payload": { "text": "first", "filename": "a.txt", "chunk_index": 0 } },
                            { "id": 2, "payload": { "text": "second", "filename": "a.txt", "chunk_index": 1 } }
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        let payloads = service_for(&server)
            .scroll_payloads(
                "documents",
                crate::qdrant::build_filename_filter(Some("a.txt")),
            )
            .await
            .expect("scroll request");

        mock.assert();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0]["text"], "first");
        assert_eq!(payloads[1]["text"], "second");
    }

    #[tokio::test]
    async fn search_surfaces_unexpected_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/documents/points/query");
                then.status(503).body("unavailable");
            })
            .await;

        let error = service_for(&server)
            .search_points("documents", vec![0.1], 5)
            .await
            .expect_err("error response");
        assert!(matches!(error, QdrantError::UnexpectedStatus { status, .. } if status == 503));
    }
}
