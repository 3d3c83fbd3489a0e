//! Pinecone serverless index provider
//!
//! Control plane calls (list/create/describe/delete) go to the global API.
//! Data plane calls (upsert/query) go to the per-index host returned by
//! describe, which is cached until the index is deleted.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{error_body, http_client};
use crate::config::{Metric, VectorStoreConfig};
use crate::error::{Error, Result};
use crate::providers::vector_store::{
    IndexDescription, IndexSpec, VectorIndexProvider, VectorRecord,
};
use crate::types::{Chunk, ScoredChunk};

const API_VERSION: &str = "2024-07";

/// Pinecone REST client
pub struct PineconeClient {
    client: reqwest::Client,
    api_key: String,
    control_plane_url: String,
    upsert_batch_size: usize,
    /// Index name -> data plane host
    hosts: RwLock<HashMap<String, String>>,
}

impl PineconeClient {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, config: &VectorStoreConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(None)?,
            api_key: api_key.into(),
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
            upsert_batch_size: config.upsert_batch_size.max(1),
            hosts: RwLock::new(HashMap::new()),
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    fn index_url(&self, name: &str) -> String {
        format!("{}/indexes/{}", self.control_plane_url, name)
    }

    /// Data plane base URL for an index
    async fn data_url(&self, index: &str) -> Result<String> {
        let cached = self.hosts.read().get(index).cloned();
        if let Some(host) = cached {
            return Ok(host);
        }

        let description = self
            .describe_index(index)
            .await?
            .ok_or_else(|| Error::vector_db(format!("Index '{}' does not exist", index)))?;

        // describe_index caches the host when one is assigned
        description
            .host
            .map(|h| normalize_host(&h))
            .ok_or_else(|| Error::vector_db(format!("Index '{}' has no host yet", index)))
    }
}

/// Hosts come back without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[derive(Deserialize)]
struct ListIndexesResponse {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    dimension: usize,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Deserialize, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: Metric,
    spec: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    serverless: Serverless<'a>,
}

#[derive(Serialize)]
struct Serverless<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<PineconeVector<'a>>,
}

#[derive(Serialize)]
struct PineconeVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[async_trait]
impl VectorIndexProvider for PineconeClient {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        let response = self
            .request(reqwest::Method::GET, format!("{}/indexes", self.control_plane_url))
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone list request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::vector_db(format!(
                "Pinecone list indexes failed ({}): {}",
                status,
                error_body(response).await
            )));
        }

        let parsed: ListIndexesResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse index list: {}", e)))?;

        Ok(parsed.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let request = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: spec.metric,
            spec: ServerlessSpec {
                serverless: Serverless {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
        };

        let response = self
            .request(reqwest::Method::POST, format!("{}/indexes", self.control_plane_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone create request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::vector_db(format!(
                "Pinecone create index '{}' failed ({}): {}",
                spec.name,
                status,
                error_body(response).await
            )));
        }

        tracing::info!(
            "Created Pinecone index '{}' (dimension {}, {})",
            spec.name,
            spec.dimension,
            spec.metric.as_str()
        );
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        self.hosts.write().remove(name);

        let response = self
            .request(reqwest::Method::DELETE, self.index_url(name))
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone delete request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Index '{}' already absent", name);
            return Ok(());
        }
        if !status.is_success() {
            return Err(Error::vector_db(format!(
                "Pinecone delete index '{}' failed ({}): {}",
                name,
                status,
                error_body(response).await
            )));
        }

        tracing::info!("Deleted Pinecone index '{}'", name);
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>> {
        let response = self
            .request(reqwest::Method::GET, self.index_url(name))
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone describe request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::vector_db(format!(
                "Pinecone describe index '{}' failed ({}): {}",
                name,
                status,
                error_body(response).await
            )));
        }

        let model: IndexModel = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse index description: {}", e)))?;

        if let Some(host) = model.host.as_deref().filter(|h| !h.is_empty()) {
            self.hosts
                .write()
                .insert(name.to_string(), normalize_host(host));
        }

        Ok(Some(IndexDescription {
            name: model.name,
            dimension: model.dimension,
            ready: model.status.ready,
            host: model.host.filter(|h| !h.is_empty()),
        }))
    }

    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let url = format!("{}/vectors/upsert", self.data_url(index).await?);
        let mut total = 0;

        for batch in records.chunks(self.upsert_batch_size) {
            let request = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|r| PineconeVector {
                        id: &r.id,
                        values: &r.values,
                        metadata: r.chunk.to_vector_metadata(),
                    })
                    .collect(),
            };

            let response = self
                .request(reqwest::Method::POST, url.clone())
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::vector_db(format!("Pinecone upsert request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::vector_db(format!(
                    "Pinecone upsert failed ({}): {}",
                    status,
                    error_body(response).await
                )));
            }

            let parsed: UpsertResponse = response
                .json()
                .await
                .map_err(|e| Error::vector_db(format!("Failed to parse upsert response: {}", e)))?;

            total += parsed.upserted_count;
            tracing::debug!("Upserted {} vectors into '{}'", parsed.upserted_count, index);
        }

        Ok(total)
    }

    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let url = format!("{}/query", self.data_url(index).await?);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone query request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::vector_db(format!(
                "Pinecone query failed ({}): {}",
                status,
                error_body(response).await
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse query response: {}", e)))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ScoredChunk {
                chunk: Chunk::from_vector_metadata(&m.metadata),
                score: m.score,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
