//! Vector index provider trait for managing indexes and searching embeddings

use async_trait::async_trait;
use crate::config::Metric;
use crate::error::Result;
use crate::types::{Chunk, ScoredChunk};

/// Parameters for creating an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
    pub cloud: String,
    pub region: String,
}

/// Remote index status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    /// Index accepts reads and writes
    pub ready: bool,
    /// Data plane host, once assigned
    pub host: Option<String>,
}

/// A vector with its id and the chunk stored as metadata
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub chunk: Chunk,
}

/// Trait for a hosted vector index
///
/// Implementations:
/// - `PineconeClient`: Pinecone serverless indexes
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Names of all existing indexes
    async fn list_indexes(&self) -> Result<Vec<String>>;

    /// Create an index
    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    /// Delete an index; deleting a missing index is not an error
    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Describe an index, `None` if it does not exist
    async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>>;

    /// Insert or overwrite vectors
    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize>;

    /// Nearest neighbours of `vector`, best first
    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
