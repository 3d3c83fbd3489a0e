//! Configuration for the RAG pipeline
//!
//! Values are layered: built-in defaults, then an optional TOML file named by
//! `MINI_RAG_CONFIG`, then environment variables. Credentials are only ever
//! read from the environment or the TOML file; they are checked by the
//! `require_*` helpers before any network call is made.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "MINI_RAG_CONFIG";

/// Main RAG configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval and rerank sizes
    pub retrieval: RetrievalConfig,
    /// Embedding model configuration
    pub embedding: EmbeddingConfig,
    /// Chat model configuration
    pub llm: LlmConfig,
    /// Reranker configuration
    pub rerank: RerankConfig,
    /// Vector store configuration
    pub vector_store: VectorStoreConfig,
    /// Index lifecycle polling
    pub index_polling: IndexPollingConfig,
    /// API credentials and index name
    pub credentials: Credentials,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Separators tried in order, largest first; `""` splits into characters
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                ". ".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates fetched from the vector index (K)
    pub top_k: usize,
    /// Candidates kept after reranking (N)
    pub top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 20, top_n: 5 }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name
    pub model: String,
    /// Output dimension; must match the index dimension
    pub dimensions: usize,
    /// Texts per batch request
    pub batch_size: usize,
    /// API base URL
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "models/embedding-001".to_string(),
            dimensions: 768,
            batch_size: 100,
            base_url: GOOGLE_API_BASE.to_string(),
        }
    }
}

/// Chat model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// API base URL
    pub base_url: String,
    /// Optional request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.0,
            base_url: GOOGLE_API_BASE.to_string(),
            timeout_secs: None,
        }
    }
}

/// Reranker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            model: "rerank-english-v3.0".to_string(),
            base_url: "https://api.cohere.com".to_string(),
        }
    }
}

/// Similarity metric of the remote index
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Index dimension
    pub dimension: usize,
    /// Index metric
    pub metric: Metric,
    /// Serverless cloud
    pub cloud: String,
    /// Serverless region
    pub region: String,
    /// Control plane base URL
    pub control_plane_url: String,
    /// Vectors per upsert request
    pub upsert_batch_size: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            dimension: 768,
            metric: Metric::Cosine,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            upsert_batch_size: 100,
        }
    }
}

/// Index lifecycle polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPollingConfig {
    /// Wait after issuing a delete before polling (ms)
    pub delete_settle_ms: u64,
    /// Interval between polls (ms)
    pub poll_interval_ms: u64,
    /// Maximum number of polls before giving up
    pub max_attempts: u32,
}

impl Default for IndexPollingConfig {
    fn default() -> Self {
        Self {
            delete_settle_ms: 5000,
            poll_interval_ms: 1000,
            max_attempts: 120,
        }
    }
}

/// Credentials and index name
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Credentials {
    pub index_name: Option<String>,
    pub google_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("index_name", &self.index_name)
            .field("google_api_key", &mask(&self.google_api_key))
            .field("cohere_api_key", &mask(&self.cohere_api_key))
            .field("pinecone_api_key", &mask(&self.pinecone_api_key))
            .finish()
    }
}

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com";

impl RagConfig {
    /// Load configuration from the optional TOML file and the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_toml_file(path)?,
            _ => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Override values from an environment lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("PINECONE_INDEX_NAME") {
            self.credentials.index_name = Some(v);
        }
        if let Some(v) = get("GOOGLE_API_KEY") {
            self.credentials.google_api_key = Some(v);
        }
        if let Some(v) = get("COHERE_API_KEY") {
            self.credentials.cohere_api_key = Some(v);
        }
        if let Some(v) = get("PINECONE_API_KEY") {
            self.credentials.pinecone_api_key = Some(v);
        }
        if let Some(v) = get("PINECONE_ENVIRONMENT") {
            self.vector_store.region = v;
        }
        if let Some(origin) = get("CORS_ORIGIN") {
            if !self.server.cors_origins.contains(&origin) {
                self.server.cors_origins.push(origin);
            }
        }
        if let Some(v) = get("MINI_RAG_HOST") {
            self.server.host = v;
        }
        if let Some(port) = get("MINI_RAG_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Check settings that do not depend on credentials
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 || self.retrieval.top_n == 0 {
            return Err(Error::config("top_k and top_n must be greater than zero"));
        }
        if self.embedding.dimensions != self.vector_store.dimension {
            return Err(dimension_mismatch(
                self.embedding.dimensions,
                self.vector_store.dimension,
            ));
        }
        Ok(())
    }

    pub fn require_index_name(&self) -> Result<&str> {
        require(&self.credentials.index_name, "PINECONE_INDEX_NAME")
    }

    pub fn require_google_key(&self) -> Result<&str> {
        require(&self.credentials.google_api_key, "GOOGLE_API_KEY")
    }

    pub fn require_pinecone_key(&self) -> Result<&str> {
        require(&self.credentials.pinecone_api_key, "PINECONE_API_KEY")
    }

    /// Cohere key is optional here; its absence surfaces as `RerankUnavailable` at rerank time
    pub fn cohere_key(&self) -> Option<&str> {
        self.credentials.cohere_api_key.as_deref()
    }
}

/// Error for an embedding/index dimension mismatch
pub fn dimension_mismatch(embedding: usize, index: usize) -> Error {
    Error::config(format!(
        "Embedding dimension {} does not match index dimension {}",
        embedding, index
    ))
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::config(format!("{} environment variable not set", name)))
}
