//! Error types for the RAG pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential, index name or invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read or parsed
    #[error("Failed to load document '{source_name}': {message}")]
    DocumentLoad { source_name: String, message: String },

    /// Request rejected before any external call
    #[error("{0}")]
    Validation(String),

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector database error
    #[error("Vector database error: {0}")]
    VectorDb(String),

    /// Reranker call failed
    #[error("Rerank failed: {0}")]
    Rerank(String),

    /// Reranker credential is not configured
    #[error("Reranker unavailable: COHERE_API_KEY is not set")]
    RerankUnavailable,

    /// Chat model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retriever handle could not be constructed
    #[error("RAG system not ready. Failed to initialize retriever: {0}")]
    RetrieverUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a document load error
    pub fn document_load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a rerank error
    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to at the API boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::RetrieverUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Error::Validation(_) | Error::RetrieverUnavailable(_) => self.to_string(),
            _ => format!("An error occurred: {}", self),
        };

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
