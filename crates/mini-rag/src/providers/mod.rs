//! Provider abstractions for embeddings, chat, vector indexes, and reranking
//!
//! Traits live in their own modules; `gemini`, `pinecone` and `cohere` hold
//! the hosted implementations used by the server.

pub mod cohere;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod pinecone;
pub mod reranker;
pub mod vector_store;

use std::time::Duration;

pub use cohere::CohereReranker;
pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiChat, GeminiEmbedder};
pub use llm::ChatProvider;
pub use pinecone::PineconeClient;
pub use reranker::{RerankHit, RerankProvider};
pub use vector_store::{IndexDescription, IndexSpec, VectorIndexProvider, VectorRecord};

use crate::error::Result;

/// Shared HTTP client construction
pub(crate) fn http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Response body for error messages
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}
