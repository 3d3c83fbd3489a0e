//! Rerank provider trait for cross-encoder relevance scoring

use async_trait::async_trait;
use crate::error::Result;

/// One reranked document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankHit {
    /// Index into the submitted documents
    pub index: usize,
    /// Relevance score, higher is better
    pub relevance_score: f32,
}

/// Trait for reranking candidate documents against a query
///
/// Implementations:
/// - `CohereReranker`: Cohere rerank API (rerank-english-v3.0)
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Score `documents` against `query`, returning at most `top_n` hits, best first
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
