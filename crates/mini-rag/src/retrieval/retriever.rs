//! Dense retrieval against the managed index

use std::sync::Arc;

use crate::config::dimension_mismatch;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorIndexProvider};
use crate::types::{Chunk, ScoredChunk};

/// Handle for similarity search on one named index
pub struct Retriever {
    store: Arc<dyn VectorIndexProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    index_name: String,
    top_k: usize,
}

impl Retriever {
    /// Connect to an existing index
    ///
    /// Fails if the index does not exist or its dimension differs from the
    /// embedder's.
    pub async fn connect(
        store: Arc<dyn VectorIndexProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        index_name: &str,
        top_k: usize,
    ) -> Result<Self> {
        let description = store
            .describe_index(index_name)
            .await?
            .ok_or_else(|| Error::vector_db(format!("Index '{}' does not exist", index_name)))?;

        if description.dimension != 0 && description.dimension != embedder.dimensions() {
            return Err(dimension_mismatch(embedder.dimensions(), description.dimension));
        }

        tracing::info!(
            "Retriever connected to index '{}' (top_k = {})",
            index_name,
            top_k
        );

        Ok(Self {
            store,
            embedder,
            index_name: index_name.to_string(),
            top_k,
        })
    }

    /// Up to `top_k` chunks with scores, most similar first
    pub async fn retrieve_scored(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let vector = self.embedder.embed(query).await?;
        let mut results = self.store.query(&self.index_name, &vector, self.top_k).await?;

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(self.top_k);

        tracing::debug!("Retrieved {} candidates for query", results.len());
        Ok(results)
    }

    /// Up to `top_k` chunks, most similar first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>> {
        Ok(self
            .retrieve_scored(query)
            .await?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::VectorRecord;
    use crate::testing::{MemoryVectorIndex, MockEmbedder};

    async fn populated(texts: &[&str]) -> Arc<MemoryVectorIndex> {
        let embedder = MockEmbedder::new(16);
        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            records.push(VectorRecord {
                id: format!("v{}", i),
                values: embedder.embed(text).await.unwrap(),
                chunk: Chunk::new(*text, "notes.txt", i as u32),
            });
        }
        Arc::new(MemoryVectorIndex::new().with_index("docs", 16, records))
    }

    #[tokio::test]
    async fn test_connect_missing_index() {
        let store = Arc::new(MemoryVectorIndex::new());
        let result = Retriever::connect(store, Arc::new(MockEmbedder::new(16)), "docs", 20).await;
        assert!(matches!(result, Err(Error::VectorDb(_))));
    }

    #[tokio::test]
    async fn test_connect_dimension_mismatch() {
        let store = Arc::new(MemoryVectorIndex::new().with_index("docs", 768, Vec::new()));
        let result = Retriever::connect(store, Arc::new(MockEmbedder::new(16)), "docs", 20).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_similarity() {
        let store = populated(&["zzzz", "rust borrow checker", "rust"]).await;
        let retriever = Retriever::connect(store, Arc::new(MockEmbedder::new(16)), "docs", 20)
            .await
            .unwrap();

        let results = retriever.retrieve_scored("rust").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.text, "rust");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_top_k() {
        let texts: Vec<String> = (0..30).map(|i| format!("document {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let store = populated(&refs).await;
        let retriever = Retriever::connect(store, Arc::new(MockEmbedder::new(16)), "docs", 20)
            .await
            .unwrap();

        assert_eq!(retriever.retrieve("document").await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_retrieve_empty_index() {
        let store = Arc::new(MemoryVectorIndex::new().with_index("docs", 16, Vec::new()));
        let retriever = Retriever::connect(store, Arc::new(MockEmbedder::new(16)), "docs", 20)
            .await
            .unwrap();

        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }
}
