//! Second-stage reranking of retrieved candidates

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::RerankProvider;
use crate::types::{Chunk, ScoredChunk};

/// Reorders candidates by cross-encoder relevance and keeps the best `top_n`
pub struct Reranker {
    provider: Option<Arc<dyn RerankProvider>>,
    top_n: usize,
}

impl Reranker {
    /// `provider` is `None` when no reranking credential is configured
    pub fn new(provider: Option<Arc<dyn RerankProvider>>, top_n: usize) -> Self {
        Self { provider, top_n }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// At most `top_n` chunks, most relevant first
    pub async fn rerank(&self, query: &str, candidates: &[Chunk]) -> Result<Vec<Chunk>> {
        Ok(self
            .rerank_scored(query, candidates)
            .await?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }

    pub async fn rerank_scored(
        &self,
        query: &str,
        candidates: &[Chunk],
    ) -> Result<Vec<ScoredChunk>> {
        let provider = self.provider.as_ref().ok_or(Error::RerankUnavailable)?;

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let hits = provider.rerank(query, &documents, self.top_n).await?;

        let mut seen = vec![false; candidates.len()];
        let mut ranked = Vec::with_capacity(self.top_n.min(candidates.len()));
        for hit in hits {
            if ranked.len() == self.top_n {
                break;
            }
            match seen.get_mut(hit.index) {
                Some(taken) if !*taken => {
                    *taken = true;
                    ranked.push(ScoredChunk {
                        chunk: candidates[hit.index].clone(),
                        score: hit.relevance_score,
                    });
                }
                Some(_) => {}
                None => {
                    tracing::warn!(
                        "{} returned index {} for {} candidates, ignoring",
                        provider.name(),
                        hit.index,
                        candidates.len()
                    );
                }
            }
        }

        tracing::debug!("Reranked {} candidates to {}", candidates.len(), ranked.len());
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ReverseReranker;
    use std::sync::atomic::Ordering;

    fn candidates(n: u32) -> Vec<Chunk> {
        (0..n).map(|i| Chunk::new(format!("c{}", i), "a.pdf", i)).collect()
    }

    #[tokio::test]
    async fn test_rerank_reorders_and_caps() {
        let reranker = Reranker::new(Some(Arc::new(ReverseReranker::new())), 5);
        let ranked = reranker.rerank("q", &candidates(20)).await.unwrap();

        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].text, "c19");
        assert_eq!(ranked[4].text, "c15");
    }

    #[tokio::test]
    async fn test_rerank_fewer_than_top_n() {
        let reranker = Reranker::new(Some(Arc::new(ReverseReranker::new())), 5);
        let ranked = reranker.rerank("q", &candidates(3)).await.unwrap();
        assert_eq!(ranked.len(), 3);
    }

    #[tokio::test]
    async fn test_rerank_empty_skips_provider() {
        let provider = Arc::new(ReverseReranker::new());
        let reranker = Reranker::new(Some(provider.clone()), 5);

        assert!(reranker.rerank("q", &[]).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rerank_unavailable() {
        let reranker = Reranker::new(None, 5);
        assert!(!reranker.is_available());
        assert!(matches!(
            reranker.rerank("q", &candidates(2)).await,
            Err(Error::RerankUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_rerank_ignores_out_of_range_hits() {
        let mut provider = ReverseReranker::new();
        provider.stray_index = Some(99);
        let reranker = Reranker::new(Some(Arc::new(provider)), 5);

        let ranked = reranker.rerank_scored("q", &candidates(3)).await.unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].chunk.text, "c2");
    }
}
