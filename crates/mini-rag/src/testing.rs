//! In-memory providers for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{IndexPollingConfig, RagConfig};
use crate::error::{Error, Result};
use crate::providers::{
    ChatProvider, EmbeddingProvider, IndexDescription, IndexSpec, RerankHit, RerankProvider,
    VectorIndexProvider, VectorRecord,
};
use crate::types::ScoredChunk;

/// Configuration for 16-dimensional mocks with instant index polling
pub fn test_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.credentials.index_name = Some("docs".to_string());
    config.embedding.dimensions = 16;
    config.vector_store.dimension = 16;
    config.index_polling = IndexPollingConfig {
        delete_settle_ms: 0,
        poll_interval_ms: 0,
        max_attempts: 5,
    };
    config
}

/// Letter-frequency embedder
pub struct MockEmbedder {
    pub dimensions: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(dimensions: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(dimensions)
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        for c in text.chars().filter(|c| c.is_alphanumeric()) {
            let slot = (c.to_ascii_lowercase() as usize) % self.dimensions;
            v[slot] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::embedding("mock embedder failure"));
        }
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct MemoryIndex {
    dimension: usize,
    polls_until_ready: u32,
    records: Vec<VectorRecord>,
}

/// Vector index held in memory; records every call
pub struct MemoryVectorIndex {
    indexes: Mutex<HashMap<String, MemoryIndex>>,
    /// Describe calls a new index needs before it reports ready
    pub ready_after: u32,
    /// List calls that still report a deleted index
    pub list_after_delete: u32,
    deleting: Mutex<HashMap<String, u32>>,
    pub log: Mutex<Vec<String>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            indexes: Mutex::new(HashMap::new()),
            ready_after: 1,
            list_after_delete: 0,
            deleting: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Pre-populate an index that is already ready
    pub fn with_index(self, name: &str, dimension: usize, records: Vec<VectorRecord>) -> Self {
        self.indexes.lock().insert(
            name.to_string(),
            MemoryIndex {
                dimension,
                polls_until_ready: 0,
                records,
            },
        );
        self
    }

    pub fn records(&self, name: &str) -> Vec<VectorRecord> {
        self.indexes
            .lock()
            .get(name)
            .map(|i| i.records.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, call: String) {
        self.log.lock().push(call);
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl VectorIndexProvider for MemoryVectorIndex {
    async fn list_indexes(&self) -> Result<Vec<String>> {
        self.record("list".to_string());
        let mut names: Vec<String> = self.indexes.lock().keys().cloned().collect();
        for (name, remaining) in self.deleting.lock().iter_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                names.push(name.clone());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        self.record(format!("create:{}", spec.name));
        self.indexes.lock().insert(
            spec.name.clone(),
            MemoryIndex {
                dimension: spec.dimension,
                polls_until_ready: self.ready_after,
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<()> {
        self.record(format!("delete:{}", name));
        self.indexes.lock().remove(name);
        if self.list_after_delete > 0 {
            self.deleting
                .lock()
                .insert(name.to_string(), self.list_after_delete);
        }
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>> {
        self.record(format!("describe:{}", name));
        let mut indexes = self.indexes.lock();
        Ok(indexes.get_mut(name).map(|index| {
            let ready = index.polls_until_ready == 0;
            index.polls_until_ready = index.polls_until_ready.saturating_sub(1);
            IndexDescription {
                name: name.to_string(),
                dimension: index.dimension,
                ready,
                host: ready.then(|| format!("{}.memory", name)),
            }
        }))
    }

    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<usize> {
        self.record(format!("upsert:{}:{}", index, records.len()));
        let mut indexes = self.indexes.lock();
        let target = indexes
            .get_mut(index)
            .ok_or_else(|| Error::vector_db(format!("Index '{}' does not exist", index)))?;
        target.records.extend_from_slice(records);
        Ok(records.len())
    }

    async fn query(&self, index: &str, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        self.record(format!("query:{}", index));
        let indexes = self.indexes.lock();
        let target = indexes
            .get(index)
            .ok_or_else(|| Error::vector_db(format!("Index '{}' does not exist", index)))?;
        let mut scored: Vec<ScoredChunk> = target
            .records
            .iter()
            .map(|r| ScoredChunk {
                chunk: r.chunk.clone(),
                score: cosine(vector, &r.values),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Chat model returning a fixed answer
pub struct MockChat {
    pub answer: String,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl MockChat {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-chat"
    }
}

/// Reranker that reverses the candidate order
pub struct ReverseReranker {
    /// Extra hit pointing past the candidate list
    pub stray_index: Option<usize>,
    pub calls: AtomicUsize,
}

impl ReverseReranker {
    pub fn new() -> Self {
        Self {
            stray_index: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RerankProvider for ReverseReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut hits: Vec<RerankHit> = Vec::new();
        if let Some(index) = self.stray_index {
            hits.push(RerankHit {
                index,
                relevance_score: 1.0,
            });
        }
        hits.extend((0..documents.len()).rev().enumerate().map(|(rank, index)| RerankHit {
            index,
            relevance_score: 0.9 - rank as f32 * 0.01,
        }));
        hits.truncate(top_n);
        Ok(hits)
    }

    fn name(&self) -> &str {
        "reverse"
    }
}
