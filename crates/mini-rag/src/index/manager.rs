//! Destructive index rebuild
//!
//! Every ingest replaces the whole index: the existing index is deleted,
//! a fresh one is created with the configured dimension and metric, and
//! the new chunks are embedded and upserted once it reports ready.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{dimension_mismatch, IndexPollingConfig, VectorStoreConfig};
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, IndexSpec, VectorIndexProvider, VectorRecord};
use crate::types::Chunk;

/// Lifecycle of the managed index as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Absent,
    Creating,
    Ready,
    Deleting,
}

/// Owns the delete/create/populate cycle of a single named index
pub struct IndexManager {
    store: Arc<dyn VectorIndexProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_config: VectorStoreConfig,
    polling: IndexPollingConfig,
    state: Mutex<IndexState>,
    /// Serializes rebuilds
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl IndexManager {
    pub fn new(
        store: Arc<dyn VectorIndexProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        vector_config: VectorStoreConfig,
        polling: IndexPollingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            vector_config,
            polling,
            state: Mutex::new(IndexState::Absent),
            rebuild_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> IndexState {
        *self.state.lock()
    }

    fn transition(&self, name: &str, next: IndexState) {
        let mut state = self.state.lock();
        if *state != next {
            tracing::info!("Index '{}': {:?} -> {:?}", name, *state, next);
            *state = next;
        }
    }

    /// Replace the contents of `name` with `chunks`
    ///
    /// Returns the number of vectors upserted. Chunks are embedded before
    /// the existing index is touched, so an embedding failure leaves the old
    /// index in place. Failures after the delete leave the index empty or
    /// absent; there is no rollback.
    pub async fn rebuild_index(&self, name: &str, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Err(Error::internal("No text chunks to ingest."));
        }
        if self.embedder.dimensions() != self.vector_config.dimension {
            return Err(dimension_mismatch(
                self.embedder.dimensions(),
                self.vector_config.dimension,
            ));
        }

        let _guard = self.rebuild_lock.lock().await;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        tracing::info!(
            "Embedded {} chunks with {}",
            chunks.len(),
            self.embedder.name()
        );

        if self.store.list_indexes().await?.iter().any(|n| n == name) {
            self.delete_and_wait(name).await?;
        }
        self.transition(name, IndexState::Absent);

        self.create_and_wait(name).await?;

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| VectorRecord {
                id: Uuid::new_v4().to_string(),
                values,
                chunk: chunk.clone(),
            })
            .collect();

        let upserted = self.store.upsert(name, &records).await?;
        tracing::info!(
            "Upserted {} vectors into index '{}' via {}",
            upserted,
            name,
            self.store.name()
        );

        Ok(upserted)
    }

    async fn delete_and_wait(&self, name: &str) -> Result<()> {
        tracing::info!("Deleting existing index '{}'", name);
        self.transition(name, IndexState::Deleting);
        self.store.delete_index(name).await?;

        tokio::time::sleep(Duration::from_millis(self.polling.delete_settle_ms)).await;

        for _ in 0..self.polling.max_attempts {
            if !self.store.list_indexes().await?.iter().any(|n| n == name) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(self.polling.poll_interval_ms)).await;
        }

        Err(Error::vector_db(format!(
            "Timed out waiting for index '{}' to be deleted",
            name
        )))
    }

    async fn create_and_wait(&self, name: &str) -> Result<()> {
        let spec = IndexSpec {
            name: name.to_string(),
            dimension: self.vector_config.dimension,
            metric: self.vector_config.metric,
            cloud: self.vector_config.cloud.clone(),
            region: self.vector_config.region.clone(),
        };

        tracing::info!("Creating index '{}'", name);
        self.transition(name, IndexState::Creating);
        if let Err(e) = self.store.create_index(&spec).await {
            self.transition(name, IndexState::Absent);
            return Err(e);
        }

        for attempt in 0..self.polling.max_attempts {
            match self.store.describe_index(name).await? {
                Some(description) if description.ready => {
                    self.transition(name, IndexState::Ready);
                    return Ok(());
                }
                _ => {
                    tracing::debug!("Index '{}' not ready (poll {})", name, attempt + 1);
                    tokio::time::sleep(Duration::from_millis(self.polling.poll_interval_ms))
                        .await;
                }
            }
        }

        Err(Error::vector_db(format!(
            "Timed out waiting for index '{}' to become ready",
            name
        )))
    }
}
