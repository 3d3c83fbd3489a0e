//! Application state for the RAG server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::pipeline::RagPipeline;
use crate::retrieval::Retriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Ingest and query pipeline
    pipeline: RagPipeline,
    /// Retriever over the current index, built lazily
    retriever: RwLock<Option<Arc<Retriever>>>,
}

impl AppState {
    /// Create application state with the hosted providers from `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::with_pipeline(RagPipeline::from_config(config)?))
    }

    pub fn with_pipeline(pipeline: RagPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pipeline,
                retriever: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        self.inner.pipeline.config()
    }

    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }

    /// Try to build the retriever at startup
    ///
    /// Failure is logged and left for the first query to retry.
    pub async fn warm_up(&self) {
        match self.retriever().await {
            Ok(_) => tracing::info!("Retriever initialized"),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    /// The cached retriever, building it on first use
    ///
    /// Concurrent callers may each build one; the last one stored wins.
    pub async fn retriever(&self) -> Result<Arc<Retriever>> {
        let cached = self.inner.retriever.read().clone();
        if let Some(retriever) = cached {
            return Ok(retriever);
        }

        let retriever = self
            .inner
            .pipeline
            .connect_retriever()
            .await
            .map(Arc::new)
            .map_err(|e| Error::RetrieverUnavailable(e.to_string()))?;

        *self.inner.retriever.write() = Some(retriever.clone());
        Ok(retriever)
    }

    /// Drop the cached retriever so the next query reconnects
    pub fn invalidate_retriever(&self) {
        self.inner.retriever.write().take();
    }

    /// Whether a retriever is currently held
    pub fn is_ready(&self) -> bool {
        self.inner.retriever.read().is_some()
    }
}
