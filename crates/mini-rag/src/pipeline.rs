//! End-to-end ingest and query orchestration

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::AnswerSynthesizer;
use crate::index::{IndexManager, IndexState};
use crate::ingestion::TextChunker;
use crate::providers::{
    ChatProvider, CohereReranker, EmbeddingProvider, GeminiChat, GeminiEmbedder, PineconeClient,
    RerankProvider, VectorIndexProvider,
};
use crate::retrieval::{Reranker, Retriever};
use crate::types::{AnswerResult, Chunk, SourceDocument};

/// External services the pipeline talks to
///
/// A service is `None` when its credential is not configured; the error is
/// raised when an operation first needs it.
#[derive(Clone, Default)]
pub struct Services {
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub vector_index: Option<Arc<dyn VectorIndexProvider>>,
    pub reranker: Option<Arc<dyn RerankProvider>>,
    pub chat: Option<Arc<dyn ChatProvider>>,
}

impl Services {
    /// Build the hosted clients for every configured credential
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let mut services = Self::default();

        if let Ok(key) = config.require_google_key() {
            services.embedder = Some(Arc::new(GeminiEmbedder::new(key, &config.embedding)?));
            services.chat = Some(Arc::new(GeminiChat::new(key, &config.llm)?));
        } else {
            tracing::warn!("GOOGLE_API_KEY not set; embedding and generation are unavailable");
        }

        if let Ok(key) = config.require_pinecone_key() {
            services.vector_index = Some(Arc::new(PineconeClient::new(key, &config.vector_store)?));
        } else {
            tracing::warn!("PINECONE_API_KEY not set; the vector index is unavailable");
        }

        match config.cohere_key() {
            Some(key) => {
                services.reranker = Some(Arc::new(CohereReranker::new(key, &config.rerank)?));
            }
            None => tracing::warn!("COHERE_API_KEY not set; queries will fail at reranking"),
        }

        Ok(services)
    }
}

/// Chunk, index, retrieve, rerank and answer
pub struct RagPipeline {
    config: RagConfig,
    chunker: TextChunker,
    services: Services,
    index_manager: Option<IndexManager>,
    reranker: Reranker,
}

impl RagPipeline {
    pub fn new(config: RagConfig, services: Services) -> Result<Self> {
        let chunker = TextChunker::from_config(&config.chunking)?;

        let index_manager = match (&services.vector_index, &services.embedder) {
            (Some(store), Some(embedder)) => Some(IndexManager::new(
                store.clone(),
                embedder.clone(),
                config.vector_store.clone(),
                config.index_polling.clone(),
            )),
            _ => None,
        };

        let reranker = Reranker::new(services.reranker.clone(), config.retrieval.top_n);

        Ok(Self {
            config,
            chunker,
            services,
            index_manager,
            reranker,
        })
    }

    /// Build a pipeline with the hosted clients from configuration
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let services = Services::from_config(&config)?;
        Self::new(config, services)
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    pub fn index_state(&self) -> IndexState {
        self.index_manager
            .as_ref()
            .map(|m| m.state())
            .unwrap_or(IndexState::Absent)
    }

    fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.services.embedder.clone().ok_or_else(|| {
            Error::config("GOOGLE_API_KEY environment variable not set")
        })
    }

    fn vector_index(&self) -> Result<Arc<dyn VectorIndexProvider>> {
        self.services.vector_index.clone().ok_or_else(|| {
            Error::config("PINECONE_API_KEY environment variable not set")
        })
    }

    /// Chunk pasted text and rebuild the index from it
    pub async fn ingest_text(&self, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(&SourceDocument::text(text));
        tracing::info!("Split pasted text into {} chunks", chunks.len());
        self.ingest_chunks(&chunks).await
    }

    /// Chunk several documents and rebuild the index from all of them
    pub async fn ingest_documents(&self, documents: &[SourceDocument]) -> Result<usize> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunker.chunk(doc))
            .collect();
        self.ingest_chunks(&chunks).await
    }

    /// Replace the index contents with `chunks`
    pub async fn ingest_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let index_name = self.config.require_index_name()?;
        self.embedder()?;
        self.vector_index()?;
        let manager = self
            .index_manager
            .as_ref()
            .ok_or_else(|| Error::internal("index manager not initialized"))?;

        manager.rebuild_index(index_name, chunks).await
    }

    /// Build a retriever over the configured index
    pub async fn connect_retriever(&self) -> Result<Retriever> {
        let index_name = self.config.require_index_name()?;
        Retriever::connect(
            self.vector_index()?,
            self.embedder()?,
            index_name,
            self.config.retrieval.top_k,
        )
        .await
    }

    /// Answer a question: retrieve, rerank, then synthesize
    pub async fn answer(&self, retriever: &Retriever, query: &str) -> Result<AnswerResult> {
        if query.is_empty() {
            return Err(Error::validation("Query cannot be empty."));
        }

        let candidates = retriever.retrieve(query).await?;
        tracing::info!("Retrieved {} candidate chunks", candidates.len());

        let ranked = self.reranker.rerank(query, &candidates).await?;
        tracing::info!("Reranker kept {} chunks", ranked.len());

        let chat = self.services.chat.clone().ok_or_else(|| {
            Error::config("GOOGLE_API_KEY environment variable not set")
        })?;
        AnswerSynthesizer::new(chat).synthesize(query, &ranked).await
    }
}
