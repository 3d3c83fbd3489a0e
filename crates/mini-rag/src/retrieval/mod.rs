//! Two-stage retrieval: dense similarity search, then reranking

mod rerank;
mod retriever;

pub use rerank::Reranker;
pub use retriever::Retriever;
