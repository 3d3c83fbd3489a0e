//! mini-rag: minimal retrieval-augmented question answering over hosted model APIs
//!
//! Documents are split into overlapping chunks, embedded and written to a
//! freshly rebuilt vector index. Questions are answered by dense retrieval,
//! reranking and a single grounded chat completion whose `[n]` markers are
//! linked back to the chunks they cite.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{RagPipeline, Services};
pub use types::{
    document::{Chunk, FileType, SourceDocument},
    query::{QueryRequest, TextIngestRequest},
    response::{AnswerResult, CitedSource, IngestResponse, QueryResponse},
};
