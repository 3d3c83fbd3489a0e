//! Core types for the RAG pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, FileType, Page, ScoredChunk, SourceDocument};
pub use query::{QueryRequest, TextIngestRequest};
pub use response::{AnswerResult, CitedSource, IngestResponse, QueryResponse};
