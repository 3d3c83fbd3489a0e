//! Response types for ingest and query

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A retrieved chunk that the answer cites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitedSource {
    /// Document name of the cited chunk
    pub source: String,
    /// Chunk text
    pub content: String,
    /// 1-based position of the chunk in the prompt context
    pub citation_id: usize,
}

/// Synthesized answer with the sources it cites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResult {
    pub answer: String,
    pub sources: Vec<CitedSource>,
}

/// Response from `POST /ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub chunks_processed: usize,
    pub processing_time: String,
}

impl IngestResponse {
    pub fn new(chunks_processed: usize, elapsed: Duration) -> Self {
        Self {
            message: "Document ingested successfully!".to_string(),
            chunks_processed,
            processing_time: format_elapsed(elapsed),
        }
    }
}

/// Response from `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub sources: Vec<CitedSource>,
    pub processing_time: String,
}

impl QueryResponse {
    pub fn new(query: String, result: AnswerResult, elapsed: Duration) -> Self {
        Self {
            query,
            answer: result.answer,
            sources: result.sources,
            processing_time: format_elapsed(elapsed),
        }
    }
}

/// Seconds with two decimals, e.g. `"1.25s"`
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
