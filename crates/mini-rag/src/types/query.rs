//! Request types

use serde::{Deserialize, Serialize};

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub query: String,
}

/// Body of `POST /ingest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextIngestRequest {
    /// Raw text to index
    pub text: String,
}
