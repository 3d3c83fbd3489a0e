//! Document and chunk types with provenance for citations

use serde::{Deserialize, Serialize};

/// Source name given to chunks of pasted raw text
pub const PASTED_TEXT_SOURCE: &str = "Pasted Text";

/// Supported input file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// One page of extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    /// Text content of the page
    pub text: String,
}

/// Input to the chunker
#[derive(Debug, Clone)]
pub enum SourceDocument {
    /// A loaded file split into pages; `source` is the base filename
    Parsed { source: String, pages: Vec<Page> },
    /// Raw pasted text
    Text(String),
}

impl SourceDocument {
    /// Wrap pasted text
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Name recorded on every chunk of this document
    pub fn source_name(&self) -> &str {
        match self {
            Self::Parsed { source, .. } => source,
            Self::Text(_) => PASTED_TEXT_SOURCE,
        }
    }

    /// Text segments to split independently, in document order
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Parsed { pages, .. } => pages.iter().map(|p| p.text.as_str()).collect(),
            Self::Text(text) => vec![text.as_str()],
        }
    }
}

/// Provenance attached to a chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Base filename, or "Pasted Text"
    pub source: String,
    /// 0-based position within the document's chunk sequence
    pub chunk_id: u32,
}

/// A bounded segment of document text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Text content
    pub text: String,
    /// Provenance
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, source: impl Into<String>, chunk_id: u32) -> Self {
        Self {
            text: text.into(),
            metadata: ChunkMetadata {
                source: source.into(),
                chunk_id,
            },
        }
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// Convert to vector metadata for storage
    pub fn to_vector_metadata(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut meta = serde_json::Map::new();
        meta.insert("text".to_string(), serde_json::json!(self.text));
        meta.insert("source".to_string(), serde_json::json!(self.metadata.source));
        meta.insert("chunk_id".to_string(), serde_json::json!(self.metadata.chunk_id));
        meta
    }

    /// Rebuild a chunk from stored vector metadata
    ///
    /// Missing fields fall back to an empty text, an "Unknown" source and
    /// chunk id 0 so that foreign vectors in the index never fail a query.
    pub fn from_vector_metadata(meta: &serde_json::Map<String, serde_json::Value>) -> Self {
        let text = meta
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let source = meta
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown");
        // Stored numbers may come back as floats
        let chunk_id = meta
            .get("chunk_id")
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
            .unwrap_or(0) as u32;
        Self::new(text, source, chunk_id)
    }
}

/// A chunk with the relevance score assigned by the store or reranker
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Higher is more relevant
    pub score: f32,
}
