//! Citation extraction and linking

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Chunk, CitedSource};

/// Answer substituted when the model declines to answer
pub const NO_ANSWER_MESSAGE: &str = "Sorry, I couldn't find a definitive answer to that question in the provided documents. Please try a different query.";

/// Lower-case phrases that mark an answer as a refusal
pub const REFUSAL_PHRASES: &[&str] = &[
    "not available",
    "cannot find",
    "do not have information",
    "not found",
];

static CITATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("Invalid regex"));

/// Parses `[n]` markers out of model answers
pub struct CitationParser;

impl CitationParser {
    /// Marker numbers in order of appearance, duplicates included
    ///
    /// Digits that do not fit a `usize` are skipped.
    pub fn extract_markers(answer: &str) -> Vec<usize> {
        CITATION_PATTERN
            .captures_iter(answer)
            .filter_map(|cap| cap.get(1)?.as_str().parse().ok())
            .collect()
    }

    /// Case-insensitive refusal check
    ///
    /// A substring heuristic: an answer that merely quotes one of the
    /// phrases is treated as a refusal too.
    pub fn is_refusal(answer: &str) -> bool {
        let lower = answer.to_lowercase();
        REFUSAL_PHRASES.iter().any(|phrase| lower.contains(phrase))
    }

    /// Link cited markers back to the chunks shown to the model
    ///
    /// Each chunk appears at most once, ordered by its position in `chunks`.
    /// Markers outside `1..=chunks.len()` are ignored.
    pub fn link_sources(answer: &str, chunks: &[Chunk]) -> Vec<CitedSource> {
        let markers = Self::extract_markers(answer);

        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (i + 1, chunk))
            .filter(|(position, _)| markers.contains(position))
            .map(|(position, chunk)| CitedSource {
                source: chunk.source().to_string(),
                content: chunk.text.clone(),
                citation_id: position,
            })
            .collect()
    }
}
