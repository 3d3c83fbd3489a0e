//! Recursive character chunking with overlap
//!
//! Text is split on the largest separator that occurs in it (paragraph,
//! line, sentence, word, then single characters). Pieces that still exceed
//! the size bound are split again with the remaining separators, and the
//! small pieces are merged back greedily into chunks of at most `chunk_size`
//! characters that share up to `overlap` characters with their predecessor.
//! All lengths are counted in `char`s.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, SourceDocument};

/// Text chunker with configurable size, overlap and separators
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters carried over between chunks
    overlap: usize,
    /// Separators in priority order
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a chunker with the default separators
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        Self::from_config(&ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
            ..ChunkingConfig::default()
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
            separators: config.separators.clone(),
        })
    }

    /// Chunk a document, numbering chunks sequentially across all its pages
    pub fn chunk(&self, document: &SourceDocument) -> Vec<Chunk> {
        let source = document.source_name();

        let chunks: Vec<Chunk> = document
            .segments()
            .into_iter()
            .flat_map(|segment| self.split_text(segment))
            .enumerate()
            .map(|(i, text)| Chunk::new(text, source, i as u32))
            .collect();

        tracing::debug!("Split '{}' into {} chunks", source, chunks.len());
        chunks
    }

    /// Split a single text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // First separator present in the text wins; "" always matches
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    final_chunks.push(trimmed.to_string());
                }
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily merge small pieces into chunks, carrying overlap forward
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                // Drop from the front until only the overlap remains and the next piece fits
                while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

/// Split on `separator`, attaching each separator to the start of the piece that follows it
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Page;

    fn default_chunker() -> TextChunker {
        TextChunker::from_config(&ChunkingConfig::default()).unwrap()
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = default_chunker().chunk(&SourceDocument::text(
            "Paris is the capital of France. It lies on the Seine.",
        ));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.chunk_id, 0);
        assert_eq!(chunks[0].source(), "Pasted Text");
        assert_eq!(
            chunks[0].text,
            "Paris is the capital of France. It lies on the Seine."
        );
    }

    #[test]
    fn test_1200_chars_two_chunks_with_overlap() {
        let text = "A".repeat(1200);
        let chunks = default_chunker().chunk(&SourceDocument::text(text.clone()));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.len(), 1000);
        // Second chunk starts 850 characters in (1000 - 150 overlap)
        assert_eq!(chunks[1].text, text[850..]);
        assert_eq!(chunks[1].metadata.chunk_id, 1);
    }

    #[test]
    fn test_exact_overlap_between_consecutive_chunks() {
        let text: String = (0..2500)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let chunks = default_chunker().split_text(&text);

        assert_eq!(chunks.len(), 3);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            assert_eq!(prev[prev.len() - 150..], next[..150]);
        }
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
    }

    #[test]
    fn test_multibyte_counts_characters() {
        let text = "é".repeat(1200);
        let chunks = default_chunker().split_text(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 350);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let chunker = TextChunker::new(20, 5).unwrap();
        let chunks = chunker.split_text("aaaa bbbb cccc\n\ndddd eeee ffff");
        assert_eq!(chunks, vec!["aaaa bbbb cccc", "dddd eeee ffff"]);
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_words() {
        let chunker = TextChunker::new(12, 0).unwrap();
        let chunks = chunker.split_text("one two three four five\n\nsix");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks.first().map(String::as_str), Some("one two"));
        assert_eq!(chunks.last().map(String::as_str), Some("six"));
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(default_chunker().split_text("").is_empty());
        assert!(default_chunker().split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_pages_share_sequential_ids() {
        let doc = SourceDocument::Parsed {
            source: "manual.pdf".to_string(),
            pages: vec![
                Page { number: 1, text: "B".repeat(1200) },
                Page { number: 2, text: "Short second page.".to_string() },
            ],
        };
        let chunks = default_chunker().chunk(&doc);

        let ids: Vec<u32> = chunks.iter().map(|c| c.metadata.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(chunks.iter().all(|c| c.source() == "manual.pdf"));
        assert_eq!(chunks[2].text, "Short second page.");
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(TextChunker::new(100, 100), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(0, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_split_keep_separator() {
        assert_eq!(
            split_keep_separator("a\n\nb\n\n\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\n", "\n\nc"]
        );
        assert_eq!(split_keep_separator("\n\nx", "\n\n"), vec!["\n\nx"]);
        assert_eq!(split_keep_separator("héj", ""), vec!["h", "é", "j"]);
    }
}
