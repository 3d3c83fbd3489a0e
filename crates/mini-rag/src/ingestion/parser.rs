//! Document loading: PDF pages or plain text

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{FileType, Page, SourceDocument};

/// Loads files into page-structured documents
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a file from disk; the chunk source becomes its base filename
    pub fn load_file(path: impl AsRef<Path>) -> Result<SourceDocument> {
        let path = path.as_ref();
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let data = std::fs::read(path)
            .map_err(|e| Error::document_load(&source, format!("Failed to read file: {}", e)))?;

        Self::load_bytes(&source, &data)
    }

    /// Load in-memory file content, dispatching on the file extension
    pub fn load_bytes(source: &str, data: &[u8]) -> Result<SourceDocument> {
        match FileType::from_filename(source) {
            FileType::Pdf => Self::load_pdf(source, data),
            FileType::Txt | FileType::Markdown => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|e| Error::document_load(source, format!("Invalid UTF-8: {}", e)))?;
                Ok(SourceDocument::Parsed {
                    source: source.to_string(),
                    pages: vec![Page { number: 1, text }],
                })
            }
            FileType::Unknown => Err(Error::document_load(source, "Unsupported file type")),
        }
    }

    /// Extract a PDF page by page
    pub fn load_pdf(source: &str, data: &[u8]) -> Result<SourceDocument> {
        let pages = match Self::extract_pages(data) {
            Ok(pages) if pages.iter().any(|p| !p.text.trim().is_empty()) => pages,
            Ok(_) => {
                tracing::warn!("No text from page extraction for '{}', trying pdf-extract", source);
                Self::extract_whole(source, data)?
            }
            Err(e) => {
                tracing::warn!(
                    "Page extraction failed for '{}': {}, trying pdf-extract",
                    source,
                    e
                );
                Self::extract_whole(source, data)?
            }
        };

        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(Error::document_load(
                source,
                "No text content could be extracted from PDF",
            ));
        }

        tracing::debug!("Loaded '{}' ({} pages)", source, pages.len());
        Ok(SourceDocument::Parsed {
            source: source.to_string(),
            pages,
        })
    }

    fn extract_pages(data: &[u8]) -> std::result::Result<Vec<Page>, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(text) => cleanup_pdf_text(&text),
                Err(e) => {
                    tracing::debug!("Could not extract page {}: {}", page_number, e);
                    String::new()
                }
            };
            pages.push(Page {
                number: *page_number,
                text,
            });
        }
        Ok(pages)
    }

    /// Whole-document fallback; pdf-extract does not expose page boundaries
    fn extract_whole(source: &str, data: &[u8]) -> Result<Vec<Page>> {
        // pdf-extract panics on some malformed fonts
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| Error::document_load(source, "PDF extraction panicked"))?
            .map_err(|e| Error::document_load(source, format!("Failed to load PDF: {}", e)))?;
        Ok(vec![Page {
            number: 1,
            text: cleanup_pdf_text(&text),
        }])
    }
}

/// Normalize ligatures and typographic glyphs, drop NULs
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{00A0}', " ")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
}
