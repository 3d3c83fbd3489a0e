//! Batch loading of a document folder

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::chunker::TextChunker;
use super::parser::DocumentLoader;
use crate::error::Error;
use crate::types::{Chunk, FileType};

/// Outcome of chunking every supported file under a folder
#[derive(Debug, Default)]
pub struct BatchChunks {
    /// Chunks from all documents that loaded successfully
    pub chunks: Vec<Chunk>,
    /// Per-file chunk counts for loaded documents
    pub loaded: Vec<(PathBuf, usize)>,
    /// Documents that failed to load
    pub failed: Vec<(PathBuf, Error)>,
}

/// Walk `folder`, load every file of an accepted type and chunk it
///
/// A document that fails to load is recorded in `failed` and skipped; the
/// remaining documents are still processed.
pub fn chunk_folder(folder: &Path, accept: &[FileType], chunker: &TextChunker) -> BatchChunks {
    let mut batch = BatchChunks::default();

    let mut paths: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.file_name()
                .map(|n| accept.contains(&FileType::from_filename(&n.to_string_lossy())))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        match DocumentLoader::load_file(&path) {
            Ok(document) => {
                let chunks = chunker.chunk(&document);
                tracing::info!("Loaded {} chunks from {}", chunks.len(), path.display());
                batch.loaded.push((path, chunks.len()));
                batch.chunks.extend(chunks);
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path.display(), e);
                batch.failed.push((path, e));
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_broken.pdf"), b"garbage").unwrap();
        std::fs::write(dir.path().join("b_notes.txt"), "Some notes.").unwrap();
        std::fs::write(dir.path().join("c_ignored.csv"), "x,y").unwrap();

        let chunker = TextChunker::new(1000, 150).unwrap();
        let batch = chunk_folder(dir.path(), &[FileType::Pdf, FileType::Txt], &chunker);

        assert_eq!(batch.failed.len(), 1);
        assert!(batch.failed[0].0.ends_with("a_broken.pdf"));
        assert_eq!(batch.loaded.len(), 1);
        assert_eq!(batch.chunks.len(), 1);
        assert_eq!(batch.chunks[0].source(), "b_notes.txt");
        assert_eq!(batch.chunks[0].metadata.chunk_id, 0);
    }

    #[test]
    fn test_only_accepted_types() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Some notes.").unwrap();

        let chunker = TextChunker::new(1000, 150).unwrap();
        let batch = chunk_folder(dir.path(), &[FileType::Pdf], &chunker);

        assert!(batch.chunks.is_empty());
        assert!(batch.failed.is_empty());
    }
}
