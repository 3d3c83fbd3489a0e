//! Document loading and chunking

pub mod batch;
mod chunker;
mod parser;

pub use batch::{chunk_folder, BatchChunks};
pub use chunker::TextChunker;
pub use parser::DocumentLoader;
