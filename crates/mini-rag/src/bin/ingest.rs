//! Batch ingestion of a folder of documents
//!
//! Run with: cargo run -p mini-rag --features cli --bin mini-rag-ingest -- ./documents

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use mini_rag::ingestion::chunk_folder;
use mini_rag::{FileType, RagConfig, RagPipeline};

#[derive(Parser)]
#[command(name = "mini-rag-ingest")]
#[command(about = "Chunk every document in a folder and rebuild the vector index from them")]
#[command(version)]
struct Cli {
    /// Folder to scan recursively
    folder: PathBuf,

    /// Also ingest .txt and .md files, not only PDFs
    #[arg(long)]
    include_text: bool,

    /// Chunk and report without touching the index
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_rag=info".into()),
        )
        .init();

    let cli = Cli::parse();
    if !cli.folder.is_dir() {
        anyhow::bail!("{} is not a directory", cli.folder.display());
    }

    let config = RagConfig::load()?;
    let pipeline = RagPipeline::from_config(config)?;

    let accept: &[FileType] = if cli.include_text {
        &[FileType::Pdf, FileType::Txt, FileType::Markdown]
    } else {
        &[FileType::Pdf]
    };

    let batch = chunk_folder(&cli.folder, accept, pipeline.chunker());

    for (path, error) in &batch.failed {
        tracing::warn!("Skipped {}: {}", path.display(), error);
    }
    println!(
        "Loaded {} documents ({} failed), {} chunks",
        batch.loaded.len(),
        batch.failed.len(),
        batch.chunks.len()
    );

    if cli.dry_run {
        return Ok(());
    }

    let upserted = pipeline
        .ingest_chunks(&batch.chunks)
        .await
        .context("failed to rebuild the index")?;

    println!("Indexed {} chunks", upserted);
    Ok(())
}
