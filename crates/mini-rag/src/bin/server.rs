//! RAG Server binary
//!
//! Run with: cargo run -p mini-rag --bin mini-rag-server

use mini_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - Index: {}",
        config.credentials.index_name.as_deref().unwrap_or("<unset>")
    );
    tracing::info!(
        "  - Embedding model: {} ({} dims)",
        config.embedding.model,
        config.embedding.dimensions
    );
    tracing::info!("  - Chat model: {}", config.llm.model);
    tracing::info!("  - Rerank model: {}", config.rerank.model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::debug!("Credentials: {:?}", config.credentials);

    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ingest - Index pasted text (replaces the index)");
    println!("  POST /query  - Ask questions");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
