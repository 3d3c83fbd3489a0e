//! Text ingestion endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{IngestResponse, TextIngestRequest};

/// POST /ingest - Replace the index with the chunks of the pasted text
pub async fn ingest_text(
    State(state): State<AppState>,
    Json(request): Json<TextIngestRequest>,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    tracing::info!("Ingesting {} characters of pasted text", request.text.chars().count());

    let chunks_processed = state.pipeline().ingest_text(&request.text).await?;

    // The index was recreated; reconnect on the next query
    state.invalidate_retriever();

    let response = IngestResponse::new(chunks_processed, start.elapsed());
    tracing::info!(
        "Ingested {} chunks in {}",
        response.chunks_processed,
        response.processing_time
    );
    Ok(Json(response))
}
