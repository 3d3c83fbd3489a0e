//! Query endpoint with RAG and citations

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /query - Answer a question from the indexed documents
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();

    if request.query.is_empty() {
        return Err(Error::validation("Query cannot be empty."));
    }

    tracing::info!("Query: \"{}\"", request.query);

    let retriever = state.retriever().await?;
    let result = state.pipeline().answer(&retriever, &request.query).await?;

    tracing::info!(
        "Answered with {} cited sources in {:.2}s",
        result.sources.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Json(QueryResponse::new(request.query, result, start.elapsed())))
}
