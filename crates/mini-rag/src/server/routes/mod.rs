//! API routes for the RAG server

pub mod ingest;
pub mod query;

use axum::{routing::post, Router};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest::ingest_text))
        .route("/query", post(query::query_rag))
}
