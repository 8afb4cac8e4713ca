//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunkers::ChapterChunker;
use crate::types::{ChapterMeta, Chunk, ChunkingConfig};

/// Application state shared across handlers.
pub struct AppState {
    pub chunking: ChunkingConfig,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Request to chunk one chapter.
#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    /// Chapter markdown, title header included
    pub markdown: String,

    /// Metadata copied onto every chunk
    #[serde(default)]
    pub meta: ChapterMeta,

    /// Override of the configured merge floor
    #[serde(default)]
    pub min_tokens: Option<usize>,

    /// Override of the configured ceiling
    #[serde(default)]
    pub max_tokens: Option<usize>,
}

/// Chunks produced for one chapter.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub count: usize,
    pub chunks: Vec<Chunk>,
}

/// Error body for rejected requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Chunk a chapter synchronously.
pub async fn chunk_chapter(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Result<Json<ChunkResponse>, (StatusCode, Json<ErrorResponse>)> {
    let config = ChunkingConfig {
        min_tokens: request.min_tokens.unwrap_or(state.chunking.min_tokens),
        max_tokens: request.max_tokens.unwrap_or(state.chunking.max_tokens),
        ..state.chunking
    };
    config.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
    })?;

    let chunker = ChapterChunker::new(config);
    let ChunkRequest { markdown, meta, .. } = request;
    let chunks = tokio::task::spawn_blocking(move || chunker.chunk_chapter(&markdown, &meta))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: e.to_string() }),
            )
        })?;

    info!(
        chapter = chunks.first().map(|c| c.meta.chapter.as_str()).unwrap_or(""),
        chunks = chunks.len(),
        "Chunked chapter request"
    );

    Ok(Json(ChunkResponse {
        count: chunks.len(),
        chunks,
    }))
}
