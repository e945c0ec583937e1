//! The HTTP surface: one embedded page plus a small JSON API.
//!
//! There is no session machinery and no persistence. Batches live in a
//! process-local map keyed by a random id so the download endpoints can
//! find them again; restarting the server forgets everything, exactly like
//! the in-memory UI state it replaces. The progress relay is a single
//! server-wide instance — batches run one at a time, and a second
//! concurrent batch would merely scramble the progress display.

pub mod handlers;

use crate::batch::BatchOutput;
use crate::config::ConvertConfig;
use crate::converter::{DoclingEngine, DocumentConverter};
use crate::progress::ProgressRelay;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Default upload body limit: 500 MB.
pub const DEFAULT_BODY_LIMIT: usize = 500 * 1024 * 1024;

/// Shared server state.
pub struct AppState {
    /// The conversion engine behind the trait seam.
    pub converter: Arc<dyn DocumentConverter>,
    /// Shared progress state, polled by the browser.
    pub relay: ProgressRelay,
    /// Finished batches, kept in memory for the download endpoints.
    pub batches: Mutex<HashMap<Uuid, BatchOutput>>,
    /// Server-level defaults (engine program); per-request fields override
    /// the option booleans.
    pub defaults: ConvertConfig,
}

impl AppState {
    /// State wired to the real external engine.
    pub fn new(defaults: ConvertConfig) -> Arc<Self> {
        Self::with_converter(Arc::new(DoclingEngine::new()), defaults)
    }

    /// State with a custom converter — the seam tests use.
    pub fn with_converter(
        converter: Arc<dyn DocumentConverter>,
        defaults: ConvertConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            converter,
            relay: ProgressRelay::new(),
            batches: Mutex::new(HashMap::new()),
            defaults,
        })
    }

    /// Store a finished batch under `id` for the download endpoints.
    pub fn store_batch(&self, id: Uuid, output: BatchOutput) {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, output);
    }

    /// Clone out a finished batch.
    pub fn batch(&self, id: Uuid) -> Option<BatchOutput> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/formats", get(handlers::formats))
        .route("/api/progress", get(handlers::progress))
        .route("/api/convert", post(handlers::convert))
        .route(
            "/api/batches/{id}/files/{index}/download",
            get(handlers::download_file),
        )
        .route("/api/batches/{id}/archive", get(handlers::download_archive))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    body_limit: usize,
) -> std::io::Result<()> {
    let app = router(state, body_limit);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

/// HTTP-facing error mapping; every arm renders a JSON `{"error": …}` body.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        WebError::BadRequest(format!("invalid multipart body: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
