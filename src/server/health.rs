//! Liveness endpoint.
//!
//! Answers 200 while the server accepts connections, with a small JSON
//! summary of the pipeline so operators can see whether the queue drains.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

/// Body of a `GET /health` response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Health {
    pub status: &'static str,

    /// Mentions waiting for verification.
    pub pending: usize,

    /// Verified records in the store.
    pub stored: usize,
}

/// Health check handler.
///
/// # Example
///
/// ```ignore
/// GET /health HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"status":"ok","pending":3,"stored":120}
/// ```
pub async fn health_handler(State(app_state): State<AppState>) -> Json<Health> {
    let context = app_state.context();
    Json(Health {
        status: "ok",
        pending: context.queue_len().await,
        stored: context.stored_len().await,
    })
}
