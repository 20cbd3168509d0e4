//! HTTP server for the webmention receiver.
//!
//! # Endpoints
//!
//! - `POST /` and `POST /webmention` - Accepts submissions (returns 202 Accepted).
//!   Other methods on these paths reach the validator and get 400.
//! - `GET /health` - Returns 200 with queue and store counts
//!
//! Submission bodies are capped at [`MAX_SUBMISSION_BYTES`]. A larger body
//! fails to buffer and gets 500 like any other body-read error.

use std::sync::Arc;

pub mod health;
pub mod submit;

pub use health::health_handler;
pub use submit::submit_handler;

use crate::context::ReceiverContext;

/// Largest submission body read (64 KiB). A form carrying two URLs is far
/// smaller.
pub const MAX_SUBMISSION_BYTES: usize = 64 * 1024;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The verifier
/// holds another handle to the same context.
#[derive(Clone)]
pub struct AppState {
    context: Arc<ReceiverContext>,
}

impl AppState {
    pub fn new(context: Arc<ReceiverContext>) -> Self {
        AppState { context }
    }

    /// Returns the receiver context.
    pub fn context(&self) -> &ReceiverContext {
        &self.context
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::extract::DefaultBodyLimit;
    use axum::routing::{any, get};

    axum::Router::new()
        .route("/", any(submit_handler))
        .route("/webmention", any(submit_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
        .with_state(app_state)
}
