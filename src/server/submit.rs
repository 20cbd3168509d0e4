//! Webmention submission endpoint.
//!
//! Validates the submission, then tries to queue it. Verification happens
//! later, on the verifier's schedule, so a 202 only means "queued".

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::AppState;
use crate::queue::AdmissionError;
use crate::validation::{Rejection, validate_submission};

/// Errors returned to a sender.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request is not a valid webmention.
    #[error("invalid submission: {0}")]
    Invalid(#[from] Rejection),

    /// The mention is valid but cannot be queued right now.
    #[error("not enqueueable: {0}")]
    NotEnqueueable(#[from] AdmissionError),

    /// The body could not be read, including bodies over the size cap.
    #[error("failed to read body: {0}")]
    Body(#[from] BytesRejection),
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        match self {
            SubmitError::Invalid(_) => StatusCode::BAD_REQUEST,
            SubmitError::NotEnqueueable(_) | SubmitError::Body(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}

/// Submission handler.
///
/// # Request
///
/// - Method: POST
/// - `Content-Type: application/x-www-form-urlencoded`
/// - Body: `source=<url>&target=<url>`
///
/// # Response
///
/// No body in any case.
///
/// - 202 Accepted: queued for verification
/// - 400 Bad Request: failed validation
/// - 500 Internal Server Error: valid, but already queued, recently
///   verified, from a source over its failure budget, or the queue is full;
///   also when the body cannot be read or exceeds the size cap
///
/// # Example
///
/// ```ignore
/// POST / HTTP/1.1
/// Content-Type: application/x-www-form-urlencoded
///
/// source=https://a.example/post&target=https://b.example/page
///
/// HTTP/1.1 202 Accepted
/// ```
pub async fn submit_handler(
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, SubmitError> {
    let context = app_state.context();
    let body = body.inspect_err(|e| {
        debug!(error = %e, "Failed to read submission body");
    })?;

    let mention =
        validate_submission(&method, &headers, &body, context.allow_list()).inspect_err(|e| {
            debug!(rule = e.rule_index(), reason = %e, "Rejected submission");
        })?;

    context
        .submit(mention.clone(), Utc::now())
        .await
        .inspect_err(|e| {
            debug!(
                source = %mention.source,
                target = %mention.target,
                reason = %e,
                "Mention not enqueueable"
            );
        })?;

    info!(
        source = %mention.source,
        target = %mention.target,
        "Mention queued"
    );
    Ok(StatusCode::ACCEPTED)
}
