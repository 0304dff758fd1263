//! Inbound request signature verification.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use signed_channel::{Signer, SIGNATURE_HEADER};
use tracing::warn;

use crate::error::ApiError;

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Reject any request whose `X-Signature` does not match its raw body.
///
/// The body is buffered, verified, then handed on unchanged. Bodyless
/// requests are signed over the empty string.
pub async fn verify_signature(State(signer): State<Signer>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::invalid_field("body", e.to_string()).into_response(),
    };

    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = signer.verify_hex(&bytes, signature) {
        warn!(method = %parts.method, path = %parts.uri.path(), error = %e, "Rejected unsigned request");
        return ApiError::Unauthenticated(e.to_string()).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
