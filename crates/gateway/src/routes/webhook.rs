//! Notification webhook called by the core service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use signed_channel::SIGNATURE_HEADER;
use tracing::{error, info, warn};
use trip_core::{ErrorBody, NotificationEnvelope};

use crate::format::render;
use crate::sender::ChatSender;
use crate::state::GatewayState;

/// `POST /webhook/notifications`
///
/// Verifies the signature over the raw body before parsing. Any verified
/// envelope is acknowledged with 200; chat delivery is best-effort.
pub async fn receive_notification<S: ChatSender + 'static>(
    State(state): State<GatewayState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = state.signer.verify_hex(&body, signature) {
        warn!(error = %e, "Rejected unsigned notification");
        let body = ErrorBody::new("unauthenticated").with_message(e.to_string());
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let envelope: NotificationEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Malformed notification");
            let body = ErrorBody::new("validation_failed")
                .with_message("Malformed notification")
                .with_details(json!({ "body": e.to_string() }));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    deliver(state.sender.as_ref(), &envelope).await;
    (StatusCode::OK, Json(json!({ "status": "accepted" }))).into_response()
}

/// Render an envelope and hand it to the chat sender. Returns whether a chat
/// message went out.
pub async fn deliver<S: ChatSender + ?Sized>(sender: &S, envelope: &NotificationEnvelope) -> bool {
    let outgoing = render(envelope);
    let Some(chat_id) = outgoing.chat_id else {
        warn!(
            trip_id = envelope.trip_id,
            contact = envelope.contact_name.as_deref().unwrap_or("unknown"),
            "Contact has no chat, SOS alert undeliverable over chat"
        );
        return false;
    };

    match sender.send_message(chat_id, &outgoing.text).await {
        Ok(()) => {
            info!(trip_id = envelope.trip_id, chat_id, kind = envelope.kind.as_str(), "Notification forwarded");
            true
        }
        Err(e) => {
            error!(
                trip_id = envelope.trip_id,
                chat_id,
                kind = envelope.kind.as_str(),
                error = %e,
                "Failed to forward notification"
            );
            false
        }
    }
}
