//! Route handlers for the gateway.

pub mod webhook;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::sender::ChatSender;
use crate::state::GatewayState;

/// Build the router with all routes.
pub fn router<S: ChatSender + 'static>(state: GatewayState<S>) -> Router {
    Router::new()
        .route("/webhook/notifications", post(webhook::receive_notification::<S>))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
