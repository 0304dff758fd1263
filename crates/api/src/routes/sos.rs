//! Emergency endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use notifier::NotificationDispatcher;
use trip_core::{SosAcknowledgement, SosRequest};

use crate::error::Result;
use crate::state::AppState;

/// `POST /api/sos`
///
/// Succeeds once the SOS is persisted, even when no contact could be
/// reached yet.
pub async fn trigger_sos<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    payload: std::result::Result<Json<SosRequest>, JsonRejection>,
) -> Result<Json<SosAcknowledgement>> {
    let Json(request) = payload?;
    Ok(Json(state.orchestrator.trigger_sos(&request).await?))
}
