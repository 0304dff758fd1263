//! Route handlers for the core API.

pub mod health;
pub mod sos;
pub mod trips;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use notifier::NotificationDispatcher;

use crate::middleware::verify_signature;
use crate::state::AppState;

/// Build the router with all routes. Everything under `/api` must be signed.
pub fn router<N: NotificationDispatcher + 'static>(state: AppState<N>) -> Router {
    let api = Router::new()
        .route("/api/trips", post(trips::create_trip::<N>))
        .route("/api/trips/:id", get(trips::get_trip::<N>))
        .route("/api/trips/:id/start", post(trips::start_trip::<N>))
        .route(
            "/api/trips/:id/locations",
            post(trips::record_location::<N>).get(trips::list_locations::<N>),
        )
        .route("/api/trips/:id/complete", post(trips::complete_trip::<N>))
        .route("/api/trips/:id/cancel", post(trips::cancel_trip::<N>))
        .route("/api/sos", post(sos::trigger_sos::<N>))
        .route_layer(middleware::from_fn_with_state(
            state.signer.clone(),
            verify_signature,
        ));

    Router::new()
        // Health check
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
}
