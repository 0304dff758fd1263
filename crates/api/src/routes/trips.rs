//! Trip lifecycle endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use notifier::NotificationDispatcher;
use trip_core::{
    CancelTripRequest, LocationUpdate, LocationUpdateRequest, RouteOption, Trip, TripCreationRequest,
    TripRouteOptions,
};

use crate::error::Result;
use crate::state::AppState;

type TripId = std::result::Result<Path<i64>, PathRejection>;
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// `POST /api/trips`
pub async fn create_trip<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    payload: JsonBody<TripCreationRequest>,
) -> Result<(StatusCode, Json<TripRouteOptions>)> {
    let Json(request) = payload?;
    let options = state.orchestrator.create_trip(&request).await?;
    Ok((StatusCode::CREATED, Json(options)))
}

/// `POST /api/trips/:id/start`
pub async fn start_trip<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
    payload: JsonBody<RouteOption>,
) -> Result<Json<Trip>> {
    let Path(trip_id) = trip_id?;
    let Json(route) = payload?;
    Ok(Json(state.orchestrator.start_trip(trip_id, &route).await?))
}

/// `POST /api/trips/:id/locations`
pub async fn record_location<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
    payload: JsonBody<LocationUpdateRequest>,
) -> Result<Json<LocationUpdate>> {
    let Path(trip_id) = trip_id?;
    let Json(update) = payload?;
    Ok(Json(state.orchestrator.record_location(trip_id, &update).await?))
}

/// `POST /api/trips/:id/complete`
pub async fn complete_trip<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
) -> Result<Json<Trip>> {
    let Path(trip_id) = trip_id?;
    Ok(Json(state.orchestrator.complete_trip(trip_id).await?))
}

/// `POST /api/trips/:id/cancel`
pub async fn cancel_trip<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
    payload: JsonBody<CancelTripRequest>,
) -> Result<Json<Trip>> {
    let Path(trip_id) = trip_id?;
    let Json(request) = payload?;
    Ok(Json(state.orchestrator.cancel_trip(trip_id, &request).await?))
}

/// `GET /api/trips/:id`
pub async fn get_trip<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
) -> Result<Json<Trip>> {
    let Path(trip_id) = trip_id?;
    Ok(Json(state.orchestrator.get_trip(trip_id).await?))
}

/// `GET /api/trips/:id/locations`
pub async fn list_locations<N: NotificationDispatcher + 'static>(
    State(state): State<AppState<N>>,
    trip_id: TripId,
) -> Result<Json<Vec<LocationUpdate>>> {
    let Path(trip_id) = trip_id?;
    Ok(Json(state.orchestrator.list_locations(trip_id).await?))
}
