//! Signed client for the core service API.

use serde::de::DeserializeOwned;
use signed_channel::{ChannelError, SignedClient};
use tracing::debug;
use trip_core::{
    CancelTripRequest, ErrorBody, LocationUpdate, LocationUpdateRequest, RouteOption, SosAcknowledgement,
    SosRequest, Trip, TripCreationRequest, TripRouteOptions,
};

use crate::error::{GatewayError, Result};

/// Calls every core endpoint with a signed body.
#[derive(Debug, Clone)]
pub struct CoreClient {
    client: SignedClient,
}

impl CoreClient {
    pub fn new(client: SignedClient) -> Self {
        Self { client }
    }

    /// Register the user and get ranked route options.
    pub async fn create_trip(&self, request: &TripCreationRequest) -> Result<TripRouteOptions> {
        decode(self.client.post_json("/api/trips", request).await?).await
    }

    /// Start a trip on the chosen route.
    pub async fn start_trip(&self, trip_id: i64, route: &RouteOption) -> Result<Trip> {
        let path = format!("/api/trips/{}/start", trip_id);
        decode(self.client.post_json(&path, route).await?).await
    }

    pub async fn record_location(&self, trip_id: i64, update: &LocationUpdateRequest) -> Result<LocationUpdate> {
        let path = format!("/api/trips/{}/locations", trip_id);
        decode(self.client.post_json(&path, update).await?).await
    }

    pub async fn complete_trip(&self, trip_id: i64) -> Result<Trip> {
        let path = format!("/api/trips/{}/complete", trip_id);
        decode(self.client.post_empty(&path).await?).await
    }

    pub async fn cancel_trip(&self, trip_id: i64, request: &CancelTripRequest) -> Result<Trip> {
        let path = format!("/api/trips/{}/cancel", trip_id);
        decode(self.client.post_json(&path, request).await?).await
    }

    /// Raise an SOS for a trip.
    pub async fn trigger_sos(&self, request: &SosRequest) -> Result<SosAcknowledgement> {
        decode(self.client.post_json("/api/sos", request).await?).await
    }

    pub async fn get_trip(&self, trip_id: i64) -> Result<Trip> {
        let path = format!("/api/trips/{}", trip_id);
        decode(self.client.get(&path).await?).await
    }

    pub async fn list_locations(&self, trip_id: i64) -> Result<Vec<LocationUpdate>> {
        let path = format!("/api/trips/{}/locations", trip_id);
        decode(self.client.get(&path).await?).await
    }

    /// Whether core answers its health check.
    pub async fn is_healthy(&self) -> bool {
        match self.client.get("/health").await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Core health check failed");
                false
            }
        }
    }
}

/// Decode a success body as `T`, or an error status as the core error body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ChannelError::from)?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes).map_err(ChannelError::from)?);
    }

    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(body) => Err(GatewayError::Core {
            status: status.as_u16(),
            body,
        }),
        Err(_) => Err(GatewayError::UnexpectedResponse {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }),
    }
}
