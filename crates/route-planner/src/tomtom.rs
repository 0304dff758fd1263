//! TomTom Routing API provider.

use std::time::Duration;

use async_trait::async_trait;
use geo_math::LatLng;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use trip_core::RouteOption;

use crate::error::{Result, RoutingError};
use crate::provider::RoutingProvider;

/// Default TomTom API host.
pub const DEFAULT_TOMTOM_BASE_URL: &str = "https://api.tomtom.com";

/// Configuration for the TomTom provider.
#[derive(Debug, Clone)]
pub struct TomTomConfig {
    /// API host, without trailing slash.
    pub base_url: String,
    /// Connect timeout for each request.
    pub connect_timeout: Duration,
    /// Overall timeout for each request.
    pub read_timeout: Duration,
    api_key: SecretString,
}

impl TomTomConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_TOMTOM_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Builder method to set the API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder method to set both timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    fn route_url(&self, source: LatLng, destination: LatLng) -> String {
        format!(
            "{}/routing/1/calculateRoute/{},{}:{},{}/json",
            self.base_url, source.lat, source.lng, destination.lat, destination.lng
        )
    }
}

#[derive(Debug, Deserialize)]
struct CalculateRouteResponse {
    #[serde(default)]
    routes: Vec<TomTomRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomRoute {
    summary: TomTomSummary,
    #[serde(default)]
    legs: Vec<TomTomLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomSummary {
    length_in_meters: f64,
    travel_time_in_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct TomTomLeg {
    #[serde(default)]
    points: Vec<TomTomPoint>,
}

#[derive(Debug, Deserialize)]
struct TomTomPoint {
    latitude: f64,
    longitude: f64,
}

/// Pedestrian routes from the TomTom Routing API.
pub struct TomTomRoutingProvider {
    http: Client,
    config: TomTomConfig,
}

impl TomTomRoutingProvider {
    pub fn new(config: TomTomConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    async fn fetch(
        &self,
        source: LatLng,
        destination: LatLng,
        max_alternatives: usize,
    ) -> Result<Vec<RouteOption>> {
        let url = self.config.route_url(source, destination);
        debug!("TomTom request: {}", url);

        let alternatives = max_alternatives.saturating_sub(1).to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.expose_secret()),
                ("travelMode", "pedestrian"),
                ("maxAlternatives", alternatives.as_str()),
                ("routeRepresentation", "polyline"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        let body: CalculateRouteResponse = response.json().await?;
        convert_routes(body, max_alternatives)
    }
}

#[async_trait]
impl RoutingProvider for TomTomRoutingProvider {
    fn name(&self) -> &'static str {
        "tomtom"
    }

    async fn get_routes(
        &self,
        source: LatLng,
        destination: LatLng,
        max_alternatives: usize,
    ) -> Vec<RouteOption> {
        match self.fetch(source, destination, max_alternatives).await {
            Ok(routes) => routes,
            Err(e) => {
                warn!(error = %e, "TomTom routing failed");
                Vec::new()
            }
        }
    }
}

fn convert_routes(body: CalculateRouteResponse, max_alternatives: usize) -> Result<Vec<RouteOption>> {
    let mut options = Vec::with_capacity(body.routes.len());

    for (i, route) in body.routes.into_iter().take(max_alternatives).enumerate() {
        let polyline: Vec<LatLng> = route
            .legs
            .iter()
            .flat_map(|leg| leg.points.iter())
            .map(|point| LatLng::new(point.latitude, point.longitude))
            .collect();

        if polyline.len() < 2 {
            return Err(RoutingError::Malformed(format!(
                "route {} has {} polyline points",
                i + 1,
                polyline.len()
            )));
        }

        let summary = route.summary;
        if !(summary.length_in_meters >= 0.0 && summary.travel_time_in_seconds >= 0.0) {
            return Err(RoutingError::Malformed(format!("route {} has negative summary", i + 1)));
        }

        options.push(RouteOption {
            id: (i + 1) as u32,
            distance: summary.length_in_meters,
            duration: summary.travel_time_in_seconds.round() as i64,
            safety_score: 0.0,
            polyline,
        });
    }

    if !crate::provider::is_complete(&options) {
        return Err(RoutingError::Malformed("route failed validation".to_string()));
    }

    Ok(options)
}
