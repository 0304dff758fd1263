//! Candidate walking routes for SafeWalk.
//!
//! - [`RoutingProvider`] - the port to a mapping service
//! - [`StubRoutingProvider`] - deterministic offline routes
//! - [`TomTomRoutingProvider`] - the TomTom Routing API
//! - [`SafetyScorer`] - scores and ranks candidates
//! - [`RoutePlanner`] - provider, stub fallback and scoring in one call

pub mod error;
mod provider;
mod scorer;
mod stub;
mod tomtom;

use std::sync::Arc;

use geo_math::LatLng;
use tracing::{info, warn};
use trip_core::RouteOption;

pub use error::{Result, RoutingError};
pub use provider::RoutingProvider;
pub use scorer::{SafetyScorer, MAX_SAFETY_SCORE};
pub use stub::StubRoutingProvider;
pub use tomtom::{TomTomConfig, TomTomRoutingProvider, DEFAULT_TOMTOM_BASE_URL};

/// Number of candidate routes proposed for a trip.
pub const DEFAULT_ROUTE_COUNT: usize = 3;

/// Pick the provider for the given settings.
///
/// TomTom is used only with a non-empty key and stub mode switched off.
/// Anything else, including a client that fails to build, selects the stub.
pub fn provider_from_settings(
    api_key: Option<&str>,
    stub_enabled: bool,
    config: impl FnOnce(String) -> TomTomConfig,
) -> Arc<dyn RoutingProvider> {
    let key = api_key.map(str::trim).filter(|key| !key.is_empty());

    match key {
        Some(key) if !stub_enabled => match TomTomRoutingProvider::new(config(key.to_string())) {
            Ok(provider) => {
                info!("Routing provider: tomtom");
                Arc::new(provider)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build TomTom client, using stub routes");
                Arc::new(StubRoutingProvider::new())
            }
        },
        _ => {
            info!("Routing provider: stub");
            Arc::new(StubRoutingProvider::new())
        }
    }
}

/// Fetches, backfills and ranks route options.
#[derive(Clone)]
pub struct RoutePlanner {
    provider: Arc<dyn RoutingProvider>,
    stub: StubRoutingProvider,
    scorer: SafetyScorer,
    route_count: usize,
}

impl RoutePlanner {
    pub fn new(provider: Arc<dyn RoutingProvider>) -> Self {
        Self {
            provider,
            stub: StubRoutingProvider::new(),
            scorer: SafetyScorer::new(),
            route_count: DEFAULT_ROUTE_COUNT,
        }
    }

    /// Builder method to set how many options are requested.
    pub fn with_route_count(mut self, route_count: usize) -> Self {
        self.route_count = route_count.max(1);
        self
    }

    /// Ranked options between two points. Never empty.
    ///
    /// When the provider answers with nothing the stub routes stand in, so
    /// a provider outage never fails trip creation.
    pub async fn plan(&self, source: LatLng, destination: LatLng) -> Vec<RouteOption> {
        let mut routes = self
            .provider
            .get_routes(source, destination, self.route_count)
            .await;

        if routes.is_empty() {
            warn!(
                provider = self.provider.name(),
                "Routing provider returned no routes, using stub routes"
            );
            routes = self.stub.routes(source, destination, self.route_count);
        }

        self.scorer.rank(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EmptyProvider;

    #[async_trait]
    impl RoutingProvider for EmptyProvider {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn get_routes(&self, _: LatLng, _: LatLng, _: usize) -> Vec<RouteOption> {
            Vec::new()
        }
    }

    struct FixedProvider;

    #[async_trait]
    impl RoutingProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn get_routes(&self, source: LatLng, destination: LatLng, _: usize) -> Vec<RouteOption> {
            vec![
                RouteOption {
                    id: 1,
                    distance: 4000.0,
                    duration: 2000,
                    safety_score: 0.0,
                    polyline: vec![source, destination],
                },
                RouteOption {
                    id: 2,
                    distance: 1500.0,
                    duration: 750,
                    safety_score: 0.0,
                    polyline: vec![source, destination],
                },
            ]
        }
    }

    fn endpoints() -> (LatLng, LatLng) {
        (LatLng::new(12.97, 77.59), LatLng::new(12.93, 77.61))
    }

    #[tokio::test]
    async fn test_plan_falls_back_to_stub() {
        let (src, dst) = endpoints();
        let planner = RoutePlanner::new(Arc::new(EmptyProvider));

        let routes = planner.plan(src, dst).await;
        assert_eq!(routes.len(), 3);
        assert_eq!(routes, planner.plan(src, dst).await);
        for pair in routes.windows(2) {
            assert!(pair[0].safety_score >= pair[1].safety_score);
        }
        for route in &routes {
            let expected = ((10.0 - route.distance / 1000.0).max(0.0) * 10.0).round() / 10.0;
            assert_eq!(route.safety_score, expected);
        }
    }

    #[tokio::test]
    async fn test_plan_ranks_provider_routes() {
        let (src, dst) = endpoints();
        let routes = RoutePlanner::new(Arc::new(FixedProvider)).plan(src, dst).await;
        assert_eq!(routes[0].id, 2);
        assert_eq!(routes[0].safety_score, 8.5);
        assert_eq!(routes[1].safety_score, 6.0);
    }

    #[test]
    fn test_provider_selection() {
        let config = |key: String| TomTomConfig::new(key);
        assert_eq!(provider_from_settings(None, false, config).name(), "stub");
        assert_eq!(provider_from_settings(Some("  "), false, config).name(), "stub");
        assert_eq!(provider_from_settings(Some("key"), true, config).name(), "stub");
        assert_eq!(provider_from_settings(Some("key"), false, config).name(), "tomtom");
    }
}
