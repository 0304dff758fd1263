//! The routing provider port.

use async_trait::async_trait;
use geo_math::LatLng;
use trip_core::RouteOption;

/// Fetches candidate walking routes between two coordinates.
///
/// Implementations are all-or-nothing: either every returned option is
/// complete (id >= 1, non-negative distance and duration, a polyline of at
/// least two points) or the list is empty. Failures are logged by the
/// implementation and reported as an empty list.
///
/// The `safety_score` of returned options is left at zero; scoring is the
/// job of [`crate::SafetyScorer`].
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &'static str;

    async fn get_routes(
        &self,
        source: LatLng,
        destination: LatLng,
        max_alternatives: usize,
    ) -> Vec<RouteOption>;
}

/// Whether every option of a provider answer is complete.
pub(crate) fn is_complete(options: &[RouteOption]) -> bool {
    options.iter().all(|option| {
        option.id >= 1
            && option.distance.is_finite()
            && option.distance >= 0.0
            && option.duration >= 0
            && option.polyline.len() >= 2
            && option.polyline.iter().all(LatLng::is_valid)
    })
}
