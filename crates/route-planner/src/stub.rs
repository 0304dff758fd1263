//! Deterministic offline routes.

use async_trait::async_trait;
use geo_math::LatLng;
use sha2::{Digest, Sha256};
use trip_core::RouteOption;

use crate::provider::RoutingProvider;

/// Extra metres added per alternative.
const ALTERNATIVE_STEP_METERS: f64 = 300.0;

/// Lateral midpoint offset per alternative, in degrees.
const ALTERNATIVE_OFFSET_DEGREES: f64 = 0.0005;

/// Assumed walking pace for durations.
const METERS_PER_SECOND: f64 = 2.0;

/// Hash-seeded provider used when no real provider is configured or the
/// real one answers with nothing.
///
/// The same source and destination always produce the same options, so
/// retried requests see identical replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubRoutingProvider;

impl StubRoutingProvider {
    pub fn new() -> Self {
        Self
    }

    /// Build `count` options between the two points.
    pub fn routes(&self, source: LatLng, destination: LatLng, count: usize) -> Vec<RouteOption> {
        let base = base_distance(source, destination);

        (1..=count)
            .map(|id| {
                let step = (id - 1) as f64;
                let distance = base + ALTERNATIVE_STEP_METERS * step;
                RouteOption {
                    id: id as u32,
                    distance,
                    duration: (distance / METERS_PER_SECOND).round() as i64,
                    safety_score: 0.0,
                    polyline: vec![
                        source,
                        offset_midpoint(source, destination, ALTERNATIVE_OFFSET_DEGREES * step),
                        destination,
                    ],
                }
            })
            .collect()
    }
}

#[async_trait]
impl RoutingProvider for StubRoutingProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn get_routes(
        &self,
        source: LatLng,
        destination: LatLng,
        max_alternatives: usize,
    ) -> Vec<RouteOption> {
        self.routes(source, destination, max_alternatives)
    }
}

/// `1000 + (h mod 500)` where `h` is the leading 8 bytes of the SHA-256 of
/// the formatted endpoints.
fn base_distance(source: LatLng, destination: LatLng) -> f64 {
    let seed = format!(
        "{:.6},{:.6}|{:.6},{:.6}",
        source.lat, source.lng, destination.lat, destination.lng
    );
    let digest = Sha256::digest(seed.as_bytes());
    let mut leading = [0u8; 8];
    leading.copy_from_slice(&digest[..8]);
    let h = u64::from_be_bytes(leading);

    1000.0 + (h % 500) as f64
}

/// Midpoint of the segment, pushed sideways by `offset` degrees.
fn offset_midpoint(source: LatLng, destination: LatLng, offset: f64) -> LatLng {
    let mid = source.lerp(&destination, 0.5);
    let d_lat = destination.lat - source.lat;
    let d_lng = destination.lng - source.lng;
    let len = (d_lat * d_lat + d_lng * d_lng).sqrt();

    if len == 0.0 {
        return LatLng::new(mid.lat + offset, mid.lng);
    }

    LatLng::new(mid.lat - d_lng / len * offset, mid.lng + d_lat / len * offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> (LatLng, LatLng) {
        (LatLng::new(12.97, 77.59), LatLng::new(12.93, 77.61))
    }

    #[test]
    fn test_stub_is_deterministic() {
        let (src, dst) = endpoints();
        let stub = StubRoutingProvider::new();
        assert_eq!(stub.routes(src, dst, 3), stub.routes(src, dst, 3));
    }

    #[test]
    fn test_stub_distances_and_ids() {
        let (src, dst) = endpoints();
        let routes = StubRoutingProvider::new().routes(src, dst, 3);

        assert_eq!(routes.len(), 3);
        let base = routes[0].distance;
        assert!((1000.0..1500.0).contains(&base));
        for (i, route) in routes.iter().enumerate() {
            assert_eq!(route.id as usize, i + 1);
            assert_eq!(route.distance, base + 300.0 * i as f64);
            assert_eq!(route.duration, (route.distance / 2.0).round() as i64);
            assert_eq!(route.polyline.first(), Some(&src));
            assert_eq!(route.polyline.last(), Some(&dst));
        }
        assert_ne!(routes[1].polyline[1], routes[2].polyline[1]);
        assert!(crate::provider::is_complete(&routes));
    }

    #[test]
    fn test_stub_depends_on_direction() {
        let (src, dst) = endpoints();
        let stub = StubRoutingProvider::new();
        let forward = stub.routes(src, dst, 1);
        let backward = stub.routes(dst, src, 1);
        assert_eq!(forward[0].polyline[0], src);
        assert_eq!(backward[0].polyline[0], dst);
    }

    #[test]
    fn test_stub_handles_identical_endpoints() {
        let p = LatLng::new(1.0, 1.0);
        let routes = StubRoutingProvider::new().routes(p, p, 2);
        let mid = routes[1].polyline[1];
        assert!((mid.lat - 1.0005).abs() < 1e-12);
        assert_eq!(mid.lng, 1.0);
    }

    #[tokio::test]
    async fn test_stub_provider_port() {
        let (src, dst) = endpoints();
        let routes = StubRoutingProvider::new().get_routes(src, dst, 5).await;
        assert_eq!(routes.len(), 5);
    }
}
