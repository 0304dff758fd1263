//! Route safety scoring and ranking.

use std::cmp::Ordering;

use trip_core::RouteOption;

/// Highest possible safety score.
pub const MAX_SAFETY_SCORE: f64 = 10.0;

/// Assigns each route a score in `[0, 10]` and ranks the list.
///
/// The baseline is `10 - distance_km`, rounded to one decimal. The score is
/// monotone in distance and clipped to the valid range.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyScorer;

impl SafetyScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score for a route of `distance_meters`.
    pub fn score(&self, distance_meters: f64) -> f64 {
        let km = distance_meters / 1000.0;
        let raw = (MAX_SAFETY_SCORE - km).max(0.0);
        let rounded = (raw * 10.0).round() / 10.0;
        rounded.clamp(0.0, MAX_SAFETY_SCORE)
    }

    /// Score every route and sort by descending score, then ascending
    /// distance, then ascending id.
    pub fn rank(&self, mut routes: Vec<RouteOption>) -> Vec<RouteOption> {
        for route in &mut routes {
            route.safety_score = self.score(route.distance);
        }
        routes.sort_by(compare_ranked);
        routes
    }
}

fn compare_ranked(a: &RouteOption, b: &RouteOption) -> Ordering {
    b.safety_score
        .total_cmp(&a.safety_score)
        .then_with(|| a.distance.total_cmp(&b.distance))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_math::LatLng;

    fn route(id: u32, distance: f64) -> RouteOption {
        RouteOption {
            id,
            distance,
            duration: 0,
            safety_score: 0.0,
            polyline: vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.001)],
        }
    }

    #[test]
    fn test_score_baseline() {
        let scorer = SafetyScorer::new();
        assert_eq!(scorer.score(0.0), 10.0);
        assert_eq!(scorer.score(1234.0), 8.8);
        assert_eq!(scorer.score(1250.0), 8.8);
        assert_eq!(scorer.score(9_960.0), 0.0);
        assert_eq!(scorer.score(25_000.0), 0.0);
    }

    #[test]
    fn test_score_is_monotone() {
        let scorer = SafetyScorer::new();
        let mut previous = scorer.score(0.0);
        for meters in (0..12_000).step_by(37) {
            let score = scorer.score(meters as f64);
            assert!(score <= previous);
            assert!((0.0..=10.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn test_rank_orders_by_score_distance_id() {
        let ranked = SafetyScorer::new().rank(vec![
            route(1, 3000.0),
            route(2, 1210.0),
            route(3, 1240.0),
            route(4, 1210.0),
        ]);

        let ids: Vec<u32> = ranked.iter().map(|r| r.id).collect();
        // 1210 and 1240 both score 8.8; shorter first, then lower id.
        assert_eq!(ids, vec![2, 4, 3, 1]);
        assert_eq!(ranked[0].safety_score, 8.8);
        assert_eq!(ranked[3].safety_score, 7.0);
    }

    #[test]
    fn test_rank_empty() {
        assert!(SafetyScorer::new().rank(Vec::new()).is_empty());
    }
}
