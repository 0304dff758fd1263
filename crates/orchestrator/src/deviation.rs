//! Route deviation detection.
//!
//! The detector keeps no memory between updates. The persisted trip status
//! is the only state: an alert fires on the ACTIVE to DEVIATION_ALERT edge
//! and is suppressed while the trip stays off route.

use geo_math::{distance_to_polyline, LatLng};
use trip_core::{NotificationType, Trip, TripStatus};

use crate::messages::{deviation_alert_text, DEVIATION_CLEARED_TEXT};

/// What a single location update means for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationOutcome {
    /// Meters from the route, or `None` when the trip has no usable route.
    pub distance_meters: Option<f64>,
    /// New status to persist, if any.
    pub transition: Option<TripStatus>,
    /// Message for the trip owner, if any.
    pub notification: Option<(NotificationType, String)>,
}

impl DeviationOutcome {
    fn unchanged(distance_meters: Option<f64>) -> Self {
        Self {
            distance_meters,
            transition: None,
            notification: None,
        }
    }
}

/// Evaluates positions against the selected route.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviationDetector;

impl DeviationDetector {
    pub fn new() -> Self {
        Self
    }

    /// Decide the effect of `point` on `trip`. Pure; the caller persists the
    /// transition and sends the notification.
    pub fn evaluate(&self, trip: &Trip, point: LatLng) -> DeviationOutcome {
        let route = trip.route();
        if route.len() < 2 {
            return DeviationOutcome::unchanged(None);
        }

        let d = distance_to_polyline(point, route);
        let off_route = d > trip.deviation_threshold_meters;

        match (trip.status, off_route) {
            (TripStatus::Active, true) => DeviationOutcome {
                distance_meters: Some(d),
                transition: Some(TripStatus::DeviationAlert),
                notification: Some((
                    NotificationType::DeviationAlert,
                    deviation_alert_text(d.round() as i64),
                )),
            },
            (TripStatus::DeviationAlert, false) => DeviationOutcome {
                distance_meters: Some(d),
                transition: Some(TripStatus::Active),
                notification: Some((
                    NotificationType::DeviationCleared,
                    DEVIATION_CLEARED_TEXT.to_string(),
                )),
            },
            _ => DeviationOutcome::unchanged(Some(d)),
        }
    }
}
