//! Distance helpers for SafeWalk route monitoring.
//!
//! Positions are plain WGS-84 latitude/longitude pairs in degrees. Distances
//! are returned in meters.
//!
//! Segment projection treats latitude/longitude as planar coordinates to find
//! the closest point on a segment, then measures the leg to that point with
//! the haversine formula. For pedestrian routes (segments of a few kilometres
//! or less) the error stays well under one percent.
//!
//! # Example
//!
//! ```rust
//! use geo_math::{distance_to_polyline, LatLng};
//!
//! let route = [LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.001)];
//! let offset = distance_to_polyline(LatLng::new(0.0005, 0.0), &route);
//! assert!((offset - 55.6).abs() < 0.5);
//! ```

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether the latitude lies in [-90, 90] and the longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Linear interpolation towards `other` in degree space.
    pub fn lerp(&self, other: &LatLng, t: f64) -> LatLng {
        LatLng {
            lat: self.lat + t * (other.lat - self.lat),
            lng: self.lng + t * (other.lng - self.lng),
        }
    }
}

/// Great-circle distance between two coordinates, in meters.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Haversine distance between two points.
pub fn distance_between(a: LatLng, b: LatLng) -> f64 {
    haversine(a.lat, a.lng, b.lat, b.lng)
}

/// Distance from `p` to the segment `a`-`b`, in meters.
///
/// Coincident endpoints degrade to the point distance to `a`.
pub fn distance_to_segment(p: LatLng, a: LatLng, b: LatLng) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lng = b.lng - a.lng;
    let len_sq = d_lat * d_lat + d_lng * d_lng;

    if len_sq == 0.0 {
        return distance_between(p, a);
    }

    let t = (((p.lat - a.lat) * d_lat + (p.lng - a.lng) * d_lng) / len_sq).clamp(0.0, 1.0);
    distance_between(p, a.lerp(&b, t))
}

/// Minimum distance from `p` to any segment of `polyline`, in meters.
///
/// A single point is measured directly; an empty polyline is infinitely far.
pub fn distance_to_polyline(p: LatLng, polyline: &[LatLng]) -> f64 {
    match polyline {
        [] => f64::INFINITY,
        [only] => distance_between(p, *only),
        _ => polyline
            .windows(2)
            .map(|pair| distance_to_segment(p, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
