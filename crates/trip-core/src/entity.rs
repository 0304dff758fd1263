//! Persisted entities as they appear on the wire.

use chrono::{DateTime, Utc};
use geo_math::LatLng;
use serde::{Deserialize, Serialize};

use crate::status::{Gender, SosStatus, TripStatus};

/// A registered user, keyed by their chat id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub telegram_chat_id: i64,
    pub name: String,
    pub phone: String,
    pub gender: Gender,
}

/// Someone to alert when the owning user raises an SOS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<i64>,
}

/// A monitored walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    /// Chat id of the owning user.
    pub telegram_chat_id: i64,
    pub status: TripStatus,
    pub source: LatLng,
    pub destination: LatLng,
    /// Present while the trip is being walked.
    pub selected_route_polyline: Option<Vec<LatLng>>,
    pub deviation_threshold_meters: f64,
    /// Meters, from the chosen route.
    pub distance: Option<f64>,
    /// Seconds, from the chosen route.
    pub duration: Option<i64>,
    pub safety_score: Option<f64>,
    pub cancellation_reason: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Set on entering `Completed` or `Cancelled`.
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// The selected route, or an empty slice before the trip starts.
    pub fn route(&self) -> &[LatLng] {
        self.selected_route_polyline.as_deref().unwrap_or(&[])
    }
}

/// One recorded position. Insert-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub id: i64,
    pub trip_id: i64,
    pub lat: f64,
    pub lng: f64,
    /// Server receipt time; orders updates within a trip.
    #[serde(with = "crate::timestamp")]
    pub recorded_at: DateTime<Utc>,
    /// Device time reported by the client.
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl LocationUpdate {
    pub fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// An emergency signal and its notification progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosEvent {
    pub id: i64,
    pub trip_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub message: Option<String>,
    pub status: SosStatus,
    /// Completed dispatch rounds that reached no contact.
    pub dispatch_attempts: i64,
    /// When the retry sweeper should try again; `None` once settled or given up.
    #[serde(default)]
    pub next_attempt_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl SosEvent {
    pub fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}
