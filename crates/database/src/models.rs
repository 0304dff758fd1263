//! Database rows and their conversion into the shared entities.
//!
//! Enumerations are stored as their wire names, polylines as JSON text and
//! timestamps as fixed-width RFC 3339 UTC text so that lexical order matches
//! chronological order.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;
use trip_core::{
    EmergencyContact, LatLng, LocationUpdate, SosEvent, Trip, User,
};

use crate::error::{DatabaseError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Encode a timestamp for storage.
pub(crate) fn encode_ts(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode a stored timestamp. Accepts any RFC 3339 text as well as the
/// column defaults written by SQLite.
pub(crate) fn decode_ts(entity: &'static str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| DatabaseError::corrupt(entity, format!("bad timestamp {:?}: {}", value, e)))
}

fn decode_optional_ts(entity: &'static str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| decode_ts(entity, v)).transpose()
}

pub(crate) fn encode_polyline(polyline: &[LatLng]) -> Result<String> {
    serde_json::to_string(polyline).map_err(|e| DatabaseError::corrupt("Trip", e))
}

fn decode_polyline(value: &str) -> Result<Vec<LatLng>> {
    serde_json::from_str(value).map_err(|e| DatabaseError::corrupt("Trip", format!("bad polyline: {}", e)))
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub telegram_chat_id: i64,
    pub name: String,
    pub phone: String,
    pub gender: String,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            telegram_chat_id: row.telegram_chat_id,
            name: row.name,
            phone: row.phone,
            gender: row.gender.parse().map_err(|e| DatabaseError::corrupt("User", e))?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct EmergencyContactRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub telegram_chat_id: Option<i64>,
}

impl From<EmergencyContactRow> for EmergencyContact {
    fn from(row: EmergencyContactRow) -> Self {
        EmergencyContact {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            phone: row.phone,
            telegram_chat_id: row.telegram_chat_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TripRow {
    pub id: i64,
    pub telegram_chat_id: i64,
    pub status: String,
    pub source_lat: f64,
    pub source_lng: f64,
    pub destination_lat: f64,
    pub destination_lng: f64,
    pub selected_route_polyline: Option<String>,
    pub deviation_threshold_meters: f64,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub safety_score: Option<f64>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub ended_at: Option<String>,
}

impl TryFrom<TripRow> for Trip {
    type Error = DatabaseError;

    fn try_from(row: TripRow) -> Result<Self> {
        Ok(Trip {
            id: row.id,
            telegram_chat_id: row.telegram_chat_id,
            status: row.status.parse().map_err(|e| DatabaseError::corrupt("Trip", e))?,
            source: LatLng::new(row.source_lat, row.source_lng),
            destination: LatLng::new(row.destination_lat, row.destination_lng),
            selected_route_polyline: row
                .selected_route_polyline
                .as_deref()
                .map(decode_polyline)
                .transpose()?,
            deviation_threshold_meters: row.deviation_threshold_meters,
            distance: row.distance_meters,
            duration: row.duration_seconds,
            safety_score: row.safety_score,
            cancellation_reason: row.cancellation_reason,
            created_at: decode_ts("Trip", &row.created_at)?,
            ended_at: decode_optional_ts("Trip", row.ended_at.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct LocationUpdateRow {
    pub id: i64,
    pub trip_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: String,
    pub client_timestamp: String,
}

impl TryFrom<LocationUpdateRow> for LocationUpdate {
    type Error = DatabaseError;

    fn try_from(row: LocationUpdateRow) -> Result<Self> {
        Ok(LocationUpdate {
            id: row.id,
            trip_id: row.trip_id,
            lat: row.lat,
            lng: row.lng,
            recorded_at: decode_ts("LocationUpdate", &row.recorded_at)?,
            timestamp: decode_ts("LocationUpdate", &row.client_timestamp)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct SosEventRow {
    pub id: i64,
    pub trip_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub message: Option<String>,
    pub status: String,
    pub dispatch_attempts: i64,
    pub next_attempt_at: Option<String>,
    pub created_at: String,
}

impl TryFrom<SosEventRow> for SosEvent {
    type Error = DatabaseError;

    fn try_from(row: SosEventRow) -> Result<Self> {
        Ok(SosEvent {
            id: row.id,
            trip_id: row.trip_id,
            lat: row.lat,
            lng: row.lng,
            message: row.message,
            status: row.status.parse().map_err(|e| DatabaseError::corrupt("SosEvent", e))?,
            dispatch_attempts: row.dispatch_attempts,
            next_attempt_at: decode_optional_ts("SosEvent", row.next_attempt_at.as_deref())?,
            created_at: decode_ts("SosEvent", &row.created_at)?,
        })
    }
}
