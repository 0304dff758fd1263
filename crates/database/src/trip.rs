//! Trip operations.
//!
//! Rows in `COMPLETED` or `CANCELLED` are never rewritten: [`update_trip`]
//! refuses them with [`DatabaseError::Immutable`].

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqliteConnection};
use trip_core::{LatLng, Trip, TripStatus};

use crate::error::{DatabaseError, Result};
use crate::models::{encode_polyline, encode_ts, TripRow};

const TRIP_COLUMNS: &str = r#"
    id, telegram_chat_id, status,
    source_lat, source_lng, destination_lat, destination_lng,
    selected_route_polyline, deviation_threshold_meters,
    distance_meters, duration_seconds, safety_score,
    cancellation_reason, created_at, ended_at
"#;

/// Values for a trip that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub telegram_chat_id: i64,
    pub source: LatLng,
    pub destination: LatLng,
    pub deviation_threshold_meters: f64,
    pub created_at: DateTime<Utc>,
}

/// Insert a trip in `CREATED`.
pub async fn insert_trip<'e, E>(executor: E, trip: &NewTrip) -> Result<Trip>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created_at = encode_ts(&trip.created_at);
    let sql = format!(
        r#"
        INSERT INTO trips (
            telegram_chat_id, status,
            source_lat, source_lng, destination_lat, destination_lng,
            deviation_threshold_meters, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        TRIP_COLUMNS
    );

    let row = sqlx::query_as::<_, TripRow>(&sql)
        .bind(trip.telegram_chat_id)
        .bind(TripStatus::Created.as_str())
        .bind(trip.source.lat)
        .bind(trip.source.lng)
        .bind(trip.destination.lat)
        .bind(trip.destination.lng)
        .bind(trip.deviation_threshold_meters)
        .bind(&created_at)
        .bind(&created_at)
        .fetch_one(executor)
        .await?;

    Trip::try_from(row)
}

/// Look up a trip by id.
pub async fn find_trip_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Trip>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM trips WHERE id = ?", TRIP_COLUMNS);
    sqlx::query_as::<_, TripRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(Trip::try_from)
        .transpose()
}

/// Get a trip by id, failing with `NotFound` when absent.
pub async fn get_trip<'e, E>(executor: E, id: i64) -> Result<Trip>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_trip_by_id(executor, id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Trip", id))
}

/// Look up a trip by id, only if it is currently in `status`.
pub async fn find_trip_by_id_and_status<'e, E>(
    executor: E,
    id: i64,
    status: TripStatus,
) -> Result<Option<Trip>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM trips WHERE id = ? AND status = ?", TRIP_COLUMNS);
    sqlx::query_as::<_, TripRow>(&sql)
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?
        .map(Trip::try_from)
        .transpose()
}

/// The most recent trip of a chat that is being walked.
pub async fn find_active_by_chat_id<'e, E>(executor: E, telegram_chat_id: i64) -> Result<Option<Trip>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT {}
        FROM trips
        WHERE telegram_chat_id = ?
          AND status IN ('ACTIVE', 'DEVIATION_ALERT', 'SOS_PENDING', 'SOS_TRIGGERED')
        ORDER BY id DESC
        LIMIT 1
        "#,
        TRIP_COLUMNS
    );
    sqlx::query_as::<_, TripRow>(&sql)
        .bind(telegram_chat_id)
        .fetch_optional(executor)
        .await?
        .map(Trip::try_from)
        .transpose()
}

/// All trips currently in `status`, oldest first.
pub async fn find_all_by_status<'e, E>(executor: E, status: TripStatus) -> Result<Vec<Trip>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM trips WHERE status = ? ORDER BY id ASC", TRIP_COLUMNS);
    let rows = sqlx::query_as::<_, TripRow>(&sql)
        .bind(status.as_str())
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(Trip::try_from).collect()
}

/// Take the write lock on a trip row for the rest of the transaction.
///
/// Must be the first statement of the transaction. SQLite holds the database
/// write lock from here until commit, so concurrent writers queue behind it.
pub async fn lock_trip(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE trips SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Trip", id));
    }

    Ok(())
}

/// Persist the mutable fields of a trip.
pub async fn update_trip<'e, E>(executor: E, trip: &Trip, now: DateTime<Utc>) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let polyline = trip
        .selected_route_polyline
        .as_deref()
        .map(encode_polyline)
        .transpose()?;

    let result = sqlx::query(
        r#"
        UPDATE trips
        SET status = ?,
            selected_route_polyline = ?,
            deviation_threshold_meters = ?,
            distance_meters = ?,
            duration_seconds = ?,
            safety_score = ?,
            cancellation_reason = ?,
            ended_at = ?,
            updated_at = ?
        WHERE id = ? AND status NOT IN ('COMPLETED', 'CANCELLED')
        "#,
    )
    .bind(trip.status.as_str())
    .bind(polyline)
    .bind(trip.deviation_threshold_meters)
    .bind(trip.distance)
    .bind(trip.duration)
    .bind(trip.safety_score)
    .bind(trip.cancellation_reason.as_deref())
    .bind(trip.ended_at.as_ref().map(encode_ts))
    .bind(encode_ts(&now))
    .bind(trip.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::Immutable {
            entity: "Trip",
            id: trip.id.to_string(),
        });
    }

    Ok(())
}
