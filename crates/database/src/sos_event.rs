//! SOS event operations.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};
use trip_core::{LatLng, SosEvent, SosStatus};

use crate::error::{DatabaseError, Result};
use crate::models::{encode_ts, SosEventRow};

const SOS_COLUMNS: &str =
    "id, trip_id, lat, lng, message, status, dispatch_attempts, next_attempt_at, created_at";

/// Record an SOS in `PENDING`, due for retry at `next_attempt_at`.
pub async fn insert_sos_event<'e, E>(
    executor: E,
    trip_id: i64,
    point: LatLng,
    message: Option<&str>,
    created_at: DateTime<Utc>,
    next_attempt_at: Option<DateTime<Utc>>,
) -> Result<SosEvent>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO sos_events (trip_id, lat, lng, message, status, created_at, next_attempt_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SOS_COLUMNS
    );
    let row = sqlx::query_as::<_, SosEventRow>(&sql)
        .bind(trip_id)
        .bind(point.lat)
        .bind(point.lng)
        .bind(message)
        .bind(SosStatus::Pending.as_str())
        .bind(encode_ts(&created_at))
        .bind(next_attempt_at.as_ref().map(encode_ts))
        .fetch_one(executor)
        .await?;

    SosEvent::try_from(row)
}

/// Get an SOS event by id.
pub async fn find_sos_event_by_id<'e, E>(executor: E, id: i64) -> Result<SosEvent>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM sos_events WHERE id = ?", SOS_COLUMNS);
    let row = sqlx::query_as::<_, SosEventRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("SosEvent", id))?;

    SosEvent::try_from(row)
}

/// Set the status of an SOS event and clear any pending retry.
pub async fn update_sos_event_status<'e, E>(executor: E, id: i64, status: SosStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE sos_events
        SET status = ?, next_attempt_at = NULL
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("SosEvent", id));
    }

    Ok(())
}

/// Count a dispatch round that reached no contact.
///
/// `next_attempt_at` of `None` means no further retry is scheduled.
pub async fn record_failed_attempt<'e, E>(
    executor: E,
    id: i64,
    next_attempt_at: Option<DateTime<Utc>>,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE sos_events
        SET dispatch_attempts = dispatch_attempts + 1, next_attempt_at = ?
        WHERE id = ? AND status = 'PENDING'
        "#,
    )
    .bind(next_attempt_at.as_ref().map(encode_ts))
    .bind(id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("SosEvent", id));
    }

    Ok(())
}

/// Pending SOS events whose retry is due at `now`, oldest first.
pub async fn list_due_sos_events<'e, E>(executor: E, now: DateTime<Utc>) -> Result<Vec<SosEvent>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT {}
        FROM sos_events
        WHERE status = 'PENDING'
          AND next_attempt_at IS NOT NULL
          AND next_attempt_at <= ?
        ORDER BY next_attempt_at ASC, id ASC
        "#,
        SOS_COLUMNS
    );
    let rows = sqlx::query_as::<_, SosEventRow>(&sql)
        .bind(encode_ts(&now))
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(SosEvent::try_from).collect()
}

/// All SOS events of a trip, oldest first.
pub async fn list_sos_events_for_trip<'e, E>(executor: E, trip_id: i64) -> Result<Vec<SosEvent>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM sos_events WHERE trip_id = ? ORDER BY id ASC",
        SOS_COLUMNS
    );
    let rows = sqlx::query_as::<_, SosEventRow>(&sql)
        .bind(trip_id)
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(SosEvent::try_from).collect()
}
