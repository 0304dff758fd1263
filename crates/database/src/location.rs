//! Location update operations. Rows are insert-only.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};
use trip_core::{LatLng, LocationUpdate};

use crate::error::Result;
use crate::models::{encode_ts, LocationUpdateRow};

/// Record a position for a trip.
///
/// `recorded_at` is the server receipt time and orders updates within a trip;
/// `client_timestamp` is whatever the device reported.
pub async fn insert_location<'e, E>(
    executor: E,
    trip_id: i64,
    point: LatLng,
    recorded_at: DateTime<Utc>,
    client_timestamp: DateTime<Utc>,
) -> Result<LocationUpdate>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, LocationUpdateRow>(
        r#"
        INSERT INTO location_updates (trip_id, lat, lng, recorded_at, client_timestamp)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, trip_id, lat, lng, recorded_at, client_timestamp
        "#,
    )
    .bind(trip_id)
    .bind(point.lat)
    .bind(point.lng)
    .bind(encode_ts(&recorded_at))
    .bind(encode_ts(&client_timestamp))
    .fetch_one(executor)
    .await?;

    LocationUpdate::try_from(row)
}

/// The most recent update of a trip.
pub async fn latest_location_for_trip<'e, E>(executor: E, trip_id: i64) -> Result<Option<LocationUpdate>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, LocationUpdateRow>(
        r#"
        SELECT id, trip_id, lat, lng, recorded_at, client_timestamp
        FROM location_updates
        WHERE trip_id = ?
        ORDER BY recorded_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(trip_id)
    .fetch_optional(executor)
    .await?
    .map(LocationUpdate::try_from)
    .transpose()
}

/// All updates of a trip, oldest first.
pub async fn all_locations_for_trip_asc<'e, E>(executor: E, trip_id: i64) -> Result<Vec<LocationUpdate>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, LocationUpdateRow>(
        r#"
        SELECT id, trip_id, lat, lng, recorded_at, client_timestamp
        FROM location_updates
        WHERE trip_id = ?
        ORDER BY recorded_at ASC, id ASC
        "#,
    )
    .bind(trip_id)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(LocationUpdate::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::{insert_trip, NewTrip};
    use crate::{Database, DatabaseError};
    use chrono::{Duration, TimeZone};

    async fn setup() -> (Database, i64) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        let trip = insert_trip(
            db.pool(),
            &NewTrip {
                telegram_chat_id: 1,
                source: LatLng::new(0.0, 0.0),
                destination: LatLng::new(0.0, 0.001),
                deviation_threshold_meters: 30.0,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
        (db, trip.id)
    }

    #[tokio::test]
    async fn test_ordering_uses_server_time() {
        let (db, trip_id) = setup().await;
        let base = Utc.with_ymd_and_hms(2025, 1, 10, 18, 30, 0).unwrap();
        // Device clock runs backwards; server order must still hold.
        let device = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        insert_location(db.pool(), trip_id, LatLng::new(0.0, 0.0), base, device)
            .await
            .unwrap();
        insert_location(
            db.pool(),
            trip_id,
            LatLng::new(0.0005, 0.0005),
            base + Duration::seconds(5),
            device - Duration::days(1),
        )
        .await
        .unwrap();

        let all = all_locations_for_trip_asc(db.pool(), trip_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].recorded_at, base);
        assert_eq!(all[0].timestamp, device);

        let latest = latest_location_for_trip(db.pool(), trip_id).await.unwrap().unwrap();
        assert_eq!(latest.point(), LatLng::new(0.0005, 0.0005));
    }

    #[tokio::test]
    async fn test_same_instant_falls_back_to_id() {
        let (db, trip_id) = setup().await;
        let now = Utc::now();

        let first = insert_location(db.pool(), trip_id, LatLng::new(1.0, 1.0), now, now)
            .await
            .unwrap();
        let second = insert_location(db.pool(), trip_id, LatLng::new(2.0, 2.0), now, now)
            .await
            .unwrap();

        let latest = latest_location_for_trip(db.pool(), trip_id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        let all = all_locations_for_trip_asc(db.pool(), trip_id).await.unwrap();
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn test_empty_and_orphan() {
        let (db, trip_id) = setup().await;
        assert!(latest_location_for_trip(db.pool(), trip_id).await.unwrap().is_none());

        let err = insert_location(db.pool(), trip_id + 50, LatLng::new(0.0, 0.0), Utc::now(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlx(_)));
    }
}
