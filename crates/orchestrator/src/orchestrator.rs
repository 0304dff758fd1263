//! The trip state machine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use database::{location, sos_event, trip as trip_store, user, Database, DatabaseError, NewTrip};
use notifier::NotificationDispatcher;
use route_planner::RoutePlanner;
use tracing::{debug, error, info, warn};
use trip_core::{
    CancelTripRequest, Gender, LocationUpdate, LocationUpdateRequest, NotificationType, RouteOption,
    SosAcknowledgement, SosRequest, SosStatus, Trip, TripCreationRequest, TripRouteOptions,
    TripStatus, Validate,
};

use crate::deviation::DeviationDetector;
use crate::error::{OrchestratorError, Result};
use crate::locks::TripLocks;
use crate::messages::{
    sos_contact_text, trip_cancelled_text, SOS_ACK_TEXT, SOS_DEGRADED_ACK_TEXT, TRIP_COMPLETED_TEXT,
};
use crate::sweeper::retry_delay;

/// Deviation threshold used when a trip request does not set one.
pub const DEFAULT_DEVIATION_THRESHOLD_METERS: f64 = 30.0;

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Default deviation threshold for new trips, in meters.
    pub deviation_threshold_meters: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            deviation_threshold_meters: DEFAULT_DEVIATION_THRESHOLD_METERS,
        }
    }
}

/// Drives trips through their lifecycle.
///
/// Every mutating operation on a trip runs under that trip's in-process lock
/// and inside one database transaction that starts by taking the trip's row
/// lock. The transaction commits before any notification is sent, so a
/// failed delivery never rolls back a state change.
pub struct TripOrchestrator<N: NotificationDispatcher> {
    db: Database,
    planner: RoutePlanner,
    dispatcher: Arc<N>,
    detector: DeviationDetector,
    locks: TripLocks,
    config: OrchestratorConfig,
}

impl<N: NotificationDispatcher> TripOrchestrator<N> {
    pub fn new(db: Database, planner: RoutePlanner, dispatcher: Arc<N>, config: OrchestratorConfig) -> Self {
        Self {
            db,
            planner,
            dispatcher,
            detector: DeviationDetector::new(),
            locks: TripLocks::new(),
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn dispatcher(&self) -> &Arc<N> {
        &self.dispatcher
    }

    /// Register the user and contacts, propose ranked routes and store the
    /// trip in `CREATED`.
    pub async fn create_trip(&self, request: &TripCreationRequest) -> Result<TripRouteOptions> {
        request.validate()?;

        let route_options = self.planner.plan(request.source, request.destination).await;

        let threshold = request
            .deviation_threshold_meters
            .unwrap_or(self.config.deviation_threshold_meters);

        let mut tx = self.db.begin().await?;
        let owner = user::upsert_user(
            &mut *tx,
            request.telegram_chat_id,
            request.user_name.trim(),
            request.phone.trim(),
            Gender::from_request(&request.gender),
        )
        .await?;
        user::replace_contacts(&mut tx, owner.id, &request.emergency_contacts).await?;
        let trip = trip_store::insert_trip(
            &mut *tx,
            &NewTrip {
                telegram_chat_id: request.telegram_chat_id,
                source: request.source,
                destination: request.destination,
                deviation_threshold_meters: threshold,
                created_at: Utc::now(),
            },
        )
        .await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            trip_id = trip.id,
            chat_id = trip.telegram_chat_id,
            options = route_options.len(),
            "Trip created"
        );

        Ok(TripRouteOptions {
            trip_id: trip.id,
            route_options,
        })
    }

    /// Pin the chosen route and move the trip to `ACTIVE`.
    ///
    /// Repeating the call with the same polyline on an `ACTIVE` trip returns
    /// the trip unchanged.
    pub async fn start_trip(&self, trip_id: i64, route: &RouteOption) -> Result<Trip> {
        route.validate()?;

        let _guard = self.locks.acquire(trip_id).await;
        let mut tx = self.db.begin().await?;
        trip_store::lock_trip(&mut tx, trip_id).await?;
        let mut trip = trip_store::get_trip(&mut *tx, trip_id).await?;

        match trip.status {
            TripStatus::Created => {}
            TripStatus::Active if trip.route() == route.polyline.as_slice() => {
                debug!(trip_id, "Start repeated with the same route");
                return Ok(trip);
            }
            status => return Err(invalid_state(trip_id, status, "start")),
        }

        trip.status = TripStatus::Active;
        trip.selected_route_polyline = Some(route.polyline.clone());
        trip.distance = Some(route.distance);
        trip.duration = Some(route.duration);
        trip.safety_score = Some(route.safety_score);
        trip_store::update_trip(&mut *tx, &trip, Utc::now()).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        info!(trip_id, route_id = route.id, "Trip started: CREATED -> ACTIVE");
        Ok(trip)
    }

    /// Store a position and run deviation detection on it.
    pub async fn record_location(&self, trip_id: i64, update: &LocationUpdateRequest) -> Result<LocationUpdate> {
        update.validate()?;
        if let Some(body_trip_id) = update.trip_id.filter(|id| *id != trip_id) {
            debug!(trip_id, body_trip_id, "Location body names another trip, using path id");
        }

        let _guard = self.locks.acquire(trip_id).await;
        let mut tx = self.db.begin().await?;
        trip_store::lock_trip(&mut tx, trip_id).await?;
        let mut trip = trip_store::get_trip(&mut *tx, trip_id).await?;

        if !trip.status.accepts_locations() {
            return Err(invalid_state(trip_id, trip.status, "record location for"));
        }

        let now = Utc::now();
        let recorded = location::insert_location(&mut *tx, trip_id, update.point(), now, update.timestamp).await?;

        let outcome = self.detector.evaluate(&trip, recorded.point());
        if let Some(next) = outcome.transition {
            let previous = trip.status;
            trip.status = next;
            trip_store::update_trip(&mut *tx, &trip, now).await?;
            match next {
                TripStatus::DeviationAlert => warn!(
                    trip_id,
                    distance_m = outcome.distance_meters.unwrap_or_default(),
                    threshold_m = trip.deviation_threshold_meters,
                    "Deviation detected: {} -> {}",
                    previous,
                    next
                ),
                _ => info!(trip_id, "Deviation cleared: {} -> {}", previous, next),
            }
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        if let Some((kind, text)) = outcome.notification {
            self.dispatcher.send_user_message(&trip, kind, &text).await;
        }

        Ok(recorded)
    }

    /// Move the trip to `COMPLETED`. Completing twice is a no-op.
    pub async fn complete_trip(&self, trip_id: i64) -> Result<Trip> {
        let _guard = self.locks.acquire(trip_id).await;
        let mut tx = self.db.begin().await?;
        trip_store::lock_trip(&mut tx, trip_id).await?;
        let mut trip = trip_store::get_trip(&mut *tx, trip_id).await?;

        match trip.status {
            TripStatus::Completed => {
                debug!(trip_id, "Trip already completed");
                return Ok(trip);
            }
            TripStatus::Cancelled => return Err(invalid_state(trip_id, trip.status, "complete")),
            _ => {}
        }

        let previous = trip.status;
        let now = Utc::now();
        end_trip(&mut trip, TripStatus::Completed, now);
        trip_store::update_trip(&mut *tx, &trip, now).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        info!(trip_id, "Trip completed: {} -> COMPLETED", previous);
        self.dispatcher
            .send_user_message(&trip, NotificationType::MessageToUser, TRIP_COMPLETED_TEXT)
            .await;

        Ok(trip)
    }

    /// Move the trip to `CANCELLED` with a reason. Cancelling twice is a
    /// no-op; a completed trip cannot be cancelled.
    pub async fn cancel_trip(&self, trip_id: i64, request: &CancelTripRequest) -> Result<Trip> {
        request.validate()?;

        let _guard = self.locks.acquire(trip_id).await;
        let mut tx = self.db.begin().await?;
        trip_store::lock_trip(&mut tx, trip_id).await?;
        let mut trip = trip_store::get_trip(&mut *tx, trip_id).await?;

        match trip.status {
            TripStatus::Cancelled => {
                debug!(trip_id, "Trip already cancelled");
                return Ok(trip);
            }
            TripStatus::Completed => return Err(invalid_state(trip_id, trip.status, "cancel")),
            _ => {}
        }

        let previous = trip.status;
        let reason = request.reason.trim().to_string();
        let now = Utc::now();
        end_trip(&mut trip, TripStatus::Cancelled, now);
        trip.cancellation_reason = Some(reason.clone());
        trip_store::update_trip(&mut *tx, &trip, now).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        info!(trip_id, reason = %reason, "Trip cancelled: {} -> CANCELLED", previous);
        self.dispatcher
            .send_user_message(&trip, NotificationType::TripCancelled, &trip_cancelled_text(&reason))
            .await;

        Ok(trip)
    }

    /// Record an SOS, escalate the trip and alert every emergency contact.
    ///
    /// An ended trip is left untouched. Once the event is stored, neither
    /// delivery failures nor a failed outcome write fail the call; the event
    /// stays `PENDING` for the retry sweeper instead.
    pub async fn trigger_sos(&self, request: &SosRequest) -> Result<SosAcknowledgement> {
        request.validate()?;
        let trip_id = request.trip_id;

        let _guard = self.locks.acquire(trip_id).await;
        let mut tx = self.db.begin().await?;
        trip_store::lock_trip(&mut tx, trip_id).await?;
        let mut trip = trip_store::get_trip(&mut *tx, trip_id).await?;

        if trip.status.is_terminal() {
            info!(trip_id, status = %trip.status, "SOS on ended trip ignored");
            return Ok(SosAcknowledgement {
                trip_id,
                trip_status: trip.status,
                sos_event_id: None,
                contacts_notified: 0,
            });
        }
        if request.telegram_chat_id != trip.telegram_chat_id {
            warn!(
                trip_id,
                request_chat_id = request.telegram_chat_id,
                owner_chat_id = trip.telegram_chat_id,
                "SOS chat id does not match trip owner"
            );
        }

        let now = Utc::now();
        let event = sos_event::insert_sos_event(
            &mut *tx,
            trip_id,
            request.point(),
            request.note(),
            now,
            retry_delay(0).map(|delay| now + delay),
        )
        .await?;
        let previous = trip.status;
        trip.status = TripStatus::SosTriggered;
        trip_store::update_trip(&mut *tx, &trip, now).await?;
        let owner = user::find_user_by_chat_id(&mut *tx, trip.telegram_chat_id).await?;
        let contacts = user::list_contacts_by_chat_id(&mut *tx, trip.telegram_chat_id).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        warn!(
            trip_id,
            sos_event_id = event.id,
            contacts = contacts.len(),
            "SOS triggered: {} -> SOS_TRIGGERED",
            previous
        );
        if owner.is_none() {
            warn!(trip_id, "No user registered for trip owner, contact alerts carry placeholders");
        }

        let (name, phone) = owner
            .as_ref()
            .map(|u| (u.name.as_str(), u.phone.as_str()))
            .unwrap_or(("Unknown user", "unknown"));
        let text = sos_contact_text(name, phone, event.point(), event.message.as_deref());

        let mut notified = 0;
        for contact in &contacts {
            if self.dispatcher.send_contact_alert(&trip, contact, &text).await.is_delivered() {
                notified += 1;
            } else {
                warn!(trip_id, contact_id = contact.id, "SOS alert to contact failed");
            }
        }

        // The SOS is already stored and contacts were alerted; the event
        // stays PENDING for the sweeper if this write fails.
        if let Err(e) = settle_dispatch(&self.db, event.id, event.dispatch_attempts, notified, Utc::now()).await {
            error!(trip_id, sos_event_id = event.id, error = %e, "Failed to record SOS dispatch outcome");
        }

        let ack = if notified > 0 { SOS_ACK_TEXT } else { SOS_DEGRADED_ACK_TEXT };
        self.dispatcher
            .send_user_message(&trip, NotificationType::SosUser, ack)
            .await;

        Ok(SosAcknowledgement {
            trip_id,
            trip_status: trip.status,
            sos_event_id: Some(event.id),
            contacts_notified: notified,
        })
    }

    /// Current state of a trip.
    pub async fn get_trip(&self, trip_id: i64) -> Result<Trip> {
        Ok(trip_store::get_trip(self.db.pool(), trip_id).await?)
    }

    /// All positions of a trip, oldest first.
    pub async fn list_locations(&self, trip_id: i64) -> Result<Vec<LocationUpdate>> {
        trip_store::get_trip(self.db.pool(), trip_id).await?;
        Ok(location::all_locations_for_trip_asc(self.db.pool(), trip_id).await?)
    }

    pub(crate) fn locks(&self) -> &TripLocks {
        &self.locks
    }
}

/// Record the result of one dispatch round for an SOS event.
///
/// `attempts_before` counts earlier failed rounds.
pub(crate) async fn settle_dispatch(
    db: &Database,
    event_id: i64,
    attempts_before: i64,
    notified: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    if notified > 0 {
        sos_event::update_sos_event_status(db.pool(), event_id, SosStatus::Contacted).await?;
        info!(sos_event_id = event_id, notified, "SOS contacts reached");
        return Ok(());
    }

    let next = retry_delay(attempts_before + 1).map(|delay| now + delay);
    sos_event::record_failed_attempt(db.pool(), event_id, next).await?;
    match next {
        Some(at) => warn!(
            sos_event_id = event_id,
            attempt = attempts_before + 1,
            next_attempt_at = %at,
            "No SOS contact reached, retry scheduled"
        ),
        None => error!(
            sos_event_id = event_id,
            attempts = attempts_before + 1,
            "No SOS contact reached, giving up"
        ),
    }
    Ok(())
}

fn end_trip(trip: &mut Trip, status: TripStatus, now: DateTime<Utc>) {
    trip.status = status;
    trip.selected_route_polyline = None;
    trip.ended_at = Some(now);
}

fn invalid_state(trip_id: i64, status: TripStatus, action: &'static str) -> OrchestratorError {
    OrchestratorError::InvalidState {
        trip_id,
        status,
        action,
    }
}
