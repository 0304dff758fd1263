//! Background retry of SOS alerts that reached no contact.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use database::{sos_event, trip as trip_store, user};
use notifier::NotificationDispatcher;
use tracing::{debug, info, warn};
use trip_core::{SosEvent, SosStatus};

use crate::error::Result;
use crate::messages::sos_contact_text;
use crate::orchestrator::{settle_dispatch, TripOrchestrator};

/// Delay before the next dispatch round, given how many rounds have failed.
///
/// A fresh event is due 30s after creation. After 1, 2 and 3 failed rounds
/// the next try follows 30s, 2m and 10m later; after the fourth the event is
/// given up.
pub fn retry_delay(failed_attempts: i64) -> Option<Duration> {
    match failed_attempts {
        0 | 1 => Some(Duration::seconds(30)),
        2 => Some(Duration::minutes(2)),
        3 => Some(Duration::minutes(10)),
        _ => None,
    }
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Events re-dispatched.
    pub attempted: usize,
    /// Events that reached at least one contact.
    pub contacted: usize,
    /// Events closed because their trip had ended.
    pub resolved: usize,
}

/// Periodically re-dispatches `PENDING` SOS events whose retry is due.
pub struct SosSweeper<N: NotificationDispatcher> {
    orchestrator: Arc<TripOrchestrator<N>>,
    interval: StdDuration,
}

impl<N: NotificationDispatcher + 'static> SosSweeper<N> {
    pub fn new(orchestrator: Arc<TripOrchestrator<N>>, interval: StdDuration) -> Self {
        Self {
            orchestrator,
            interval,
        }
    }

    /// Sweep forever at the configured interval.
    pub async fn run(self) {
        info!("SOS sweeper running every {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.run_once(Utc::now()).await {
                Ok(report) if report.attempted > 0 || report.resolved > 0 => {
                    info!(
                        attempted = report.attempted,
                        contacted = report.contacted,
                        resolved = report.resolved,
                        "SOS sweep finished"
                    );
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "SOS sweep failed"),
            }
        }
    }

    /// Re-dispatch every event due at `now`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let db = self.orchestrator.database();
        let due = sos_event::list_due_sos_events(db.pool(), now).await?;
        let mut report = SweepReport::default();

        for event in due {
            match self.retry(event.id, event.trip_id, now).await {
                Ok(Outcome::Contacted) => {
                    report.attempted += 1;
                    report.contacted += 1;
                }
                Ok(Outcome::Failed) => report.attempted += 1,
                Ok(Outcome::Resolved) => report.resolved += 1,
                Ok(Outcome::Skipped) => {}
                Err(e) => warn!(sos_event_id = event.id, error = %e, "SOS retry failed"),
            }
        }

        Ok(report)
    }

    async fn retry(&self, event_id: i64, trip_id: i64, now: DateTime<Utc>) -> Result<Outcome> {
        let _guard = self.orchestrator.locks().acquire(trip_id).await;
        let db = self.orchestrator.database();

        // Re-read under the trip lock; a concurrent dispatch may have settled it.
        let event = sos_event::find_sos_event_by_id(db.pool(), event_id).await?;
        if !is_due(&event, now) {
            debug!(sos_event_id = event_id, "SOS event no longer due");
            return Ok(Outcome::Skipped);
        }

        let trip = trip_store::get_trip(db.pool(), trip_id).await?;
        if trip.status.is_terminal() {
            sos_event::update_sos_event_status(db.pool(), event_id, SosStatus::Resolved).await?;
            info!(sos_event_id = event_id, trip_id, status = %trip.status, "SOS resolved, trip has ended");
            return Ok(Outcome::Resolved);
        }

        let owner = user::find_user_by_chat_id(db.pool(), trip.telegram_chat_id).await?;
        let contacts = user::list_contacts_by_chat_id(db.pool(), trip.telegram_chat_id).await?;
        let (name, phone) = owner
            .as_ref()
            .map(|u| (u.name.as_str(), u.phone.as_str()))
            .unwrap_or(("Unknown user", "unknown"));
        let text = sos_contact_text(name, phone, event.point(), event.message.as_deref());

        let dispatcher = self.orchestrator.dispatcher();
        let mut notified = 0;
        for contact in &contacts {
            if dispatcher.send_contact_alert(&trip, contact, &text).await.is_delivered() {
                notified += 1;
            }
        }

        settle_dispatch(db, event_id, event.dispatch_attempts, notified, now).await?;
        Ok(if notified > 0 {
            Outcome::Contacted
        } else {
            Outcome::Failed
        })
    }
}

enum Outcome {
    Contacted,
    Failed,
    Resolved,
    Skipped,
}

fn is_due(event: &SosEvent, now: DateTime<Utc>) -> bool {
    event.status == SosStatus::Pending && event.next_attempt_at.is_some_and(|at| at <= now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(retry_delay(0), Some(Duration::seconds(30)));
        assert_eq!(retry_delay(1), Some(Duration::seconds(30)));
        assert_eq!(retry_delay(2), Some(Duration::minutes(2)));
        assert_eq!(retry_delay(3), Some(Duration::minutes(10)));
        assert_eq!(retry_delay(4), None);
        assert_eq!(retry_delay(9), None);
    }
}
