//! Notification dispatcher trait and implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use signed_channel::SignedClient;
use tracing::{debug, info, warn};
use trip_core::{EmergencyContact, NotificationEnvelope, NotificationType, Trip};

/// Path of the gateway's notification webhook.
pub const NOTIFICATIONS_PATH: &str = "/webhook/notifications";

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Delivers notifications to the bot gateway.
///
/// Best-effort: failures are logged by the implementation and reported as
/// [`Delivery::Failed`], never as an error.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver one envelope.
    async fn dispatch(&self, envelope: &NotificationEnvelope) -> Delivery;

    /// Send a message to the trip owner.
    ///
    /// `trip_cancelled` envelopes carry the trip's cancellation reason.
    async fn send_user_message(&self, trip: &Trip, kind: NotificationType, text: &str) -> Delivery {
        let mut envelope = NotificationEnvelope::to_user(kind, trip.id, trip.telegram_chat_id, text);
        if kind == NotificationType::TripCancelled {
            if let Some(reason) = &trip.cancellation_reason {
                envelope = envelope.with_reason(reason.clone());
            }
        }
        self.dispatch(&envelope).await
    }

    /// Send an SOS alert to one emergency contact of the trip owner.
    async fn send_contact_alert(&self, trip: &Trip, contact: &EmergencyContact, text: &str) -> Delivery {
        let envelope = NotificationEnvelope::to_contact(
            trip.id,
            trip.telegram_chat_id,
            contact.name.clone(),
            contact.phone.clone(),
            contact.telegram_chat_id,
            text,
        );
        self.dispatch(&envelope).await
    }
}

/// Posts signed envelopes to the gateway webhook.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: SignedClient,
}

impl WebhookDispatcher {
    pub fn new(client: SignedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    async fn dispatch(&self, envelope: &NotificationEnvelope) -> Delivery {
        match self.client.post_json(NOTIFICATIONS_PATH, envelope).await {
            Ok(response) if response.status().is_success() => {
                debug!(
                    trip_id = envelope.trip_id,
                    kind = envelope.kind.as_str(),
                    "Notification delivered"
                );
                Delivery::Delivered
            }
            Ok(response) => {
                warn!(
                    trip_id = envelope.trip_id,
                    kind = envelope.kind.as_str(),
                    status = response.status().as_u16(),
                    "Gateway rejected notification"
                );
                Delivery::Failed
            }
            Err(e) => {
                warn!(
                    trip_id = envelope.trip_id,
                    kind = envelope.kind.as_str(),
                    error = %e,
                    "Notification delivery failed"
                );
                Delivery::Failed
            }
        }
    }
}

/// A no-op dispatcher that discards all notifications.
#[derive(Debug, Clone, Default)]
pub struct NoOpDispatcher;

#[async_trait]
impl NotificationDispatcher for NoOpDispatcher {
    async fn dispatch(&self, _envelope: &NotificationEnvelope) -> Delivery {
        Delivery::Delivered
    }
}

/// A dispatcher that logs every notification instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn dispatch(&self, envelope: &NotificationEnvelope) -> Delivery {
        info!(
            "[{}] trip {} -> chat {}: {}",
            envelope.kind.as_str(),
            envelope.trip_id,
            envelope.contact_chat_id.unwrap_or(envelope.telegram_chat_id),
            envelope.message
        );
        Delivery::Delivered
    }
}

/// Keeps every envelope in memory. Used to observe dispatch in tests.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<NotificationEnvelope>>,
    failing: Mutex<Vec<NotificationType>>,
    failing_contacts: Mutex<Vec<String>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Failed` for every envelope of `kind` from now on. Failed
    /// envelopes are still recorded.
    pub fn fail_kind(&self, kind: NotificationType) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.push(kind);
        }
    }

    /// Report `Failed` for every contact alert addressed to `phone`.
    pub fn fail_contact(&self, phone: impl Into<String>) {
        if let Ok(mut failing) = self.failing_contacts.lock() {
            failing.push(phone.into());
        }
    }

    /// Deliver everything again.
    pub fn recover(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
        if let Ok(mut failing) = self.failing_contacts.lock() {
            failing.clear();
        }
    }

    /// Everything dispatched so far, in order.
    pub fn sent(&self) -> Vec<NotificationEnvelope> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Dispatched envelopes of one kind.
    pub fn sent_of(&self, kind: NotificationType) -> Vec<NotificationEnvelope> {
        self.sent()
            .into_iter()
            .filter(|envelope| envelope.kind == kind)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, envelope: &NotificationEnvelope) -> Delivery {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(envelope.clone());
        }
        let kind_failing = self
            .failing
            .lock()
            .map(|failing| failing.contains(&envelope.kind))
            .unwrap_or(false);
        let contact_failing = match &envelope.contact_phone {
            Some(phone) => self
                .failing_contacts
                .lock()
                .map(|failing| failing.contains(phone))
                .unwrap_or(false),
            None => false,
        };

        if kind_failing || contact_failing {
            Delivery::Failed
        } else {
            Delivery::Delivered
        }
    }
}
