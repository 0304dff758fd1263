//! Notifications pushed from the core service to the bot gateway.

use serde::{Deserialize, Serialize};

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    MessageToUser,
    SosUser,
    SosContact,
    TripCancelled,
    DeviationAlert,
    DeviationCleared,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::MessageToUser => "message_to_user",
            NotificationType::SosUser => "sos_user",
            NotificationType::SosContact => "sos_contact",
            NotificationType::TripCancelled => "trip_cancelled",
            NotificationType::DeviationAlert => "deviation_alert",
            NotificationType::DeviationCleared => "deviation_cleared",
        }
    }

    /// Whether the notification is addressed to an emergency contact rather
    /// than the trip owner.
    pub fn is_contact_alert(&self) -> bool {
        matches!(self, NotificationType::SosContact)
    }
}

/// Envelope posted to `{GATEWAY_BASE}/webhook/notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEnvelope {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub trip_id: i64,
    /// Chat id of the trip owner.
    pub telegram_chat_id: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_chat_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl NotificationEnvelope {
    /// A message addressed to the trip owner.
    pub fn to_user(
        kind: NotificationType,
        trip_id: i64,
        telegram_chat_id: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            trip_id,
            telegram_chat_id,
            message: message.into(),
            contact_name: None,
            contact_phone: None,
            contact_chat_id: None,
            reason: None,
        }
    }

    /// An SOS alert addressed to one emergency contact.
    pub fn to_contact(
        trip_id: i64,
        telegram_chat_id: i64,
        contact_name: impl Into<String>,
        contact_phone: impl Into<String>,
        contact_chat_id: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: NotificationType::SosContact,
            trip_id,
            telegram_chat_id,
            message: message.into(),
            contact_name: Some(contact_name.into()),
            contact_phone: Some(contact_phone.into()),
            contact_chat_id,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
