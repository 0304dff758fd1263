//! Chat rendering of core notifications.

use trip_core::{NotificationEnvelope, NotificationType};

/// A notification rendered for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    /// Target chat, or `None` when the recipient has no chat.
    pub chat_id: Option<i64>,
    pub text: String,
}

/// Pick the recipient and render the text for an envelope.
///
/// Owner-directed kinds go to the trip owner's chat. `sos_contact` goes to
/// the contact's own chat when one is known.
pub fn render(envelope: &NotificationEnvelope) -> Outgoing {
    let chat_id = if envelope.kind.is_contact_alert() {
        envelope.contact_chat_id
    } else {
        Some(envelope.telegram_chat_id)
    };

    let message = envelope.message.as_str();
    let text = match envelope.kind {
        NotificationType::SosUser => format!("🌍 *SOS Triggered*\n\n{}", message),
        NotificationType::TripCancelled => match envelope.reason.as_deref() {
            Some(reason) if !message.contains(reason) => {
                format!("❌ *Trip Cancelled*\n\n{}\nReason: {}", message, reason)
            }
            _ => format!("❌ *Trip Cancelled*\n\n{}", message),
        },
        NotificationType::MessageToUser
        | NotificationType::SosContact
        | NotificationType::DeviationAlert
        | NotificationType::DeviationCleared => message.to_string(),
    };

    Outgoing { chat_id, text }
}
