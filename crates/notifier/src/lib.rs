//! Outbound notifications from the SafeWalk core service.
//!
//! [`NotificationDispatcher`] is the port the trip orchestrator talks to;
//! [`WebhookDispatcher`] is the production implementation posting signed
//! envelopes to the bot gateway.

mod dispatcher;

pub use dispatcher::{
    Delivery, LoggingDispatcher, NoOpDispatcher, NotificationDispatcher, RecordingDispatcher,
    WebhookDispatcher, NOTIFICATIONS_PATH,
};
