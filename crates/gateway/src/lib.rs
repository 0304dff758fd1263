//! SafeWalk bot gateway.
//!
//! Receives signed notifications from the core service on
//! `POST /webhook/notifications` and forwards them to chat through a
//! [`ChatSender`]. [`CoreClient`] issues signed calls the other way.

pub mod config;
mod core_client;
pub mod error;
mod format;
pub mod routes;
mod sender;
mod state;

pub use config::{Config, ConfigError};
pub use core_client::CoreClient;
pub use error::{GatewayError, Result};
pub use format::{render, Outgoing};
pub use routes::router;
pub use sender::{ChatSender, LoggingSender, NoOpSender, RecordingSender};
pub use state::GatewayState;
