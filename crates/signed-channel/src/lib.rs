//! Signed JSON webhooks between the SafeWalk core service and bot gateway.
//!
//! Every body is authenticated with HMAC-SHA256 under a shared secret,
//! hex-encoded in the `X-Signature` header. Receivers verify over the raw
//! body bytes before any JSON parsing.
//!
//! # Example
//!
//! ```no_run
//! use secrecy::SecretString;
//! use signed_channel::{ClientConfig, SignedClient, Signer};
//!
//! # async fn example() -> signed_channel::Result<()> {
//! let signer = Signer::new(&SecretString::from("shared-secret".to_string()))?;
//! let client = SignedClient::new(ClientConfig::new("http://localhost:8081"), signer)?;
//! client
//!     .post_json("/webhook/notifications", &serde_json::json!({"type": "message_to_user"}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
mod signature;

pub use client::{ClientConfig, SignedClient};
pub use error::{ChannelError, Result};
pub use signature::{constant_time_eq, Signer, SIGNATURE_HEADER};
