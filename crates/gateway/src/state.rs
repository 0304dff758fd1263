//! Application state shared across handlers.

use std::sync::Arc;

use signed_channel::Signer;

use crate::sender::ChatSender;

/// Shared application state.
pub struct GatewayState<S: ChatSender> {
    /// Chat delivery.
    pub sender: Arc<S>,
    /// Verifies webhook signatures.
    pub signer: Signer,
}

impl<S: ChatSender> GatewayState<S> {
    pub fn new(sender: Arc<S>, signer: Signer) -> Self {
        Self { sender, signer }
    }
}

impl<S: ChatSender> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            signer: self.signer.clone(),
        }
    }
}
