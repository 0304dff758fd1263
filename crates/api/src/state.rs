//! Application state shared across handlers.

use std::sync::Arc;

use notifier::NotificationDispatcher;
use orchestrator::TripOrchestrator;
use signed_channel::Signer;

/// Shared application state.
pub struct AppState<N: NotificationDispatcher> {
    /// Trip state machine.
    pub orchestrator: Arc<TripOrchestrator<N>>,
    /// Verifies inbound request signatures.
    pub signer: Signer,
}

impl<N: NotificationDispatcher> AppState<N> {
    /// Create new application state.
    pub fn new(orchestrator: Arc<TripOrchestrator<N>>, signer: Signer) -> Self {
        Self { orchestrator, signer }
    }
}

impl<N: NotificationDispatcher> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            signer: self.signer.clone(),
        }
    }
}
