//! Trip safety state machine for SafeWalk.
//!
//! This crate provides the [`TripOrchestrator`], which drives a trip from
//! route proposal to completion, cancellation or SOS, and the
//! [`SosSweeper`] that retries SOS alerts nobody received.
//!
//! # Lifecycle
//!
//! ```text
//!   CREATED ──start──▶ ACTIVE ◀──back on route── DEVIATION_ALERT
//!      │                 │ ──────off route──────▶      │
//!      │                 │                              │
//!      └─────────────────┴───────── sos ────────────────┴──▶ SOS_TRIGGERED
//!
//!   any non-terminal state ──complete──▶ COMPLETED
//!   any non-terminal state ──cancel────▶ CANCELLED
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{OrchestratorConfig, TripOrchestrator};
//! use notifier::LoggingDispatcher;
//! use route_planner::{RoutePlanner, StubRoutingProvider};
//!
//! let db = database::Database::connect("sqlite::memory:").await?;
//! db.migrate().await?;
//!
//! let planner = RoutePlanner::new(Arc::new(StubRoutingProvider::new()));
//! let orchestrator = TripOrchestrator::new(db, planner, Arc::new(LoggingDispatcher), OrchestratorConfig::default());
//!
//! let proposal = orchestrator.create_trip(&request).await?;
//! let trip = orchestrator.start_trip(proposal.trip_id, &proposal.route_options[0]).await?;
//! ```

mod deviation;
mod error;
mod locks;
mod messages;
mod orchestrator;
mod sweeper;

pub use deviation::{DeviationDetector, DeviationOutcome};
pub use error::{OrchestratorError, Result};
pub use locks::{TripGuard, TripLocks};
pub use messages::{SOS_ACK_TEXT, SOS_DEGRADED_ACK_TEXT};
pub use orchestrator::{OrchestratorConfig, TripOrchestrator, DEFAULT_DEVIATION_THRESHOLD_METERS};
pub use sweeper::{retry_delay, SosSweeper, SweepReport};
