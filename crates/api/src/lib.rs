//! SafeWalk core service.
//!
//! Exposes the trip state machine over signed JSON HTTP:
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | POST | `/api/trips` | `TripCreationRequest` |
//! | POST | `/api/trips/:id/start` | `RouteOption` |
//! | POST | `/api/trips/:id/locations` | `LocationUpdateRequest` |
//! | POST | `/api/trips/:id/complete` | (empty) |
//! | POST | `/api/trips/:id/cancel` | `CancelTripRequest` |
//! | GET | `/api/trips/:id` | |
//! | GET | `/api/trips/:id/locations` | |
//! | POST | `/api/sos` | `SosRequest` |
//! | GET | `/health` | unsigned |

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
