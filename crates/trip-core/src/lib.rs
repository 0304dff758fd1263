//! Shared schema for the SafeWalk core service and bot gateway.
//!
//! Both processes speak the same wire contract; this crate is the single
//! definition of it:
//!
//! - [`TripStatus`], [`SosStatus`], [`Gender`] - closed enumerations
//! - [`Trip`], [`LocationUpdate`], [`SosEvent`], [`User`], [`EmergencyContact`] - entities
//! - [`TripCreationRequest`], [`RouteOption`], [`LocationUpdateRequest`], [`SosRequest`] - requests
//! - [`NotificationEnvelope`] - outbound notifications from core to gateway
//! - [`FieldErrors`] / [`Validate`] - request validation
//! - [`env`] - environment value parsing shared by both binaries
//!
//! All JSON uses camelCase field names.

mod entity;
pub mod env;
mod error_body;
mod notification;
mod request;
mod status;
pub mod timestamp;
pub mod validation;

pub use entity::{EmergencyContact, LocationUpdate, SosEvent, Trip, User};
pub use error_body::ErrorBody;
pub use notification::{NotificationEnvelope, NotificationType};
pub use request::{
    CancelTripRequest, EmergencyContactInput, LocationUpdateRequest, RouteOption, SosAcknowledgement,
    SosRequest, TripCreationRequest, TripRouteOptions,
};
pub use status::{Gender, SosStatus, TripStatus, UnknownVariant};
pub use validation::{FieldErrors, Validate, ValidationError};

pub use geo_math::LatLng;
