//! Closed enumerations shared by both services.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a stored or received value names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Lifecycle state of a trip.
///
/// The graph is acyclic except for `Active` <-> `DeviationAlert`.
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Created,
    Active,
    DeviationAlert,
    SosPending,
    SosTriggered,
    Cancelled,
    Completed,
}

impl TripStatus {
    pub const ALL: [TripStatus; 7] = [
        TripStatus::Created,
        TripStatus::Active,
        TripStatus::DeviationAlert,
        TripStatus::SosPending,
        TripStatus::SosTriggered,
        TripStatus::Cancelled,
        TripStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Created => "CREATED",
            TripStatus::Active => "ACTIVE",
            TripStatus::DeviationAlert => "DEVIATION_ALERT",
            TripStatus::SosPending => "SOS_PENDING",
            TripStatus::SosTriggered => "SOS_TRIGGERED",
            TripStatus::Cancelled => "CANCELLED",
            TripStatus::Completed => "COMPLETED",
        }
    }

    /// No further mutation is accepted in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    /// States in which live location updates are recorded.
    pub fn accepts_locations(&self) -> bool {
        matches!(
            self,
            TripStatus::Active
                | TripStatus::DeviationAlert
                | TripStatus::SosPending
                | TripStatus::SosTriggered
        )
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "trip status",
                value: s.to_string(),
            })
    }
}

/// Notification progress of an SOS event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SosStatus {
    Pending,
    Contacted,
    Resolved,
}

impl SosStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SosStatus::Pending => "PENDING",
            SosStatus::Contacted => "CONTACTED",
            SosStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for SosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SosStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SosStatus::Pending),
            "CONTACTED" => Ok(SosStatus::Contacted),
            "RESOLVED" => Ok(SosStatus::Resolved),
            other => Err(UnknownVariant {
                kind: "sos status",
                value: other.to_string(),
            }),
        }
    }
}

/// Self-reported gender of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
            Gender::PreferNotToSay => "PREFER_NOT_TO_SAY",
        }
    }

    /// Lenient mapping from the free-form request field.
    ///
    /// Anything outside the known set is recorded as `PreferNotToSay`.
    pub fn from_request(value: &str) -> Gender {
        match value.trim().to_ascii_uppercase().as_str() {
            "MALE" | "M" => Gender::Male,
            "FEMALE" | "F" => Gender::Female,
            "OTHER" => Gender::Other,
            _ => Gender::PreferNotToSay,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            "PREFER_NOT_TO_SAY" => Ok(Gender::PreferNotToSay),
            other => Err(UnknownVariant {
                kind: "gender",
                value: other.to_string(),
            }),
        }
    }
}
