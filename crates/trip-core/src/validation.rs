//! Input validation for inbound requests.

use std::collections::BTreeMap;
use std::fmt;

use geo_math::LatLng;
use serde::Serialize;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty,
    /// Value too long.
    TooLong { max: usize, actual: usize },
    /// Invalid phone number format.
    InvalidPhone,
    /// Numeric value outside its allowed range.
    OutOfRange { min: f64, max: f64 },
    /// Collection with too few entries.
    TooFew { min: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "must not be blank"),
            ValidationError::TooLong { max, actual } => {
                write!(f, "is too long ({} chars, max {})", actual, max)
            }
            ValidationError::InvalidPhone => {
                write!(f, "must be a valid international number (7-15 digits, optional +)")
            }
            ValidationError::OutOfRange { min, max } => {
                write!(f, "must be between {} and {}", min, max)
            }
            ValidationError::TooFew { min: 1 } => write!(f, "must contain at least 1 entry"),
            ValidationError::TooFew { min } => write!(f, "must contain at least {} entries", min),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for user and contact names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum allowed length for the gender field.
pub const MAX_GENDER_LENGTH: usize = 10;

/// Maximum allowed length for SOS messages and cancellation reasons.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Largest accepted per-trip deviation threshold.
pub const MAX_DEVIATION_THRESHOLD_METERS: f64 = 1000.0;

/// Validation failures keyed by field path (e.g. `emergencyContacts[0].phone`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record a message for a field. The first message per field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record the outcome of a field check.
    pub fn check(&mut self, field: impl Into<String>, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.insert(field, err.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{} {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Implemented by every inbound request body.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Validate a required, bounded text field.
pub fn validate_text(value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty);
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { max, actual });
    }

    Ok(())
}

/// Validate an optional bounded text field (blank is allowed).
pub fn validate_optional_text(value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { max, actual });
    }

    Ok(())
}

/// Validate a phone number: optional leading `+`, then 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());

    if !valid {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(())
}

/// Validate a latitude in degrees.
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    validate_range(lat, -90.0, 90.0)
}

/// Validate a longitude in degrees.
pub fn validate_longitude(lng: f64) -> Result<(), ValidationError> {
    validate_range(lng, -180.0, 180.0)
}

/// Validate a finite value within `[min, max]`.
pub fn validate_range(value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::OutOfRange { min, max });
    }
    Ok(())
}

/// Validate a deviation threshold: positive and at most
/// [`MAX_DEVIATION_THRESHOLD_METERS`].
pub fn validate_threshold(meters: f64) -> Result<(), ValidationError> {
    if meters > 0.0 {
        validate_range(meters, 0.0, MAX_DEVIATION_THRESHOLD_METERS)
    } else {
        Err(ValidationError::OutOfRange {
            min: 0.0,
            max: MAX_DEVIATION_THRESHOLD_METERS,
        })
    }
}

/// Validate both components of a coordinate under a field prefix.
pub fn check_lat_lng(errors: &mut FieldErrors, prefix: &str, point: &LatLng) {
    errors.check(format!("{}.lat", prefix), validate_latitude(point.lat));
    errors.check(format!("{}.lng", prefix), validate_longitude(point.lng));
}
