//! Request and response bodies of the core HTTP API.

use chrono::{DateTime, Utc};
use geo_math::LatLng;
use serde::{Deserialize, Serialize};

use crate::status::TripStatus;
use crate::validation::{
    check_lat_lng, validate_optional_text, validate_phone, validate_range, validate_text,
    validate_threshold, FieldErrors, Validate, ValidationError, MAX_GENDER_LENGTH, MAX_MESSAGE_LENGTH,
    MAX_NAME_LENGTH,
};

/// An emergency contact as submitted with a trip request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContactInput {
    pub name: String,
    pub phone: String,
    /// Chat id, when the contact also talks to the bot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<i64>,
}

/// Body of `POST /api/trips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCreationRequest {
    pub telegram_chat_id: i64,
    pub user_name: String,
    pub phone: String,
    pub gender: String,
    pub emergency_contacts: Vec<EmergencyContactInput>,
    pub source: LatLng,
    pub destination: LatLng,
    /// Overrides the service default when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation_threshold_meters: Option<f64>,
}

impl Validate for TripCreationRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.check("userName", validate_text(&self.user_name, MAX_NAME_LENGTH));
        errors.check("phone", validate_phone(&self.phone));
        errors.check("gender", validate_text(&self.gender, MAX_GENDER_LENGTH));

        if self.emergency_contacts.is_empty() {
            errors.check("emergencyContacts", Err(ValidationError::TooFew { min: 1 }));
        }
        for (i, contact) in self.emergency_contacts.iter().enumerate() {
            errors.check(
                format!("emergencyContacts[{}].name", i),
                validate_text(&contact.name, MAX_NAME_LENGTH),
            );
            errors.check(
                format!("emergencyContacts[{}].phone", i),
                validate_phone(&contact.phone),
            );
        }

        check_lat_lng(&mut errors, "source", &self.source);
        check_lat_lng(&mut errors, "destination", &self.destination);

        if let Some(threshold) = self.deviation_threshold_meters {
            errors.check("deviationThresholdMeters", validate_threshold(threshold));
        }

        errors.into_result()
    }
}

/// A candidate route. Ephemeral: proposed at creation, echoed back on start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOption {
    /// 1-based position in the provider's answer.
    pub id: u32,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: i64,
    /// In `[0, 10]`, higher is safer.
    #[serde(default)]
    pub safety_score: f64,
    pub polyline: Vec<LatLng>,
}

impl Validate for RouteOption {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.id == 0 {
            errors.insert("id", "must be at least 1");
        }
        if !(self.distance.is_finite() && self.distance >= 0.0) {
            errors.insert("distance", "must be a non-negative number");
        }
        if self.duration < 0 {
            errors.insert("duration", "must not be negative");
        }
        errors.check("safetyScore", validate_range(self.safety_score, 0.0, 10.0));

        if self.polyline.len() < 2 {
            errors.check("polyline", Err(ValidationError::TooFew { min: 2 }));
        }
        for (i, point) in self.polyline.iter().enumerate() {
            check_lat_lng(&mut errors, &format!("polyline[{}]", i), point);
        }

        errors.into_result()
    }
}

/// Response of `POST /api/trips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRouteOptions {
    pub trip_id: i64,
    /// Sorted by descending safety score, then distance, then id.
    pub route_options: Vec<RouteOption>,
}

/// Body of `POST /api/trips/{id}/locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateRequest {
    /// Informational; the path id is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<i64>,
    pub lat: f64,
    pub lng: f64,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl LocationUpdateRequest {
    pub fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

impl Validate for LocationUpdateRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("lat", crate::validation::validate_latitude(self.lat));
        errors.check("lng", crate::validation::validate_longitude(self.lng));
        errors.into_result()
    }
}

/// Body of `POST /api/sos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosRequest {
    pub trip_id: i64,
    pub telegram_chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl SosRequest {
    pub fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// The user's message, if it carries any text.
    pub fn note(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

impl Validate for SosRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            "message",
            validate_optional_text(self.message.as_deref(), MAX_MESSAGE_LENGTH),
        );
        errors.check("lat", crate::validation::validate_latitude(self.lat));
        errors.check("lng", crate::validation::validate_longitude(self.lng));
        errors.into_result()
    }
}

/// Response of `POST /api/sos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAcknowledgement {
    pub trip_id: i64,
    pub trip_status: TripStatus,
    /// Absent when the trip had already ended and nothing was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sos_event_id: Option<i64>,
    pub contacts_notified: usize,
}

/// Body of `POST /api/trips/{id}/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTripRequest {
    pub reason: String,
}

impl Validate for CancelTripRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("reason", validate_text(&self.reason, MAX_MESSAGE_LENGTH));
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation_request() -> TripCreationRequest {
        TripCreationRequest {
            telegram_chat_id: 4242,
            user_name: "Asha".to_string(),
            phone: "+919876543210".to_string(),
            gender: "FEMALE".to_string(),
            emergency_contacts: vec![EmergencyContactInput {
                name: "Ravi".to_string(),
                phone: "+919812345678".to_string(),
                telegram_chat_id: None,
            }],
            source: LatLng::new(12.97, 77.59),
            destination: LatLng::new(12.93, 77.61),
            deviation_threshold_meters: None,
        }
    }

    #[test]
    fn test_creation_request_valid() {
        assert!(creation_request().validate().is_ok());
    }

    #[test]
    fn test_creation_request_collects_field_errors() {
        let mut request = creation_request();
        request.phone = "12".to_string();
        request.emergency_contacts.clear();
        request.destination.lat = 123.0;
        request.deviation_threshold_meters = Some(0.0);

        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["destination.lat", "deviationThresholdMeters", "emergencyContacts", "phone"]
        );
    }

    #[test]
    fn test_creation_request_nested_contact_errors() {
        let mut request = creation_request();
        request.emergency_contacts[0].phone = "nope".to_string();
        let errors = request.validate().unwrap_err();
        assert!(errors.get("emergencyContacts[0].phone").is_some());
    }

    #[test]
    fn test_creation_request_wire_names() {
        let json = serde_json::json!({
            "telegramChatId": 7,
            "userName": "Asha",
            "phone": "5551234",
            "gender": "F",
            "emergencyContacts": [{"name": "Ravi", "phone": "5554321"}],
            "source": {"lat": 12.97, "lng": 77.59},
            "destination": {"lat": 12.93, "lng": 77.61}
        });
        let request: TripCreationRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.telegram_chat_id, 7);
        assert!(request.deviation_threshold_meters.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_route_option_requires_polyline() {
        let mut option = RouteOption {
            id: 1,
            distance: 1200.0,
            duration: 600,
            safety_score: 8.8,
            polyline: vec![],
        };
        let errors = option.validate().unwrap_err();
        assert!(errors.get("polyline").is_some());

        // A single point has no segment to measure deviation against.
        option.polyline = vec![LatLng::new(12.97, 77.59)];
        let errors = option.validate().unwrap_err();
        assert_eq!(errors.get("polyline"), Some("must contain at least 2 entries"));

        option.polyline.push(LatLng::new(12.96, 77.6));
        assert!(option.validate().is_ok());
    }

    #[test]
    fn test_location_update_accepts_naive_timestamp() {
        let json = serde_json::json!({
            "tripId": 3,
            "lat": 12.95,
            "lng": 77.6,
            "timestamp": "2025-01-10T18:30:00"
        });
        let update: LocationUpdateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(update.trip_id, Some(3));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_sos_note_ignores_blank_message() {
        let json = serde_json::json!({
            "tripId": 3,
            "telegramChatId": 7,
            "message": "   ",
            "lat": 12.95,
            "lng": 77.6,
            "timestamp": "2025-01-10T18:30:00Z"
        });
        let sos: SosRequest = serde_json::from_value(json).unwrap();
        assert!(sos.note().is_none());
        assert!(sos.validate().is_ok());
    }

    #[test]
    fn test_sos_message_length_limit() {
        let sos = SosRequest {
            trip_id: 1,
            telegram_chat_id: 1,
            message: Some("x".repeat(501)),
            lat: 0.0,
            lng: 0.0,
            timestamp: Utc::now(),
        };
        assert!(sos.validate().unwrap_err().get("message").is_some());
    }
}
