//! Notification texts.

use geo_math::LatLng;

pub const DEVIATION_CLEARED_TEXT: &str =
    "✅ Deviation Cleared\nYou are back on your safe route. Monitoring continues.";

pub const TRIP_COMPLETED_TEXT: &str = "🏁 Trip completed. Glad you made it safely!";

pub const SOS_ACK_TEXT: &str = "Your emergency contacts have been notified. Stay safe.";

pub const SOS_DEGRADED_ACK_TEXT: &str = "Your SOS has been recorded, but we could not reach your emergency contacts yet. We will keep trying. If you are in danger, call local emergency services now.";

/// Alert for a user `meters` away from their route.
pub fn deviation_alert_text(meters: i64) -> String {
    format!(
        "⚠️ ROUTE DEVIATION ALERT ⚠️\nYou are {} meters off your selected safe route. Please confirm you are safe by replying with /safe.\nIf you need help, reply with /sos immediately.",
        meters
    )
}

/// Confirmation of a cancelled trip.
pub fn trip_cancelled_text(reason: &str) -> String {
    format!("Your trip has been cancelled. Reason: {}", reason)
}

/// Map link for a coordinate.
pub fn maps_link(point: LatLng) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
        point.lat, point.lng
    )
}

/// Alert sent to each emergency contact.
pub fn sos_contact_text(user_name: &str, user_phone: &str, location: LatLng, note: Option<&str>) -> String {
    let note = note
        .map(|message| format!("\nUser's message: {}", message))
        .unwrap_or_default();

    format!(
        "🚨 EMERGENCY SOS ALERT 🚨\n\nYour contact, {}, has triggered an SOS alert!\n\nLast Known Location: {}\n\nContact their phone immediately: {}{}\n\nPlease call local emergency services if you cannot reach them.",
        user_name,
        maps_link(location),
        user_phone,
        note
    )
}
