//! Canned responses for APIs with no real integration.
//!
//! This is a demo extension point. It sits last in the dispatch policy and
//! can be switched off, so real handlers replace it by registration alone.

use serde_json::{Map, Value, json};

/// Produces deterministic demo responses
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoResponder;

impl DemoResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn respond(&self, software: &str, api: &str, parameters: &Map<String, Value>) -> Value {
        let param = |key: &str, default: &str| {
            parameters
                .get(key)
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| json!(default))
        };

        match (software, api) {
            ("FlightBooking", "SearchFlights") => json!({
                "flights": [
                    {
                        "id": "F123",
                        "airline": "Example Air",
                        "departure": "2025-04-12T08:00:00Z",
                        "arrival": "2025-04-12T10:30:00Z",
                        "price": 299.99
                    },
                    {
                        "id": "F456",
                        "airline": "Sample Airlines",
                        "departure": "2025-04-12T10:15:00Z",
                        "arrival": "2025-04-12T12:45:00Z",
                        "price": 329.99
                    }
                ]
            }),
            ("FlightBooking", "BookFlight") => json!({
                "bookingId": "B12345",
                "flightId": param("flightId", "unknown"),
                "status": "confirmed",
                "departureTime": "2025-04-12T08:00:00Z",
                "arrivalTime": "2025-04-12T10:30:00Z"
            }),
            ("Calendar", "AddEvent") => json!({
                "eventId": "E67890",
                "title": param("title", "Event"),
                "startTime": param("startTime", "unknown"),
                "endTime": param("endTime", "unknown"),
                "status": "added"
            }),
            _ => json!({
                "message": format!("Successfully executed {software}/{api} (mock)"),
                "parameters": parameters,
            }),
        }
    }
}
