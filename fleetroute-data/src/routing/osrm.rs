//! OSRM API response types for the Route service.
//!
//! Only the fields the distance lookup needs are decoded; geometry and leg
//! breakdowns are ignored.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Malformed coordinates or options
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    pub routes: Option<Vec<RouteSummary>>,
}

/// Totals of one OSRM route.
#[derive(Debug, Deserialize)]
pub struct RouteSummary {
    /// Driving distance in metres.
    pub distance: f64,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Distance of the best route in metres, if any route was returned.
    #[must_use]
    pub fn best_distance_metres(&self) -> Option<f64> {
        self.routes
            .as_ref()
            .and_then(|routes| routes.first())
            .map(|route| route.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [
                {"distance": 12345.6, "duration": 900.1, "weight": 900.1},
                {"distance": 15000.0, "duration": 800.0, "weight": 800.0}
            ],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert!(response.message.is_none());
        assert_eq!(response.best_distance_metres(), Some(12345.6));
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "code": "NoRoute",
            "message": "Impossible route between points"
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(
            response.message.as_deref(),
            Some("Impossible route between points")
        );
        assert_eq!(response.best_distance_metres(), None);
    }

    #[test]
    fn deserialise_empty_route_list() {
        let json = r#"{"code": "Ok", "routes": []}"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert_eq!(response.best_distance_metres(), None);
    }
}
