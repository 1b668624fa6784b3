//! Test utilities for routing sources.
//!
//! This module provides [`StubDistanceSource`], a deterministic test double
//! for [`DistanceSource`] that returns pre-configured responses without
//! making actual HTTP requests.

use std::sync::Mutex;

use fleetroute_core::{DistanceError, DistanceSource, Leg};

/// Stub `DistanceSource` for testing.
///
/// Returns the same configured answer for every leg and records the legs it
/// was asked about.
///
/// # Example
///
/// ```
/// use fleetroute_core::{Coordinate, DistanceSource, Leg};
/// use fleetroute_data::routing::test_support::StubDistanceSource;
///
/// let source = StubDistanceSource::with_distance(12.5);
/// let here = Coordinate { latitude: 0.0, longitude: 0.0 };
///
/// assert_eq!(source.distance_km(Leg::new(here, here)), Ok(12.5));
/// assert_eq!(source.requested().len(), 1);
/// ```
#[derive(Debug)]
pub struct StubDistanceSource {
    response: Result<f64, DistanceError>,
    requested: Mutex<Vec<Leg>>,
}

impl StubDistanceSource {
    /// Create a source that answers every leg with `km`.
    #[must_use]
    pub fn with_distance(km: f64) -> Self {
        Self::with_response(Ok(km))
    }

    /// Create a source that fails every leg with `error`.
    #[must_use]
    pub fn with_error(error: DistanceError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<f64, DistanceError>) -> Self {
        Self {
            response,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Legs requested so far, in request order.
    #[must_use]
    pub fn requested(&self) -> Vec<Leg> {
        self.requested
            .lock()
            .map(|legs| legs.clone())
            .unwrap_or_default()
    }
}

impl DistanceSource for StubDistanceSource {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        if let Ok(mut legs) = self.requested.lock() {
            legs.push(leg);
        }
        self.response.clone()
    }
}
