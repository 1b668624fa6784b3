//! Geographic coordinates for pickup, delivery and depot locations.
//!
//! Coordinates are WGS84 latitude/longitude pairs. Geocoding happens before
//! the engine sees an order, so a [`Coordinate`] is always a plain pair of
//! degrees.

use std::fmt;

use geo::{Coord, Point};
use thiserror::Error;

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was outside `[-90, 90]` or not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude was outside `[-180, 180]` or not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// An immutable latitude/longitude pair in degrees.
///
/// Fields are public so that snapshots coming from a repository can be built
/// without ceremony; use [`Coordinate::validate`] (or construct through
/// [`Coordinate::new`]) to enforce the valid ranges.
///
/// # Examples
/// ```
/// use fleetroute_core::Coordinate;
///
/// let berlin = Coordinate::new(52.52, 13.405)?;
/// assert_eq!(berlin.latitude, 52.52);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok::<(), fleetroute_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Degrees north of the equator, in `[-90, 90]`.
    pub latitude: f64,
    /// Degrees east of the prime meridian, in `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either component is out of range or
    /// not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check both components against their valid ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range component.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Latitude in radians.
    #[must_use]
    pub fn latitude_radians(&self) -> f64 {
        self.latitude.to_radians()
    }

    /// Longitude in radians.
    #[must_use]
    pub fn longitude_radians(&self) -> f64 {
        self.longitude.to_radians()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// `geo` follows the GeoJSON convention: x is longitude, y is latitude.
impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(value: Coordinate) -> Self {
        Self::new(value.longitude, value.latitude)
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(value: Coord<f64>) -> Self {
        Self {
            latitude: value.y,
            longitude: value.x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_values(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(Coordinate::new(latitude, longitude).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn rejects_invalid_latitude(#[case] latitude: f64, #[case] longitude: f64) {
        let err = Coordinate::new(latitude, longitude).expect_err("latitude should be rejected");
        assert!(matches!(err, CoordinateError::LatitudeOutOfRange(_)));
    }

    #[rstest]
    #[case(0.0, 180.1)]
    #[case(0.0, -200.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_invalid_longitude(#[case] latitude: f64, #[case] longitude: f64) {
        let err = Coordinate::new(latitude, longitude).expect_err("longitude should be rejected");
        assert!(matches!(err, CoordinateError::LongitudeOutOfRange(_)));
    }

    #[test]
    fn geo_conversion_swaps_axes() {
        let coordinate = Coordinate {
            latitude: 52.52,
            longitude: 13.405,
        };
        let coord: Coord<f64> = coordinate.into();
        assert_eq!(coord.x, 13.405);
        assert_eq!(coord.y, 52.52);
        assert_eq!(Coordinate::from(coord), coordinate);
    }
}
