//! Great-circle distances on a spherical Earth.

use crate::Coordinate;

use super::error::DistanceError;
use super::source::{DistanceSource, Leg};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometres.
///
/// # Examples
/// ```
/// use fleetroute_core::{Coordinate, haversine_km};
///
/// let berlin = Coordinate { latitude: 52.52, longitude: 13.405 };
/// let munich = Coordinate { latitude: 48.1351, longitude: 11.582 };
/// let km = haversine_km(berlin, munich);
/// assert!((km - 504.0).abs() < 504.0 * 0.005);
/// ```
#[must_use]
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude_radians();
    let lat2 = to.latitude_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (to.longitude_radians() - from.longitude_radians()) / 2.0;

    let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// [`DistanceSource`] computing great-circle distances locally.
///
/// Never fails; used as the fallback behind network sources and as the only
/// source in offline mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct HaversineDistanceSource;

impl DistanceSource for HaversineDistanceSource {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        Ok(haversine_km(leg.from, leg.to))
    }
}
