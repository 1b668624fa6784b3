//! Distance-source strategy trait and the ordered coordinate pair it resolves.

use std::sync::Arc;

use crate::Coordinate;

use super::error::DistanceError;

/// An ordered pair of coordinates.
///
/// `Leg::new(a, b)` and `Leg::new(b, a)` are distinct: road distances need
/// not be symmetric and each direction is cached separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Where the leg starts.
    pub from: Coordinate,
    /// Where the leg ends.
    pub to: Coordinate,
}

impl Leg {
    /// Construct a leg from `from` to `to`.
    #[must_use]
    pub const fn new(from: Coordinate, to: Coordinate) -> Self {
        Self { from, to }
    }

    /// The same leg driven the other way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Resolve distances in kilometres between coordinates.
///
/// Implementations must be safe to share across threads; a single source is
/// typically shared by every optimization request in the process.
///
/// # Examples
///
/// ```rust
/// use fleetroute_core::{Coordinate, DistanceError, DistanceSource, Leg};
///
/// struct Flat;
///
/// impl DistanceSource for Flat {
///     fn distance_km(&self, _leg: Leg) -> Result<f64, DistanceError> {
///         Ok(1.0)
///     }
/// }
///
/// let here = Coordinate { latitude: 0.0, longitude: 0.0 };
/// assert_eq!(Flat.distance_km(Leg::new(here, here))?, 1.0);
/// # Ok::<(), DistanceError>(())
/// ```
pub trait DistanceSource: Send + Sync {
    /// Distance of a single leg in kilometres.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] when the distance cannot be resolved.
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError>;

    /// Resolve many independent legs.
    ///
    /// The result has one entry per input leg, in input order. The default
    /// resolves legs one after another; network-backed sources override it
    /// to issue lookups concurrently.
    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        legs.iter().map(|leg| self.distance_km(*leg)).collect()
    }
}

impl<T: DistanceSource + ?Sized> DistanceSource for &T {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        (**self).distance_km(leg)
    }

    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        (**self).distances_km(legs)
    }
}

impl<T: DistanceSource + ?Sized> DistanceSource for Arc<T> {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        (**self).distance_km(leg)
    }

    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        (**self).distances_km(legs)
    }
}

impl<T: DistanceSource + ?Sized> DistanceSource for Box<T> {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        (**self).distance_km(leg)
    }

    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        (**self).distances_km(legs)
    }
}
