//! Capacity-limited delivery vehicles.

use std::fmt;

/// Default payload of a delivery truck in kilograms.
pub const DEFAULT_CAPACITY_KG: u32 = 1500;

/// Repository identifier of a [`Vehicle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

/// Identifier of the driver assigned to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DriverId(pub u64);

/// A read-only vehicle snapshot handed to the planner.
///
/// # Examples
/// ```
/// use fleetroute_core::{Vehicle, VehicleId, DEFAULT_CAPACITY_KG};
///
/// let truck = Vehicle::new(VehicleId(1));
/// assert_eq!(truck.capacity_kg, DEFAULT_CAPACITY_KG);
/// assert!(truck.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    /// Repository identifier.
    pub id: VehicleId,
    /// Registration shown to dispatchers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub license_plate: String,
    /// Maximum payload in kilograms.
    #[cfg_attr(feature = "serde", serde(default = "default_capacity_kg"))]
    pub capacity_kg: u32,
    /// Inactive vehicles never receive routes.
    #[cfg_attr(feature = "serde", serde(default = "default_active"))]
    pub active: bool,
    /// Driver inherited by every route planned for this vehicle.
    #[cfg_attr(feature = "serde", serde(default))]
    pub driver: Option<DriverId>,
}

#[cfg(feature = "serde")]
const fn default_capacity_kg() -> u32 {
    DEFAULT_CAPACITY_KG
}

#[cfg(feature = "serde")]
const fn default_active() -> bool {
    true
}

impl Vehicle {
    /// Construct an active, driverless vehicle with the default capacity.
    #[must_use]
    pub fn new(id: VehicleId) -> Self {
        Self {
            id,
            license_plate: String::new(),
            capacity_kg: DEFAULT_CAPACITY_KG,
            active: true,
            driver: None,
        }
    }

    /// Set the payload capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity_kg: u32) -> Self {
        self.capacity_kg = capacity_kg;
        self
    }

    /// Set the assigned driver.
    #[must_use]
    pub const fn with_driver(mut self, driver: DriverId) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Whether the vehicle can carry anything at all.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.active && self.capacity_kg > 0
    }
}
