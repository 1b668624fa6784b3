//! Route plans: ordered stops assigned to one vehicle for one day.

use jiff::Timestamp;
use jiff::civil::Date;

use crate::{DriverId, Order, OrderId, Vehicle, VehicleId};

/// Identifier assigned by the route repository when a plan is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoutePlanId(pub u64);

/// Dispatch state of a route plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteStatus {
    /// Created by the planner, not yet driven.
    #[default]
    Planned,
    /// The driver is on the road.
    Active,
    /// Every stop was served.
    Completed,
    /// Withdrawn; its orders are free to be planned again.
    Cancelled,
}

/// One visitation of an order: its pickup followed by its delivery.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// 1-based position within the plan.
    pub number: u32,
    /// Snapshot of the order served at this stop.
    pub order: Order,
    /// Expected arrival, when known.
    pub estimated_arrival: Option<Timestamp>,
    /// Recorded arrival, when known.
    pub actual_arrival: Option<Timestamp>,
    /// Whether the driver has served the stop.
    pub completed: bool,
    /// Free-text notes for the driver.
    pub notes: String,
}

impl Stop {
    fn new(number: u32, order: Order) -> Self {
        Self {
            number,
            order,
            estimated_arrival: None,
            actual_arrival: None,
            completed: false,
            notes: String::new(),
        }
    }
}

/// A vehicle's route for one day.
///
/// Stop order is the visitation order. Stops are numbered `1..=n` on
/// construction and the planner never reorders them afterwards.
///
/// # Examples
/// ```
/// use fleetroute_core::{Coordinate, Order, OrderId, RoutePlan, Vehicle, VehicleId};
/// use jiff::civil::date;
///
/// let day = date(2024, 5, 6);
/// let here = Coordinate { latitude: 52.5, longitude: 13.4 };
/// let orders = vec![
///     Order::new(OrderId(1), here, here, 100, day),
///     Order::new(OrderId(2), here, here, 200, day),
/// ];
/// let plan = RoutePlan::new("Route 1", &Vehicle::new(VehicleId(9)), day, orders);
///
/// assert_eq!(plan.stops.len(), 2);
/// assert_eq!(plan.total_weight_kg(), 300);
/// assert!(plan.has_contiguous_stop_numbers());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePlan {
    /// Assigned by the route repository; `None` until persisted.
    pub id: Option<RoutePlanId>,
    /// Display name.
    pub name: String,
    /// Vehicle driving the route.
    pub vehicle: VehicleId,
    /// Capacity the plan was validated against, in kilograms.
    pub capacity_kg: u32,
    /// Driver inherited from the vehicle.
    pub driver: Option<DriverId>,
    /// Day the route is driven.
    pub date: Date,
    /// Stops in visitation order.
    pub stops: Vec<Stop>,
    /// Depot to depot distance in kilometres.
    pub total_distance_km: f64,
    /// Driving time estimate in minutes.
    pub estimated_duration_minutes: u32,
    /// Whether the plan came out of the optimizer.
    pub optimized: bool,
    /// Dispatch state.
    pub status: RouteStatus,
}

impl RoutePlan {
    /// Build a planned route serving `orders` in the given order.
    #[must_use]
    pub fn new(name: impl Into<String>, vehicle: &Vehicle, date: Date, orders: Vec<Order>) -> Self {
        let stops = (1_u32..)
            .zip(orders)
            .map(|(number, order)| Stop::new(number, order))
            .collect();
        Self {
            id: None,
            name: name.into(),
            vehicle: vehicle.id,
            capacity_kg: vehicle.capacity_kg,
            driver: vehicle.driver,
            date,
            stops,
            total_distance_km: 0.0,
            estimated_duration_minutes: 0,
            optimized: false,
            status: RouteStatus::Planned,
        }
    }

    /// Sum of the order weights carried on this route.
    #[must_use]
    pub fn total_weight_kg(&self) -> u64 {
        self.stops
            .iter()
            .map(|stop| u64::from(stop.order.weight_kg))
            .sum()
    }

    /// Identifiers of the orders on this route, in stop order.
    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.stops.iter().map(|stop| stop.order.id)
    }

    /// Whether stop numbers are exactly `1..=stops.len()` in order.
    #[must_use]
    pub fn has_contiguous_stop_numbers(&self) -> bool {
        self.stops
            .iter()
            .zip(1_u32..)
            .all(|(stop, expected)| stop.number == expected)
    }
}
