//! Pair merged route groups with vehicles.

use log::warn;

use fleetroute_core::Vehicle;

use crate::merge::RouteGroup;

/// A group of orders placed on a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<'a> {
    /// Vehicle driving the route.
    pub vehicle: &'a Vehicle,
    /// Capacity the group was checked against.
    pub capacity_kg: u32,
    /// Order indices in visitation order.
    pub orders: Vec<usize>,
}

/// Result of [`FleetAssigner::assign`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetAssignment<'a> {
    /// Routes in vehicle order.
    pub assigned: Vec<Assignment<'a>>,
    /// Order indices left without a vehicle, in group order.
    pub unassigned: Vec<usize>,
}

/// Hands the k-th group to the k-th vehicle.
///
/// Groups beyond the fleet, and groups heavier than their vehicle, stay
/// unassigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetAssigner {
    capacity_override: Option<u32>,
}

impl FleetAssigner {
    /// Check groups against each vehicle's own capacity, or against
    /// `capacity_override` for every vehicle when set.
    #[must_use]
    pub const fn new(capacity_override: Option<u32>) -> Self {
        Self { capacity_override }
    }

    /// Capacity a vehicle is planned with.
    #[must_use]
    pub const fn effective_capacity(&self, vehicle: &Vehicle) -> u32 {
        match self.capacity_override {
            Some(capacity) => capacity,
            None => vehicle.capacity_kg,
        }
    }

    /// Pair `groups` with `vehicles` in order.
    #[must_use]
    pub fn assign<'a>(&self, vehicles: &'a [Vehicle], groups: Vec<RouteGroup>) -> FleetAssignment<'a> {
        let mut assignment = FleetAssignment::default();
        let mut fleet = vehicles.iter();
        for group in groups.into_iter().filter(|group| !group.orders.is_empty()) {
            let Some(vehicle) = fleet.next() else {
                assignment.unassigned.extend(group.orders);
                continue;
            };
            let capacity_kg = self.effective_capacity(vehicle);
            if group.weight_kg > u64::from(capacity_kg) {
                warn!(
                    "{} kg of orders exceed the {capacity_kg} kg capacity of vehicle {}; leaving them unassigned",
                    group.weight_kg, vehicle.id
                );
                assignment.unassigned.extend(group.orders);
                continue;
            }
            assignment.assigned.push(Assignment {
                vehicle,
                capacity_kg,
                orders: group.orders,
            });
        }
        assignment
    }
}
