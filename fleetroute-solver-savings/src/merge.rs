//! Greedy route merging driven by ranked savings.
//!
//! Every order starts on its own route. Candidates are applied best first;
//! each applied join concatenates two routes and hands the result to the
//! vehicle currently being filled. Vehicles are filled one after another: a
//! vehicle owns at most one route, and once the merger moves on to the next
//! vehicle the previous route is closed.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use log::{debug, trace};

use crate::savings::{Combination, SavingsCandidate};

/// When the merger may stop filling the current vehicle and open a route on
/// the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VehicleAdvancePolicy {
    /// Keep growing the current vehicle's route until it carries the minimum
    /// number of deliveries or cannot take even the lightest unrouted order;
    /// joins that would open a second route are skipped until then.
    #[default]
    RespectMinimum,
    /// Open a route on the next vehicle as soon as the best remaining join
    /// does not extend the current one.
    PreferSavings,
}

impl fmt::Display for VehicleAdvancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RespectMinimum => "respect-minimum",
            Self::PreferSavings => "prefer-savings",
        })
    }
}

impl FromStr for VehicleAdvancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "respect-minimum" => Ok(Self::RespectMinimum),
            "prefer-savings" => Ok(Self::PreferSavings),
            other => Err(format!(
                "unknown vehicle advance policy `{other}` (expected respect-minimum or prefer-savings)"
            )),
        }
    }
}

/// Orders sharing one route, in visitation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    /// Indices into the order slice the merge ran over.
    pub orders: Vec<usize>,
    /// Combined weight of the orders.
    pub weight_kg: u64,
    /// Index of the owning vehicle, if the group came out of a merge.
    pub vehicle: Option<usize>,
}

impl RouteGroup {
    fn single(order: usize, weight_kg: u32) -> Self {
        Self {
            orders: vec![order],
            weight_kg: u64::from(weight_kg),
            vehicle: None,
        }
    }
}

/// A join the merger applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedMerge {
    /// The candidate that drove the join.
    pub candidate: SavingsCandidate,
    /// Vehicle that took the merged route.
    pub vehicle: usize,
}

/// Result of [`RouteMerger::merge`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeOutcome {
    /// Vehicle-owned groups in vehicle order, then the untouched single-order
    /// groups in input order. Every order appears in exactly one group.
    pub groups: Vec<RouteGroup>,
    /// Joins in the order they were applied.
    pub merges: Vec<AppliedMerge>,
}

/// Applies ranked savings to single-order routes under vehicle capacities.
#[derive(Debug, Clone, Copy)]
pub struct RouteMerger<'a> {
    capacities: &'a [u32],
    min_deliveries: NonZeroUsize,
    policy: VehicleAdvancePolicy,
}

impl<'a> RouteMerger<'a> {
    /// Merge under the given per-vehicle capacities, in fill order.
    #[must_use]
    pub const fn new(
        capacities: &'a [u32],
        min_deliveries: NonZeroUsize,
        policy: VehicleAdvancePolicy,
    ) -> Self {
        Self {
            capacities,
            min_deliveries,
            policy,
        }
    }

    /// Apply `candidates`, best first, to one route per entry of `weights`.
    ///
    /// Candidates must be sorted by descending value and index into the same
    /// order slice as `weights`. The scan stops at the first non-positive
    /// candidate or once every vehicle has been used.
    #[must_use]
    pub fn merge(&self, candidates: &[SavingsCandidate], weights: &[u32]) -> MergeOutcome {
        let mut state = MergeState::new(weights, self.capacities.len());
        let mut merges = Vec::new();

        for candidate in candidates {
            if candidate.value <= 0.0 {
                break;
            }
            match self.try_apply(&mut state, candidate) {
                Step::Applied(vehicle) => merges.push(AppliedMerge {
                    candidate: *candidate,
                    vehicle,
                }),
                Step::Skipped => {}
                Step::FleetExhausted => {
                    debug!("every vehicle is in use; stopping after {} merges", merges.len());
                    break;
                }
            }
        }

        MergeOutcome {
            groups: state.into_groups(),
            merges,
        }
    }

    fn capacity(&self, vehicle: usize) -> Option<u64> {
        self.capacities.get(vehicle).copied().map(u64::from)
    }

    fn try_apply(&self, state: &mut MergeState, candidate: &SavingsCandidate) -> Step {
        let Some(mut capacity) = self.capacity(state.active) else {
            return Step::FleetExhausted;
        };
        let (Some(first_slot), Some(second_slot)) = (
            state.slot_of.get(candidate.first).copied(),
            state.slot_of.get(candidate.second).copied(),
        ) else {
            return Step::Skipped;
        };
        if first_slot == second_slot {
            return Step::Skipped;
        }
        let (Some(first), Some(second)) = (state.group(first_slot), state.group(second_slot))
        else {
            return Step::Skipped;
        };

        let owners = [first.vehicle, second.vehicle];
        if owners.iter().flatten().any(|owner| *owner != state.active) {
            trace!("skipping {candidate:?}: a route is closed");
            return Step::Skipped;
        }
        let combined = first.weight_kg + second.weight_kg;
        if combined > capacity {
            return Step::Skipped;
        }

        let extends_active = owners.contains(&Some(state.active));
        if !extends_active && let Some(delivered) = state.active_deliveries() {
            if self.policy == VehicleAdvancePolicy::RespectMinimum
                && delivered < self.min_deliveries.get()
                && !state.active_is_full(capacity)
            {
                return Step::Skipped;
            }
            state.active += 1;
            let Some(next) = self.capacity(state.active) else {
                return Step::FleetExhausted;
            };
            debug!(
                "vehicle {} closed with {delivered} deliveries; filling vehicle {}",
                state.active - 1,
                state.active
            );
            capacity = next;
            if combined > capacity {
                return Step::Skipped;
            }
        }

        state.join(first_slot, second_slot, candidate.combination);
        Step::Applied(state.active)
    }
}

enum Step {
    Applied(usize),
    Skipped,
    FleetExhausted,
}

struct MergeState {
    slots: Vec<Option<RouteGroup>>,
    slot_of: Vec<usize>,
    owned: Vec<Option<usize>>,
    active: usize,
}

impl MergeState {
    fn new(weights: &[u32], vehicles: usize) -> Self {
        Self {
            slots: weights
                .iter()
                .enumerate()
                .map(|(order, weight)| Some(RouteGroup::single(order, *weight)))
                .collect(),
            slot_of: (0..weights.len()).collect(),
            owned: vec![None; vehicles],
            active: 0,
        }
    }

    fn group(&self, slot: usize) -> Option<&RouteGroup> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn take(&mut self, slot: usize) -> Option<RouteGroup> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    fn active_group(&self) -> Option<&RouteGroup> {
        let slot = self.owned.get(self.active).copied().flatten()?;
        self.group(slot)
    }

    /// Deliveries on the active vehicle's route, if it has one.
    fn active_deliveries(&self) -> Option<usize> {
        self.active_group().map(|group| group.orders.len())
    }

    /// Whether the active route is too heavy to take any unrouted order.
    fn active_is_full(&self, capacity: u64) -> bool {
        let Some(load) = self.active_group().map(|group| group.weight_kg) else {
            return false;
        };
        self.slots
            .iter()
            .flatten()
            .filter(|group| group.vehicle.is_none())
            .map(|group| group.weight_kg)
            .min()
            .is_none_or(|lightest| load + lightest > capacity)
    }

    /// Join the group in `first_slot` (holding the candidate's first order)
    /// with the group in `second_slot` and give it to the active vehicle.
    fn join(&mut self, first_slot: usize, second_slot: usize, combination: Combination) {
        let (Some(first), Some(second)) = (self.take(first_slot), self.take(second_slot)) else {
            return;
        };
        let weight_kg = first.weight_kg + second.weight_kg;
        let orders = join_orders(combination, first.orders, second.orders);

        let kept = first_slot.min(second_slot);
        for order in &orders {
            if let Some(slot) = self.slot_of.get_mut(*order) {
                *slot = kept;
            }
        }
        if let Some(slot) = self.slots.get_mut(kept) {
            *slot = Some(RouteGroup {
                orders,
                weight_kg,
                vehicle: Some(self.active),
            });
        }
        if let Some(owned) = self.owned.get_mut(self.active) {
            *owned = Some(kept);
        }
    }

    fn into_groups(self) -> Vec<RouteGroup> {
        let mut groups: Vec<RouteGroup> = self.slots.into_iter().flatten().collect();
        groups.sort_by_key(|group| group.vehicle.map_or((1, 0), |vehicle| (0, vehicle)));
        groups
    }
}

/// Concatenate two routes so the joined ends meet.
fn join_orders(combination: Combination, first: Vec<usize>, second: Vec<usize>) -> Vec<usize> {
    match combination {
        Combination::PickupPickup => second.into_iter().rev().chain(first).collect(),
        Combination::DeliveryDelivery | Combination::PickupDelivery => {
            first.into_iter().chain(second).collect()
        }
        Combination::DeliveryPickup => second.into_iter().chain(first).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MIN_ONE: NonZeroUsize = NonZeroUsize::MIN;

    fn candidate(first: usize, second: usize, combination: Combination, value: f64) -> SavingsCandidate {
        SavingsCandidate {
            first,
            second,
            combination,
            value,
        }
    }

    fn orders_of(outcome: &MergeOutcome) -> Vec<Vec<usize>> {
        outcome
            .groups
            .iter()
            .map(|group| group.orders.clone())
            .collect()
    }

    #[rstest]
    fn no_candidates_leave_singletons() {
        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::default())
            .merge(&[], &[10, 20, 30]);

        assert_eq!(orders_of(&outcome), vec![vec![0], vec![1], vec![2]]);
        assert!(outcome.merges.is_empty());
    }

    #[rstest]
    #[case(Combination::PickupPickup, vec![1, 0])]
    #[case(Combination::DeliveryDelivery, vec![0, 1])]
    #[case(Combination::PickupDelivery, vec![0, 1])]
    #[case(Combination::DeliveryPickup, vec![1, 0])]
    fn pair_joins_follow_the_combination(
        #[case] combination: Combination,
        #[case] expected: Vec<usize>,
    ) {
        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::default())
            .merge(&[candidate(0, 1, combination, 5.0)], &[10, 10]);

        assert_eq!(orders_of(&outcome), vec![expected]);
        assert_eq!(outcome.groups.first().map(|group| group.weight_kg), Some(20));
    }

    #[rstest]
    fn pickup_pickup_reverses_the_second_route() {
        let candidates = [
            candidate(1, 2, Combination::DeliveryDelivery, 9.0),
            candidate(0, 1, Combination::PickupPickup, 5.0),
        ];

        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::default())
            .merge(&candidates, &[10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![2, 1, 0]]);
    }

    #[rstest]
    fn joins_exceeding_capacity_are_skipped() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(0, 2, Combination::DeliveryDelivery, 8.0),
        ];

        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::default())
            .merge(&candidates, &[60, 50, 40]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 2], vec![1]]);
        assert_eq!(outcome.merges.len(), 1);
    }

    #[rstest]
    fn respect_minimum_keeps_filling_the_first_vehicle() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
            candidate(1, 2, Combination::DeliveryDelivery, 1.0),
        ];
        let min = NonZeroUsize::new(3).unwrap_or(MIN_ONE);

        let outcome = RouteMerger::new(&[100, 100], min, VehicleAdvancePolicy::RespectMinimum)
            .merge(&candidates, &[10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1, 2], vec![3]]);
        assert!(outcome.merges.iter().all(|merge| merge.vehicle == 0));
    }

    #[rstest]
    fn reaching_the_minimum_moves_to_the_next_vehicle() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
            candidate(1, 2, Combination::DeliveryDelivery, 1.0),
        ];
        let min = NonZeroUsize::new(2).unwrap_or(MIN_ONE);

        let outcome = RouteMerger::new(&[100, 100], min, VehicleAdvancePolicy::RespectMinimum)
            .merge(&candidates, &[10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1], vec![2, 3]]);
        let vehicles: Vec<usize> = outcome.merges.iter().map(|merge| merge.vehicle).collect();
        assert_eq!(vehicles, vec![0, 1]);
    }

    #[rstest]
    fn full_vehicle_hands_over_before_reaching_the_minimum() {
        let candidates = [
            candidate(2, 3, Combination::DeliveryDelivery, 9.0),
            candidate(1, 2, Combination::DeliveryDelivery, 8.0),
            candidate(0, 1, Combination::DeliveryDelivery, 7.0),
            candidate(0, 2, Combination::DeliveryDelivery, 6.0),
        ];
        let min = NonZeroUsize::new(3).unwrap_or(MIN_ONE);

        let outcome = RouteMerger::new(&[100, 100], min, VehicleAdvancePolicy::RespectMinimum)
            .merge(&candidates, &[50, 50, 50, 50]);

        assert_eq!(orders_of(&outcome), vec![vec![2, 3], vec![0, 1]]);
        let vehicles: Vec<usize> = outcome.merges.iter().map(|merge| merge.vehicle).collect();
        assert_eq!(vehicles, vec![0, 1]);
    }

    #[rstest]
    fn room_for_another_order_keeps_the_vehicle_open() {
        let candidates = [
            candidate(2, 3, Combination::DeliveryDelivery, 9.0),
            candidate(0, 1, Combination::DeliveryDelivery, 8.0),
            candidate(3, 0, Combination::DeliveryDelivery, 7.0),
        ];
        let min = NonZeroUsize::new(3).unwrap_or(MIN_ONE);

        let outcome = RouteMerger::new(&[100, 100], min, VehicleAdvancePolicy::RespectMinimum)
            .merge(&candidates, &[30, 50, 30, 30]);

        assert_eq!(orders_of(&outcome), vec![vec![2, 3, 0], vec![1]]);
        assert!(outcome.merges.iter().all(|merge| merge.vehicle == 0));
    }

    #[rstest]
    fn prefer_savings_opens_routes_eagerly() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
        ];
        let min = NonZeroUsize::new(5).unwrap_or(MIN_ONE);

        let outcome = RouteMerger::new(&[100, 100], min, VehicleAdvancePolicy::PreferSavings)
            .merge(&candidates, &[10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1], vec![2, 3]]);
    }

    #[rstest]
    fn closed_routes_are_not_extended() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
            candidate(1, 4, Combination::DeliveryDelivery, 7.0),
        ];

        let outcome = RouteMerger::new(&[100, 100], MIN_ONE, VehicleAdvancePolicy::PreferSavings)
            .merge(&candidates, &[10, 10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[rstest]
    fn running_out_of_vehicles_stops_merging() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
        ];

        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::PreferSavings)
            .merge(&candidates, &[10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[rstest]
    fn advancing_rechecks_the_next_capacity() {
        let candidates = [
            candidate(0, 1, Combination::DeliveryDelivery, 9.0),
            candidate(2, 3, Combination::DeliveryDelivery, 8.0),
        ];

        let outcome = RouteMerger::new(&[100, 15], MIN_ONE, VehicleAdvancePolicy::PreferSavings)
            .merge(&candidates, &[10, 10, 10, 10]);

        assert_eq!(orders_of(&outcome), vec![vec![0, 1], vec![2], vec![3]]);
    }

    #[rstest]
    fn non_positive_candidates_end_the_scan() {
        let candidates = [candidate(0, 1, Combination::DeliveryDelivery, 0.0)];

        let outcome = RouteMerger::new(&[100], MIN_ONE, VehicleAdvancePolicy::default())
            .merge(&candidates, &[10, 10]);

        assert!(outcome.merges.is_empty());
    }

    #[rstest]
    fn policies_parse_from_their_labels() {
        for policy in [
            VehicleAdvancePolicy::RespectMinimum,
            VehicleAdvancePolicy::PreferSavings,
        ] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
        assert!("greedy".parse::<VehicleAdvancePolicy>().is_err());
    }
}
