//! Clarke–Wright savings between pairs of orders.
//!
//! Serving two orders on separate depot round trips costs more than joining
//! them where one order's route ends and the other's begins. The saving of a
//! join is the two depot legs it removes minus the connecting leg it adds.
//! Every order has two joinable ends, its pickup and its delivery, so each
//! pair yields four candidate joins.

use std::fmt;
use std::str::FromStr;

use fleetroute_core::{Coordinate, DistanceProvider, DistanceSource, Leg, Order};

/// Which ends of two orders a join connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combination {
    /// Pickup of the first order to pickup of the second.
    PickupPickup,
    /// Delivery of the first order to delivery of the second.
    DeliveryDelivery,
    /// Pickup of the first order to delivery of the second.
    PickupDelivery,
    /// Delivery of the first order to pickup of the second.
    DeliveryPickup,
}

impl Combination {
    /// Every combination, in candidate enumeration order.
    pub const ALL: [Self; 4] = [
        Self::PickupPickup,
        Self::DeliveryDelivery,
        Self::PickupDelivery,
        Self::DeliveryPickup,
    ];

    /// The joined ends: (end of the first order, end of the second order).
    const fn ends(self, first: &Anchor, second: &Anchor) -> (End, End) {
        match self {
            Self::PickupPickup => (first.pickup, second.pickup),
            Self::DeliveryDelivery => (first.delivery, second.delivery),
            Self::PickupDelivery => (first.pickup, second.delivery),
            Self::DeliveryPickup => (first.delivery, second.pickup),
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PickupPickup => "pickup-pickup",
            Self::DeliveryDelivery => "delivery-delivery",
            Self::PickupDelivery => "pickup-delivery",
            Self::DeliveryPickup => "delivery-pickup",
        })
    }
}

impl FromStr for Combination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|combination| combination.to_string() == s)
            .ok_or_else(|| format!("unknown combination: {s}"))
    }
}

/// A positive-valued join between two orders.
///
/// `first` and `second` index the order slice the candidates were computed
/// from, with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsCandidate {
    /// Index of the first order of the pair.
    pub first: usize,
    /// Index of the second order of the pair.
    pub second: usize,
    /// Ends being joined.
    pub combination: Combination,
    /// Kilometres saved by the join; always positive.
    pub value: f64,
}

/// One joinable location with its depot distance.
#[derive(Debug, Clone, Copy)]
struct End {
    at: Coordinate,
    from_depot_km: f64,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    pickup: End,
    delivery: End,
}

/// Rank every positive join between pairs of `orders`.
///
/// Pairs are enumerated `i < j` in input order and combinations in
/// [`Combination::ALL`] order. The result is sorted by value, highest first;
/// the sort is stable, so ties keep enumeration order and identical inputs
/// always rank identically.
#[must_use]
pub fn compute_savings<S: DistanceSource>(
    depot: Coordinate,
    orders: &[Order],
    provider: &DistanceProvider<S>,
) -> Vec<SavingsCandidate> {
    let anchors: Vec<Anchor> = orders
        .iter()
        .map(|order| Anchor {
            pickup: End {
                at: order.pickup,
                from_depot_km: provider.distance(depot, order.pickup),
            },
            delivery: End {
                at: order.delivery,
                from_depot_km: provider.distance(depot, order.delivery),
            },
        })
        .collect();

    let mut candidates = Vec::new();
    for (first, a) in anchors.iter().enumerate() {
        for (second, b) in anchors.iter().enumerate().skip(first + 1) {
            for combination in Combination::ALL {
                let (from, to) = combination.ends(a, b);
                let value =
                    from.from_depot_km + to.from_depot_km - provider.distance(from.at, to.at);
                if value > 0.0 {
                    candidates.push(SavingsCandidate {
                        first,
                        second,
                        combination,
                        value,
                    });
                }
            }
        }
    }
    candidates.sort_by(|lhs, rhs| rhs.value.total_cmp(&lhs.value));
    candidates
}

/// Every leg planning `orders` from `depot` can ask for.
///
/// Covers the depot legs and pairwise joins used by [`compute_savings`] and
/// every leg a route walk over any ordering of the orders can take, so one
/// batched prefetch answers the whole run.
#[must_use]
pub fn planning_legs(depot: Coordinate, orders: &[Order]) -> Vec<Leg> {
    let mut legs = Vec::with_capacity(orders.len() * (orders.len() * 5 + 4));
    for order in orders {
        legs.extend([
            Leg::new(depot, order.pickup),
            Leg::new(depot, order.delivery),
            Leg::new(order.pickup, order.delivery),
            Leg::new(order.delivery, depot),
        ]);
    }
    for (idx, a) in orders.iter().enumerate() {
        for b in orders.iter().skip(idx + 1) {
            legs.extend([
                Leg::new(a.pickup, b.pickup),
                Leg::new(a.delivery, b.delivery),
                Leg::new(a.pickup, b.delivery),
                Leg::new(a.delivery, b.pickup),
                Leg::new(b.delivery, a.pickup),
            ]);
        }
    }
    legs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{order, planar_provider};
    use rstest::rstest;

    const DEPOT: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    #[rstest]
    fn single_order_has_no_candidates() {
        let provider = planar_provider();
        let orders = [order(1, (0.0, 1.0), (0.0, 2.0), 10)];

        assert!(compute_savings(DEPOT, &orders, &provider).is_empty());
    }

    #[rstest]
    fn values_follow_the_savings_formula() {
        let provider = planar_provider();
        // 100 km per degree: pickups at 100 km and 200 km east, deliveries north.
        let orders = [
            order(1, (0.0, 1.0), (1.0, 0.0), 10),
            order(2, (0.0, 2.0), (2.0, 0.0), 10),
        ];

        let candidates = compute_savings(DEPOT, &orders, &provider);

        let pickup_pickup = candidates
            .iter()
            .find(|candidate| candidate.combination == Combination::PickupPickup)
            .expect("pickup-pickup saving is positive");
        assert!((pickup_pickup.value - 200.0).abs() < 1e-9);
        assert_eq!((pickup_pickup.first, pickup_pickup.second), (0, 1));
    }

    #[rstest]
    fn opposite_directions_save_nothing() {
        let provider = planar_provider();
        let orders = [
            order(1, (0.0, 1.0), (0.0, 1.0), 10),
            order(2, (0.0, -1.0), (0.0, -1.0), 10),
        ];

        assert!(compute_savings(DEPOT, &orders, &provider).is_empty());
    }

    #[rstest]
    fn candidates_are_sorted_descending_with_stable_ties() {
        let provider = planar_provider();
        // Pickup and delivery coincide, so all four joins of a pair tie.
        let orders = [
            order(1, (0.0, 1.0), (0.0, 1.0), 10),
            order(2, (0.0, 1.5), (0.0, 1.5), 10),
            order(3, (0.0, 3.0), (0.0, 3.0), 10),
        ];

        let candidates = compute_savings(DEPOT, &orders, &provider);

        assert!(
            candidates
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.value >= b.value))
        );
        let tied: Vec<Combination> = candidates
            .iter()
            .filter(|candidate| (candidate.first, candidate.second) == (1, 2))
            .map(|candidate| candidate.combination)
            .collect();
        assert_eq!(tied, Combination::ALL.to_vec());
    }

    #[rstest]
    fn planning_legs_cover_every_lookup() {
        let provider = planar_provider();
        let orders = [
            order(1, (0.0, 1.0), (1.0, 1.0), 10),
            order(2, (0.0, 2.0), (2.0, 1.0), 10),
            order(3, (1.0, 3.0), (2.0, 2.0), 10),
        ];
        let fetched = provider.prefetch(&planning_legs(DEPOT, &orders));
        let misses_before = provider.cache_stats().misses;
        assert!(fetched > 0);

        let _ = compute_savings(DEPOT, &orders, &provider);

        assert_eq!(provider.cache_stats().misses, misses_before);
    }

    #[rstest]
    #[case("pickup-pickup", Combination::PickupPickup)]
    #[case("delivery-pickup", Combination::DeliveryPickup)]
    fn combinations_parse_from_their_labels(#[case] label: &str, #[case] expected: Combination) {
        assert_eq!(label.parse::<Combination>(), Ok(expected));
    }
}
