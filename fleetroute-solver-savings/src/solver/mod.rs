//! `SavingsOptimizer`: the Clarke–Wright [`RouteOptimizer`].

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::time::Instant;

use log::{debug, info, warn};

use fleetroute_core::{
    Coordinate, DistanceProvider, DistanceSource, Location, OptimizeDiagnostics, OptimizeError,
    OptimizeRequest, OptimizeResponse, Order, RouteOptimizer, Vehicle,
};

use crate::assign::FleetAssigner;
use crate::build::RouteBuilder;
use crate::merge::{RouteMerger, VehicleAdvancePolicy};
use crate::savings::{compute_savings, planning_legs};

/// Default depot: central Berlin.
pub const DEFAULT_DEPOT: Coordinate = Coordinate {
    latitude: 52.52,
    longitude: 13.405,
};

/// Default number of deliveries a vehicle takes before the next one is used.
pub const DEFAULT_MIN_DELIVERIES_PER_VEHICLE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(min) => min,
    None => NonZeroUsize::MIN,
};

/// Default average driving speed for duration estimates.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Default plan name prefix; plans are named `"{prefix} {k}"`.
pub const DEFAULT_ROUTE_NAME_PREFIX: &str = "Optimized Route";

/// Configuration for [`SavingsOptimizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsOptimizerConfig {
    /// Where every route starts and ends.
    pub depot: Coordinate,
    /// Deliveries a vehicle should carry before the next one is used.
    pub min_deliveries_per_vehicle: NonZeroUsize,
    /// Capacity applied to every vehicle instead of its own.
    pub vehicle_capacity_override: Option<u32>,
    /// How eagerly routes move on to the next vehicle.
    pub advance_policy: VehicleAdvancePolicy,
    /// Speed used to estimate plan durations.
    pub average_speed_kmh: f64,
    /// Prefix of generated plan names.
    pub route_name_prefix: String,
}

impl Default for SavingsOptimizerConfig {
    fn default() -> Self {
        Self {
            depot: DEFAULT_DEPOT,
            min_deliveries_per_vehicle: DEFAULT_MIN_DELIVERIES_PER_VEHICLE,
            vehicle_capacity_override: None,
            advance_policy: VehicleAdvancePolicy::default(),
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            route_name_prefix: DEFAULT_ROUTE_NAME_PREFIX.to_owned(),
        }
    }
}

impl SavingsOptimizerConfig {
    /// Start and end routes at `depot`.
    #[must_use]
    pub const fn with_depot(mut self, depot: Coordinate) -> Self {
        self.depot = depot;
        self
    }

    /// Set the per-vehicle delivery minimum.
    #[must_use]
    pub const fn with_min_deliveries_per_vehicle(mut self, min: NonZeroUsize) -> Self {
        self.min_deliveries_per_vehicle = min;
        self
    }

    /// Plan every vehicle with `capacity_kg` instead of its own capacity.
    #[must_use]
    pub const fn with_vehicle_capacity_override(mut self, capacity_kg: u32) -> Self {
        self.vehicle_capacity_override = Some(capacity_kg);
        self
    }

    /// Set the vehicle advance policy.
    #[must_use]
    pub const fn with_advance_policy(mut self, policy: VehicleAdvancePolicy) -> Self {
        self.advance_policy = policy;
        self
    }

    /// Set the speed used for duration estimates.
    #[must_use]
    pub const fn with_average_speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.average_speed_kmh = speed_kmh;
        self
    }

    /// Set the plan name prefix.
    #[must_use]
    pub fn with_route_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_name_prefix = prefix.into();
        self
    }
}

/// Plans multi-vehicle pickup-and-delivery routes with the savings
/// heuristic.
///
/// The optimizer is deterministic: the same request against the same
/// distances always yields the same plans. Distances come from a
/// [`DistanceProvider`], whose cache may be shared with other optimizers.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use fleetroute_core::{
///     Coordinate, DistanceCache, DistanceProvider, HaversineDistanceSource, OptimizeRequest,
///     Order, OrderId, RouteOptimizer, Vehicle, VehicleId,
/// };
/// use fleetroute_solver_savings::SavingsOptimizer;
/// use jiff::civil::date;
///
/// let provider = DistanceProvider::new(
///     HaversineDistanceSource,
///     Arc::new(DistanceCache::unbounded()),
/// );
/// let optimizer = SavingsOptimizer::new(provider);
/// let day = date(2024, 5, 6);
/// let request = OptimizeRequest {
///     date: day,
///     orders: vec![Order::new(
///         OrderId(1),
///         Coordinate { latitude: 52.50, longitude: 13.40 },
///         Coordinate { latitude: 52.55, longitude: 13.45 },
///         120,
///         day,
///     )],
///     vehicles: vec![Vehicle::new(VehicleId(1))],
/// };
///
/// let response = optimizer.optimize(&request)?;
/// assert_eq!(response.plans.len(), 1);
/// # Ok::<(), fleetroute_core::OptimizeError>(())
/// ```
#[derive(Debug)]
pub struct SavingsOptimizer<S> {
    provider: DistanceProvider<S>,
    config: SavingsOptimizerConfig,
}

impl<S: DistanceSource> SavingsOptimizer<S> {
    /// Construct an optimizer using default configuration.
    #[must_use]
    pub fn new(provider: DistanceProvider<S>) -> Self {
        Self::with_config(provider, SavingsOptimizerConfig::default())
    }

    /// Construct an optimizer with explicit configuration.
    #[must_use]
    pub const fn with_config(provider: DistanceProvider<S>, config: SavingsOptimizerConfig) -> Self {
        Self { provider, config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SavingsOptimizerConfig {
        &self.config
    }

    /// Distance provider the optimizer plans with.
    #[must_use]
    pub const fn provider(&self) -> &DistanceProvider<S> {
        &self.provider
    }

    fn validate(&self, orders: &[Order]) -> Result<(), OptimizeError> {
        self.config
            .depot
            .validate()
            .map_err(|source| OptimizeError::InvalidCoordinate {
                location: Location::Depot,
                source,
            })?;
        for order in orders {
            order
                .pickup
                .validate()
                .map_err(|source| OptimizeError::InvalidCoordinate {
                    location: Location::Pickup(order.id),
                    source,
                })?;
            order
                .delivery
                .validate()
                .map_err(|source| OptimizeError::InvalidCoordinate {
                    location: Location::Delivery(order.id),
                    source,
                })?;
            if order.weight_kg == 0 {
                return Err(OptimizeError::InvalidWeight { order: order.id });
            }
        }
        Ok(())
    }
}

impl<S: DistanceSource> RouteOptimizer for SavingsOptimizer<S> {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError> {
        let started_at = Instant::now();
        if request.orders.is_empty() {
            debug!("no orders for {}; nothing to plan", request.date);
            return Ok(OptimizeResponse {
                diagnostics: OptimizeDiagnostics {
                    elapsed: started_at.elapsed(),
                    ..OptimizeDiagnostics::default()
                },
                ..OptimizeResponse::default()
            });
        }
        self.validate(&request.orders)?;

        let assigner = FleetAssigner::new(self.config.vehicle_capacity_override);
        let fleet: Vec<Vehicle> = request
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.is_available() && assigner.effective_capacity(vehicle) > 0)
            .cloned()
            .collect();
        if fleet.is_empty() {
            return Err(OptimizeError::NoCapacityAvailable {
                orders: request.orders.len(),
            });
        }

        let (eligible, ineligible): (Vec<Order>, Vec<Order>) = request
            .orders
            .iter()
            .cloned()
            .partition(|order| order.status.is_routable());
        for order in &ineligible {
            warn!("skipping {}: status is {}", order.id, order.status);
        }

        let stats_before = self.provider.cache_stats();
        let depot = self.config.depot;
        let fetched = self.provider.prefetch(&planning_legs(depot, &eligible));
        debug!("prefetched {fetched} legs for {} orders", eligible.len());

        let candidates = compute_savings(depot, &eligible, &self.provider);
        let weights: Vec<u32> = eligible.iter().map(|order| order.weight_kg).collect();
        let capacities: Vec<u32> = fleet
            .iter()
            .map(|vehicle| assigner.effective_capacity(vehicle))
            .collect();
        let outcome = RouteMerger::new(
            &capacities,
            self.config.min_deliveries_per_vehicle,
            self.config.advance_policy,
        )
        .merge(&candidates, &weights);
        let assignment = assigner.assign(&fleet, outcome.groups);

        let builder = RouteBuilder::new(
            &self.provider,
            depot,
            &self.config.route_name_prefix,
            self.config.average_speed_kmh,
        );
        let plans: Vec<_> = assignment
            .assigned
            .iter()
            .zip(1..)
            .map(|(route, position)| builder.build(position, route, &eligible, request.date))
            .collect();

        let planned: HashSet<_> = plans.iter().flat_map(|plan| plan.order_ids()).collect();
        let unassigned: Vec<_> = request
            .orders
            .iter()
            .map(|order| order.id)
            .filter(|id| !planned.contains(id))
            .collect();

        let stats_after = self.provider.cache_stats();
        let diagnostics = OptimizeDiagnostics {
            elapsed: started_at.elapsed(),
            candidates: candidates.len(),
            merges: outcome.merges.len(),
            cache_hits: stats_after.hits.saturating_sub(stats_before.hits),
            cache_misses: stats_after
                .misses
                .saturating_sub(stats_before.misses)
                .saturating_add(u64::try_from(fetched).unwrap_or(u64::MAX)),
        };
        info!(
            "planned {} of {} orders for {} on {} routes ({} unassigned) in {:?}",
            planned.len(),
            request.orders.len(),
            request.date,
            plans.len(),
            unassigned.len(),
            diagnostics.elapsed
        );

        Ok(OptimizeResponse {
            plans,
            unassigned,
            diagnostics,
        })
    }
}
