//! Deterministic distance sources, in-memory repositories and a trivial
//! optimizer used by unit and behaviour tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use jiff::civil::Date;

use crate::{
    DistanceError, DistanceSource, Leg, OptimizeError, OptimizeRequest, OptimizeResponse, Order,
    OrderId, OrderRepository, OrderStatus, RepositoryError, RoutePlan, RoutePlanId,
    RouteOptimizer, RouteRepository, Vehicle, VehicleRepository,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Treats degrees as a flat grid: `km_per_degree` kilometres per degree on
/// either axis.
///
/// Distances are symmetric, satisfy the triangle inequality and are cheap to
/// reason about in tests.
#[derive(Debug, Clone, Copy)]
pub struct PlanarDistanceSource {
    /// Scale applied to the Euclidean distance in degrees.
    pub km_per_degree: f64,
}

impl Default for PlanarDistanceSource {
    fn default() -> Self {
        Self {
            km_per_degree: 100.0,
        }
    }
}

impl DistanceSource for PlanarDistanceSource {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        let dlat = leg.to.latitude - leg.from.latitude;
        let dlon = leg.to.longitude - leg.from.longitude;
        Ok(dlat.hypot(dlon) * self.km_per_degree)
    }
}

/// Fails every lookup with a network error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingDistanceSource;

impl DistanceSource for FailingDistanceSource {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        Err(DistanceError::NetworkError {
            url: format!("test://{}/{}", leg.from, leg.to),
            message: "connection refused".into(),
        })
    }
}

/// Answers lookups from a script, then repeats a final response forever.
#[derive(Debug)]
pub struct ScriptedDistanceSource {
    script: Mutex<VecDeque<Result<f64, DistanceError>>>,
    exhausted: Result<f64, DistanceError>,
}

impl ScriptedDistanceSource {
    /// Serve `script` in order, then `exhausted` for every later lookup.
    pub fn new<I>(script: I, exhausted: Result<f64, DistanceError>) -> Self
    where
        I: IntoIterator<Item = Result<f64, DistanceError>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            exhausted,
        }
    }
}

impl DistanceSource for ScriptedDistanceSource {
    fn distance_km(&self, _leg: Leg) -> Result<f64, DistanceError> {
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.exhausted.clone())
    }
}

/// Counts single-leg lookups forwarded to an inner source.
#[derive(Debug, Default)]
pub struct CountingDistanceSource<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> CountingDistanceSource<S> {
    /// Wrap `inner`.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of legs resolved so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: DistanceSource> DistanceSource for CountingDistanceSource<S> {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.distance_km(leg)
    }
}

/// Orders kept in a vector.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    /// Seed the repository.
    pub fn new<I: IntoIterator<Item = Order>>(orders: I) -> Self {
        Self {
            orders: Mutex::new(orders.into_iter().collect()),
        }
    }

    /// Snapshot of every stored order.
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.orders).clone()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn eligible_orders(&self, date: Date) -> Result<Vec<Order>, RepositoryError> {
        Ok(lock(&self.orders)
            .iter()
            .filter(|order| order.requested_date == date && order.status.is_routable())
            .cloned()
            .collect())
    }

    fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(RepositoryError::OrderNotFound(id))?;
        order.status = status;
        Ok(())
    }
}

/// Vehicles kept in a vector.
#[derive(Debug, Default)]
pub struct InMemoryVehicleRepository {
    vehicles: Vec<Vehicle>,
}

impl InMemoryVehicleRepository {
    /// Seed the repository.
    pub fn new<I: IntoIterator<Item = Vehicle>>(vehicles: I) -> Self {
        Self {
            vehicles: vehicles.into_iter().collect(),
        }
    }
}

impl VehicleRepository for InMemoryVehicleRepository {
    fn active_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self
            .vehicles
            .iter()
            .filter(|vehicle| vehicle.active)
            .cloned()
            .collect())
    }
}

/// Route plans kept in a vector, with sequential identifiers.
#[derive(Debug, Default)]
pub struct InMemoryRouteRepository {
    routes: Mutex<Vec<RoutePlan>>,
    next_id: AtomicU64,
    failure: Option<String>,
}

impl InMemoryRouteRepository {
    /// A repository whose every write fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Snapshot of every stored plan.
    pub fn routes(&self) -> Vec<RoutePlan> {
        lock(&self.routes).clone()
    }
}

impl RouteRepository for InMemoryRouteRepository {
    fn create_route(&self, mut plan: RoutePlan) -> Result<RoutePlan, RepositoryError> {
        if let Some(message) = &self.failure {
            return Err(RepositoryError::Backend {
                message: message.clone(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        plan.id = Some(RoutePlanId(id));
        lock(&self.routes).push(plan.clone());
        Ok(plan)
    }
}

/// Puts every order on the first available vehicle, ignoring capacity.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleRouteOptimizer;

impl RouteOptimizer for SingleRouteOptimizer {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError> {
        if request.orders.is_empty() {
            return Ok(OptimizeResponse::default());
        }
        let vehicle = request
            .vehicles
            .iter()
            .find(|vehicle| vehicle.is_available())
            .ok_or(OptimizeError::NoCapacityAvailable {
                orders: request.orders.len(),
            })?;
        let mut orders = request.orders.clone();
        orders.retain_mut(|order| order.mark_assigned().is_ok());
        let plan = RoutePlan::new("Route 1", vehicle, request.date, orders);
        Ok(OptimizeResponse {
            plans: vec![plan],
            ..OptimizeResponse::default()
        })
    }
}
