//! Behavioural tests for `plan_day` against in-memory repositories.

use std::cell::RefCell;

use fleetroute_core::test_support::{
    InMemoryOrderRepository, InMemoryRouteRepository, InMemoryVehicleRepository,
    SingleRouteOptimizer,
};
use fleetroute_core::{
    Coordinate, Order, OrderId, OrderStatus, OptimizeResponse, PlanningError, Vehicle, VehicleId,
    plan_day,
};
use jiff::civil::{Date, date};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const PLANNING_DAY: Date = date(2024, 5, 6);

struct PlanningWorld {
    orders: InMemoryOrderRepository,
    vehicles: InMemoryVehicleRepository,
    routes: InMemoryRouteRepository,
    outcome: Option<Result<OptimizeResponse, PlanningError>>,
}

#[fixture]
fn world() -> RefCell<PlanningWorld> {
    RefCell::new(PlanningWorld {
        orders: InMemoryOrderRepository::default(),
        vehicles: InMemoryVehicleRepository::default(),
        routes: InMemoryRouteRepository::default(),
        outcome: None,
    })
}

fn order(id: u64) -> Order {
    let depot_side = Coordinate {
        latitude: 52.5,
        longitude: 13.4,
    };
    Order::new(OrderId(id), depot_side, depot_side, 25, PLANNING_DAY)
}

#[given("two pending orders for the planning day")]
fn two_orders(#[from(world)] world: &RefCell<PlanningWorld>) {
    world.borrow_mut().orders = InMemoryOrderRepository::new([order(1), order(2)]);
}

#[given("one active vehicle")]
fn one_vehicle(#[from(world)] world: &RefCell<PlanningWorld>) {
    world.borrow_mut().vehicles = InMemoryVehicleRepository::new([Vehicle::new(VehicleId(1))]);
}

#[given("a route store that rejects writes")]
fn failing_store(#[from(world)] world: &RefCell<PlanningWorld>) {
    world.borrow_mut().routes = InMemoryRouteRepository::failing("read-only replica");
}

#[when("the day is planned")]
fn plan(#[from(world)] world: &RefCell<PlanningWorld>) {
    let mut state = world.borrow_mut();
    let outcome = plan_day(
        &SingleRouteOptimizer,
        &state.orders,
        &state.vehicles,
        &state.routes,
        PLANNING_DAY,
    );
    state.outcome = Some(outcome);
}

#[then("one route is stored with an identifier")]
fn route_stored(#[from(world)] world: &RefCell<PlanningWorld>) {
    let state = world.borrow();
    let routes = state.routes.routes();
    assert_eq!(routes.len(), 1);
    assert!(routes.iter().all(|route| route.id.is_some()));
}

#[then("every planned order is assigned")]
fn orders_assigned(#[from(world)] world: &RefCell<PlanningWorld>) {
    let state = world.borrow();
    assert!(
        state
            .orders
            .orders()
            .iter()
            .all(|order| order.status == OrderStatus::Assigned)
    );
}

#[then("planning fails while persisting")]
fn persist_failed(#[from(world)] world: &RefCell<PlanningWorld>) {
    let state = world.borrow();
    assert!(matches!(
        state.outcome,
        Some(Err(PlanningError::Persist { .. }))
    ));
}

#[then("every order is still pending")]
fn orders_pending(#[from(world)] world: &RefCell<PlanningWorld>) {
    let state = world.borrow();
    assert!(
        state
            .orders
            .orders()
            .iter()
            .all(|order| order.status == OrderStatus::Pending)
    );
}

#[scenario(path = "tests/features/day_planning.feature", index = 0)]
fn orders_are_planned(world: RefCell<PlanningWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/day_planning.feature", index = 1)]
fn failed_persistence_keeps_orders_pending(world: RefCell<PlanningWorld>) {
    let _ = world;
}
