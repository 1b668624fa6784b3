//! Behavioural tests for planning distances over `OsrmDistanceSource`.

mod support;

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use fleetroute_core::{Coordinate, DistanceCache, DistanceProvider, haversine_km};
use fleetroute_data::routing::{OsrmDistanceSource, OsrmDistanceSourceConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::{Reply, StubOsrmServer, closed_port_url};

const BERLIN: Coordinate = Coordinate {
    latitude: 52.52,
    longitude: 13.405,
};
const POTSDAM: Coordinate = Coordinate {
    latitude: 52.3906,
    longitude: 13.0645,
};

#[derive(Default)]
struct OsrmWorld {
    // Kept alive for the scenario so the port stays bound.
    server: Option<StubOsrmServer>,
    base_url: Option<String>,
    distance: Option<f64>,
}

#[fixture]
fn world() -> RefCell<OsrmWorld> {
    RefCell::new(OsrmWorld::default())
}

fn serve(world: &RefCell<OsrmWorld>, reply: Reply) {
    let server = StubOsrmServer::start(move |_| reply.clone());
    let mut state = world.borrow_mut();
    state.base_url = Some(server.base_url().to_owned());
    state.server = Some(server);
}

#[given("an OSRM service reporting 7300 metres for every route")]
fn healthy_service(#[from(world)] world: &RefCell<OsrmWorld>) {
    serve(world, Reply::distance(7300.0));
}

#[given("an OSRM service that cannot be reached")]
fn unreachable_service(#[from(world)] world: &RefCell<OsrmWorld>) {
    world.borrow_mut().base_url = Some(closed_port_url());
}

#[given("an OSRM service that finds no route")]
fn no_route_service(#[from(world)] world: &RefCell<OsrmWorld>) {
    serve(world, Reply::json(200, r#"{"code":"NoRoute","message":"Impossible route"}"#));
}

#[when("the planner asks for the distance from Berlin to Potsdam")]
fn ask(#[from(world)] world: &RefCell<OsrmWorld>) {
    let base_url = world
        .borrow()
        .base_url
        .clone()
        .expect("service configured");
    let config = OsrmDistanceSourceConfig::new(base_url).with_timeout(Duration::from_secs(2));
    let source = OsrmDistanceSource::with_config(config).expect("source should build");
    let provider = DistanceProvider::new(source, Arc::new(DistanceCache::unbounded()));
    world.borrow_mut().distance = Some(provider.distance(BERLIN, POTSDAM));
}

#[then("the distance is 7.3 km")]
fn road_distance(#[from(world)] world: &RefCell<OsrmWorld>) {
    let km = world.borrow().distance.expect("distance requested");
    assert!((km - 7.3).abs() < 1e-9, "got {km} km");
}

#[then("the distance is the great-circle distance")]
fn great_circle_distance(#[from(world)] world: &RefCell<OsrmWorld>) {
    let km = world.borrow().distance.expect("distance requested");
    assert_eq!(km, haversine_km(BERLIN, POTSDAM));
}

#[scenario(path = "tests/features/osrm_distance.feature", index = 0)]
fn healthy_service_supplies_road_distances(world: RefCell<OsrmWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_distance.feature", index = 1)]
fn unreachable_service_falls_back(world: RefCell<OsrmWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/osrm_distance.feature", index = 2)]
fn service_error_falls_back(world: RefCell<OsrmWorld>) {
    let _ = world;
}
