//! Behavioural tests for the caching, failure-tolerant `DistanceProvider`.

use std::cell::RefCell;
use std::sync::Arc;

use fleetroute_core::test_support::{CountingDistanceSource, FailingDistanceSource};
use fleetroute_core::{
    Coordinate, DistanceCache, DistanceProvider, DistanceSource, HaversineDistanceSource,
    haversine_km,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const BERLIN: Coordinate = Coordinate {
    latitude: 52.52,
    longitude: 13.405,
};
const MUNICH: Coordinate = Coordinate {
    latitude: 48.1351,
    longitude: 11.582,
};

#[derive(Default)]
struct DistanceWorld {
    provider: Option<DistanceProvider<Arc<dyn DistanceSource>>>,
    counter: Option<Arc<CountingDistanceSource<HaversineDistanceSource>>>,
    answers: Vec<f64>,
}

impl DistanceWorld {
    fn ask(&mut self) {
        let provider = self.provider.as_ref().expect("provider configured");
        let km = provider.distance(BERLIN, MUNICH);
        self.answers.push(km);
    }
}

#[fixture]
fn world() -> RefCell<DistanceWorld> {
    RefCell::new(DistanceWorld::default())
}

fn cache() -> Arc<DistanceCache> {
    Arc::new(DistanceCache::unbounded())
}

#[given("a provider over a counting great-circle source")]
fn counting_provider(#[from(world)] world: &RefCell<DistanceWorld>) {
    let counter = Arc::new(CountingDistanceSource::new(HaversineDistanceSource));
    let source: Arc<dyn DistanceSource> = counter.clone();
    let mut state = world.borrow_mut();
    state.provider = Some(DistanceProvider::new(source, cache()));
    state.counter = Some(counter);
}

#[given("a provider over a source that always fails")]
fn failing_provider(#[from(world)] world: &RefCell<DistanceWorld>) {
    let source: Arc<dyn DistanceSource> = Arc::new(FailingDistanceSource);
    world.borrow_mut().provider = Some(DistanceProvider::new(source, cache()));
}

#[when("I request the distance from Berlin to Munich twice")]
fn ask_twice(#[from(world)] world: &RefCell<DistanceWorld>) {
    let mut state = world.borrow_mut();
    state.ask();
    state.ask();
}

#[when("I request the distance from Berlin to Munich")]
fn ask_once(#[from(world)] world: &RefCell<DistanceWorld>) {
    world.borrow_mut().ask();
}

#[then("both answers are equal")]
fn answers_equal(#[from(world)] world: &RefCell<DistanceWorld>) {
    let state = world.borrow();
    assert_eq!(state.answers.len(), 2);
    assert_eq!(state.answers.first(), state.answers.last());
}

#[then("the source was consulted once")]
fn consulted_once(#[from(world)] world: &RefCell<DistanceWorld>) {
    let state = world.borrow();
    let counter = state.counter.as_ref().expect("counting source configured");
    assert_eq!(counter.calls(), 1);
}

#[then("the answer is the great-circle distance")]
fn answer_is_haversine(#[from(world)] world: &RefCell<DistanceWorld>) {
    let state = world.borrow();
    assert_eq!(state.answers, vec![haversine_km(BERLIN, MUNICH)]);
}

#[then("the answer is within half a percent of 504 km")]
fn answer_near_published(#[from(world)] world: &RefCell<DistanceWorld>) {
    let state = world.borrow();
    let km = state.answers.first().copied().expect("one answer");
    assert!((km - 504.0).abs() <= 504.0 * 0.005, "got {km} km");
}

#[scenario(path = "tests/features/distance_provider.feature", index = 0)]
fn cached_distances_are_reused(world: RefCell<DistanceWorld>) {
    let _ = world;
}

#[scenario(path = "tests/features/distance_provider.feature", index = 1)]
fn failing_source_falls_back(world: RefCell<DistanceWorld>) {
    let _ = world;
}
