//! Caching, failure-tolerant distance lookups for the planner.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::{debug, warn};

use crate::Coordinate;

use super::cache::{CacheStats, DistanceCache, LegKey};
use super::fallback::FallbackDistanceSource;
use super::haversine::{HaversineDistanceSource, haversine_km};
use super::source::{DistanceSource, Leg};

/// Distance lookups that always produce a number.
///
/// Wraps a primary [`DistanceSource`] with a great-circle fallback and a
/// shared [`DistanceCache`]. Whatever value is produced for a leg, road or
/// fallback, is cached and reused for the rest of the cache's life.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use fleetroute_core::{Coordinate, DistanceCache, DistanceProvider, HaversineDistanceSource};
///
/// let provider = DistanceProvider::new(
///     HaversineDistanceSource,
///     Arc::new(DistanceCache::unbounded()),
/// );
/// let a = Coordinate { latitude: 52.52, longitude: 13.405 };
/// let b = Coordinate { latitude: 52.50, longitude: 13.40 };
/// let km = provider.distance(a, b);
/// assert_eq!(provider.distance(a, b), km);
/// assert_eq!(provider.cache_stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct DistanceProvider<S> {
    source: FallbackDistanceSource<S, HaversineDistanceSource>,
    cache: Arc<DistanceCache>,
}

impl<S: DistanceSource> DistanceProvider<S> {
    /// Build a provider over `source`, memoising results in `cache`.
    pub const fn new(source: S, cache: Arc<DistanceCache>) -> Self {
        Self {
            source: FallbackDistanceSource::new(source, HaversineDistanceSource),
            cache,
        }
    }

    /// Distance in kilometres from `from` to `to`.
    #[must_use]
    pub fn distance(&self, from: Coordinate, to: Coordinate) -> f64 {
        self.leg_distance(Leg::new(from, to))
    }

    /// Distance of a leg in kilometres.
    #[must_use]
    pub fn leg_distance(&self, leg: Leg) -> f64 {
        if let Some(km) = self.cache.get(leg) {
            return km;
        }
        let km = sanitise(leg, self.source.distance_km(leg));
        self.cache.insert(leg, km);
        km
    }

    /// Resolve and cache every uncached leg in one batch.
    ///
    /// Lets network-backed sources issue their lookups concurrently before
    /// the planner starts asking for legs one at a time. Returns the number
    /// of legs that had to be resolved.
    #[must_use = "the count reports how many legs missed the cache"]
    pub fn prefetch(&self, legs: &[Leg]) -> usize {
        let mut seen = HashSet::with_capacity(legs.len());
        let missing: Vec<Leg> = legs
            .iter()
            .copied()
            .filter(|leg| seen.insert(LegKey::from(*leg)) && !self.cache.contains(*leg))
            .collect();
        if missing.is_empty() {
            return 0;
        }
        debug!("prefetching {} distance legs", missing.len());
        if !self.cache.can_hold(missing.len()) {
            warn!(
                "prefetching {} legs into a cache bounded at {} entries; evicted legs will be looked up one at a time",
                missing.len(),
                self.cache.capacity().map_or(0, NonZeroUsize::get)
            );
        }
        for (leg, result) in missing.iter().zip(self.source.distances_km(&missing)) {
            self.cache.insert(*leg, sanitise(*leg, result));
        }
        missing.len()
    }

    /// The cache shared by this provider.
    #[must_use]
    pub fn cache(&self) -> &Arc<DistanceCache> {
        &self.cache
    }

    /// Hit and miss counters of the shared cache.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The primary source.
    #[must_use]
    pub const fn source(&self) -> &S {
        self.source.primary()
    }
}

/// Accept a finite, non-negative result; anything else becomes haversine.
fn sanitise(leg: Leg, result: Result<f64, super::DistanceError>) -> f64 {
    match result {
        Ok(km) if km.is_finite() && km >= 0.0 => km,
        Ok(km) => {
            warn!(
                "discarding implausible distance {km} for {} -> {}",
                leg.from, leg.to
            );
            haversine_km(leg.from, leg.to)
        }
        Err(err) => {
            warn!("no distance for {} -> {}: {err}", leg.from, leg.to);
            haversine_km(leg.from, leg.to)
        }
    }
}
