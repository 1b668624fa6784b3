//! Process-wide memo of resolved leg distances.
//!
//! The cache is shared by every optimization request, so lookups and inserts
//! go through a sharded [`DashMap`] rather than a global lock. Entries carry a
//! logical recency tick; a bounded cache evicts the least recently used
//! eighth of its entries in one batch whenever it grows past capacity.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::source::Leg;

/// Bit-exact key for a directed leg.
///
/// Built from the IEEE-754 bits of each component, so two legs share a key
/// only when their coordinates are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LegKey([u64; 4]);

impl From<Leg> for LegKey {
    fn from(leg: Leg) -> Self {
        // Adding zero folds -0.0 into 0.0 so both spell the same point.
        let bits = |value: f64| (value + 0.0).to_bits();
        Self([
            bits(leg.from.latitude),
            bits(leg.from.longitude),
            bits(leg.to.latitude),
            bits(leg.to.longitude),
        ])
    }
}

#[derive(Debug)]
struct CacheEntry {
    km: f64,
    last_used: AtomicU64,
}

/// Hit and miss counters of a [`DistanceCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
}

/// Thread-safe map from directed legs to kilometres.
///
/// # Examples
/// ```
/// use fleetroute_core::{Coordinate, DistanceCache, Leg};
///
/// let cache = DistanceCache::unbounded();
/// let a = Coordinate { latitude: 0.0, longitude: 0.0 };
/// let b = Coordinate { latitude: 0.0, longitude: 1.0 };
///
/// cache.insert(Leg::new(a, b), 111.2);
/// assert_eq!(cache.get(Leg::new(a, b)), Some(111.2));
/// assert_eq!(cache.get(Leg::new(b, a)), None);
/// ```
#[derive(Debug)]
pub struct DistanceCache {
    entries: DashMap<LegKey, CacheEntry>,
    capacity: Option<NonZeroUsize>,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    eviction: Mutex<()>,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl DistanceCache {
    /// A cache that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_capacity_limit(None)
    }

    /// A cache holding at most `capacity` entries.
    #[must_use]
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self::with_capacity_limit(Some(capacity))
    }

    /// Entry limit, or `None` for an unbounded cache.
    #[must_use]
    pub const fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Whether `entries` distinct legs fit without evicting one another.
    #[must_use]
    pub fn can_hold(&self, entries: usize) -> bool {
        self.capacity.is_none_or(|limit| entries <= limit.get())
    }

    fn with_capacity_limit(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            eviction: Mutex::new(()),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Look up a leg, counting the hit or miss.
    #[must_use]
    pub fn get(&self, leg: Leg) -> Option<f64> {
        let found = self.entries.get(&LegKey::from(leg)).map(|entry| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            entry.km
        });
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Whether a leg is cached. Does not touch counters or recency.
    #[must_use]
    pub fn contains(&self, leg: Leg) -> bool {
        self.entries.contains_key(&LegKey::from(leg))
    }

    /// Record the distance of a leg, replacing any previous value.
    pub fn insert(&self, leg: Leg, km: f64) {
        let entry = CacheEntry {
            km,
            last_used: AtomicU64::new(self.tick()),
        };
        self.entries.insert(LegKey::from(leg), entry);
        if let Some(capacity) = self.capacity
            && self.entries.len() > capacity.get()
        {
            self.evict(capacity.get());
        }
    }

    fn evict(&self, capacity: usize) {
        // One evictor at a time; concurrent inserters skip and let it finish.
        let Ok(_guard) = self.eviction.try_lock() else {
            return;
        };
        let target = capacity.saturating_sub(capacity.div_ceil(8)).max(1);
        let mut ages: Vec<(LegKey, u64)> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().last_used.load(Ordering::Relaxed)))
            .collect();
        let excess = ages.len().saturating_sub(target);
        if excess == 0 {
            return;
        }
        ages.select_nth_unstable_by_key(excess - 1, |(_, age)| *age);
        for (key, _) in ages.iter().take(excess) {
            self.entries.remove(key);
        }
        log::debug!("evicted {excess} distance cache entries");
    }

    /// Number of cached legs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Counters are left untouched.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Snapshot of the hit and miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
