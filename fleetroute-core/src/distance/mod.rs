//! Distance resolution between coordinates.
//!
//! [`DistanceSource`] is the strategy seam: a road-network service, a
//! precomputed matrix or plain great-circle arithmetic. The planner never
//! talks to a source directly. It goes through [`DistanceProvider`], which
//! memoises every answer in a shared [`DistanceCache`] and degrades to
//! [`haversine_km`] whenever the source cannot answer.

mod cache;
mod error;
mod fallback;
mod haversine;
mod provider;
mod source;

pub use cache::{CacheStats, DistanceCache};
pub use error::DistanceError;
pub use fallback::FallbackDistanceSource;
pub use haversine::{EARTH_RADIUS_KM, HaversineDistanceSource, haversine_km};
pub use provider::DistanceProvider;
pub use source::{DistanceSource, Leg};
