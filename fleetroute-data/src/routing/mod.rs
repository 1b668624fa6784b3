//! HTTP-based road distances from routing services.
//!
//! This module provides [`OsrmDistanceSource`], an implementation of
//! [`fleetroute_core::DistanceSource`] that fetches driving distances from an
//! OSRM routing service.
//!
//! # Architecture
//!
//! Each leg is one request to the OSRM Route API. Failures are reported as
//! [`fleetroute_core::DistanceError`]; the caller's
//! [`fleetroute_core::DistanceProvider`] turns them into great-circle
//! fallbacks, so a routing outage slows nothing down beyond the timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fleetroute_core::{Coordinate, DistanceCache, DistanceProvider};
//! use fleetroute_data::routing::{OsrmDistanceSource, OsrmDistanceSourceConfig};
//!
//! let config = OsrmDistanceSourceConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(2))
//!     .with_user_agent("my-app/1.0");
//! let source = OsrmDistanceSource::with_config(config)?;
//! let provider = DistanceProvider::new(source, Arc::new(DistanceCache::unbounded()));
//!
//! let km = provider.distance(
//!     Coordinate { latitude: 52.52, longitude: 13.405 },
//!     Coordinate { latitude: 52.50, longitude: 13.40 },
//! );
//! println!("Driving distance: {km:.1} km");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, OsrmDistanceSource, OsrmDistanceSourceConfig,
    ProviderBuildError,
};
