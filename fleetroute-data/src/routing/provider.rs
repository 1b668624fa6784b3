//! Road-network `DistanceSource` using OSRM's Route API.
//!
//! This module provides [`OsrmDistanceSource`], an implementation of the
//! [`DistanceSource`] trait that asks an OSRM routing service for the driving
//! distance of each leg.
//!
//! # Architecture
//!
//! The [`DistanceSource`] trait is synchronous so the planner stays usable
//! from plain threads. This source bridges the async HTTP calls to the sync
//! interface by blocking on a Tokio runtime internally. Batches are resolved
//! inside one `block_on`, with at most
//! [`OsrmDistanceSourceConfig::max_concurrent_requests`] lookups in flight.
//! Every request carries its own timeout, so a slow leg never holds up its
//! siblings.
//!
//! # Example
//!
//! ```no_run
//! use fleetroute_core::{Coordinate, DistanceSource, Leg};
//! use fleetroute_data::routing::OsrmDistanceSource;
//!
//! let source = OsrmDistanceSource::new("http://localhost:5000")?;
//! let leg = Leg::new(
//!     Coordinate { latitude: 52.52, longitude: 13.405 },
//!     Coordinate { latitude: 52.50, longitude: 13.40 },
//! );
//! let km = source.distance_km(leg)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

use fleetroute_core::{DistanceError, DistanceSource, Leg};
use futures_util::stream::{self, StreamExt};
use log::debug;
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::osrm::RouteResponse;

/// Error type for [`OsrmDistanceSource`] construction failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderBuildError {
    /// The base URL could not be parsed.
    #[error("invalid routing service URL: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "fleetroute-routing/0.1";

/// Public OSRM demo server.
pub const DEFAULT_BASE_URL: &str = "http://router.project-osrm.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of lookups in flight per batch.
const DEFAULT_MAX_CONCURRENT_REQUESTS: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};

/// Configuration for [`OsrmDistanceSource`].
#[derive(Debug, Clone)]
pub struct OsrmDistanceSourceConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile, e.g. `"driving"`.
    pub profile: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Upper bound on concurrent lookups within one batch.
    pub max_concurrent_requests: NonZeroUsize,
}

impl Default for OsrmDistanceSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            profile: "driving".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl OsrmDistanceSourceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of lookups allowed in flight per batch.
    #[must_use]
    pub const fn with_max_concurrent_requests(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrent_requests = limit;
        self
    }
}

/// Road-network distance source backed by the OSRM Route API.
///
/// The source owns a Tokio runtime that is reused across calls, avoiding
/// the overhead of creating a new runtime per lookup.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the source uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the source
/// falls back to using its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may lead to deadlocks if the caller's
/// runtime is driving IO or timers that this request depends on.
pub struct OsrmDistanceSource {
    client: Client,
    config: OsrmDistanceSourceConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmDistanceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmDistanceSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmDistanceSource {
    /// Create a new source with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmDistanceSourceConfig::new(base_url))
    }

    /// Create a new source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: OsrmDistanceSourceConfig) -> Result<Self, ProviderBuildError> {
        Url::parse(&config.base_url).map_err(ProviderBuildError::InvalidBaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The configuration this source was built with.
    #[must_use]
    pub const fn config(&self) -> &OsrmDistanceSourceConfig {
        &self.config
    }

    /// Build the OSRM Route API URL for a leg.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=false`.
    fn build_route_url(&self, leg: Leg) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            leg.from.longitude,
            leg.from.latitude,
            leg.to.longitude,
            leg.to.latitude
        )
    }

    /// Fetch the distance of one leg asynchronously.
    async fn fetch_distance_async(&self, leg: Leg) -> Result<f64, DistanceError> {
        let url = self.build_route_url(leg);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| DistanceError::ParseError {
                    message: err.to_string(),
                })?;

        convert_response(route_response)
    }

    /// Convert a reqwest error to a `DistanceError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DistanceError {
        if error.is_timeout() {
            return DistanceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DistanceError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        DistanceError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Drive a future to completion from synchronous code.
    ///
    /// When called from within an existing Tokio runtime, the runtime must
    /// be multi-threaded; a `current_thread` caller falls back to the
    /// internal runtime.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}

/// Convert an OSRM response to kilometres.
fn convert_response(response: RouteResponse) -> Result<f64, DistanceError> {
    if !response.is_ok() {
        return Err(DistanceError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let metres = response
        .best_distance_metres()
        .ok_or_else(|| DistanceError::ParseError {
            message: "OSRM response contains no routes".to_owned(),
        })?;

    if !(metres.is_finite() && metres >= 0.0) {
        return Err(DistanceError::ParseError {
            message: format!("OSRM returned an invalid distance of {metres} m"),
        });
    }

    Ok(metres / 1000.0)
}

impl DistanceSource for OsrmDistanceSource {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        self.block_on(self.fetch_distance_async(leg))
    }

    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        if legs.is_empty() {
            return Vec::new();
        }
        debug!(
            "resolving {} legs against {} ({} in flight)",
            legs.len(),
            self.config.base_url,
            self.config.max_concurrent_requests
        );
        let lookups = stream::iter(legs.iter().copied().enumerate())
            .map(|(idx, leg)| async move { (idx, self.fetch_distance_async(leg).await) })
            .buffer_unordered(self.config.max_concurrent_requests.get())
            .collect::<Vec<_>>();
        let mut completed = self.block_on(lookups);
        // Completion order is arbitrary; restore input order.
        completed.sort_unstable_by_key(|(idx, _)| *idx);
        completed.into_iter().map(|(_, result)| result).collect()
    }
}
