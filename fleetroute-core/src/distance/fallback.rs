//! Decorator that retries failed lookups against a secondary source.

use log::warn;

use super::error::DistanceError;
use super::source::{DistanceSource, Leg};

/// Resolves legs with `primary` and, when it fails, with `fallback`.
///
/// A failure of the primary source is logged at `warn` level and never
/// surfaced unless the fallback fails too.
#[derive(Debug, Clone)]
pub struct FallbackDistanceSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackDistanceSource<P, F> {
    /// Wrap `primary` so that its failures are answered by `fallback`.
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// The primary source.
    pub const fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: DistanceSource, F: DistanceSource> DistanceSource for FallbackDistanceSource<P, F> {
    fn distance_km(&self, leg: Leg) -> Result<f64, DistanceError> {
        match self.primary.distance_km(leg) {
            Ok(km) => Ok(km),
            Err(err) => {
                warn!(
                    "distance lookup {} -> {} failed, using fallback: {err}",
                    leg.from, leg.to
                );
                self.fallback.distance_km(leg)
            }
        }
    }

    fn distances_km(&self, legs: &[Leg]) -> Vec<Result<f64, DistanceError>> {
        let mut results = self.primary.distances_km(legs);
        let failed: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(idx, result)| result.is_err().then_some(idx))
            .collect();
        if failed.is_empty() {
            return results;
        }
        warn!(
            "{} of {} distance lookups failed, using fallback",
            failed.len(),
            legs.len()
        );
        let retry: Vec<Leg> = failed.iter().filter_map(|idx| legs.get(*idx).copied()).collect();
        for (idx, result) in failed.into_iter().zip(self.fallback.distances_km(&retry)) {
            if let Some(slot) = results.get_mut(idx) {
                *slot = result;
            }
        }
        results
    }
}
