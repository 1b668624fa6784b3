use thiserror::Error;

/// Errors from [`crate::distance::DistanceSource`] lookups.
///
/// These never reach the optimizer: [`crate::DistanceProvider`] degrades to
/// the great-circle distance whenever a source fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL that was requested.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the HTTP client.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// URL that was requested.
        url: String,
        /// Error detail from the HTTP client.
        message: String,
    },
    /// The routing service reported a failure code in its body.
    #[error("routing service returned {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `"NoRoute"`.
        code: String,
        /// Service error message, possibly empty.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error detail.
        message: String,
    },
}
