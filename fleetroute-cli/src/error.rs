//! Error types emitted by the fleetroute CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fleetroute_core::{CoordinateError, OptimizeError};
use fleetroute_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the fleetroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that could supply it.
        env: &'static str,
    },
    /// An option was present but unusable.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument {
        /// Option name.
        field: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
    /// The configured depot lies outside the valid coordinate range.
    #[error("invalid depot: {0}")]
    InvalidDepot(#[source] CoordinateError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the optimize request file failed.
    #[error("failed to open optimize request at {path:?}: {source}")]
    OpenOptimizeRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Optimize request JSON could not be decoded.
    #[error("failed to parse optimize request JSON at {path:?}: {source}")]
    ParseOptimizeRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Constructing the road distance source failed.
    #[error("failed to build distance source for {base_url:?}: {source}")]
    BuildDistanceSource {
        /// Routing service the source would have queried.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The optimizer rejected the request.
    #[error("optimization failed: {source}")]
    Optimize {
        /// Rejection reason.
        #[source]
        source: OptimizeError,
    },
    /// Serializing the optimize response failed.
    #[error("failed to serialize optimize response: {0}")]
    SerializeOptimizeResponse(#[source] serde_json::Error),
    /// Writing the optimize output failed.
    #[error("failed to write optimize output: {0}")]
    WriteOptimizeOutput(#[source] std::io::Error),
}
