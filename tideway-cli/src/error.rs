//! Error types emitted by the Tideway CLI.
//!
//! Many helpers return `Result<_, CliError>` and the workspace enables
//! `clippy::result_large_err`, so large sources stay behind their own
//! variants.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tideway_core::{OptimizeError, TripTableError, ValidationError};

/// Errors emitted by the Tideway CLI.
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
        /// Environment variable that also supplies it.
        env: &'static str,
    },
    /// An option value could not be interpreted.
    #[error("invalid --{field} value {value:?}: {reason}")]
    InvalidOption {
        /// Option name.
        field: &'static str,
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the scenario file failed.
    #[error("failed to open scenario at {path:?}: {source}")]
    OpenScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Scenario JSON could not be decoded.
    #[error("failed to parse scenario JSON at {path:?}: {source}")]
    ParseScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A trip-time or distance entry was rejected.
    #[error("scenario {path:?} has an invalid trip table entry: {source}")]
    InvalidTripTable {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Rejected entry.
        #[source]
        source: TripTableError,
    },
    /// The scenario failed request validation.
    #[error("scenario {path:?} failed validation: {source}")]
    InvalidScenario {
        /// Scenario path.
        path: Utf8PathBuf,
        /// First validation failure.
        #[source]
        source: ValidationError,
    },
    /// The optimizer rejected the scenario.
    #[error("optimizing {path:?} failed: {source}")]
    Optimize {
        /// Scenario path.
        path: Utf8PathBuf,
        /// Optimizer error.
        #[source]
        source: OptimizeError,
    },
    /// Serializing the output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
