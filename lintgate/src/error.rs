//! Error types for the check pipeline.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Setup-level failures. Any of these halts the job before the per-file loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The requested toolchain version has no entry in the capability table.
    #[error("Unknown toolchain profile '{version}' (known: {known})")]
    UnknownProfile {
        /// The version string that was requested.
        version: String,
        /// Comma-separated list of versions the table knows about.
        known: String,
    },

    /// A toolchain version string could not be parsed.
    #[error("Invalid toolchain version '{version}': {cause}")]
    InvalidVersion {
        /// The raw version string.
        version: String,
        /// Human-readable description of the problem.
        cause: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for `PipelineConfig`.
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// The capability table is empty.
    #[error("Capability table has no profiles")]
    EmptyCapabilityTable,

    /// The lint threshold is outside the linter's score range.
    #[error("Lint threshold must be between 0 and 10, got {0}")]
    InvalidThreshold(f64),

    /// A discovery root does not exist.
    #[error("Root path does not exist or is not a directory: {}", .0.display())]
    MissingRoot(PathBuf),
}

/// Failure to run an external tool at all (as opposed to the tool reporting a problem).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// The process could not be spawned or waited on.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The kind of discovery-level failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiscoveryErrorKind {
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
    /// A root path does not exist.
    MissingRoot,
    /// A path resolves outside its discovery root (symlink escape).
    OutsideRoot,
    /// A path could not be resolved.
    IoError,
}

/// A path that discovery could not process.
///
/// These never disappear silently: the report carries them and CI treats
/// them as failures.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct DiscoveryError {
    /// The offending path (or pattern, for `InvalidExcludePattern`).
    pub path: PathBuf,
    /// The kind of failure.
    pub kind: DiscoveryErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl DiscoveryError {
    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: [discovery error] {}", self.path.display(), self.message)
    }
}
