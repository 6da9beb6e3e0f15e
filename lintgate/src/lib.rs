//! # lintgate
//!
//! Per-file static-analysis gate for Python sources.
//!
//! Target files are discovered on disk, then each file goes through a fixed
//! sequence of external checks (doctest, black, mypy, pylint score,
//! pydocstyle, darglint). The first failing check ends that file's sequence;
//! the run always continues with the next file and reports every
//! `(file, check)` failure at the end. Which checks run is decided by the
//! toolchain profile's entry in the capability table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use lintgate::{PipelineConfig, ProcessRunner, run_pipeline};
//!
//! let mut config = PipelineConfig::default();
//! config.discovery.roots = vec![PathBuf::from("src")];
//!
//! let mut progress = std::io::stdout();
//! let report = run_pipeline(&config, "3.8", ProcessRunner, &mut progress).unwrap();
//! println!("Files checked: {}", report.files_checked);
//! println!("Failures: {}", report.failures.len());
//! std::process::exit(report.exit_code());
//! ```

mod check;
mod config;
mod discovery;
mod error;
pub mod lint_score;
pub mod matrix;
pub mod output;
mod pipeline;
mod profile;
mod report;
pub mod setup;
mod tool;

pub use check::CheckKind;
pub use config::{CompanionConfig, DiscoveryConfig, PipelineConfig};
pub use discovery::{SKIP_DIRS, find_files};
pub use error::{DiscoveryError, DiscoveryErrorKind, PipelineError, ToolError};
pub use lint_score::{DEFAULT_LINT_THRESHOLD, LintScore, check_threshold};
pub use pipeline::{Pipeline, run_pipeline};
pub use profile::{CapabilityTable, CompanionSource, ProfileSpec, ToolchainVersion};
pub use report::{FailureRecord, FileOutcome, PipelineReport};
pub use tool::{CommandTemplate, Invocation, ProcessRunner, ToolCommands, ToolOutput, ToolRunner};
