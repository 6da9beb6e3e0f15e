//! Pipeline report types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::check::CheckKind;
use crate::error::DiscoveryError;
use crate::lint_score::LintScore;

/// A single failed check for a file.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[non_exhaustive]
pub struct FailureRecord {
    pub file: PathBuf,
    pub check: CheckKind,
    /// Short reason: exit status, lint score, or launch error.
    pub reason: String,
    /// Lint score, for lint-score failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<LintScore>,
    /// Captured tool output, when the tool printed anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl FailureRecord {
    /// `{file}: {check} ({reason})`
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: {} ({})", self.file.display(), self.check, self.reason)
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[non_exhaustive]
pub struct FileOutcome {
    pub file: PathBuf,
    /// Checks that were invoked, in order. The last one failed if `failure` is set.
    pub checks_run: Vec<CheckKind>,
    pub failure: Option<FailureRecord>,
}

impl FileOutcome {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of a pipeline run.
///
/// `ok` is false when any check failed or when discovery did not fully
/// cover the roots.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct PipelineReport {
    /// Toolchain profile the run used.
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_checked: usize,
    pub ok: bool,
    /// Every `(file, check)` failure, in processing order.
    pub failures: Vec<FailureRecord>,
    pub outcomes: Vec<FileOutcome>,
    pub discovery_errors: Vec<DiscoveryError>,
}

impl PipelineReport {
    /// Build a report from per-file outcomes, stamping the finish time.
    #[must_use]
    pub fn from_outcomes(
        profile: String,
        started_at: DateTime<Utc>,
        outcomes: Vec<FileOutcome>,
        discovery_errors: Vec<DiscoveryError>,
    ) -> Self {
        let failures: Vec<FailureRecord> = outcomes
            .iter()
            .filter_map(|o| o.failure.clone())
            .collect();
        Self {
            profile,
            started_at,
            finished_at: Utc::now(),
            files_checked: outcomes.len(),
            ok: failures.is_empty() && discovery_errors.is_empty(),
            failures,
            outcomes,
            discovery_errors,
        }
    }

    /// Number of files that passed every enabled check.
    #[must_use]
    pub fn files_passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Process exit code: 0 iff nothing failed.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.ok { 0 } else { 1 }
    }
}
