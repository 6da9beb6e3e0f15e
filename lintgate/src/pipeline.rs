//! The per-file check sequence.
//!
//! For every target file the enabled checks run in `CheckKind::ALL` order.
//! The first failing check is recorded and the rest are skipped for that
//! file only; the run always moves on to the next file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::check::CheckKind;
use crate::config::PipelineConfig;
use crate::discovery::find_files;
use crate::error::{DiscoveryErrorKind, PipelineError};
use crate::lint_score::LintScore;
use crate::profile::ProfileSpec;
use crate::report::{FailureRecord, FileOutcome, PipelineReport};
use crate::tool::{ToolOutput, ToolRunner};

/// Outcome of a single check invocation.
#[derive(Debug, Clone, PartialEq)]
enum Verdict {
    Pass,
    Fail {
        reason: String,
        score: Option<LintScore>,
        diagnostics: Option<String>,
    },
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

fn exit_reason(output: &ToolOutput) -> String {
    output.status.map_or_else(
        || "terminated by signal".to_owned(),
        |code| format!("exit status {code}"),
    )
}

/// Runs the check sequence for one environment profile.
pub struct Pipeline<'a, R> {
    config: &'a PipelineConfig,
    profile: &'a ProfileSpec,
    runner: R,
}

impl<'a, R: ToolRunner> Pipeline<'a, R> {
    #[must_use]
    pub const fn new(config: &'a PipelineConfig, profile: &'a ProfileSpec, runner: R) -> Self {
        Self {
            config,
            profile,
            runner,
        }
    }

    /// Run every enabled check against `file`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing progress output fails.
    pub fn run_file(
        &mut self,
        file: &Path,
        progress: &mut dyn Write,
    ) -> anyhow::Result<FileOutcome> {
        writeln!(progress, "==> {}", file.display())?;
        let mut checks_run = Vec::new();
        let profile = self.profile;

        for check in profile.enabled_checks() {
            writeln!(progress, "  -> {check}")?;
            checks_run.push(check);

            if let Verdict::Fail {
                reason,
                score,
                diagnostics,
            } = self.run_check(check, file)?
            {
                if let Some(text) = &diagnostics {
                    progress.write_all(text.as_bytes())?;
                    if !text.ends_with('\n') {
                        writeln!(progress)?;
                    }
                }
                writeln!(progress, "  FAILED {check}: {reason}")?;
                tracing::warn!(file = %file.display(), %check, "{reason}");
                return Ok(FileOutcome {
                    file: file.to_path_buf(),
                    checks_run,
                    failure: Some(FailureRecord {
                        file: file.to_path_buf(),
                        check,
                        reason,
                        score,
                        diagnostics,
                    }),
                });
            }
        }

        tracing::info!(file = %file.display(), checks = checks_run.len(), "all checks passed");
        Ok(FileOutcome {
            file: file.to_path_buf(),
            checks_run,
            failure: None,
        })
    }

    /// Run the sequence over `files` in order.
    ///
    /// A failing check never aborts the run; failures accumulate in the report.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing progress output fails.
    pub fn run(
        &mut self,
        files: &[PathBuf],
        progress: &mut dyn Write,
    ) -> anyhow::Result<PipelineReport> {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.run_file(file, progress)?);
        }
        Ok(PipelineReport::from_outcomes(
            self.profile.version.to_string(),
            started_at,
            outcomes,
            Vec::new(),
        ))
    }

    fn run_check(&mut self, check: CheckKind, file: &Path) -> anyhow::Result<Verdict> {
        let invocation = self.config.tools.template(check).resolve(
            file,
            &self.profile.lint_rcfile,
            self.config.working_dir.as_deref(),
        );
        tracing::debug!(%check, command = %invocation, "invoking tool");

        let output = match self.runner.run(&invocation) {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(%check, "{err}");
                let score = (check == CheckKind::LintScore).then_some(LintScore::Unparseable);
                return Ok(Verdict::Fail {
                    reason: err.to_string(),
                    score,
                    diagnostics: None,
                });
            }
        };

        if check == CheckKind::LintScore {
            return Ok(self.judge_lint(&output));
        }

        if output.success() {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::Fail {
                reason: exit_reason(&output),
                score: None,
                diagnostics: non_empty(output.combined()),
            })
        }
    }

    /// The lint check is judged on its score, not its exit code.
    fn judge_lint(&self, output: &ToolOutput) -> Verdict {
        let report = output.combined();
        let score = LintScore::from_output(&report);
        let threshold = self.config.lint_threshold;

        if score.passes(threshold) {
            tracing::debug!(score = score.value(), "lint score accepted");
            return Verdict::Pass;
        }

        let reason = match score {
            LintScore::Parsed(value) => format!("score {value:.2}/10 below threshold {threshold}"),
            LintScore::Unparseable => {
                format!("no parseable score (counted as 0.00/10, threshold {threshold})")
            }
        };
        Verdict::Fail {
            reason,
            score: Some(score),
            diagnostics: non_empty(report),
        }
    }
}

/// Resolve the profile, discover files and run the whole pipeline.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns an error (a setup failure, before any file is checked) if
/// `version` is not in the capability table or a root does not exist.
/// Check failures and other discovery errors are reported in the returned
/// `PipelineReport`.
pub fn run_pipeline<R: ToolRunner>(
    config: &PipelineConfig,
    version: &str,
    runner: R,
    progress: &mut dyn Write,
) -> anyhow::Result<PipelineReport> {
    let profile = config.profiles.resolve(version)?;
    tracing::info!(
        profile = %profile.version,
        checks = ?profile.enabled_checks().map(CheckKind::name).collect::<Vec<_>>(),
        "resolved toolchain profile"
    );

    let (files, discovery_errors) = find_files(&config.discovery);
    if let Some(missing) = discovery_errors
        .iter()
        .find(|e| e.kind == DiscoveryErrorKind::MissingRoot)
    {
        return Err(PipelineError::MissingRoot(missing.path.clone()).into());
    }
    for err in &discovery_errors {
        tracing::warn!("{}", err.format_human_readable());
    }

    let mut pipeline = Pipeline::new(config, profile, runner);
    let report = pipeline.run(&files, progress)?;

    Ok(PipelineReport::from_outcomes(
        report.profile,
        report.started_at,
        report.outcomes,
        discovery_errors,
    ))
}
