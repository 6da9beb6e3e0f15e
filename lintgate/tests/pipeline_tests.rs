#![allow(clippy::unwrap_used)]
//! Integration tests for `lintgate::run_pipeline`.
//!
//! Tools are replaced by a scripted runner so the tests need no Python
//! toolchain. Covered:
//! - short-circuit after the first failing check
//! - format and type checks never run under the oldest profile
//! - lint score threshold and the unparseable-score fallback
//! - exit status tracks the failure list
//! - discovery exclusions feed the per-file loop
//! - unknown profile and missing root are setup failures
//! - tool output reaches the progress log and the JSON report

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lintgate::{
    CheckKind, Invocation, PipelineConfig, PipelineError, ToolError, ToolOutput, ToolRunner,
    run_pipeline,
};
use tempfile::TempDir;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

const PASSING_LINT: &str = "Your code has been rated at 9.80/10\n";

/// Records every call; answers from a script keyed by `(program, file name)`.
#[derive(Default)]
struct ScriptedRunner {
    script: HashMap<(String, String), ToolOutput>,
    missing_programs: Vec<String>,
    calls: Vec<(String, String)>,
}

impl ScriptedRunner {
    fn on(mut self, program: &str, file: &str, status: i32, stdout: &str) -> Self {
        self.script.insert(
            (program.to_owned(), file.to_owned()),
            ToolOutput {
                status: Some(status),
                stdout: stdout.to_owned(),
                stderr: String::new(),
            },
        );
        self
    }

    fn missing(mut self, program: &str) -> Self {
        self.missing_programs.push(program.to_owned());
        self
    }

    fn calls_for(&self, file: &str) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|(_, f)| f == file)
            .map(|(p, _)| p.as_str())
            .collect()
    }

    fn programs(&self) -> Vec<&str> {
        self.calls.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let file = invocation
            .args
            .iter()
            .find(|a| a.ends_with(".py"))
            .map(|a| {
                Path::new(a)
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_default();
        self.calls.push((invocation.program.clone(), file.clone()));

        if self.missing_programs.contains(&invocation.program) {
            return Err(ToolError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }

        let key = (invocation.program.clone(), file);
        Ok(self.script.get(&key).cloned().unwrap_or_else(|| ToolOutput {
            status: Some(0),
            stdout: if invocation.program == "pylint" {
                PASSING_LINT.to_owned()
            } else {
                String::new()
            },
            stderr: String::new(),
        }))
    }
}

fn project(files: &[&str]) -> (TempDir, PipelineConfig) {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "\"\"\"Module.\"\"\"\n").unwrap();
    }
    let mut config = PipelineConfig::default();
    config.discovery.roots = vec![tmp.path().to_path_buf()];
    (tmp, config)
}

fn run(
    config: &PipelineConfig,
    version: &str,
    runner: &mut ScriptedRunner,
) -> (lintgate::PipelineReport, String) {
    let mut progress = Vec::new();
    let report = run_pipeline(config, version, &mut *runner, &mut progress).unwrap();
    (report, String::from_utf8(progress).unwrap())
}

fn failure_pairs(report: &lintgate::PipelineReport) -> Vec<(String, CheckKind)> {
    report
        .failures
        .iter()
        .map(|f| {
            (
                f.file.file_name().unwrap().to_string_lossy().into_owned(),
                f.check,
            )
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_all_checks_pass() {
    let (_tmp, config) = project(&["clean.py"]);
    let mut runner = ScriptedRunner::default();
    let (report, _) = run(&config, "3.8", &mut runner);

    assert!(report.ok);
    assert_eq!(report.exit_code(), 0);
    assert!(report.failures.is_empty());
    assert_eq!(
        runner.calls_for("clean.py"),
        ["python", "black", "mypy", "pylint", "pydocstyle", "darglint"]
    );
}

#[test]
fn test_doctest_failure_skips_remaining_checks() {
    let (_tmp, config) = project(&["broken.py", "fine.py"]);
    let mut runner = ScriptedRunner::default().on("python", "broken.py", 1, "Traceback");
    let (report, _) = run(&config, "3.8", &mut runner);

    assert_eq!(runner.calls_for("broken.py"), ["python"]);
    assert_eq!(
        failure_pairs(&report),
        [("broken.py".to_owned(), CheckKind::Doctest)]
    );
    assert_eq!(report.failures[0].check.name(), "doctest");
    // The next file is still fully processed.
    assert_eq!(runner.calls_for("fine.py").len(), 6);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_oldest_profile_never_runs_format_or_type_check() {
    let (_tmp, config) = project(&["a.py", "pkg/b.py"]);
    let mut runner = ScriptedRunner::default();
    let (report, _) = run(&config, "3.6.7", &mut runner);

    assert!(report.ok);
    assert!(!runner.programs().contains(&"black"));
    assert!(!runner.programs().contains(&"mypy"));
    assert_eq!(
        runner.calls_for("a.py"),
        ["python", "pylint", "pydocstyle", "darglint"]
    );
}

#[test]
fn test_oldest_profile_uses_legacy_rcfile() {
    #[derive(Default)]
    struct CaptureArgs(Vec<Vec<String>>);
    impl ToolRunner for CaptureArgs {
        fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
            if invocation.program == "pylint" {
                self.0.push(invocation.args.clone());
            }
            Ok(ToolOutput {
                status: Some(0),
                stdout: PASSING_LINT.to_owned(),
                stderr: String::new(),
            })
        }
    }

    let (_tmp, config) = project(&["a.py"]);
    let mut capture = CaptureArgs::default();
    let mut sink = Vec::new();
    run_pipeline(&config, "3.6.7", &mut capture, &mut sink).unwrap();
    assert_eq!(capture.0[0][0], "--rcfile=.pylintrc_python36");

    let mut capture = CaptureArgs::default();
    run_pipeline(&config, "3.x", &mut capture, &mut sink).unwrap();
    assert_eq!(capture.0[0][0], "--rcfile=.pylintrc");
}

#[test]
fn test_lint_score_below_threshold_fails_and_prints_report() {
    let (_tmp, config) = project(&["low.py", "edge.py"]);
    let low_report = "low.py:1:0: C0114: Missing module docstring\n\
                      Your code has been rated at 9.49/10\n";
    let mut runner = ScriptedRunner::default()
        .on("pylint", "low.py", 16, low_report)
        .on("pylint", "edge.py", 0, "Your code has been rated at 9.50/10\n");
    let (report, progress) = run(&config, "3.8", &mut runner);

    assert_eq!(
        failure_pairs(&report),
        [("low.py".to_owned(), CheckKind::LintScore)]
    );
    assert!(progress.contains("C0114: Missing module docstring"), "{progress}");
    assert!(report.failures[0].reason.contains("9.49"));
    assert_eq!(runner.calls_for("low.py").last(), Some(&"pylint"));
    assert_eq!(runner.calls_for("edge.py").len(), 6);
}

#[test]
fn test_unparseable_lint_output_counts_as_zero() {
    let (_tmp, config) = project(&["crash.py"]);
    let mut runner =
        ScriptedRunner::default().on("pylint", "crash.py", 32, "Fatal error while checking");
    let (report, progress) = run(&config, "3.8", &mut runner);

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.check, CheckKind::LintScore);
    assert_eq!(failure.score, Some(lintgate::LintScore::Unparseable));
    assert!(failure.reason.contains("no parseable score"));
    assert!(progress.contains("Fatal error while checking"));
}

#[test]
fn test_custom_lint_threshold() {
    let (_tmp, mut config) = project(&["ok.py"]);
    config.lint_threshold = 7.0;
    let mut runner =
        ScriptedRunner::default().on("pylint", "ok.py", 0, "Your code has been rated at 7.00/10");
    let (report, _) = run(&config, "3.8", &mut runner);
    assert!(report.ok);
}

#[test]
fn test_docstring_failure_skips_argument_doc_check() {
    let (_tmp, config) = project(&["doc.py"]);
    let mut runner = ScriptedRunner::default().on("pydocstyle", "doc.py", 1, "D103");
    let (report, _) = run(&config, "3.8", &mut runner);

    assert_eq!(
        failure_pairs(&report),
        [("doc.py".to_owned(), CheckKind::DocstringStyle)]
    );
    assert!(!runner.calls_for("doc.py").contains(&"darglint"));
}

#[test]
fn test_failures_accumulate_across_files() {
    let (_tmp, config) = project(&["a.py", "b.py", "c.py"]);
    let mut runner = ScriptedRunner::default()
        .on("black", "a.py", 1, "would reformat a.py")
        .on("darglint", "c.py", 1, "DAR101");
    let (report, _) = run(&config, "3.x", &mut runner);

    assert_eq!(
        failure_pairs(&report),
        [
            ("a.py".to_owned(), CheckKind::Format),
            ("c.py".to_owned(), CheckKind::ArgumentDoc),
        ]
    );
    assert_eq!(report.files_checked, 3);
    assert_eq!(report.files_passed(), 1);
    assert!(!report.ok);
}

#[test]
fn test_missing_tool_is_recorded_as_check_failure() {
    let (_tmp, config) = project(&["a.py"]);
    let mut runner = ScriptedRunner::default().missing("mypy");
    let (report, _) = run(&config, "3.8", &mut runner);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].check, CheckKind::TypeCheck);
    assert!(report.failures[0].reason.contains("Failed to run 'mypy'"));
}

#[test]
fn test_discovery_exclusions() {
    let (_tmp, config) = project(&[
        "main.py",
        "pkg/__init__.py",
        "pkg/core.py",
        "tests/test_core.py",
        "README.md",
    ]);
    let mut runner = ScriptedRunner::default();
    let (report, _) = run(&config, "3.8", &mut runner);

    let checked: Vec<PathBuf> = report
        .outcomes
        .iter()
        .map(|o| o.file.file_name().unwrap().into())
        .collect();
    assert_eq!(checked, [PathBuf::from("main.py"), PathBuf::from("core.py")]);
}

#[test]
fn test_empty_project_succeeds() {
    let (_tmp, config) = project(&[]);
    let mut runner = ScriptedRunner::default();
    let (report, _) = run(&config, "3.8", &mut runner);
    assert!(report.ok);
    assert_eq!(report.files_checked, 0);
    assert!(runner.calls.is_empty());
}

#[test]
fn test_unknown_profile_is_setup_failure() {
    let (_tmp, config) = project(&["a.py"]);
    let mut runner = ScriptedRunner::default();
    let mut sink = Vec::new();
    let err = run_pipeline(&config, "2.7", &mut runner, &mut sink).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::UnknownProfile { .. })
    ));
    assert!(runner.calls.is_empty(), "no file may be checked");
}

#[test]
fn test_missing_root_is_setup_failure() {
    let (tmp, mut config) = project(&["a.py"]);
    config.discovery.roots.push(tmp.path().join("absent"));
    let mut runner = ScriptedRunner::default();
    let mut sink = Vec::new();
    let err = run_pipeline(&config, "3.8", &mut runner, &mut sink).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MissingRoot(path)) if path.ends_with("absent")
    ));
    assert!(runner.calls.is_empty(), "no file may be checked");
    assert!(sink.is_empty());
}

#[test]
fn test_tool_output_surfaces_in_progress_and_json() {
    let (_tmp, config) = project(&["typed.py"]);
    let mut runner = ScriptedRunner::default().on(
        "mypy",
        "typed.py",
        1,
        "typed.py:3: error: Incompatible types in assignment",
    );
    let (report, progress) = run(&config, "3.8", &mut runner);

    assert!(
        progress.contains("Incompatible types in assignment\n  FAILED mypy: exit status 1"),
        "{progress}"
    );
    let mut buf = Vec::new();
    lintgate::output::write_json(&report, &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(
        json["failures"][0]["diagnostics"],
        "typed.py:3: error: Incompatible types in assignment"
    );
}

#[test]
fn test_report_output_contract() {
    let (_tmp, config) = project(&["a.py"]);
    let mut runner = ScriptedRunner::default().on("python", "a.py", 2, "");
    let (report, _) = run(&config, "3.8", &mut runner);

    let mut buf = Vec::new();
    lintgate::output::write_json(&report, &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(json["profile"], "3.8");
    assert_eq!(json["ok"], false);
    assert_eq!(json["failures"][0]["check"], "doctest");
    assert_eq!(json["failures"][0]["reason"], "exit status 2");

    let mut buf = Vec::new();
    lintgate::output::write_human(&report, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("FAILED CHECKS"), "{text}");
    assert!(text.contains("a.py: doctest (exit status 2)"), "{text}");
    assert!(text.contains("1 of 1 file(s) failed a check"), "{text}");
}
