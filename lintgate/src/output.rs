//! Shared output formatting for pipeline reports.
//!
//! Provides JSON and plain-text formatters for `PipelineReport`.
//! Color/terminal formatting is left to the CLI layer.

use std::io::Write;

use crate::report::PipelineReport;

/// Format a `PipelineReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &PipelineReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `PipelineReport` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &PipelineReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  LINTGATE SUMMARY (profile {})", report.profile)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Files checked:  {}", report.files_checked)?;
    writeln!(writer, "  Files passed:   {}", report.files_passed())?;
    writeln!(writer, "  Failures:       {}", report.failures.len())?;
    writeln!(writer)?;

    if !report.discovery_errors.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  DISCOVERY ERRORS (paths that could not be scanned)")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for err in &report.discovery_errors {
            writeln!(writer, "{}", err.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    if !report.failures.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  FAILED CHECKS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for failure in &report.failures {
            writeln!(writer, "{}", failure.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok {
        writeln!(
            writer,
            "\u{2713} All {} files passed every check",
            report.files_checked
        )?;
    } else {
        if !report.discovery_errors.is_empty() {
            writeln!(
                writer,
                "\u{2717} {} path(s) could not be scanned",
                report.discovery_errors.len()
            )?;
        }
        if !report.failures.is_empty() {
            writeln!(
                writer,
                "\u{2717} {} of {} file(s) failed a check",
                report.failures.len(),
                report.files_checked
            )?;
        }
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}
