//! Lint score extraction from the linter's summary output.
//!
//! The linter ends its report with a line such as
//! `Your code has been rated at 9.71/10 (previous run: 9.50/10, +0.21)`.
//! Only the `rated at <n>/10` part is trusted. When no such line exists the
//! score is `Unparseable`, which compares as `0.0`: a crashed linter and a
//! linter reporting zero quality fail the same way.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::PipelineError;

/// Minimum score a file must reach.
pub const DEFAULT_LINT_THRESHOLD: f64 = 9.5;

/// Summary-line regex. Accepts negative scores, which older linters emit.
static RATED_AT: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(concat!(
        r"rated at\s+",
        r"(-?\d+(?:\.\d+)?)", // score
        r"\s*/\s*10\b",
    )) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid lint summary regex: {err}"),
    }
});

/// Parse the score from linter output, taking the last summary line.
#[must_use]
pub fn parse_score(output: &str) -> Option<f64> {
    RATED_AT
        .captures_iter(output)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|score| score.is_finite())
}

/// Accept `threshold` only if it lies on the linter's `0..=10` scale.
///
/// # Errors
///
/// Returns `PipelineError::InvalidThreshold` for values outside the scale
/// (including NaN).
pub fn check_threshold(threshold: f64) -> Result<f64, PipelineError> {
    if (0.0..=10.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PipelineError::InvalidThreshold(threshold))
    }
}

/// A lint score as reported by the linter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LintScore {
    Parsed(f64),
    Unparseable,
}

impl LintScore {
    #[must_use]
    pub fn from_output(output: &str) -> Self {
        parse_score(output).map_or(Self::Unparseable, Self::Parsed)
    }

    /// Numeric value; `Unparseable` counts as `0.0`.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Parsed(score) => score,
            Self::Unparseable => 0.0,
        }
    }

    /// A score passes iff it is not strictly below `threshold`.
    #[must_use]
    pub fn passes(self, threshold: f64) -> bool {
        self.value() >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
************* Module phase_amp_omega
phase_amp_omega.py:118:0: C0413: Import \"import sys\" should be placed at the top of the module (wrong-import-position)

------------------------------------------------------------------
Your code has been rated at 9.71/10 (previous run: 9.50/10, +0.21)
";

    #[test]
    fn test_parse_summary_line() {
        assert_eq!(parse_score(REPORT), Some(9.71));
        assert_eq!(LintScore::from_output(REPORT), LintScore::Parsed(9.71));
    }

    #[test]
    fn test_parse_negative_and_integer_scores() {
        assert_eq!(
            parse_score("Your code has been rated at -3.25/10"),
            Some(-3.25)
        );
        assert_eq!(parse_score("Your code has been rated at 10/10"), Some(10.0));
    }

    #[test]
    fn test_other_scales_are_not_scores() {
        assert_eq!(parse_score("Coverage rated at 85/100"), None);
    }

    #[test]
    fn test_check_threshold() {
        assert!(check_threshold(9.5).is_ok());
        assert!(check_threshold(0.0).is_ok());
        assert!(check_threshold(10.0).is_ok());
        assert!(check_threshold(11.0).is_err());
        assert!(check_threshold(-0.5).is_err());
        assert!(check_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_last_summary_wins() {
        let out = "rated at 1.00/10\n...\nrated at 9.90/10\n";
        assert_eq!(parse_score(out), Some(9.9));
    }

    #[test]
    fn test_unparseable_counts_as_zero() {
        let score = LintScore::from_output("Traceback (most recent call last):\n  ...");
        assert_eq!(score, LintScore::Unparseable);
        assert!(score.value().abs() < f64::EPSILON);
        assert!(!score.passes(DEFAULT_LINT_THRESHOLD));
        assert!(score.passes(0.0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(LintScore::Parsed(9.5).passes(DEFAULT_LINT_THRESHOLD));
        assert!(!LintScore::Parsed(9.49).passes(DEFAULT_LINT_THRESHOLD));
        assert!(LintScore::Parsed(10.0).passes(DEFAULT_LINT_THRESHOLD));
    }
}
