//! The catalogue of per-file checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the six checks run against every target file.
///
/// Variant order is pipeline order: `CheckKind::ALL` and the derived `Ord`
/// both follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    /// Run the file as a script with embedded examples enabled.
    #[serde(rename = "doctest")]
    Doctest,
    /// Canonical auto-formatter, check-only.
    #[serde(rename = "black")]
    Format,
    /// Strict static type checking.
    #[serde(rename = "mypy")]
    TypeCheck,
    /// Linter score against a threshold.
    #[serde(rename = "pylint")]
    LintScore,
    /// Docstring convention linter.
    #[serde(rename = "pydocstyle")]
    DocstringStyle,
    /// Documented arguments must match signatures.
    #[serde(rename = "darglint")]
    ArgumentDoc,
}

impl CheckKind {
    /// All checks in the order the pipeline runs them.
    pub const ALL: [Self; 6] = [
        Self::Doctest,
        Self::Format,
        Self::TypeCheck,
        Self::LintScore,
        Self::DocstringStyle,
        Self::ArgumentDoc,
    ];

    /// Stable name used in failure records, logs and config keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Doctest => "doctest",
            Self::Format => "black",
            Self::TypeCheck => "mypy",
            Self::LintScore => "pylint",
            Self::DocstringStyle => "pydocstyle",
            Self::ArgumentDoc => "darglint",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown check '{s}'"))
    }
}
