//! Environment profiles and the capability table.
//!
//! A profile is a toolchain version under test. Which checks run for it,
//! which lint rule file it uses and how its dependencies are planned are all
//! looked up here instead of being branched on inline.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::check::CheckKind;
use crate::error::PipelineError;

/// Lint rule file used by every profile except the oldest.
pub const DEFAULT_LINT_RCFILE: &str = ".pylintrc";

/// Lint rule file used by the oldest profile.
pub const LEGACY_LINT_RCFILE: &str = ".pylintrc_python36";

/// A toolchain version identifier: a concrete release or the "latest" alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ToolchainVersion {
    /// A concrete release such as `3.8` or `3.6.7`.
    Release {
        major: u32,
        minor: u32,
        patch: Option<u32>,
    },
    /// The newest available release of a major line, written `3.x`.
    Latest { major: u32 },
}

impl ToolchainVersion {
    const fn major(self) -> u32 {
        match self {
            Self::Release { major, .. } | Self::Latest { major } => major,
        }
    }

    /// Whether `other` names the same `major.minor` line as `self`.
    fn same_line(self, other: Self) -> bool {
        match (self, other) {
            (
                Self::Release { major, minor, .. },
                Self::Release {
                    major: o_major,
                    minor: o_minor,
                    ..
                },
            ) => major == o_major && minor == o_minor,
            (Self::Latest { major }, Self::Latest { major: o_major }) => major == o_major,
            _ => false,
        }
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major()
            .cmp(&other.major())
            .then_with(|| match (self, other) {
                (
                    Self::Release { minor, patch, .. },
                    Self::Release {
                        minor: o_minor,
                        patch: o_patch,
                        ..
                    },
                ) => minor.cmp(o_minor).then(patch.cmp(o_patch)),
                (Self::Release { .. }, Self::Latest { .. }) => Ordering::Less,
                (Self::Latest { .. }, Self::Release { .. }) => Ordering::Greater,
                (Self::Latest { .. }, Self::Latest { .. }) => Ordering::Equal,
            })
    }
}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release {
                major,
                minor,
                patch: Some(patch),
            } => write!(f, "{major}.{minor}.{patch}"),
            Self::Release {
                major,
                minor,
                patch: None,
            } => write!(f, "{major}.{minor}"),
            Self::Latest { major } => write!(f, "{major}.x"),
        }
    }
}

impl FromStr for ToolchainVersion {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |cause: &str| PipelineError::InvalidVersion {
            version: s.to_owned(),
            cause: cause.to_owned(),
        };
        let number = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| invalid(&format!("'{part}' is not a number")))
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [major, "x" | "X"] => Ok(Self::Latest {
                major: number(*major)?,
            }),
            [major, minor] => Ok(Self::Release {
                major: number(*major)?,
                minor: number(*minor)?,
                patch: None,
            }),
            [major, minor, patch] => Ok(Self::Release {
                major: number(*major)?,
                minor: number(*minor)?,
                patch: Some(number(*patch)?),
            }),
            _ => Err(invalid("expected MAJOR.MINOR[.PATCH] or MAJOR.x")),
        }
    }
}

impl TryFrom<String> for ToolchainVersion {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolchainVersion> for String {
    fn from(value: ToolchainVersion) -> Self {
        value.to_string()
    }
}

/// Where the companion package is installed from for a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionSource {
    /// The published release.
    #[default]
    Release,
    /// The development branch.
    Development,
}

/// Capabilities of one environment profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProfileSpec {
    /// Toolchain version this profile describes.
    pub version: ToolchainVersion,
    /// Checks enabled for this profile.
    #[serde(default = "all_checks")]
    pub checks: BTreeSet<CheckKind>,
    /// Rule file passed to the lint-score check.
    #[serde(default = "default_rcfile")]
    pub lint_rcfile: String,
    /// Keep version-pinned requirement entries when planning setup.
    #[serde(default = "default_true")]
    pub pin_requirements: bool,
    /// Companion package source.
    #[serde(default)]
    pub companion_source: CompanionSource,
}

fn all_checks() -> BTreeSet<CheckKind> {
    CheckKind::ALL.into_iter().collect()
}

fn default_rcfile() -> String {
    DEFAULT_LINT_RCFILE.to_owned()
}

const fn default_true() -> bool {
    true
}

impl ProfileSpec {
    /// A profile with every check enabled and default settings.
    #[must_use]
    pub fn new(version: ToolchainVersion) -> Self {
        Self {
            version,
            checks: all_checks(),
            lint_rcfile: default_rcfile(),
            pin_requirements: true,
            companion_source: CompanionSource::Release,
        }
    }

    /// Whether `check` runs under this profile.
    #[must_use]
    pub fn enables(&self, check: CheckKind) -> bool {
        self.checks.contains(&check)
    }

    /// Enabled checks in pipeline order.
    pub fn enabled_checks(&self) -> impl Iterator<Item = CheckKind> + '_ {
        CheckKind::ALL.into_iter().filter(|c| self.enables(*c))
    }
}

/// Explicit mapping from environment profile to its capabilities.
///
/// Never empty, whether built in code or loaded from config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProfileSpec>", into = "Vec<ProfileSpec>")]
pub struct CapabilityTable {
    profiles: Vec<ProfileSpec>,
}

impl TryFrom<Vec<ProfileSpec>> for CapabilityTable {
    type Error = PipelineError;

    fn try_from(profiles: Vec<ProfileSpec>) -> Result<Self, Self::Error> {
        Self::new(profiles)
    }
}

impl From<CapabilityTable> for Vec<ProfileSpec> {
    fn from(table: CapabilityTable) -> Self {
        table.profiles
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::python_default()
    }
}

impl CapabilityTable {
    /// Build a table from explicit profiles.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::EmptyCapabilityTable` if `profiles` is empty.
    pub fn new(profiles: Vec<ProfileSpec>) -> Result<Self, PipelineError> {
        if profiles.is_empty() {
            return Err(PipelineError::EmptyCapabilityTable);
        }
        Ok(Self { profiles })
    }

    /// The table used by the Python CI matrix: `3.6.7`, `3.7`, `3.8`, `3.x`.
    ///
    /// `3.6.7` is the oldest profile: no format or type check, the legacy
    /// lint rule file, and pinned requirements dropped. `3.x` takes the
    /// companion package from its development source.
    #[must_use]
    pub fn python_default() -> Self {
        let release = |minor, patch| ToolchainVersion::Release {
            major: 3,
            minor,
            patch,
        };

        let mut legacy = ProfileSpec::new(release(6, Some(7)));
        legacy.checks.remove(&CheckKind::Format);
        legacy.checks.remove(&CheckKind::TypeCheck);
        LEGACY_LINT_RCFILE.clone_into(&mut legacy.lint_rcfile);
        legacy.pin_requirements = false;

        let mut latest = ProfileSpec::new(ToolchainVersion::Latest { major: 3 });
        latest.companion_source = CompanionSource::Development;

        Self {
            profiles: vec![
                legacy,
                ProfileSpec::new(release(7, None)),
                ProfileSpec::new(release(8, None)),
                latest,
            ],
        }
    }

    /// All profiles in table order.
    #[must_use]
    pub fn profiles(&self) -> &[ProfileSpec] {
        &self.profiles
    }

    /// The lowest-versioned profile.
    #[must_use]
    pub fn oldest(&self) -> Option<&ProfileSpec> {
        self.profiles.iter().min_by_key(|p| p.version)
    }

    /// Look up a profile by version string.
    ///
    /// An exact version match wins; otherwise the profile on the same
    /// `major.minor` line is returned (`3.6` resolves to `3.6.7`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` if `version` does not parse and
    /// `UnknownProfile` if no profile matches.
    pub fn resolve(&self, version: &str) -> Result<&ProfileSpec, PipelineError> {
        let wanted: ToolchainVersion = version.parse()?;

        self.profiles
            .iter()
            .find(|p| p.version == wanted)
            .or_else(|| self.profiles.iter().find(|p| p.version.same_line(wanted)))
            .ok_or_else(|| PipelineError::UnknownProfile {
                version: version.to_owned(),
                known: self
                    .profiles
                    .iter()
                    .map(|p| p.version.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
