//! Per-job dependency planning.
//!
//! Reads requirement manifests and works out what a given profile installs.
//! Nothing is installed here; the plan is handed to the CI runner.

use serde::Serialize;

use crate::config::CompanionConfig;
use crate::profile::{CompanionSource, ProfileSpec};

/// One requirement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// The full requirement text, comments stripped.
    pub spec: String,
    /// Distribution name.
    pub name: String,
    /// `true` when the version is pinned with `==`.
    pub pinned: bool,
}

/// Cut a trailing comment. `#` starts a comment only at the beginning of the
/// line or after whitespace, so URL fragments such as `#egg=` survive.
fn strip_comment(line: &str) -> &str {
    line.char_indices()
        .find(|&(i, c)| c == '#' && (i == 0 || line[..i].ends_with(char::is_whitespace)))
        .map_or(line, |(i, _)| &line[..i])
}

/// Parse a requirements manifest. Blank lines and comments are skipped.
///
/// URL requirements take their name from the `#egg=` fragment.
#[must_use]
pub fn parse_requirements(content: &str) -> Vec<Requirement> {
    content
        .lines()
        .filter_map(|line| {
            let spec = strip_comment(line).trim();
            if spec.is_empty() {
                return None;
            }
            let name = match spec.split_once("#egg=") {
                Some((_, egg)) => egg,
                None => {
                    let name_end = spec
                        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.')))
                        .unwrap_or(spec.len());
                    &spec[..name_end]
                }
            };
            Some(Requirement {
                spec: spec.to_owned(),
                name: name.to_owned(),
                pinned: spec.contains("=="),
            })
        })
        .collect()
}

/// What one job installs before the per-file loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupPlan {
    pub profile: String,
    pub requirements: Vec<Requirement>,
    /// Requirements left out for this profile.
    pub dropped: Vec<Requirement>,
    pub companion: String,
}

impl SetupPlan {
    /// Build the plan for `profile` from manifests given in install order.
    #[must_use]
    pub fn for_profile(
        profile: &ProfileSpec,
        manifests: &[&str],
        companion: &CompanionConfig,
    ) -> Self {
        let (requirements, dropped): (Vec<Requirement>, Vec<Requirement>) = manifests
            .iter()
            .flat_map(|m| parse_requirements(m))
            .partition(|r| profile.pin_requirements || !r.pinned);

        let companion = match profile.companion_source {
            CompanionSource::Release => companion.release.clone(),
            CompanionSource::Development => companion.development.clone(),
        };

        Self {
            profile: profile.version.to_string(),
            requirements,
            dropped,
            companion,
        }
    }
}
