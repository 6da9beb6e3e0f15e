//! Job matrix and trigger conditions.
//!
//! Each `(os, toolchain)` pair is an independent pipeline instance with no
//! shared state. The matrix only describes those jobs; scheduling them is
//! the CI runner's business.

use serde::{Deserialize, Serialize};

/// When the pipeline should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Trigger {
    Push { branch: String },
    PullRequest { branch: String },
    Schedule { cron: String },
}

/// Something that happened in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Push { branch: String },
    PullRequest { base: String },
    Schedule { cron: String },
}

impl Trigger {
    /// Whether `event` fires this trigger. Pull requests match on their base branch.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        match (self, event) {
            (Self::Push { branch }, Event::Push { branch: pushed }) => branch == pushed,
            (Self::PullRequest { branch }, Event::PullRequest { base }) => branch == base,
            (Self::Schedule { cron }, Event::Schedule { cron: fired }) => cron == fired,
            _ => false,
        }
    }
}

/// One matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub os: String,
    pub toolchain: String,
}

/// Matrix axes and triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct MatrixConfig {
    pub os: Vec<String>,
    pub toolchains: Vec<String>,
    pub triggers: Vec<Trigger>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            os: vec!["ubuntu-20.04".to_owned(), "ubuntu-22.04".to_owned()],
            toolchains: ["3.6.7", "3.7", "3.8", "3.x"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            triggers: vec![
                Trigger::Push {
                    branch: "master".to_owned(),
                },
                Trigger::PullRequest {
                    branch: "master".to_owned(),
                },
                // 1st and 15th of every month
                Trigger::Schedule {
                    cron: "0 0 1,15 * *".to_owned(),
                },
            ],
        }
    }
}

impl MatrixConfig {
    /// Cartesian product of the axes, operating system major.
    #[must_use]
    pub fn expand(&self) -> Vec<Job> {
        self.os
            .iter()
            .flat_map(|os| {
                self.toolchains.iter().map(move |toolchain| Job {
                    os: os.clone(),
                    toolchain: toolchain.clone(),
                })
            })
            .collect()
    }

    /// Whether any trigger fires for `event`.
    #[must_use]
    pub fn should_run(&self, event: &Event) -> bool {
        self.triggers.iter().any(|t| t.matches(event))
    }
}
