//! External tool invocation.
//!
//! Every check is an external program. `ToolRunner` is the seam between the
//! pipeline and the processes it launches; `ProcessRunner` is the real one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::check::CheckKind;
use crate::error::ToolError;

/// Placeholder replaced by the target file path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Placeholder replaced by the profile's lint rule file.
pub const RCFILE_PLACEHOLDER: &str = "{rcfile}";

/// A fully-resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }

    /// Stdout followed by stderr.
    #[must_use]
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        format!("{}\n{}", self.stdout.trim_end(), self.stderr)
    }
}

/// Runs a resolved invocation to completion.
pub trait ToolRunner {
    /// Run `invocation` and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `ToolError` if the program could not be launched at all.
    /// A program that runs and exits non-zero is not an error here.
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &mut T {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        (**self).run(invocation)
    }
}

/// Spawns real processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        command.envs(invocation.env.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| ToolError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Command template for one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for this check only.
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

impl CommandTemplate {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            env: Vec::new(),
        }
    }

    /// Substitute placeholders and produce an invocation.
    ///
    /// If no argument mentions `{file}`, the file is appended as the last
    /// argument.
    #[must_use]
    pub fn resolve(&self, file: &Path, rcfile: &str, current_dir: Option<&Path>) -> Invocation {
        let file = file.to_string_lossy();
        let mut saw_file = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                saw_file |= arg.contains(FILE_PLACEHOLDER);
                arg.replace(FILE_PLACEHOLDER, &file)
                    .replace(RCFILE_PLACEHOLDER, rcfile)
            })
            .collect();
        if !saw_file {
            args.push(file.into_owned());
        }

        Invocation {
            program: self.program.clone(),
            args,
            env: self.env.clone(),
            current_dir: current_dir.map(Path::to_path_buf),
        }
    }
}

/// Command templates for all six checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCommands {
    pub doctest: CommandTemplate,
    pub black: CommandTemplate,
    pub mypy: CommandTemplate,
    pub pylint: CommandTemplate,
    pub pydocstyle: CommandTemplate,
    pub darglint: CommandTemplate,
}

impl Default for ToolCommands {
    fn default() -> Self {
        let mut doctest = CommandTemplate::new("python", &[FILE_PLACEHOLDER]);
        doctest.env = vec![
            ("DOCTEST_MODE".to_owned(), "1".to_owned()),
            ("PYTHONPATH".to_owned(), ".".to_owned()),
        ];

        Self {
            doctest,
            black: CommandTemplate::new("black", &["--check", FILE_PLACEHOLDER]),
            mypy: CommandTemplate::new(
                "mypy",
                &["--strict", "--allow-untyped-calls", FILE_PLACEHOLDER],
            ),
            pylint: CommandTemplate::new("pylint", &["--rcfile={rcfile}", FILE_PLACEHOLDER]),
            pydocstyle: CommandTemplate::new("pydocstyle", &[FILE_PLACEHOLDER]),
            darglint: CommandTemplate::new("darglint", &["-v", "2", FILE_PLACEHOLDER]),
        }
    }
}

impl ToolCommands {
    /// Template for `check`.
    #[must_use]
    pub const fn template(&self, check: CheckKind) -> &CommandTemplate {
        match check {
            CheckKind::Doctest => &self.doctest,
            CheckKind::Format => &self.black,
            CheckKind::TypeCheck => &self.mypy,
            CheckKind::LintScore => &self.pylint,
            CheckKind::DocstringStyle => &self.pydocstyle,
            CheckKind::ArgumentDoc => &self.darglint,
        }
    }
}
