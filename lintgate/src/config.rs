//! Configuration types for the check pipeline.
//!
//! Split into discovery options (which files), tool commands (how each check
//! is launched) and the capability table (which checks run per profile).
//! Every field has a default, so an empty YAML document is a valid config
//! that reproduces the stock Python pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::lint_score::{DEFAULT_LINT_THRESHOLD, check_threshold};
use crate::matrix::MatrixConfig;
use crate::profile::CapabilityTable;
use crate::tool::ToolCommands;

/// Filesystem discovery options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct DiscoveryConfig {
    /// Directories (or single files) to scan. Defaults to the current directory.
    pub roots: Vec<PathBuf>,
    /// Source file extension, without the dot.
    pub extension: String,
    /// File names that are never targets (package markers).
    pub exclude_names: Vec<String>,
    /// Subdirectories of each root that are skipped entirely (the test tree).
    pub exclude_dirs: Vec<String>,
    /// Additional exclude patterns (glob format), matched against the path
    /// and the file name.
    pub exclude: Vec<String>,
    /// Whether to follow symbolic links. Defaults to `false`.
    pub follow_links: bool,
    /// Maximum directory traversal depth (default: 64).
    pub max_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            extension: "py".to_owned(),
            exclude_names: vec!["__init__.py".to_owned()],
            exclude_dirs: vec!["tests".to_owned()],
            exclude: Vec::new(),
            follow_links: false,
            max_depth: 64,
        }
    }
}

/// Companion package installed alongside the project dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct CompanionConfig {
    /// Requirement spec used for the released package.
    pub release: String,
    /// Requirement spec used for the development source.
    pub development: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            release: "scipy".to_owned(),
            development: "git+https://github.com/scipy/scipy.git".to_owned(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct PipelineConfig {
    pub discovery: DiscoveryConfig,
    pub tools: ToolCommands,
    /// Minimum lint score; files strictly below it fail.
    pub lint_threshold: f64,
    /// Working directory for every tool invocation (defaults to the process cwd).
    pub working_dir: Option<PathBuf>,
    pub profiles: CapabilityTable,
    pub matrix: MatrixConfig,
    pub companion: CompanionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            tools: ToolCommands::default(),
            lint_threshold: DEFAULT_LINT_THRESHOLD,
            working_dir: None,
            profiles: CapabilityTable::default(),
            matrix: MatrixConfig::default(),
            companion: CompanionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document. Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ConfigParse` if the document is not valid YAML
    /// or has keys of the wrong shape (including an empty `profiles` list),
    /// and `PipelineError::InvalidThreshold` if `lint_threshold` is off the
    /// `0..=10` scale.
    pub fn from_yaml_str(content: &str) -> Result<Self, PipelineError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_saphyr::from_str::<Self>(content)
            .map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        check_threshold(config.lint_threshold)?;
        Ok(config)
    }

    /// Read and parse a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ConfigRead` if the file cannot be read and
    /// `PipelineError::ConfigParse` if it does not parse.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}
