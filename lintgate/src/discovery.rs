//! Target file discovery.
//!
//! Walks each root and collects source files, skipping:
//! - tool and VCS directories (`SKIP_DIRS`) anywhere in the tree
//! - the configured test subdirectories of each root
//! - package-marker files (`__init__.py` by default)
//! - anything matching an exclude glob
//!
//! Symlinks are skipped unless `follow_links` is set, and even then a file
//! that resolves outside its root is rejected. Walk errors are returned,
//! never swallowed.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, DiscoveryErrorKind};

/// Directories to skip
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "__pycache__",
    ".venv",
    ".mypy_cache",
    ".tox",
];

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Returns `true` if the entry should be **included** (i.e., is not a skipped directory).
fn is_not_skip_dir(entry: &walkdir::DirEntry, root: &Path, exclude_dirs: &[PathBuf]) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return true;
    }
    if let Some(name) = entry.file_name().to_str()
        && SKIP_DIRS.contains(&name)
    {
        return false;
    }
    !entry
        .path()
        .strip_prefix(root)
        .is_ok_and(|rel| exclude_dirs.iter().any(|d| rel == d.as_path()))
}

fn is_target_file(path: &Path, config: &DiscoveryConfig) -> bool {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == config.extension);
    let is_marker = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| config.exclude_names.iter().any(|x| x == n));
    has_extension && !is_marker
}

/// Find all target files under the configured roots.
///
/// Returns `(files, errors)`:
/// - `files`: sorted, deduplicated paths ready for the check pipeline.
/// - `errors`: missing roots, walk errors, root escapes and bad exclude patterns.
#[must_use]
pub fn find_files(config: &DiscoveryConfig) -> (Vec<PathBuf>, Vec<DiscoveryError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    let mut exclude_patterns = Vec::with_capacity(config.exclude.len());
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => exclude_patterns.push(pat),
            Err(e) => errors.push(DiscoveryError {
                path: PathBuf::from(pat_str),
                kind: DiscoveryErrorKind::InvalidExcludePattern,
                message: format!("Invalid exclude glob pattern '{pat_str}': {e}"),
            }),
        }
    }

    let exclude_dirs: Vec<PathBuf> = config.exclude_dirs.iter().map(PathBuf::from).collect();

    for root in &config.roots {
        if root.is_file() {
            if is_target_file(root, config) && !matches_exclude(root, &exclude_patterns) {
                files.push(root.clone());
            }
            continue;
        }

        if !root.is_dir() {
            errors.push(DiscoveryError {
                path: root.clone(),
                kind: DiscoveryErrorKind::MissingRoot,
                message: "Root path does not exist or is not a directory".to_owned(),
            });
            continue;
        }

        let canonical_root = match root.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                errors.push(DiscoveryError {
                    path: root.clone(),
                    kind: DiscoveryErrorKind::IoError,
                    message: format!("Failed to canonicalize root path: {e}"),
                });
                continue;
            }
        };

        for entry_result in WalkDir::new(root)
            .follow_links(config.follow_links)
            .max_depth(config.max_depth)
            .into_iter()
            .filter_entry(|e| is_not_skip_dir(e, root, &exclude_dirs))
        {
            let entry = match entry_result {
                Ok(e) => e,
                Err(walk_err) => {
                    let path = walk_err
                        .path()
                        .map_or_else(|| root.clone(), Path::to_path_buf);
                    tracing::warn!(path = %path.display(), "directory traversal error: {walk_err}");
                    errors.push(DiscoveryError {
                        path,
                        kind: DiscoveryErrorKind::WalkError,
                        message: format!("Directory traversal error: {walk_err}"),
                    });
                    continue;
                }
            };

            let file_path = entry.path();
            if entry.path_is_symlink() && !config.follow_links {
                tracing::debug!(path = %file_path.display(), "skipping symlink");
                continue;
            }
            if !file_path.is_file() || !is_target_file(file_path, config) {
                continue;
            }

            // Only files that resolve inside the root are checked; a followed
            // symlink may point anywhere on disk.
            match file_path.canonicalize() {
                Ok(canonical_path) => {
                    if !canonical_path.starts_with(&canonical_root) {
                        tracing::warn!(path = %file_path.display(), "resolves outside root");
                        errors.push(DiscoveryError {
                            path: file_path.to_path_buf(),
                            kind: DiscoveryErrorKind::OutsideRoot,
                            message: format!(
                                "Path resolves outside root: {} -> {}",
                                file_path.display(),
                                canonical_path.display()
                            ),
                        });
                        continue;
                    }
                }
                Err(e) => {
                    errors.push(DiscoveryError {
                        path: file_path.to_path_buf(),
                        kind: DiscoveryErrorKind::IoError,
                        message: format!("Failed to canonicalize path: {e}"),
                    });
                    continue;
                }
            }
            if matches_exclude(file_path, &exclude_patterns) {
                tracing::debug!(path = %file_path.display(), "excluded by pattern");
                continue;
            }

            files.push(file_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered target files");
    (files, errors)
}
