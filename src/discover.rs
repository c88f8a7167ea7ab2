//! Document discovery.
//!
//! Walks the scan root and returns every file matched by the include globs
//! and not matched by an exclude glob, as `/`-separated paths relative to
//! the root. The walk is sorted by file name so the list, and therefore the
//! initial sibling positions in the tree, is stable across platforms.
//!
//! Some directories are never descended into: site tooling output and
//! dependencies (`.vitepress`, `node_modules`, `dist`, `public`), version
//! control metadata, and any other dot-directory. The root `index.md` is
//! the site's home page and never part of the sidebar.

use crate::naming::parse_entry_name;
use glob::{MatchOptions, Pattern};
use std::path::Path;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped at any depth.
const SKIPPED_DIRS: &[&str] = &[".vitepress", "node_modules", ".git", "dist", "public"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Failed to walk documentation tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Compiled include/exclude globs.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, DiscoverError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a relative path is selected.
    pub fn accepts(&self, rel_path: &str) -> bool {
        self.include.iter().any(|p| matches(p, rel_path))
            && !self.exclude.iter().any(|p| matches(p, rel_path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, DiscoverError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| DiscoverError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// `**/x` also matches `x` at the top level.
fn matches(pattern: &Pattern, rel_path: &str) -> bool {
    if pattern.matches_with(rel_path, MATCH_OPTIONS) {
        return true;
    }
    pattern
        .as_str()
        .strip_prefix("**/")
        .and_then(|rest| Pattern::new(rest).ok())
        .is_some_and(|rest| rest.matches_with(rel_path, MATCH_OPTIONS))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.iter().any(|dir| name == *dir)
}

fn is_root_index(rel_path: &str) -> bool {
    let name = parse_entry_name(rel_path);
    !rel_path.contains('/') && name.is_content && name.is_index
}

/// List matching files under `root`, sorted by path.
pub fn list_files(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<String>, DiscoverError> {
    let filter = PathFilter::new(include, exclude)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if is_root_index(&rel_path) || !filter.accepts(&rel_path) {
            continue;
        }
        files.push(rel_path);
    }

    Ok(files)
}
