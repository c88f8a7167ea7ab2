//! Generator configuration module.
//!
//! Handles loading, validating, and merging `sidebar.toml`. The file lives in
//! the documentation root; stock defaults are overridden by whatever keys the
//! user file sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! scan_start_path = ""          # Subdirectory of the docs root to generate from
//! pattern = ["**/*.md"]         # Documents to include
//! exclude = []                  # Documents to skip
//! frontmatter_prefix = "sidebar" # Front-matter keys become `sidebar-sort` etc. (omit for bare keys only)
//! index_as_folder_link = true   # `index.md` becomes its folder's link
//! use_article_title = false     # Use each document's `# heading` as its title
//! collapsed = false             # Default collapse state for folders (omit = not collapsible)
//! cache_dir = ".vitepress/cache/auto-sidebar"
//!
//! [items."guide"]               # Keyed by bare name or by path under scan_start_path
//! sort = 1
//! title = "User Guide"
//! collapsed = true
//!
//! [items."guide/drafts"]
//! hide = true
//!
//! [summary]                     # Present = read an outline file instead of scanning
//! target = "SUMMARY.md"
//! collapsed = false
//! remove_escape = true
//!
//! [processing]
//! max_processes = 4             # Timestamp resolver threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file inside the documentation root.
pub const CONFIG_FILENAME: &str = "sidebar.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `sidebar.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidebarConfig {
    /// Subdirectory of the documentation root the tree is generated from.
    /// Links and `items` path keys are relative to it.
    pub scan_start_path: String,
    /// Glob patterns selecting documents, relative to the scan start.
    pub pattern: Vec<String>,
    /// Glob patterns of documents to skip.
    pub exclude: Vec<String>,
    /// Prefix for front-matter overrides (`<prefix>-sort`, `<prefix>-hide`, ...).
    pub frontmatter_prefix: Option<String>,
    /// Fold `index.md` into its enclosing folder's link.
    pub index_as_folder_link: bool,
    /// Global default for using a document's first heading as its title.
    pub use_article_title: bool,
    /// Global default collapse state for folder groups. `None` means folder
    /// groups are not collapsible at all.
    pub collapsed: Option<bool>,
    /// Directory (relative to the documentation root) holding the timestamp cache.
    pub cache_dir: String,
    /// Per-item settings keyed by bare name or path.
    pub items: BTreeMap<String, ItemSetting>,
    /// Outline-file mode. When set, every other option is ignored.
    pub summary: Option<SummaryConfig>,
    /// Parallel timestamp resolution settings.
    pub processing: ProcessingConfig,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            scan_start_path: String::new(),
            pattern: vec!["**/*.md".to_string()],
            exclude: Vec::new(),
            frontmatter_prefix: None,
            index_as_folder_link: true,
            use_article_title: false,
            collapsed: None,
            cache_dir: ".vitepress/cache/auto-sidebar".to_string(),
            items: BTreeMap::new(),
            summary: None,
            processing: ProcessingConfig::default(),
        }
    }
}

impl SidebarConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern.is_empty() {
            return Err(ConfigError::Validation("pattern must not be empty".into()));
        }
        for pattern in self.pattern.iter().chain(&self.exclude) {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "invalid glob pattern '{pattern}': {e}"
                )));
            }
        }
        if let Some(summary) = &self.summary
            && summary.target.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "summary.target must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The configured front-matter prefix, with an empty string meaning none.
    pub fn prefix(&self) -> Option<&str> {
        self.frontmatter_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Explicit settings for one item, keyed in [`SidebarConfig::items`].
///
/// Every field is optional: an absent field falls through to the global
/// default for that attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemSetting {
    /// Exclude the item (and, for folders, everything below it).
    pub hide: Option<bool>,
    /// Explicit sort weight.
    pub sort: Option<f64>,
    /// Display title override.
    pub title: Option<String>,
    /// Use the document's first heading as the title.
    pub use_heading_as_title: Option<bool>,
    /// Collapse state for a folder group.
    pub collapsed: Option<bool>,
}

/// Outline-file mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Outline file path, relative to the documentation root.
    pub target: String,
    /// Collapse state applied to every group built from the outline.
    #[serde(default)]
    pub collapsed: Option<bool>,
    /// Strip markdown backslash escapes from link text.
    #[serde(default)]
    pub remove_escape: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel timestamp resolver threads.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SidebarConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sidebar.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SidebarConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SidebarConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sidebar.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SidebarConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `sidebar.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# auto-sidebar Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the documentation root (next to .vitepress/).
# Unknown keys will cause an error.

# Subdirectory of the documentation root to generate from.
# Links and [items] path keys are relative to it.
scan_start_path = ""

# Glob patterns selecting documents.
pattern = ["**/*.md"]

# Glob patterns of documents to skip.
exclude = []

# Front-matter overrides may be prefixed, e.g. `sidebar-sort: 2`.
# Prefixed keys win over bare keys (`sort: 2`). Omit for bare keys only.
# frontmatter_prefix = "sidebar"

# Fold `index.md` into its folder: the folder group links to it and the
# document is not listed as its own entry.
index_as_folder_link = true

# Use each document's first `# heading` as its sidebar title.
use_article_title = false

# Default collapse state for folder groups.
# Omit to make folder groups non-collapsible.
# collapsed = false

# Timestamp cache location, relative to the documentation root.
cache_dir = ".vitepress/cache/auto-sidebar"

# ---------------------------------------------------------------------------
# Per-item settings
# ---------------------------------------------------------------------------
# Keyed by bare file/folder name ("intro.md", "guide") or by path relative
# to scan_start_path ("guide/intro"). Path keys win over bare names.
# Front-matter in the document itself wins over everything here.
#
# [items."guide"]
# hide = false
# sort = 1
# title = "User Guide"
# use_heading_as_title = false
# collapsed = true

[items]

# ---------------------------------------------------------------------------
# Outline mode
# ---------------------------------------------------------------------------
# When present, the sidebar is read from an outline file instead of the
# directory tree and every option above is ignored.
#
# [summary]
# target = "SUMMARY.md"
# collapsed = false
# remove_escape = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel timestamp resolver threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
