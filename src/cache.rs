//! Timestamp cache for repeated builds.
//!
//! History lookups spawn one `git` process per document, which dominates the
//! build for large documentation trees. This module lets the resolver skip
//! the history query when a document hasn't changed since the last build.
//!
//! # Design
//!
//! The cache is keyed by **absolute path** and invalidated per entry by a
//! single stamp: the local modification time observed when the entry was
//! written. A lookup is a hit only when the current modification time equals
//! the stored one; anything else (edited file, fresh checkout) re-resolves.
//!
//! The cache is an explicit value passed into and out of the build pass, so
//! parallel test runs never share state.
//!
//! ## Storage
//!
//! A JSON file at `<cache_dir>/timestamps.json`. A missing, unreadable,
//! corrupt, or wrong-version file loads as an empty cache (cold start).
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `generate` to resolve everything fresh. The rewritten
//! cache replaces the old one.

use crate::timestamps::Timestamps;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the cache file within the cache directory.
const MANIFEST_FILENAME: &str = "timestamps.json";

/// Version of the cache format. Bump this to invalidate all existing caches
/// when the format changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached path.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Modification time the entry was resolved against.
    pub modified: i64,
    pub timestamps: Timestamps,
}

impl CacheEntry {
    pub fn new(timestamps: Timestamps) -> Self {
        Self {
            modified: timestamps.local_modified,
            timestamps,
        }
    }
}

/// On-disk cache mapping absolute paths to resolved timestamps.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty cache (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let path = manifest_path(cache_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no timestamp cache, starting cold");
                return Self::empty();
            }
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "corrupt timestamp cache, starting cold");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            debug!(found = manifest.version, "timestamp cache version mismatch, starting cold");
            return Self::empty();
        }
        manifest
    }

    /// Save to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(cache_dir)?;
        let path = manifest_path(cache_dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Cached timestamps for `path`, if the entry was resolved against the
    /// same modification time.
    pub fn find_cached(&self, path: &Path, modified: i64) -> Option<&Timestamps> {
        self.entries
            .get(path.to_string_lossy().as_ref())
            .filter(|entry| entry.modified == modified)
            .map(|entry| &entry.timestamps)
    }

    /// Record (or replace) the entry for `path`.
    pub fn insert(&mut self, path: &Path, entry: CacheEntry) {
        self.entries
            .insert(path.to_string_lossy().into_owned(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} resolved ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} resolved", self.misses)
        }
    }
}

/// Resolve the cache file path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}
