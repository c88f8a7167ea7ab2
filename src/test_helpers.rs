//! Shared test utilities for the auto-sidebar test suite.
//!
//! Provides fixture setup, in-memory stand-ins for the filesystem, clock and
//! history collaborators, and lookup helpers over trees and sidebars.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let docs = MemoryDocuments::new().with("b/c.md", "---\nsort: 2\n---\n");
//! let forest = tree::build(&paths, &config, &docs).unwrap();
//!
//! assert_eq!(item_names(&forest), vec!["a.md", "b"]);
//! assert_eq!(child_names(&forest, "b"), vec!["c.md", "d.md"]);
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::metadata::{
    DocumentMetadata, DocumentSource, MetadataError, extract_heading, parse_document,
};
use crate::timestamps::{
    FileTimes, HISTORY_TIMEOUT, HistoryError, HistoryLog, LocalTimes, Timestamps,
};
use crate::tree::Item;
use crate::types::SidebarItem;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/docs");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Fake collaborators
// =========================================================================

fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Documents served from memory, keyed by relative path.
///
/// Paths without an entry load as empty documents.
#[derive(Default)]
pub struct MemoryDocuments {
    docs: HashMap<String, String>,
    failing: Vec<String>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rel_path: &str, raw: &str) -> Self {
        self.docs.insert(rel_path.to_string(), raw.to_string());
        self
    }

    /// Make loading `rel_path` fail as if the file were unreadable.
    pub fn failing(mut self, rel_path: &str) -> Self {
        self.failing.push(rel_path.to_string());
        self
    }
}

impl DocumentSource for MemoryDocuments {
    fn load(&self, rel_path: &str) -> Result<DocumentMetadata, MetadataError> {
        let path = PathBuf::from(rel_path);
        if self.failing.iter().any(|f| f == rel_path) {
            return Err(MetadataError::Read {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "unreadable"),
            });
        }
        let Some(raw) = self.docs.get(rel_path) else {
            return Ok(DocumentMetadata::default());
        };
        let parsed = parse_document(raw, &path)?;
        Ok(DocumentMetadata {
            heading: extract_heading(&parsed.body),
            fields: parsed.fields,
        })
    }
}

/// Local timestamps keyed by file name. Unknown names fail like a missing file.
#[derive(Default)]
pub struct FixedTimes {
    times: HashMap<String, LocalTimes>,
}

impl FixedTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, created: i64, modified: i64) -> Self {
        self.times
            .insert(name.to_string(), LocalTimes { created, modified });
        self
    }
}

impl FileTimes for FixedTimes {
    fn stat(&self, path: &Path) -> io::Result<LocalTimes> {
        self.times.get(&file_key(path)).copied().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no fixed times for {}", path.display()),
            )
        })
    }
}

/// History keyed by file name. Unknown names have no history.
#[derive(Default)]
pub struct FixedHistory {
    commits: HashMap<String, Vec<i64>>,
}

impl FixedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, commits: &[i64]) -> Self {
        self.commits.insert(name.to_string(), commits.to_vec());
        self
    }
}

impl HistoryLog for FixedHistory {
    fn history(&self, path: &Path) -> Result<Vec<i64>, HistoryError> {
        Ok(self.commits.get(&file_key(path)).cloned().unwrap_or_default())
    }
}

/// History that always times out.
pub struct FailingHistory;

impl HistoryLog for FailingHistory {
    fn history(&self, _path: &Path) -> Result<Vec<i64>, HistoryError> {
        Err(HistoryError::Timeout(HISTORY_TIMEOUT))
    }
}

/// Returns the same commits for every path and counts queries.
pub struct CountingHistory {
    commits: Vec<i64>,
    calls: AtomicUsize,
}

impl CountingHistory {
    pub fn new(commits: Vec<i64>) -> Self {
        Self {
            commits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HistoryLog for CountingHistory {
    fn history(&self, _path: &Path) -> Result<Vec<i64>, HistoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.commits.clone())
    }
}

// =========================================================================
// Item builders
// =========================================================================

/// A bare document item with default options.
pub fn tree_item(name: &str, rel_path: &str) -> Item {
    Item {
        name: name.to_string(),
        rel_path: rel_path.to_string(),
        is_folder: false,
        position_index: 0,
        options: Default::default(),
        document: None,
        timestamps: Timestamps::default(),
        children: Vec::new(),
    }
}

/// A document item at `index` created at `time`.
pub fn sample_item(name: &str, index: usize, time: i64) -> Item {
    let mut item = tree_item(name, name);
    item.position_index = index;
    item.timestamps.local_created = time;
    item.timestamps.local_modified = time;
    item
}

// =========================================================================
// Tree lookups (panic with a clear message on miss)
// =========================================================================

/// Names of a sibling list in order.
pub fn item_names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

/// Find an item anywhere in the forest by relative path. Panics if not found.
pub fn find_item<'a>(forest: &'a [Item], rel_path: &str) -> &'a Item {
    fn search<'a>(items: &'a [Item], rel_path: &str) -> Option<&'a Item> {
        items.iter().find_map(|item| {
            if item.rel_path == rel_path {
                Some(item)
            } else {
                search(&item.children, rel_path)
            }
        })
    }
    search(forest, rel_path).unwrap_or_else(|| {
        let top = item_names(forest);
        panic!("item '{rel_path}' not found. Top level: {top:?}")
    })
}

/// Child names of the item at `parent_rel`. Panics if not found.
pub fn child_names<'a>(forest: &'a [Item], parent_rel: &str) -> Vec<&'a str> {
    item_names(&find_item(forest, parent_rel).children)
}

// =========================================================================
// Sidebar helpers
// =========================================================================

/// Display texts of a sidebar list in order.
pub fn sidebar_texts(items: &[SidebarItem]) -> Vec<&str> {
    items.iter().map(SidebarItem::text).collect()
}
