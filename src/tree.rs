//! Tree construction from a flat list of document paths.
//!
//! Discovery hands over relative paths like `guide/setup/install.md`. The
//! builder walks each path segment by segment, reusing sibling nodes whose
//! name matches, so every folder exists exactly once no matter how many
//! documents pass through it:
//!
//! ```text
//! a.md                      a.md
//! guide/intro.md     →      guide/
//! guide/setup/install.md      ├── intro.md
//!                             └── setup/
//!                                 └── install.md
//! ```
//!
//! Options are resolved when a node is first created. A node that resolves to
//! hidden is never created, and the rest of that path is abandoned, so a
//! hidden folder takes its whole subtree with it.
//!
//! Timestamps are filled in after the shape is known: files and folders
//! resolve their own timestamps in parallel ([`stamp_timestamps`]), then
//! folders take the min/max of their descendants ([`aggregate_timestamps`]).
//! Aggregation has to wait for the whole tree because a folder discovered
//! early cannot know about documents added to it later in the path list.

use crate::cache::CacheManifest;
use crate::config::SidebarConfig;
use crate::metadata::{DocumentMetadata, DocumentSource, MetadataError};
use crate::naming::{join_rel, parse_entry_name};
use crate::options::ResolvedOptions;
use crate::timestamps::{Lookup, TimestampResolver, Timestamps};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file or folder in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Raw file or folder name, extension included.
    pub name: String,
    /// Path relative to the scan start, `/`-separated.
    pub rel_path: String,
    pub is_folder: bool,
    /// Index among siblings when the node was created.
    pub position_index: usize,
    pub options: ResolvedOptions,
    /// Present for documents only.
    pub document: Option<DocumentMetadata>,
    pub timestamps: Timestamps,
    /// Always empty for documents.
    pub children: Vec<Item>,
}

impl Item {
    /// First level-1 heading of the document, if any.
    pub fn heading(&self) -> Option<&str> {
        self.document.as_ref()?.heading.as_deref()
    }
}

/// Build the forest for `paths`.
///
/// Fails only when a document can't be read or its front-matter is invalid.
pub fn build(
    paths: &[String],
    config: &SidebarConfig,
    documents: &dyn DocumentSource,
) -> Result<Vec<Item>, MetadataError> {
    let mut forest = Vec::new();
    for path in paths {
        insert_path(&mut forest, path, config, documents)?;
    }
    Ok(forest)
}

fn insert_path(
    forest: &mut Vec<Item>,
    path: &str,
    config: &SidebarConfig,
    documents: &dyn DocumentSource,
) -> Result<(), MetadataError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(file_name) = segments.last() else {
        return Ok(());
    };
    if !parse_entry_name(file_name).is_content {
        debug!(path, "not a content file, skipping path");
        return Ok(());
    }
    let mut siblings = forest;
    let mut rel_path = String::new();

    for (depth, segment) in segments.iter().enumerate() {
        let is_last = depth + 1 == segments.len();
        rel_path = join_rel(&rel_path, segment);

        let pos = match siblings.iter().position(|item| item.name == *segment) {
            Some(pos) => {
                if !siblings[pos].is_folder && !is_last {
                    debug!(path, node = %rel_path, "name already taken by a document, skipping path");
                    return Ok(());
                }
                pos
            }
            None => {
                let is_folder = !is_last;
                let document = if is_folder {
                    None
                } else {
                    Some(documents.load(&rel_path)?)
                };
                let options =
                    ResolvedOptions::resolve(config, document.as_ref(), &rel_path, segment);
                if options.hidden {
                    debug!(node = %rel_path, "hidden, skipping subtree");
                    return Ok(());
                }
                siblings.push(Item {
                    name: segment.to_string(),
                    rel_path: rel_path.clone(),
                    is_folder,
                    position_index: siblings.len(),
                    options,
                    document,
                    timestamps: Timestamps::default(),
                    children: Vec::new(),
                });
                siblings.len() - 1
            }
        };

        siblings = &mut siblings[pos].children;
    }
    Ok(())
}

/// Resolve every node's own timestamps in parallel.
///
/// Each task only reads the cache; the returned lookups (one per node, keyed
/// by absolute path) are for the caller to write back.
pub fn stamp_timestamps(
    items: &mut [Item],
    root: &Path,
    cache: &CacheManifest,
    resolver: &TimestampResolver<'_>,
) -> std::io::Result<Vec<(PathBuf, Lookup)>> {
    let nested = items
        .par_iter_mut()
        .map(|item| -> std::io::Result<Vec<(PathBuf, Lookup)>> {
            let path = root.join(&item.rel_path);
            let lookup = resolver.lookup(cache, &path, item.is_folder)?;
            item.timestamps = lookup.timestamps;

            let mut lookups = stamp_timestamps(&mut item.children, root, cache, resolver)?;
            lookups.push((path, lookup));
            Ok(lookups)
        })
        .collect::<std::io::Result<Vec<_>>>()?;

    Ok(nested.into_iter().flatten().collect())
}

/// Set each folder's history pair to the min/max over its descendant
/// documents. Returns the `(earliest, latest)` span of `items`.
///
/// A folder with no documents below it keeps its local timestamps and
/// contributes nothing to its parent's span.
pub fn aggregate_timestamps(items: &mut [Item]) -> Option<(i64, i64)> {
    let mut span: Option<(i64, i64)> = None;

    for item in items.iter_mut() {
        let item_span = if item.is_folder {
            let child_span = aggregate_timestamps(&mut item.children);
            if let Some((earliest, latest)) = child_span {
                item.timestamps.first_history = Some(earliest);
                item.timestamps.last_history = Some(latest);
            }
            child_span
        } else {
            Some((item.timestamps.earliest(), item.timestamps.latest()))
        };

        if let Some((earliest, latest)) = item_span {
            span = Some(match span {
                Some((lo, hi)) => (lo.min(earliest), hi.max(latest)),
                None => (earliest, latest),
            });
        }
    }
    span
}
