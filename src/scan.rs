//! Build pass orchestration.
//!
//! One call to [`scan`] turns a documentation tree into nav entries and
//! sidebars:
//!
//! ```text
//! list_files → tree::build → stamp_timestamps → aggregate → sort_tree → render
//!  (discover)   (options,      (cache, stat,      (folder     (order)   (sidebar)
//!               metadata)       history)           spans)
//! ```
//!
//! With `[summary]` configured the pipeline is bypassed and the outline file
//! is parsed instead ([`crate::summary`]).
//!
//! The timestamp cache is passed in and updated in place; saving it is the
//! caller's job. Each cache entry is written once, after the parallel
//! timestamp pass has finished.
//!
//! ## Layout
//!
//! ```text
//! docs/                       # HostSite::src_root
//! ├── sidebar.toml            # Generator config (optional)
//! ├── index.md                # Home page, never in the sidebar
//! ├── .vitepress/             # Skipped
//! ├── guide/
//! │   ├── index.md            # Folded into the "guide" group link
//! │   ├── intro.md
//! │   └── setup/
//! │       └── install.md
//! └── reference/
//!     └── api.md
//! ```

use crate::cache::{CacheManifest, CacheStats};
use crate::config::SidebarConfig;
use crate::discover::{self, DiscoverError};
use crate::metadata::{FsDocuments, MetadataError};
use crate::naming::normalize_rel_path;
use crate::order::{self, CompareFn, OrderError};
use crate::sidebar::{self, RenderOptions};
use crate::summary::{self, OutlineOptions};
use crate::timestamps::{FileTimes, HistoryLog, TimestampResolver};
use crate::tree;
use crate::types::{HostSite, Manifest};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Discovery error: {0}")]
    Discover(#[from] DiscoverError),
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("Ordering error: {0}")]
    Order(#[from] OrderError),
    #[error("Failed to read outline {path}: {source}")]
    Outline {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// External capabilities a build pass depends on.
pub struct Collaborators<'a> {
    pub times: &'a dyn FileTimes,
    pub history: &'a dyn HistoryLog,
    /// Replaces the default sibling ordering when set.
    pub compare: Option<&'a CompareFn>,
}

/// Result of one build pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub manifest: Manifest,
    pub stats: CacheStats,
    /// Number of documents discovered (0 in outline mode).
    pub documents: usize,
}

/// Run one build pass for `host`.
pub fn scan(
    host: &HostSite,
    config: &SidebarConfig,
    cache: &mut CacheManifest,
    collab: &Collaborators<'_>,
) -> Result<ScanReport, ScanError> {
    if let Some(outline) = &config.summary {
        let path = host.src_root.join(normalize_rel_path(&outline.target));
        let text = fs::read_to_string(&path).map_err(|source| ScanError::Outline {
            path: path.clone(),
            source,
        })?;
        let mut manifest = summary::parse(
            &text,
            &OutlineOptions {
                collapsed: outline.collapsed,
                remove_escape: outline.remove_escape,
            },
        );
        if host.has_nav() {
            manifest.nav.clear();
        }
        info!(path = %path.display(), "sidebar generated from outline");
        return Ok(ScanReport {
            manifest,
            stats: CacheStats::default(),
            documents: 0,
        });
    }

    let scan_start = normalize_rel_path(&config.scan_start_path);
    let scan_root = host.src_root.join(&scan_start);

    let exclude: Vec<String> = config
        .exclude
        .iter()
        .chain(&host.exclude_patterns)
        .cloned()
        .collect();
    let paths = discover::list_files(&scan_root, &config.pattern, &exclude)?;
    debug!(root = %scan_root.display(), count = paths.len(), "documents discovered");

    let mut forest = tree::build(&paths, config, &FsDocuments::new(&scan_root))?;

    let resolver = TimestampResolver::new(collab.times, collab.history);
    let lookups = tree::stamp_timestamps(&mut forest, &scan_root, cache, &resolver)?;
    let mut stats = CacheStats::default();
    for (path, lookup) in lookups {
        lookup.record(cache, &mut stats, &path);
    }

    tree::aggregate_timestamps(&mut forest);
    order::sort_tree(&mut forest, collab.compare, config.prefix())?;

    let manifest = sidebar::render(
        &forest,
        &RenderOptions {
            scan_start: &scan_start,
            index_as_folder_link: config.index_as_folder_link,
            skip_nav: host.has_nav(),
        },
    );
    info!(
        documents = paths.len(),
        groups = manifest.sidebar.len(),
        timestamps = %stats,
        "sidebar generated"
    );

    Ok(ScanReport {
        manifest,
        stats,
        documents: paths.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ItemSetting, SummaryConfig, load_config};
    use crate::test_helpers::{
        CountingHistory, FixedHistory, FixedTimes, setup_fixtures, sidebar_texts,
    };
    use crate::timestamps::FsTimes;
    use crate::tree::Item;
    use crate::types::{NavEntry, SidebarItem};
    use std::cmp::Ordering;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(
        root: &Path,
        config: &SidebarConfig,
        times: &dyn FileTimes,
        history: &dyn HistoryLog,
    ) -> ScanReport {
        let host = HostSite::new(root, root.join("cache"));
        let mut cache = CacheManifest::empty();
        scan(
            &host,
            config,
            &mut cache,
            &Collaborators {
                times,
                history,
                compare: None,
            },
        )
        .unwrap()
    }

    fn abc_times() -> FixedTimes {
        FixedTimes::new()
            .with("a.md", 100, 100)
            .with("b", 1, 1)
            .with("c.md", 300, 300)
            .with("d.md", 200, 200)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[test]
    fn flat_paths_become_ordered_sidebars() {
        let tmp = TempDir::new().unwrap();
        for f in ["a.md", "b/c.md", "b/d.md"] {
            write(tmp.path(), f, "# x\n");
        }
        let report = run(tmp.path(), &SidebarConfig::default(), &abc_times(), &FixedHistory::new());

        assert_eq!(report.documents, 3);
        let nav: Vec<&str> = report.manifest.nav.iter().map(|n| n.text.as_str()).collect();
        // b spans 200..300 from its documents, a is 100.
        assert_eq!(nav, vec!["a", "b"]);
        let b = &report.manifest.sidebar["/b/"][0];
        assert_eq!(sidebar_texts(b.items()), vec!["d", "c"]);
        assert_eq!(report.manifest.nav[1].link, "/b/d");
    }

    #[test]
    fn history_overrides_local_order() {
        let tmp = TempDir::new().unwrap();
        for f in ["b/c.md", "b/d.md"] {
            write(tmp.path(), f, "");
        }
        let history = FixedHistory::new().with("c.md", &[10]).with("d.md", &[20]);
        let report = run(tmp.path(), &SidebarConfig::default(), &abc_times(), &history);
        let b = &report.manifest.sidebar["/b/"][0];
        assert_eq!(sidebar_texts(b.items()), vec!["c", "d"]);
    }

    #[test]
    fn sort_weights_from_front_matter_and_config() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b/c.md", "---\nsort: 1\n---\n");
        write(tmp.path(), "b/d.md", "");
        let mut config = SidebarConfig::default();
        config.items.insert(
            "b/d".into(),
            ItemSetting {
                sort: Some(0.0),
                ..Default::default()
            },
        );
        let report = run(tmp.path(), &config, &abc_times(), &FixedHistory::new());
        let b = &report.manifest.sidebar["/b/"][0];
        assert_eq!(sidebar_texts(b.items()), vec!["d", "c"]);
    }

    #[test]
    fn wide_pattern_skips_non_content_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "notes.txt", "plain text");
        let logo = tmp.path().join("assets/logo.png");
        fs::create_dir_all(logo.parent().unwrap()).unwrap();
        fs::write(&logo, [0x89, b'P', b'N', b'G', 0xff, 0xfe, 0x00]).unwrap();
        let config = SidebarConfig {
            pattern: vec!["**/*".into()],
            ..Default::default()
        };

        let report = run(tmp.path(), &config, &abc_times(), &FixedHistory::new());

        let keys: Vec<&str> = report.manifest.sidebar.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/a"]);
    }

    #[test]
    fn fresh_lookups_written_to_cache() {
        let tmp = TempDir::new().unwrap();
        for f in ["a.md", "b/c.md", "b/d.md"] {
            write(tmp.path(), f, "");
        }
        let host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        let history = CountingHistory::new(vec![5]);
        let times = abc_times();
        let collab = Collaborators {
            times: &times,
            history: &history,
            compare: None,
        };
        let mut cache = CacheManifest::empty();

        let first = scan(&host, &SidebarConfig::default(), &mut cache, &collab).unwrap();
        assert_eq!(first.stats.misses, 4);
        assert_eq!(cache.len(), 4);
        assert_eq!(history.calls(), 3);

        let second = scan(&host, &SidebarConfig::default(), &mut cache, &collab).unwrap();
        assert_eq!(second.stats.hits, 4);
        assert_eq!(history.calls(), 3);
        assert_eq!(first.manifest, second.manifest);
    }

    #[test]
    fn existing_host_nav_suppresses_generation() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        let mut host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        host.nav = vec![NavEntry {
            text: "Manual".into(),
            active_match: "/".into(),
            link: "/".into(),
        }];
        let times = abc_times();
        let report = scan(
            &host,
            &SidebarConfig::default(),
            &mut CacheManifest::empty(),
            &Collaborators {
                times: &times,
                history: &FixedHistory::new(),
                compare: None,
            },
        )
        .unwrap();
        assert!(report.manifest.nav.is_empty());
        assert!(report.manifest.sidebar.contains_key("/a"));
    }

    #[test]
    fn host_exclude_patterns_applied() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "drafts/x.md", "");
        let mut host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        host.exclude_patterns = vec!["drafts/**".into()];
        let times = abc_times().with("x.md", 1, 1);
        let report = scan(
            &host,
            &SidebarConfig::default(),
            &mut CacheManifest::empty(),
            &Collaborators {
                times: &times,
                history: &FixedHistory::new(),
                compare: None,
            },
        )
        .unwrap();
        assert_eq!(report.documents, 1);
    }

    #[test]
    fn custom_compare_error_fails_build() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "c.md", "");
        let host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        let times = abc_times();
        let failing = |a: &Item, b: &Item, _: Option<&str>| -> Result<Ordering, OrderError> {
            Err(OrderError::Compare {
                left: a.name.clone(),
                right: b.name.clone(),
                message: "no".into(),
            })
        };
        let result = scan(
            &host,
            &SidebarConfig::default(),
            &mut CacheManifest::empty(),
            &Collaborators {
                times: &times,
                history: &FixedHistory::new(),
                compare: Some(&failing),
            },
        );
        assert!(matches!(result, Err(ScanError::Order(_))));
    }

    #[test]
    fn invalid_front_matter_fails_build() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "---\nsort: [unclosed\n---\n");
        let host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        let times = abc_times();
        let result = scan(
            &host,
            &SidebarConfig::default(),
            &mut CacheManifest::empty(),
            &Collaborators {
                times: &times,
                history: &FixedHistory::new(),
                compare: None,
            },
        );
        assert!(matches!(result, Err(ScanError::Metadata(_))));
    }

    // =========================================================================
    // Outline mode
    // =========================================================================

    #[test]
    fn outline_bypasses_filesystem_tree() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.md", "");
        write(tmp.path(), "SUMMARY.md", "# Guide\n- [A](a.md)\n");
        let config = SidebarConfig {
            summary: Some(SummaryConfig {
                target: "SUMMARY.md".into(),
                collapsed: None,
                remove_escape: false,
            }),
            ..Default::default()
        };
        let report = run(tmp.path(), &config, &FixedTimes::new(), &FixedHistory::new());
        assert_eq!(report.documents, 0);
        assert_eq!(report.manifest.nav[0].link, "/a");
        assert_eq!(
            report.manifest.sidebar["/"][0].items()[0],
            SidebarItem::Link(crate::types::SidebarLink {
                text: "A".into(),
                link: "/a".into()
            })
        );
    }

    #[test]
    fn missing_outline_is_error() {
        let tmp = TempDir::new().unwrap();
        let host = HostSite::new(tmp.path(), tmp.path().join("cache"));
        let config = SidebarConfig {
            summary: Some(SummaryConfig {
                target: "SUMMARY.md".into(),
                collapsed: None,
                remove_escape: false,
            }),
            ..Default::default()
        };
        let result = scan(
            &host,
            &config,
            &mut CacheManifest::empty(),
            &Collaborators {
                times: &FixedTimes::new(),
                history: &FixedHistory::new(),
                compare: None,
            },
        );
        assert!(matches!(result, Err(ScanError::Outline { .. })));
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    #[test]
    fn fixture_site_renders() {
        let tmp = setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        let report = run(tmp.path(), &config, &FsTimes, &FixedHistory::new());

        let keys: Vec<&str> = report.manifest.sidebar.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/guide/", "/reference/"]);

        let guide = &report.manifest.sidebar["/guide/"][0];
        assert_eq!(guide.link(), Some("/guide/index"));
        assert_eq!(guide.text(), "User Guide");
        assert_eq!(
            sidebar_texts(guide.items()),
            vec!["Introduction", "Installing", "setup"]
        );
    }
}
