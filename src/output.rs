//! CLI output formatting for the generated structures.
//!
//! # Information-First Display
//!
//! Every entry is shown by its display text and 1-based position among its
//! siblings, with its link as secondary context after an arrow. Groups
//! without a link of their own show only their text. This reads as the
//! sidebar a visitor will see, while the links let users trace entries back
//! to documents.
//!
//! # Output Format
//!
//! ```text
//! Nav
//! 001 Guide → /guide/index
//!     Active: /guide/
//! 002 Reference → /reference/api
//!     Active: /reference/
//!
//! Sidebar /guide/
//! 001 User Guide → /guide/index
//!     001 Introduction → /guide/intro
//!     002 setup
//!         001 Linux → /guide/setup/linux
//!
//! Generated 2 sidebars from 4 documents
//! Timestamps: 3 cached, 1 resolved (4 total)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::scan::ScanReport;
use crate::types::{NavEntry, Sidebar, SidebarItem};

// ============================================================================
// Shared entry display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entry header: positional index + text, with the link if any.
///
/// ```text
/// 001 Introduction → /guide/intro
/// 002 setup
/// ```
fn entry_line(index: usize, text: &str, link: Option<&str>) -> String {
    match link {
        Some(link) if !link.is_empty() => format!("{} {} → {}", format_index(index), text, link),
        _ => format!("{} {}", format_index(index), text),
    }
}

fn sidebar_lines(items: &[SidebarItem], depth: usize, lines: &mut Vec<String>) {
    for (i, item) in items.iter().enumerate() {
        lines.push(format!(
            "{}{}",
            indent(depth),
            entry_line(i + 1, item.text(), item.link())
        ));
        sidebar_lines(item.items(), depth + 1, lines);
    }
}

// ============================================================================
// Views
// ============================================================================

/// Nav entries with their active-match prefixes.
pub fn format_nav(nav: &[NavEntry]) -> Vec<String> {
    let mut lines = vec!["Nav".to_string()];
    for (i, entry) in nav.iter().enumerate() {
        lines.push(entry_line(i + 1, &entry.text, Some(&entry.link)));
        if !entry.active_match.is_empty() {
            lines.push(format!("{}Active: {}", indent(1), entry.active_match));
        }
    }
    lines
}

/// One block per sidebar key, blank line between blocks.
pub fn format_sidebar(sidebar: &Sidebar) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, items) in sidebar {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("Sidebar {key}"));
        sidebar_lines(items, 0, &mut lines);
    }
    lines
}

/// Full report for `generate` and `check`.
pub fn format_generate_output(report: &ScanReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.manifest.nav.is_empty() {
        lines.extend(format_nav(&report.manifest.nav));
        lines.push(String::new());
    }
    let sidebar = format_sidebar(&report.manifest.sidebar);
    if !sidebar.is_empty() {
        lines.extend(sidebar);
        lines.push(String::new());
    }

    let groups = report.manifest.sidebar.len();
    let plural = if groups == 1 { "" } else { "s" };
    if report.documents > 0 {
        lines.push(format!(
            "Generated {groups} sidebar{plural} from {} documents",
            report.documents
        ));
        lines.push(format!("Timestamps: {}", report.stats));
    } else {
        lines.push(format!("Generated {groups} sidebar{plural}"));
    }
    lines
}

pub fn print_generate_output(report: &ScanReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::types::{Manifest, SidebarGroup, SidebarLink};

    fn link(text: &str, link: &str) -> SidebarItem {
        SidebarItem::Link(SidebarLink {
            text: text.into(),
            link: link.into(),
        })
    }

    fn group(text: &str, link: Option<&str>, items: Vec<SidebarItem>) -> SidebarItem {
        SidebarItem::Group(SidebarGroup {
            text: text.into(),
            collapsed: None,
            items,
            link: link.map(String::from),
        })
    }

    fn sample_sidebar() -> Sidebar {
        let mut sidebar = Sidebar::new();
        sidebar.insert(
            "/guide/".into(),
            vec![group(
                "User Guide",
                Some("/guide/index"),
                vec![
                    link("Introduction", "/guide/intro"),
                    group("setup", None, vec![link("Linux", "/guide/setup/linux")]),
                ],
            )],
        );
        sidebar.insert("/a".into(), vec![link("a", "/a")]);
        sidebar
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_four_spaces_per_level() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entry_line_with_and_without_link() {
        assert_eq!(entry_line(1, "Intro", Some("/intro")), "001 Intro → /intro");
        assert_eq!(entry_line(2, "setup", None), "002 setup");
        assert_eq!(entry_line(3, "Empty", Some("")), "003 Empty");
    }

    // =========================================================================
    // Views
    // =========================================================================

    #[test]
    fn sidebar_nested_with_positions() {
        let lines = format_sidebar(&sample_sidebar());
        assert_eq!(
            lines,
            vec![
                "Sidebar /a",
                "001 a → /a",
                "",
                "Sidebar /guide/",
                "001 User Guide → /guide/index",
                "    001 Introduction → /guide/intro",
                "    002 setup",
                "        001 Linux → /guide/setup/linux",
            ]
        );
    }

    #[test]
    fn nav_shows_active_match() {
        let lines = format_nav(&[NavEntry {
            text: "Guide".into(),
            active_match: "/guide/".into(),
            link: "/guide/index".into(),
        }]);
        assert_eq!(lines, vec!["Nav", "001 Guide → /guide/index", "    Active: /guide/"]);
    }

    #[test]
    fn generate_output_summary_lines() {
        let report = ScanReport {
            manifest: Manifest {
                nav: vec![],
                sidebar: sample_sidebar(),
            },
            stats: CacheStats { hits: 2, misses: 1 },
            documents: 3,
        };
        let lines = format_generate_output(&report);
        assert_eq!(lines[0], "Sidebar /a");
        assert!(!lines.iter().any(|l| l == "Nav"));
        assert_eq!(
            &lines[lines.len() - 2..],
            &[
                "Generated 2 sidebars from 3 documents".to_string(),
                "Timestamps: 2 cached, 1 resolved (3 total)".to_string(),
            ]
        );
    }

    #[test]
    fn generate_output_outline_mode() {
        let mut sidebar = Sidebar::new();
        sidebar.insert("/".into(), vec![link("A", "/a")]);
        let report = ScanReport {
            manifest: Manifest {
                nav: vec![],
                sidebar,
            },
            stats: CacheStats::default(),
            documents: 0,
        };
        let lines = format_generate_output(&report);
        assert_eq!(lines.last().map(String::as_str), Some("Generated 1 sidebar"));
    }
}
