//! Outline-file ingestion.
//!
//! When `[summary]` is configured the tree is not built from the filesystem
//! at all. A single markdown outline lists the sidebar literally:
//!
//! ```markdown
//! # Guide
//!
//! - [Introduction](guide/intro.md)
//! - [Setup](guide/setup.md)
//!   - [Linux](guide/setup/linux.md)
//!
//! ## Advanced
//!
//! * [Plugins](guide/plugins.md)
//!
//! # Reference
//!
//! - [API](reference/api.md)
//! ```
//!
//! Two kinds of line are recognized. Headings nest by their `#` count. List
//! items (`-` or `*`) nest under the most recent heading, and under each
//! other by indentation. The indent unit is whatever leading whitespace the
//! first indented item uses. Any other line is ignored.
//!
//! Each new line closes open nodes until it finds one strictly shallower,
//! then appends under it. Level-1 headings also become nav entries, whose
//! link is the first list link found beneath them.
//!
//! Order is the outline's order. No options, timestamps, or sort weights
//! apply. The whole outline becomes one sidebar under the key `/`.

use crate::naming::{document_link, normalize_rel_path};
use crate::types::{Manifest, NavEntry, Sidebar, SidebarGroup, SidebarItem, SidebarLink};

/// Sidebar key for outline output.
pub const OUTLINE_KEY: &str = "/";

/// List items rank below every heading level.
const LIST_BASE_DEPTH: usize = 7;

/// Outline parsing settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineOptions {
    /// Collapse state applied to every group.
    pub collapsed: Option<bool>,
    /// Drop markdown backslash escapes (`\_` → `_`) from entry text.
    pub remove_escape: bool,
}

#[derive(Debug)]
struct Node {
    depth: usize,
    text: String,
    link: Option<String>,
    is_heading: bool,
    /// Index into the nav list, for level-1 headings.
    nav_slot: Option<usize>,
    children: Vec<Node>,
}

enum Line<'a> {
    Heading { level: usize, text: &'a str },
    Entry { indent: usize, text: &'a str, target: Option<&'a str> },
}

/// Parse outline text into nav entries and a single `/` sidebar.
pub fn parse(outline: &str, opts: &OutlineOptions) -> Manifest {
    let mut nav: Vec<NavEntry> = Vec::new();
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut indent_unit: Option<usize> = None;

    for raw in outline.lines() {
        let Some(line) = classify(raw) else {
            continue;
        };

        let node = match line {
            Line::Heading { level, text } => {
                let text = clean_text(text, opts);
                let nav_slot = (level == 1).then(|| {
                    nav.push(NavEntry {
                        text: text.clone(),
                        active_match: String::new(),
                        link: String::new(),
                    });
                    nav.len() - 1
                });
                Node {
                    depth: level,
                    text,
                    link: None,
                    is_heading: true,
                    nav_slot,
                    children: Vec::new(),
                }
            }
            Line::Entry {
                indent,
                text,
                target,
            } => {
                let level = if indent == 0 {
                    0
                } else {
                    let unit = *indent_unit.get_or_insert(indent);
                    indent.div_ceil(unit)
                };
                let link = target.map(resolve_link);
                if let Some(link) = &link {
                    backfill_nav(&mut nav, &stack, link);
                }
                Node {
                    depth: LIST_BASE_DEPTH + level,
                    text: clean_text(text, opts),
                    link,
                    is_heading: false,
                    nav_slot: None,
                    children: Vec::new(),
                }
            }
        };

        close_until(&mut stack, &mut root, node.depth);
        stack.push(node);
    }
    close_until(&mut stack, &mut root, 0);

    let items = root.into_iter().map(|n| to_sidebar_item(n, opts)).collect();
    let mut sidebar = Sidebar::new();
    sidebar.insert(OUTLINE_KEY.to_string(), items);
    Manifest { nav, sidebar }
}

fn classify(raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim_start();
    let indent = raw.len() - trimmed.len();

    if indent == 0 && trimmed.starts_with('#') {
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        let rest = &trimmed[level..];
        if level > 6 || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
            return None;
        }
        let text = rest.trim().trim_end_matches('#').trim_end();
        return (!text.is_empty()).then_some(Line::Heading { level, text });
    }

    let body = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))?
        .trim();
    if body.is_empty() {
        return None;
    }
    let (text, target) = match parse_link(body) {
        Some((text, target)) => (text, Some(target)),
        None => (body, None),
    };
    Some(Line::Entry {
        indent,
        text,
        target,
    })
}

/// Split `[text](target)` into its parts.
fn parse_link(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_prefix('[')?;
    let split = inner.find("](")?;
    let target = inner[split + 2..].strip_suffix(')')?;
    Some((inner[..split].trim(), target.trim()))
}

/// Site link for an outline target. External URLs and anchors pass through.
fn resolve_link(target: &str) -> String {
    if target.contains("://") || target.starts_with('#') || target.starts_with("mailto:") {
        return target.to_string();
    }
    let (path, anchor) = match target.find('#') {
        Some(pos) => target.split_at(pos),
        None => (target, ""),
    };
    format!("{}{anchor}", document_link("", &normalize_rel_path(path)))
}

/// The first link under a level-1 heading becomes its nav link.
fn backfill_nav(nav: &mut [NavEntry], stack: &[Node], link: &str) {
    let Some(slot) = stack.iter().rev().find_map(|n| n.nav_slot) else {
        return;
    };
    let entry = &mut nav[slot];
    if entry.link.is_empty() {
        entry.link = link.to_string();
        entry.active_match = match link.rfind('/') {
            Some(pos) if !link.contains("://") => link[..=pos].to_string(),
            _ => link.to_string(),
        };
    }
}

/// Pop every open node at `depth` or deeper, attaching each to its parent.
fn close_until(stack: &mut Vec<Node>, root: &mut Vec<Node>, depth: usize) {
    while stack.last().is_some_and(|top| top.depth >= depth) {
        let Some(node) = stack.pop() else {
            break;
        };
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => root.push(node),
        }
    }
}

fn clean_text(text: &str, opts: &OutlineOptions) -> String {
    if !opts.remove_escape {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn to_sidebar_item(node: Node, opts: &OutlineOptions) -> SidebarItem {
    match (node.link, node.is_heading || !node.children.is_empty()) {
        (Some(link), false) => SidebarItem::Link(SidebarLink {
            text: node.text,
            link,
        }),
        (link, _) => SidebarItem::Group(SidebarGroup {
            text: node.text,
            collapsed: opts.collapsed,
            items: node
                .children
                .into_iter()
                .map(|n| to_sidebar_item(n, opts))
                .collect(),
            link,
        }),
    }
}
