//! Output types shared by the tree serializer and the outline parser.
//!
//! These are serialized as the JSON consumed by the site configuration, so
//! field names follow its camelCase conventions (`activeMatch`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One top-level navigation bar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavEntry {
    pub text: String,
    /// Path prefix that highlights this entry as active.
    #[serde(rename = "activeMatch")]
    pub active_match: String,
    pub link: String,
}

/// A sidebar node: a link to a document or a group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    Group(SidebarGroup),
    Link(SidebarLink),
}

impl SidebarItem {
    pub fn text(&self) -> &str {
        match self {
            Self::Group(g) => &g.text,
            Self::Link(l) => &l.text,
        }
    }

    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Group(g) => g.link.as_deref(),
            Self::Link(l) => Some(&l.link),
        }
    }

    pub fn items(&self) -> &[SidebarItem] {
        match self {
            Self::Group(g) => &g.items,
            Self::Link(_) => &[],
        }
    }
}

/// A folder (or outline heading) with nested entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarGroup {
    pub text: String,
    /// `None` = not collapsible; `Some(true)` = starts collapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    pub items: Vec<SidebarItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A single document link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarLink {
    pub text: String,
    pub link: String,
}

/// Sidebars keyed by the path prefix they apply to.
pub type Sidebar = BTreeMap<String, Vec<SidebarItem>>;

/// Generated navigation and sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Empty when the host already defines a nav.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nav: Vec<NavEntry>,
    pub sidebar: Sidebar,
}

/// The host site configuration the generator reads from and writes into.
#[derive(Debug, Clone, Default)]
pub struct HostSite {
    /// Documentation root.
    pub src_root: PathBuf,
    /// Extra documents to skip, on top of the generator's own `exclude`.
    pub exclude_patterns: Vec<String>,
    /// A manually configured nav. Never replaced or merged with generated entries.
    pub nav: Vec<NavEntry>,
    pub sidebar: Sidebar,
    /// Timestamp cache directory.
    pub cache_dir: PathBuf,
}

impl HostSite {
    pub fn new(src_root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }

    pub fn has_nav(&self) -> bool {
        !self.nav.is_empty()
    }

    /// Install generated output. An existing nav is left untouched.
    pub fn apply(&mut self, manifest: Manifest) {
        if !self.has_nav() {
            self.nav = manifest.nav;
        }
        self.sidebar = manifest.sidebar;
    }

    /// The nav and sidebar the host ends up with, ready to write back.
    pub fn into_manifest(self) -> Manifest {
        Manifest {
            nav: self.nav,
            sidebar: self.sidebar,
        }
    }
}
