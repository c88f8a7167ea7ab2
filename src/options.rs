//! Per-item option resolution.
//!
//! Every attribute of an item can come from three layers. Each attribute is
//! resolved independently; the first layer that yields a usable value wins:
//!
//! 1. Front-matter under the prefixed key (`sidebar-sort` with prefix `sidebar`)
//! 2. Front-matter under the bare key (`sort`)
//! 3. The matching `[items."<key>"]` table in `sidebar.toml`
//!
//! When no layer has a value the built-in default applies: visible, no sort
//! weight, no title override, the global `use_article_title`, the global
//! `collapsed`.
//!
//! A front-matter value of the wrong type (`sort: "first"`) is ignored at its
//! layer and resolution falls through to the next one.
//!
//! ## Matching `[items]` keys
//!
//! Keys are tried in this order; the first match wins and settings from
//! different keys are never merged:
//!
//! 1. Path keys: a key equal to the item's path relative to the scan start,
//!    with or without the `.md` extension (`guide/intro`, `guide/intro.md`).
//! 2. The bare item name (`intro.md`, `guide`).
//! 3. The bare item name without `.md` (`intro`).

use crate::config::{ItemSetting, SidebarConfig};
use crate::metadata::DocumentMetadata;
use crate::naming::{normalize_rel_path, strip_content_extension};
use std::collections::BTreeMap;
use tracing::warn;

/// Front-matter keys, one per attribute.
pub const KEY_HIDE: &str = "hide";
pub const KEY_SORT: &str = "sort";
pub const KEY_TITLE: &str = "title";
pub const KEY_USE_HEADING: &str = "useHeadingAsTitle";
pub const KEY_COLLAPSED: &str = "collapsed";

/// Conversion from a front-matter value into an attribute value.
pub trait FromMetadata: Sized {
    fn from_metadata(value: &serde_yaml::Value) -> Option<Self>;
}

impl FromMetadata for bool {
    fn from_metadata(value: &serde_yaml::Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromMetadata for f64 {
    fn from_metadata(value: &serde_yaml::Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromMetadata for String {
    fn from_metadata(value: &serde_yaml::Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

/// Resolve one attribute across the three layers.
pub fn resolve_attr<T: FromMetadata>(
    document: Option<&DocumentMetadata>,
    explicit: Option<T>,
    key: &str,
    prefix: Option<&str>,
) -> Option<T> {
    if let Some(doc) = document {
        if let Some(prefix) = prefix {
            let prefixed = format!("{prefix}-{key}");
            if let Some(value) = from_document(doc, &prefixed) {
                return Some(value);
            }
        }
        if let Some(value) = from_document(doc, key) {
            return Some(value);
        }
    }
    explicit
}

fn from_document<T: FromMetadata>(doc: &DocumentMetadata, key: &str) -> Option<T> {
    let raw = doc.get(key)?;
    let value = T::from_metadata(raw);
    if value.is_none() {
        warn!(key, value = ?raw, "ignoring front-matter value of the wrong type");
    }
    value
}

/// Find the `[items]` entry for an item. See the module docs for key order.
pub fn find_setting<'a>(
    items: &'a BTreeMap<String, ItemSetting>,
    rel_path: &str,
    name: &str,
) -> Option<&'a ItemSetting> {
    let stripped_path = strip_content_extension(rel_path);
    let by_path = items.iter().find_map(|(key, setting)| {
        let key = normalize_rel_path(key);
        (key.contains('/') && (key == rel_path || key == stripped_path)).then_some(setting)
    });

    by_path
        .or_else(|| items.get(name))
        .or_else(|| items.get(strip_content_extension(name)))
}

/// Fully merged options for one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    pub hidden: bool,
    pub sort: Option<f64>,
    pub title: Option<String>,
    pub use_heading_as_title: bool,
    /// Only meaningful for folders.
    pub collapsed: Option<bool>,
}

impl ResolvedOptions {
    /// Resolve every attribute for the item at `rel_path` named `name`.
    pub fn resolve(
        config: &SidebarConfig,
        document: Option<&DocumentMetadata>,
        rel_path: &str,
        name: &str,
    ) -> Self {
        let setting = find_setting(&config.items, rel_path, name);
        let prefix = config.prefix();

        Self {
            hidden: resolve_attr(document, setting.and_then(|s| s.hide), KEY_HIDE, prefix)
                .unwrap_or(false),
            sort: resolve_attr(document, setting.and_then(|s| s.sort), KEY_SORT, prefix),
            title: resolve_attr(
                document,
                setting.and_then(|s| s.title.clone()),
                KEY_TITLE,
                prefix,
            ),
            use_heading_as_title: resolve_attr(
                document,
                setting.and_then(|s| s.use_heading_as_title),
                KEY_USE_HEADING,
                prefix,
            )
            .unwrap_or(config.use_article_title),
            collapsed: resolve_attr(document, setting.and_then(|s| s.collapsed), KEY_COLLAPSED, prefix)
                .or(config.collapsed),
        }
    }
}
