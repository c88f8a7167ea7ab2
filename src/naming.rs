//! Centralized file-name handling for documentation entries.
//!
//! Every item in the tree (file or folder) is identified by its raw name.
//! This module derives everything else the pipeline needs from that name:
//! the extension-less stem used as a fallback display title, whether the
//! entry is a content document, whether it is the reserved `index` document,
//! and the site link a relative path maps to.
//!
//! ## Links
//!
//! Links are root-absolute and extension-less:
//! - `guide/intro.md` under scan start `""` → `/guide/intro`
//! - `guide/intro.md` under scan start `"docs/v2"` → `/docs/v2/guide/intro`
//! - folder `guide` → `/guide/` (trailing slash marks a directory match)

/// Extension (without dot) that marks a content document.
pub const CONTENT_EXTENSION: &str = "md";

/// Stem of the document that represents its enclosing folder.
pub const INDEX_STEM: &str = "index";

/// Result of parsing an entry name like `getting-started.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Name with a content extension removed. Other extensions are kept.
    pub stem: String,
    /// Whether the name carries the content extension.
    pub is_content: bool,
    /// Whether the stem is the reserved `index` name.
    pub is_index: bool,
}

/// Parse an entry name.
///
/// - `"intro.md"` → stem="intro", is_content=true, is_index=false
/// - `"INDEX.MD"` → stem="INDEX", is_content=true, is_index=true
/// - `"guide"` → stem="guide", is_content=false, is_index=false
/// - `"archive.tar"` → stem="archive.tar", is_content=false
pub fn parse_entry_name(name: &str) -> ParsedName {
    let stem = strip_content_extension(name);
    ParsedName {
        is_content: stem.len() != name.len(),
        is_index: stem.eq_ignore_ascii_case(INDEX_STEM),
        stem: stem.to_string(),
    }
}

/// Remove a trailing `.md` (any case) from a name or path.
pub fn strip_content_extension(name: &str) -> &str {
    let suffix_len = CONTENT_EXTENSION.len() + 1;
    if name.len() > suffix_len {
        let split = name.len() - suffix_len;
        if name.is_char_boundary(split) {
            let (head, tail) = name.split_at(split);
            if tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(CONTENT_EXTENSION) {
                return head;
            }
        }
    }
    name
}

/// Normalize a user-written relative path: forward slashes, no leading
/// `./` or `/`, no trailing `/`. `..` removes the previous segment and
/// never climbs above the root.
pub fn normalize_rel_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for seg in unified.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(seg),
        }
    }
    segments.join("/")
}

/// Join path segments with `/`, skipping empty ones.
pub fn join_rel(base: &str, rel: &str) -> String {
    match (base.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{rel}"),
    }
}

/// Site link for a document at `rel_path` under `scan_start`.
pub fn document_link(scan_start: &str, rel_path: &str) -> String {
    format!(
        "/{}",
        join_rel(scan_start, strip_content_extension(rel_path))
    )
}

/// Site link for a folder at `rel_path` under `scan_start`.
pub fn folder_link(scan_start: &str, rel_path: &str) -> String {
    format!("/{}/", join_rel(scan_start, rel_path))
}
