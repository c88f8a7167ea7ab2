//! Document metadata extraction.
//!
//! Each content document can carry two pieces of metadata the generator cares
//! about:
//!
//! - **Front-matter**: a YAML block fenced by `---` lines at the very top of
//!   the file. It is parsed into a flat string-keyed map; nested values are
//!   kept as-is but only top-level keys are ever looked up.
//! - **Heading**: the first level-1 heading of the body (ATX `# Title` or
//!   setext `Title\n===`), with inline markup flattened to plain text.
//!
//! Nothing else about the document is validated. A document without
//! front-matter simply has an empty map; a document without a level-1
//! heading has no heading.
//!
//! ## Errors
//!
//! An unreadable document is fatal, since every document handed to the
//! generator was discovered on disk and must be readable. A front-matter block
//! that is not valid YAML (or is YAML but not a mapping) is fatal too: silently
//! ignoring it would drop `hide`/`sort` overrides without telling anyone.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Cannot read document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front-matter in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Front-matter in {0} is not a key-value mapping")]
    NotAMapping(PathBuf),
}

/// Metadata extracted from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Top-level front-matter entries.
    pub fields: BTreeMap<String, serde_yaml::Value>,
    /// Text of the first level-1 heading in the body.
    pub heading: Option<String>,
}

impl DocumentMetadata {
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.fields.get(key)
    }
}

/// A document split into its front-matter map and remaining body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub fields: BTreeMap<String, serde_yaml::Value>,
    pub body: String,
}

/// Source of document metadata, keyed by path relative to the scan root.
///
/// The tree builder only needs metadata, never raw files, so tests can feed
/// it from memory.
pub trait DocumentSource {
    fn load(&self, rel_path: &str) -> Result<DocumentMetadata, MetadataError>;
}

/// Reads documents from a directory on disk.
pub struct FsDocuments {
    root: PathBuf,
}

impl FsDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for FsDocuments {
    fn load(&self, rel_path: &str) -> Result<DocumentMetadata, MetadataError> {
        let path = self.root.join(rel_path);
        let raw = fs::read_to_string(&path).map_err(|source| MetadataError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_document(&raw, &path)?;
        Ok(DocumentMetadata {
            heading: extract_heading(&parsed.body),
            fields: parsed.fields,
        })
    }
}

/// Split `raw` into front-matter fields and body.
///
/// `path` is only used for error messages.
pub fn parse_document(raw: &str, path: &Path) -> Result<ParsedDocument, MetadataError> {
    let Some((block, body)) = split_front_matter(raw) else {
        return Ok(ParsedDocument {
            fields: BTreeMap::new(),
            body: raw.to_string(),
        });
    };
    if block.trim().is_empty() {
        return Ok(ParsedDocument {
            fields: BTreeMap::new(),
            body: body.to_string(),
        });
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|source| MetadataError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

    let fields = match value {
        serde_yaml::Value::Null => BTreeMap::new(),
        serde_yaml::Value::Mapping(map) => map
            .into_iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
            .collect(),
        _ => return Err(MetadataError::NotAMapping(path.to_path_buf())),
    };

    Ok(ParsedDocument {
        fields,
        body: body.to_string(),
    })
}

/// Locate a leading `---` fenced block. Returns `(yaml, body)`.
///
/// The closing fence may be `---` or `...`. An opening fence with no closing
/// fence means the document has no front-matter.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let first_end = text.find('\n')?;
    if text[..first_end].trim_end() != "---" {
        return None;
    }

    let block_start = first_end + 1;
    let mut offset = block_start;
    for line in text[block_start..].split_inclusive('\n') {
        let fence = line.trim_end();
        if fence == "---" || fence == "..." {
            let block = &text[block_start..offset];
            let body = &text[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

/// Text of the first level-1 heading in a markdown body.
pub fn extract_heading(body: &str) -> Option<String> {
    let mut in_heading = false;
    let mut text = String::new();

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => in_heading = true,
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_heading => {
                let heading = text.trim();
                return (!heading.is_empty()).then(|| heading.to_string());
            }
            Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_heading => text.push(' '),
            _ => {}
        }
    }
    None
}
