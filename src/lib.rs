//! # Auto Sidebar
//!
//! A build-time generator of navigation and sidebar configuration for static
//! documentation sites. Your documentation tree is the data source: folders
//! become sidebar groups, markdown files become links, and front-matter or a
//! `sidebar.toml` tunes titles, visibility and order.
//!
//! # Architecture: One Build Pass
//!
//! ```text
//! 1. Discover   docs/          →  relative paths      (glob include/exclude)
//! 2. Build      paths          →  forest of items     (options + front-matter)
//! 3. Stamp      forest         →  timestamps          (cache → history → stat)
//! 4. Order      forest         →  sorted forest       (weights, then age)
//! 5. Render     sorted forest  →  { nav, sidebar }    (index folding, titles)
//! ```
//!
//! An outline file (`[summary]` in `sidebar.toml`) replaces all five stages
//! with a single linear parse.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Runs one build pass from host site settings to `{ nav, sidebar }` |
//! | [`discover`] | Walks the docs root and applies include/exclude globs |
//! | [`tree`] | Builds the item forest from flat paths; aggregates folder timestamps |
//! | [`options`] | Layered per-item option resolution (front-matter over `[items]` over defaults) |
//! | [`order`] | Sibling ordering: sort weights as target slots, otherwise oldest first |
//! | [`sidebar`] | Serializes the ordered forest into nav entries and sidebar groups |
//! | [`summary`] | Parses an outline file directly into nav entries and a sidebar |
//! | [`timestamps`] | Local and version-control timestamps behind swappable traits |
//! | [`cache`] | Persisted timestamp cache, invalidated per file by modification time |
//! | [`metadata`] | Front-matter splitting and first-heading extraction |
//! | [`config`] | `sidebar.toml` loading, merging, validation and the stock config |
//! | [`naming`] | Content-file detection, `index` detection and link building |
//! | [`types`] | Output types shared by the serializer, outline parser and host |
//! | [`output`] | CLI output formatting of the generated structures |
//!
//! # Design Decisions
//!
//! ## Explicit Collaborators
//!
//! Reading timestamps, querying history and loading documents all sit behind
//! traits ([`timestamps::FileTimes`], [`timestamps::HistoryLog`],
//! [`metadata::DocumentSource`]). The core never shells out or touches the
//! clock directly, so every ordering rule is testable with fixed inputs.
//!
//! ## Cache as a Value
//!
//! The timestamp cache is loaded by the caller, passed into [`scan::scan`],
//! and saved by the caller. There is no process-wide state, so parallel test
//! runs and repeated passes in one process never interfere.
//!
//! ## Manual Nav Wins
//!
//! When the host site already defines a nav, no nav entries are generated.
//! Generated and hand-written entries are never merged.

pub mod cache;
pub mod config;
pub mod discover;
pub mod metadata;
pub mod naming;
pub mod options;
pub mod order;
pub mod output;
pub mod scan;
pub mod sidebar;
pub mod summary;
pub mod timestamps;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
