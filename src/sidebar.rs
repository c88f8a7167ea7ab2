//! Tree serialization into nav entries and sidebar groups.
//!
//! The ordered forest maps onto the two output shapes like this:
//!
//! ```text
//! a.md                 nav:     [a, guide]
//! guide/               sidebar: "/a"      → [{text: a, link: /a}]
//! ├── index.md                  "/guide/" → [{text: guide, link: /guide/index,
//! ├── intro.md                                items: [intro, setup]}]
//! └── setup/
//!     └── install.md
//! ```
//!
//! Every top-level node becomes one nav entry and seeds one sidebar keyed by
//! its own path. Folders become groups, documents become links.
//!
//! ## Display text
//!
//! First match wins: explicit title override, the document's first heading
//! when `use_heading_as_title` is on, the name without `.md`.
//!
//! ## Index folding
//!
//! With `index_as_folder_link` on, an `index.md` inside a folder is not
//! listed as its own entry. Its link becomes the folder group's `link`
//! instead. Without it, `index.md` is an ordinary document.

use crate::naming::{document_link, folder_link, parse_entry_name};
use crate::tree::Item;
use crate::types::{Manifest, NavEntry, Sidebar, SidebarGroup, SidebarItem, SidebarLink};

/// Serializer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Scan start path, prepended to every link.
    pub scan_start: &'a str,
    pub index_as_folder_link: bool,
    /// Leave `nav` empty because the host already has one.
    pub skip_nav: bool,
}

/// Serialize the ordered forest.
pub fn render(forest: &[Item], opts: &RenderOptions<'_>) -> Manifest {
    let mut nav = Vec::new();
    let mut sidebar = Sidebar::new();

    for item in forest {
        let key = root_key(item, opts.scan_start);
        if !opts.skip_nav {
            let link = first_article(item)
                .map(|doc| document_link(opts.scan_start, &doc.rel_path))
                .unwrap_or_else(|| key.clone());
            nav.push(NavEntry {
                text: display_text(item),
                active_match: key.clone(),
                link,
            });
        }
        sidebar.insert(key, vec![sidebar_item(item, opts)]);
    }

    Manifest { nav, sidebar }
}

/// Sidebar key and nav `activeMatch` for a top-level node.
fn root_key(item: &Item, scan_start: &str) -> String {
    if item.is_folder {
        folder_link(scan_start, &item.rel_path)
    } else {
        document_link(scan_start, &item.rel_path)
    }
}

/// The first document reached by always descending into the first child.
pub fn first_article(item: &Item) -> Option<&Item> {
    let mut current = item;
    while current.is_folder {
        current = current.children.first()?;
    }
    Some(current)
}

/// Resolved display text for an item.
pub fn display_text(item: &Item) -> String {
    if let Some(title) = &item.options.title {
        return title.clone();
    }
    if item.options.use_heading_as_title
        && let Some(heading) = item.heading()
    {
        return heading.to_string();
    }
    parse_entry_name(&item.name).stem
}

fn is_folded_index(item: &Item, opts: &RenderOptions<'_>) -> bool {
    if !opts.index_as_folder_link || item.is_folder {
        return false;
    }
    let name = parse_entry_name(&item.name);
    name.is_content && name.is_index
}

fn sidebar_item(item: &Item, opts: &RenderOptions<'_>) -> SidebarItem {
    if !item.is_folder {
        return SidebarItem::Link(SidebarLink {
            text: display_text(item),
            link: document_link(opts.scan_start, &item.rel_path),
        });
    }

    let mut link = None;
    let mut items = Vec::with_capacity(item.children.len());
    for child in &item.children {
        if is_folded_index(child, opts) {
            if link.is_none() {
                link = Some(document_link(opts.scan_start, &child.rel_path));
            }
            continue;
        }
        items.push(sidebar_item(child, opts));
    }

    SidebarItem::Group(SidebarGroup {
        text: display_text(item),
        collapsed: item.options.collapsed,
        items,
        link,
    })
}
