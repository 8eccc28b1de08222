//! Heading anchors and the table of contents.

use std::collections::HashMap;

use folio_common::model::{HeadingLevel, Node};
use serde::Serialize;
use smol_str::SmolStr;

use crate::slug::{SlugRegistry, slugify};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// The heading's node key, or `{slug}-{index}` for unkeyed headings.
    pub key: SmolStr,
    pub slug: String,
    pub text: String,
    pub level: HeadingLevel,
}

/// Slugs for every heading plus the ordered table of contents.
///
/// Keyed headings are looked up by node key, unkeyed ones by their position
/// in the body they were derived from.
///
/// Derived from a body in one pass and never updated in place; a changed
/// body gets a fresh `Anchors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchors {
    slugs: HashMap<SmolStr, String>,
    unkeyed: HashMap<usize, String>,
    toc: Vec<TocEntry>,
}

impl Anchors {
    pub fn derive(nodes: &[Node]) -> Self {
        let mut registry = SlugRegistry::new();
        let mut anchors = Anchors::default();

        for (index, node) in nodes.iter().enumerate() {
            let Node::Heading { key, level, text } = node else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let slug = registry.claim(slugify(text));
            let toc_key = match key {
                Some(key) => {
                    anchors.slugs.insert(key.clone(), slug.clone());
                    key.clone()
                }
                None => {
                    anchors.unkeyed.insert(index, slug.clone());
                    SmolStr::new(format!("{slug}-{index}"))
                }
            };
            anchors.toc.push(TocEntry {
                key: toc_key,
                slug,
                text: text.to_owned(),
                level: *level,
            });
        }

        tracing::trace!(headings = anchors.toc.len(), "derived heading anchors");
        anchors
    }

    /// The slug assigned to the heading with this node key.
    pub fn slug_for(&self, key: &str) -> Option<&str> {
        self.slugs.get(key).map(String::as_str)
    }

    /// The slug for the heading at `index`: by key when it has one,
    /// otherwise by position.
    pub fn anchor_for(&self, index: usize, key: Option<&str>) -> Option<&str> {
        match key {
            Some(key) => self.slug_for(key),
            None => self.unkeyed.get(&index).map(String::as_str),
        }
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn into_toc(self) -> Vec<TocEntry> {
        self.toc
    }

    pub fn is_empty(&self) -> bool {
        self.toc.is_empty()
    }
}

/// Shorthand for [`Anchors::derive`].
pub fn derive_anchors(nodes: &[Node]) -> Anchors {
    Anchors::derive(nodes)
}
