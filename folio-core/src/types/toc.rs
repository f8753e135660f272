//! Outline types: raw heading records and the navigation nodes built from them

use serde::{Deserialize, Serialize};

/// A heading found in a content document, in document order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeadingRecord {
    /// Heading depth (1 for `<h1>`)
    pub level: u8,

    /// The heading's `id` attribute, if any
    pub anchor: Option<String>,

    /// Plain-text label
    pub label: String,
}

impl HeadingRecord {
    /// Create a heading record without an anchor
    pub fn new(level: u8, label: impl Into<String>) -> Self {
        Self {
            level,
            anchor: None,
            label: label.into(),
        }
    }

    /// Set the anchor
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// A single navigable point in the book outline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavNode {
    /// Position in the global reading order, starting at 1
    pub play_order: usize,

    /// Nesting depth within its document (1 = top level)
    pub level: u8,

    /// Anchor within the owning document
    pub anchor: Option<String>,

    /// Link target (`document#anchor`), absent when the heading has no anchor
    pub href: Option<String>,

    /// Display label
    pub label: String,

    /// Child entries
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// Count this node and all of its descendants
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NavNode::count).sum::<usize>()
    }

    /// Visit this node and its descendants in play order
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a NavNode>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// The outline of one content document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentOutline {
    /// Package-relative path of the document
    pub document: String,

    /// Top-level entries
    pub roots: Vec<NavNode>,
}

impl DocumentOutline {
    /// All nodes of the document in play order
    pub fn nodes(&self) -> Vec<&NavNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.walk(&mut out);
        }
        out
    }
}
