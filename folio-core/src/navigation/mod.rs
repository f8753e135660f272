//! Navigation tree synthesis
//!
//! Each content document contributes a flat list of heading records. The
//! builder turns every list into a forest keyed on heading level, numbers all
//! nodes with one play-order counter shared by the whole book, and keeps the
//! per-document forests in manifest order. The three navigation projections
//! (NCX nav map, hyperlink list, flat outline) are all rendered from the same
//! [`Navigation`] value, so they always agree on node set and order.

mod render;

pub use render::{render_outline_groups, OutlineGroup, OutlineLine};

use crate::types::{DocumentOutline, HeadingRecord, NavNode, MAX_DEPTH};
use serde::Serialize;

/// A heading after level normalization
#[derive(Debug)]
struct LeveledHeading<'a> {
    level: u8,
    record: &'a HeadingRecord,
}

/// Builds the book outline one document at a time
#[derive(Debug)]
pub struct NavigationBuilder {
    /// Deepest level kept; deeper headings are clamped to it
    depth: u8,

    /// Last play order handed out
    play_order: usize,

    documents: Vec<DocumentOutline>,
}

impl NavigationBuilder {
    /// Create a builder clamping heading levels to `depth` (itself clamped to `1..=6`)
    pub fn new(depth: u8) -> Self {
        Self {
            depth: depth.clamp(1, MAX_DEPTH),
            play_order: 0,
            documents: Vec::new(),
        }
    }

    /// Add the headings of the next document in reading order.
    ///
    /// `document` is the package-relative path used to build hrefs. A document
    /// without headings contributes nothing.
    pub fn add_document(&mut self, document: &str, headings: &[HeadingRecord]) {
        if headings.is_empty() {
            return;
        }

        let leveled = normalize_levels(headings, self.depth);
        let (roots, consumed) = self.take_children(document, &leveled, 0, 0, 1);
        debug_assert_eq!(consumed, leveled.len());

        tracing::debug!(
            document,
            headings = headings.len(),
            last_play_order = self.play_order,
            "Built document outline"
        );

        self.documents.push(DocumentOutline {
            document: document.to_string(),
            roots,
        });
    }

    /// Finish building and hand over the outline
    pub fn finish(self) -> Navigation {
        Navigation {
            documents: self.documents,
        }
    }

    fn next_play_order(&mut self) -> usize {
        self.play_order += 1;
        self.play_order
    }

    /// Collect the nodes starting at `idx` whose level is above `parent_level`.
    ///
    /// Each node takes the following deeper headings as its children; the scan
    /// stops at the first heading at or above `parent_level`. Returns the
    /// nodes and the index of the first heading not consumed.
    fn take_children(
        &mut self,
        document: &str,
        headings: &[LeveledHeading<'_>],
        mut idx: usize,
        parent_level: u8,
        tree_level: u8,
    ) -> (Vec<NavNode>, usize) {
        let mut nodes = Vec::new();

        while let Some(heading) = headings.get(idx) {
            if heading.level <= parent_level {
                break;
            }

            // Pre-order numbering: the parent is numbered before its children
            let play_order = self.next_play_order();
            let (children, next) =
                self.take_children(document, headings, idx + 1, heading.level, tree_level + 1);

            let anchor = heading.record.anchor.clone();
            nodes.push(NavNode {
                play_order,
                level: tree_level,
                href: anchor.as_ref().map(|a| format!("{document}#{a}")),
                anchor,
                label: heading.record.label.clone(),
                children,
            });
            idx = next;
        }

        (nodes, idx)
    }
}

/// Shift levels so the shallowest heading becomes level 1, then clamp to `depth`
fn normalize_levels(headings: &[HeadingRecord], depth: u8) -> Vec<LeveledHeading<'_>> {
    let raw = |h: &HeadingRecord| h.level.clamp(1, MAX_DEPTH);
    let offset = headings.iter().map(raw).min().unwrap_or(1) - 1;

    headings
        .iter()
        .map(|record| {
            let shifted = raw(record) - offset;
            if shifted > depth {
                tracing::debug!(
                    label = %record.label,
                    level = shifted,
                    depth,
                    "Clamping heading level to outline depth"
                );
            }
            LeveledHeading {
                level: shifted.min(depth),
                record,
            }
        })
        .collect()
}

/// The complete book outline, one forest per document in reading order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Navigation {
    pub documents: Vec<DocumentOutline>,
}

impl Navigation {
    /// Total number of navigable nodes
    pub fn len(&self) -> usize {
        self.documents
            .iter()
            .flat_map(|d| d.roots.iter())
            .map(NavNode::count)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Deepest nesting level present (0 when empty)
    pub fn max_level(&self) -> u8 {
        self.nodes().iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// All nodes in play order
    pub fn nodes(&self) -> Vec<&NavNode> {
        self.documents.iter().flat_map(|d| d.nodes()).collect()
    }
}
