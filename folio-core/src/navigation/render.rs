//! The three projections of the outline.
//!
//! Every projection walks the same forests in the same pre-order and tags each
//! entry with `nav<play_order>`, so entries can be matched across documents.

use super::Navigation;
use crate::templates::escape_xml;
use crate::types::NavNode;
use serde::Serialize;
use std::fmt::Write;

const INDENT_STEP: &str = "    ";

/// One line of the flat outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineLine {
    pub play_order: usize,

    /// Indentation in steps (0 for top-level entries)
    pub indent: u8,

    pub label: String,

    pub href: Option<String>,
}

/// Flat outline lines belonging to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineGroup {
    pub document: String,
    pub lines: Vec<OutlineLine>,
}

impl Navigation {
    /// Nested `navPoint` elements for the NCX nav map
    pub fn ncx_nav_points(&self) -> String {
        let mut out = String::new();
        for node in self.documents.iter().flat_map(|d| d.roots.iter()) {
            write_nav_point(&mut out, node);
        }
        out
    }

    /// Nested `<li>` items for the hyperlink navigation document's `<ol>`
    pub fn nav_list_items(&self) -> String {
        let mut out = String::new();
        for node in self.documents.iter().flat_map(|d| d.roots.iter()) {
            write_list_item(&mut out, node);
        }
        out
    }

    /// The flattened outline, grouped by document
    pub fn flat_outline(&self) -> Vec<OutlineGroup> {
        self.documents
            .iter()
            .map(|doc| OutlineGroup {
                document: doc.document.clone(),
                lines: doc
                    .nodes()
                    .into_iter()
                    .map(|node| OutlineLine {
                        play_order: node.play_order,
                        indent: node.level.saturating_sub(1),
                        label: node.label.clone(),
                        href: node.href.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// The flat outline as HTML paragraphs, one `<div>` per document
    pub fn flat_outline_html(&self) -> String {
        render_outline_groups(&self.flat_outline())
    }
}

/// Render outline groups as HTML paragraphs, one `<div>` per document
pub fn render_outline_groups(groups: &[OutlineGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str("<div style=\"margin-top: 1em;\">\n");
        for line in &group.lines {
            out.push_str(&render_outline_line(line));
            out.push('\n');
        }
        out.push_str("</div>\n");
    }
    out
}

/// Render one flat outline line as a paragraph
pub(crate) fn render_outline_line(line: &OutlineLine) -> String {
    format!(
        "<p id=\"nav{}\" style=\"text-indent: {}em;\">{}</p>",
        line.play_order,
        line.indent,
        link_or_text(line.href.as_deref(), &line.label)
    )
}

fn link_or_text(href: Option<&str>, label: &str) -> String {
    match href {
        Some(href) => format!("<a href=\"{}\">{}</a>", escape_xml(href), escape_xml(label)),
        None => format!("<span>{}</span>", escape_xml(label)),
    }
}

fn prefix(level: u8, factor: usize) -> String {
    INDENT_STEP.repeat(usize::from(level.saturating_sub(1)) * factor)
}

fn write_nav_point(out: &mut String, node: &NavNode) {
    let p = prefix(node.level, 1);
    let _ = writeln!(
        out,
        "{p}<navPoint id=\"nav{n}\" playOrder=\"{n}\">",
        n = node.play_order
    );
    let _ = writeln!(
        out,
        "{p}{INDENT_STEP}<navLabel><text>{}</text></navLabel>",
        escape_xml(&node.label)
    );
    if let Some(href) = &node.href {
        let _ = writeln!(out, "{p}{INDENT_STEP}<content src=\"{}\"/>", escape_xml(href));
    }
    for child in &node.children {
        write_nav_point(out, child);
    }
    let _ = writeln!(out, "{p}</navPoint>");
}

fn write_list_item(out: &mut String, node: &NavNode) {
    let p = prefix(node.level, 2);
    let _ = writeln!(out, "{p}<li id=\"nav{}\">", node.play_order);
    let _ = writeln!(
        out,
        "{p}{INDENT_STEP}{}",
        link_or_text(node.href.as_deref(), &node.label)
    );
    if !node.children.is_empty() {
        let _ = writeln!(out, "{p}{INDENT_STEP}<ol>");
        for child in &node.children {
            write_list_item(out, child);
        }
        let _ = writeln!(out, "{p}{INDENT_STEP}</ol>");
    }
    let _ = writeln!(out, "{p}</li>");
}

#[cfg(test)]
mod tests {
    use super::super::NavigationBuilder;
    use crate::types::HeadingRecord;

    fn sample() -> super::Navigation {
        let mut builder = NavigationBuilder::new(6);
        builder.add_document(
            "page1.xhtml",
            &[
                HeadingRecord::new(1, "Intro").with_anchor("s1"),
                HeadingRecord::new(2, "Detail").with_anchor("s2"),
            ],
        );
        builder.finish()
    }

    #[test]
    fn test_ncx_nav_points() {
        let expected = "\
<navPoint id=\"nav1\" playOrder=\"1\">
    <navLabel><text>Intro</text></navLabel>
    <content src=\"page1.xhtml#s1\"/>
    <navPoint id=\"nav2\" playOrder=\"2\">
        <navLabel><text>Detail</text></navLabel>
        <content src=\"page1.xhtml#s2\"/>
    </navPoint>
</navPoint>
";
        assert_eq!(sample().ncx_nav_points(), expected);
    }

    #[test]
    fn test_nav_list_items() {
        let expected = "\
<li id=\"nav1\">
    <a href=\"page1.xhtml#s1\">Intro</a>
    <ol>
        <li id=\"nav2\">
            <a href=\"page1.xhtml#s2\">Detail</a>
        </li>
    </ol>
</li>
";
        assert_eq!(sample().nav_list_items(), expected);
    }

    #[test]
    fn test_flat_outline_indentation() {
        let groups = sample().flat_outline();
        assert_eq!(groups.len(), 1);
        let indents: Vec<(u8, &str)> = groups[0]
            .lines
            .iter()
            .map(|l| (l.indent, l.label.as_str()))
            .collect();
        assert_eq!(indents, vec![(0, "Intro"), (1, "Detail")]);
    }

    #[test]
    fn test_anchorless_node_has_no_link_target() {
        let mut builder = NavigationBuilder::new(6);
        builder.add_document("a.xhtml", &[HeadingRecord::new(1, "Plain & simple")]);
        let nav = builder.finish();

        let ncx = nav.ncx_nav_points();
        assert!(ncx.contains("playOrder=\"1\""));
        assert!(ncx.contains("<text>Plain &amp; simple</text>"));
        assert!(!ncx.contains("<content"));

        let list = nav.nav_list_items();
        assert!(list.contains("<span>Plain &amp; simple</span>"));
        assert!(!list.contains("href"));

        let html = nav.flat_outline_html();
        assert!(html.contains("<span>Plain &amp; simple</span>"));
        assert!(!html.contains("href"));
    }
}
