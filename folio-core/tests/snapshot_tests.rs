//! Snapshot tests for folio-core using insta
//!
//! These pin single generated lines so that formatting changes to the
//! outline and package markup show up as snapshot diffs.

use folio_core::emit::strip_doctype;
use folio_core::templates::{DefaultTemplates, PackageContext, TemplateSet};
use folio_core::types::{Author, HeadingRecord, ManifestEntry};
use folio_core::NavigationBuilder;

fn outline_lines(headings: &[HeadingRecord]) -> Vec<String> {
    let mut builder = NavigationBuilder::new(6);
    builder.add_document("chapter1.xhtml", headings);
    builder
        .finish()
        .flat_outline_html()
        .lines()
        .filter(|line| line.starts_with("<p"))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_outline_line_with_anchor() {
    let lines = outline_lines(&[
        HeadingRecord::new(2, "Part One").with_anchor("p1"),
        HeadingRecord::new(3, "Fish & Chips").with_anchor("p1-1"),
    ]);
    insta::assert_snapshot!(&lines[0], @r###"<p id="nav1" style="text-indent: 0em;"><a href="chapter1.xhtml#p1">Part One</a></p>"###);
    insta::assert_snapshot!(&lines[1], @r###"<p id="nav2" style="text-indent: 1em;"><a href="chapter1.xhtml#p1-1">Fish &amp; Chips</a></p>"###);
}

#[test]
fn test_outline_line_without_anchor() {
    let lines = outline_lines(&[HeadingRecord::new(1, "Untitled")]);
    insta::assert_snapshot!(&lines[0], @r###"<p id="nav1" style="text-indent: 0em;"><span>Untitled</span></p>"###);
}

#[test]
fn test_outline_json() {
    let mut builder = NavigationBuilder::new(6);
    builder.add_document("a.xhtml", &[HeadingRecord::new(1, "A").with_anchor("a")]);
    let outline = builder.finish().flat_outline();
    let json = serde_json::to_string(&outline).unwrap();
    insta::assert_snapshot!(json, @r###"[{"document":"a.xhtml","lines":[{"play_order":1,"indent":0,"label":"A","href":"a.xhtml#a"}]}]"###);
}

#[test]
fn test_fallback_manifest_item() {
    let ctx = PackageContext {
        title: "T".into(),
        authors: vec![Author::new("A")],
        rights: "R".into(),
        language: "en".into(),
        publisher: "P".into(),
        identifier: "urn:x".into(),
        identifier_scheme: None,
        modified: None,
        manifest: vec![ManifestEntry::new("image0", "images/photo.webp", "image/webp")
            .with_fallback("fallbackimage")],
        spine: vec![],
        guide: None,
        webp_fallback: true,
    };
    let opf = DefaultTemplates.package(&ctx);
    let line = opf.lines().find(|l| l.contains("photo.webp")).unwrap().trim();
    insta::assert_snapshot!(line, @r###"<item id="image0" href="images/photo.webp" media-type="image/webp" fallback="fallbackimage"/>"###);
}

#[test]
fn test_doctype_stripped_from_single_line_document() {
    let text = strip_doctype(r#"<?xml version="1.0"?><!DOCTYPE html><html/>"#);
    insta::assert_snapshot!(text, @r###"<?xml version="1.0"?><html/>"###);
}
