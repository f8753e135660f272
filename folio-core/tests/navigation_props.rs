//! Property tests for outline construction
//!
//! Whatever the heading levels, the NCX nav map, the hyperlink list and the
//! flat outline must list the same nodes in the same order.

use folio_core::types::HeadingRecord;
use folio_core::NavigationBuilder;
use proptest::prelude::*;
use regex::Regex;

fn nav_ids(markup: &str) -> Vec<usize> {
    let re = Regex::new(r#"id="nav(\d+)""#).unwrap();
    re.captures_iter(markup)
        .map(|c| c[1].parse().unwrap())
        .collect()
}

fn documents() -> impl Strategy<Value = Vec<Vec<(u8, bool)>>> {
    prop::collection::vec(
        prop::collection::vec((1u8..=6, any::<bool>()), 0..10),
        0..5,
    )
}

fn to_headings(spec: &[(u8, bool)]) -> Vec<HeadingRecord> {
    spec.iter()
        .enumerate()
        .map(|(i, &(level, anchored))| {
            let record = HeadingRecord::new(level, format!("Heading {i}"));
            if anchored {
                record.with_anchor(format!("h{i}"))
            } else {
                record
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn projections_agree(docs in documents(), depth in 1u8..=6) {
        let mut builder = NavigationBuilder::new(depth);
        for (i, doc) in docs.iter().enumerate() {
            builder.add_document(&format!("doc{i}.xhtml"), &to_headings(doc));
        }
        let navigation = builder.finish();

        let total: usize = docs.iter().map(Vec::len).sum();
        let anchored = docs.iter().flatten().filter(|(_, a)| *a).count();
        let expected: Vec<usize> = (1..=total).collect();

        prop_assert_eq!(navigation.len(), total);
        prop_assert_eq!(nav_ids(&navigation.ncx_nav_points()), expected.clone());
        prop_assert_eq!(nav_ids(&navigation.nav_list_items()), expected.clone());
        prop_assert_eq!(nav_ids(&navigation.flat_outline_html()), expected.clone());

        let flat: Vec<usize> = navigation
            .flat_outline()
            .iter()
            .flat_map(|g| g.lines.iter().map(|l| l.play_order))
            .collect();
        prop_assert_eq!(flat, expected);

        prop_assert_eq!(navigation.ncx_nav_points().matches("<content ").count(), anchored);
        prop_assert_eq!(
            navigation.documents.len(),
            docs.iter().filter(|d| !d.is_empty()).count()
        );
    }

    #[test]
    fn levels_stay_within_depth(docs in documents(), depth in 1u8..=6) {
        let mut builder = NavigationBuilder::new(depth);
        for (i, doc) in docs.iter().enumerate() {
            builder.add_document(&format!("doc{i}.xhtml"), &to_headings(doc));
        }
        let navigation = builder.finish();

        for node in navigation.nodes() {
            prop_assert!(node.level >= 1 && node.level <= depth);
            for child in &node.children {
                prop_assert_eq!(child.level, node.level + 1);
                prop_assert!(child.play_order > node.play_order);
            }
        }
        for group in navigation.flat_outline() {
            if let Some(first) = group.lines.first() {
                prop_assert_eq!(first.indent, 0);
            }
        }
    }
}
