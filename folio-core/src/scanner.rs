//! Markup scanning: headings and image references in content documents

use crate::types::HeadingRecord;
use scraper::{Html, Selector};

/// What the scanner found in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Headings in document order
    pub headings: Vec<HeadingRecord>,

    /// Image sources as written in the markup (may repeat)
    pub images: Vec<String>,
}

/// Trait for extracting the outline and image references from markup
pub trait MarkupScanner: Send + Sync {
    /// Scan a document's raw text
    fn scan(&self, text: &str) -> ScannedDocument;
}

/// Scanner for (X)HTML content documents
#[derive(Debug, Clone, Default)]
pub struct HtmlScanner;

impl HtmlScanner {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupScanner for HtmlScanner {
    fn scan(&self, text: &str) -> ScannedDocument {
        let document = Html::parse_document(text);

        let heading_selector =
            Selector::parse("h1, h2, h3, h4, h5, h6").expect("static heading selector");
        let image_selector = Selector::parse("img[src]").expect("static image selector");

        let headings = document
            .select(&heading_selector)
            .filter_map(|el| {
                let level = el.value().name()[1..].parse::<u8>().ok()?;
                let label = el.text().collect::<String>();
                let anchor = el
                    .value()
                    .attr("id")
                    .filter(|id| !id.is_empty())
                    .map(|id| id.to_string());
                Some(HeadingRecord {
                    level,
                    anchor,
                    label: label.trim().to_string(),
                })
            })
            .collect();

        let images = document
            .select(&image_selector)
            .filter_map(|el| el.value().attr("src"))
            .filter(|src| is_local_reference(src))
            .map(|src| src.to_string())
            .collect();

        ScannedDocument { headings, images }
    }
}

/// Whether a reference points at a file that should be packaged
fn is_local_reference(src: &str) -> bool {
    !src.trim().is_empty() && !src.contains("://") && !src.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Page</title></head>
<body>
<h1 id="intro">Intro<em>duction</em></h1>
<p><img src="images/a.png" alt=""/></p>
<h2>No anchor</h2>
<h3 id="deep">  Deep  </h3>
<img src="https://example.com/remote.png"/>
<img src="images/a.png"/>
<img src=""/>
</body>
</html>"#;

    #[test]
    fn test_headings_in_document_order() {
        let scanned = HtmlScanner::new().scan(PAGE);
        assert_eq!(
            scanned.headings,
            vec![
                HeadingRecord::new(1, "Introduction").with_anchor("intro"),
                HeadingRecord::new(2, "No anchor"),
                HeadingRecord::new(3, "Deep").with_anchor("deep"),
            ]
        );
    }

    #[test]
    fn test_local_images_only() {
        let scanned = HtmlScanner::new().scan(PAGE);
        assert_eq!(scanned.images, vec!["images/a.png", "images/a.png"]);
    }

    #[test]
    fn test_document_without_headings() {
        let scanned = HtmlScanner::new().scan("<html><body><p>Hi</p></body></html>");
        assert!(scanned.headings.is_empty());
        assert!(scanned.images.is_empty());
    }
}
