//! The book manifest: metadata, cover, outline settings and content list

use crate::error::{AssemblyError, FolioError, ManifestError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deepest heading level the outline can represent
pub const MAX_DEPTH: u8 = 6;

/// Stylesheet path used when the manifest does not name one
pub const DEFAULT_STYLESHEET: &str = "style.css";

/// The user-supplied book description.
///
/// Required fields are stored as `Option` and checked by their accessors, so a
/// missing field is reported where it is first needed rather than up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Book title
    pub title: Option<String>,

    /// Authors in display order
    #[serde(default)]
    pub authors: Vec<Author>,

    /// Copyright/rights statement
    pub rights: Option<String>,

    /// Language tag (BCP 47)
    pub language: Option<String>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Unique publication identifier
    pub identifier: Option<Identifier>,

    /// Last-modified timestamp (RFC 3339)
    pub modified: Option<String>,

    /// Cover image path
    pub cover: Option<String>,

    /// Stylesheet path
    pub stylesheet: Option<String>,

    /// Outline settings
    #[serde(default)]
    pub toc: TocSettings,

    /// Optional guide references
    pub guide: Option<Vec<GuideReference>>,

    /// Ordered content items
    #[serde(default)]
    pub contents: Vec<ContentItem>,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a manifest file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FolioError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| AssemblyError::missing(path, e))?;
        Ok(Self::from_json(&text)?)
    }

    pub fn title(&self) -> Result<&str, ManifestError> {
        require(&self.title, "title")
    }

    pub fn rights(&self) -> Result<&str, ManifestError> {
        require(&self.rights, "rights")
    }

    pub fn language(&self) -> Result<&str, ManifestError> {
        require(&self.language, "language")
    }

    pub fn publisher(&self) -> Result<&str, ManifestError> {
        require(&self.publisher, "publisher")
    }

    pub fn cover(&self) -> Result<&str, ManifestError> {
        require(&self.cover, "cover")
    }

    pub fn identifier(&self) -> Result<&Identifier, ManifestError> {
        self.identifier
            .as_ref()
            .ok_or(ManifestError::MissingField("identifier"))
    }

    /// The first listed author, used for sort keys and navigation headers
    pub fn primary_author(&self) -> Result<&Author, ManifestError> {
        self.authors.first().ok_or(ManifestError::NoAuthors)
    }

    pub fn stylesheet(&self) -> &str {
        self.stylesheet.as_deref().unwrap_or(DEFAULT_STYLESHEET)
    }

    /// Maximum outline depth, clamped to `1..=6`
    pub fn depth(&self) -> u8 {
        self.toc.depth()
    }

    /// Parsed last-modified timestamp, if one was given
    pub fn modified(&self) -> Result<Option<DateTime<Utc>>, ManifestError> {
        self.modified
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ManifestError::InvalidTimestamp {
                        value: value.to_string(),
                        reason: e.to_string(),
                    })
            })
            .transpose()
    }
}

fn require<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, ManifestError> {
    field.as_deref().ok_or(ManifestError::MissingField(name))
}

/// A book author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    /// Display name
    pub name: String,

    /// Sort key ("Last, First")
    pub sort: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: None,
        }
    }

    /// Sort key, falling back to the display name
    pub fn sort_key(&self) -> &str {
        self.sort.as_deref().unwrap_or(&self.name)
    }
}

/// Publication identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    /// Identifier scheme (e.g. "URL", "ISBN")
    pub scheme: Option<String>,

    pub value: String,
}

/// Outline settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TocSettings {
    /// Requested depth; anything outside `1..=6` is clamped
    pub depth: Option<i64>,
}

impl TocSettings {
    pub fn depth(&self) -> u8 {
        match self.depth {
            Some(depth) => depth.clamp(1, MAX_DEPTH as i64) as u8,
            None => MAX_DEPTH,
        }
    }
}

/// A reference in the package guide
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideReference {
    /// Reference type (e.g. "toc", "text", "cover")
    #[serde(rename = "type")]
    pub kind: String,

    pub title: String,

    /// Target inside the package, optionally with a fragment
    pub href: String,
}

/// Kind of content item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A content document (or wildcard of documents)
    Text,

    /// Placeholder for the generated table of contents page
    Toc,
}

/// One entry of the manifest's content list.
///
/// `generate` is resolved while deserializing: when absent it is `true` for
/// [`ContentKind::Toc`] and `false` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawContentItem")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: ContentKind,

    /// Path or wildcard pattern
    pub source: String,

    /// Whether the item is generated rather than read from disk
    pub generate: bool,
}

impl ContentItem {
    pub fn new(kind: ContentKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            generate: kind == ContentKind::Toc,
        }
    }

    /// Whether the source should be expanded as a wildcard pattern
    pub fn is_pattern(&self) -> bool {
        self.kind == ContentKind::Text && self.source.contains(['*', '?'])
    }
}

#[derive(Deserialize)]
struct RawContentItem {
    #[serde(rename = "type")]
    kind: ContentKind,
    source: String,
    generate: Option<bool>,
}

impl From<RawContentItem> for ContentItem {
    fn from(raw: RawContentItem) -> Self {
        Self {
            kind: raw.kind,
            generate: raw.generate.unwrap_or(raw.kind == ContentKind::Toc),
            source: raw.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults_by_kind() {
        let manifest = Manifest::from_json(
            r#"{"contents": [
                {"type": "toc", "source": "toc.html"},
                {"type": "text", "source": "a.xhtml"},
                {"type": "text", "source": "b.xhtml", "generate": true}
            ]}"#,
        )
        .unwrap();

        let flags: Vec<bool> = manifest.contents.iter().map(|c| c.generate).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_depth_is_clamped() {
        let depth = |d| TocSettings { depth: Some(d) }.depth();
        assert_eq!(depth(0), 1);
        assert_eq!(depth(-3), 1);
        assert_eq!(depth(4), 4);
        assert_eq!(depth(12), 6);
        assert_eq!(TocSettings::default().depth(), 6);
    }

    #[test]
    fn test_missing_field_reported_on_use() {
        let manifest = Manifest::from_json(r#"{"title": "Book"}"#).unwrap();
        assert_eq!(manifest.title().unwrap(), "Book");
        assert!(matches!(
            manifest.publisher(),
            Err(ManifestError::MissingField("publisher"))
        ));
        assert!(matches!(manifest.primary_author(), Err(ManifestError::NoAuthors)));
    }

    #[test]
    fn test_modified_timestamp() {
        let mut manifest = Manifest::default();
        assert!(manifest.modified().unwrap().is_none());

        manifest.modified = Some("2020-05-01T10:00:00+02:00".to_string());
        let parsed = manifest.modified().unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-05-01T08:00:00+00:00");

        manifest.modified = Some("yesterday".to_string());
        assert!(matches!(
            manifest.modified(),
            Err(ManifestError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_pattern_detection() {
        assert!(ContentItem::new(ContentKind::Text, "ch/*.xhtml").is_pattern());
        assert!(!ContentItem::new(ContentKind::Text, "ch/one.xhtml").is_pattern());
        assert!(!ContentItem::new(ContentKind::Toc, "*.html").is_pattern());
    }

    #[test]
    fn test_author_sort_key_fallback() {
        let author = Author::new("Jane Doe");
        assert_eq!(author.sort_key(), "Jane Doe");
    }
}
