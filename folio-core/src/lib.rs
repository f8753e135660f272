//! Folio Core Library
//!
//! This crate assembles EPUB archives from a JSON manifest and a set of
//! pre-rendered XHTML content documents. Headings found in the documents are
//! rebuilt into one book outline which is emitted three ways: the NCX index,
//! the EPUB 3 navigation document and a flat table of contents page.

pub mod archive;
pub mod classify;
pub mod emit;
pub mod error;
pub mod navigation;
pub mod package;
pub mod scanner;
pub mod sources;
pub mod templates;
pub mod types;

pub use emit::{Assembly, BuildReport, EpubMaker, MakerOptions};
pub use error::{ArchiveError, AssemblyError, FolioError, ManifestError, Result};
pub use navigation::{Navigation, NavigationBuilder, OutlineGroup, OutlineLine};
pub use types::{
    ArchiveEntry, Author, ContentItem, ContentKind, EntryContent, GuideReference, HeadingRecord,
    Identifier, Manifest, ManifestEntry, NavNode, StoreMode,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_creation() {
        let manifest = Manifest::from_json(r#"{"title": "Test Book", "language": "en"}"#).unwrap();
        assert_eq!(manifest.title().unwrap(), "Test Book");
        assert_eq!(manifest.language().unwrap(), "en");
        assert_eq!(manifest.depth(), 6);
    }
}
