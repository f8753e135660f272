//! Package manifest entries and archive entries

use serde::{Deserialize, Serialize};

/// One file declared in the package description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,

    /// Path relative to the package directory
    pub href: String,

    pub media_type: String,

    /// Space-separated item properties (e.g. "nav", "cover-image")
    pub properties: Option<String>,

    /// Id of the fallback item for formats readers may not support
    pub fallback: Option<String>,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
            fallback: None,
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

/// How an archive member is stored
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Stored,
    #[default]
    Deflated,
}

/// Contents of an archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Generated text
    Text(String),

    /// Bytes copied from a source file
    Bytes(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(text) => text.as_bytes(),
            EntryContent::Bytes(bytes) => bytes,
        }
    }
}

/// One member of the output archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the container
    pub path: String,

    pub content: EntryContent,

    pub store_mode: StoreMode,
}

impl ArchiveEntry {
    pub fn text(path: impl Into<String>, text: impl Into<String>, store_mode: StoreMode) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Text(text.into()),
            store_mode,
        }
    }

    pub fn bytes(path: impl Into<String>, bytes: Vec<u8>, store_mode: StoreMode) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Bytes(bytes),
            store_mode,
        }
    }
}
