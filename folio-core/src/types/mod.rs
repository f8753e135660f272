//! Core types shared by the navigation builder, package assembler and emitter

mod entry;
mod manifest;
mod toc;

pub use entry::{ArchiveEntry, EntryContent, ManifestEntry, StoreMode};
pub use manifest::{
    Author, ContentItem, ContentKind, GuideReference, Identifier, Manifest, TocSettings,
    DEFAULT_STYLESHEET, MAX_DEPTH,
};
pub use toc::{DocumentOutline, HeadingRecord, NavNode};
