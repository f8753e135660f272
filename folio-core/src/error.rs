//! Error types for Folio Core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Top-level error type for all Folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the book manifest itself
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("At least one author is required")]
    NoAuthors,

    #[error("Invalid modification timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Guide reference '{0}' does not point at a packaged file")]
    UnresolvedGuideReference(String),
}

/// Errors raised while collecting and classifying book contents
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Unknown media type for '{0}'")]
    UnrecognizedFormat(String),

    #[error("Cannot read '{path}': {source}")]
    MissingSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid source pattern: {0}")]
    InvalidPattern(String),

    #[error("'{0}' is not an image")]
    NotAnImage(String),

    #[error("'{0}' resolves outside the package directory")]
    OutsidePackage(String),

    #[error("'{0}' collides with a generated package file")]
    ReservedPath(String),
}

/// Errors that occur while writing the output archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(String),

    #[error("Failed to move archive into place at '{path}': {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

impl AssemblyError {
    /// Wrap an IO failure on a declared source path
    pub fn missing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssemblyError::MissingSource {
            path: path.into(),
            source,
        }
    }
}
