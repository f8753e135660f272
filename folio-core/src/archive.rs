//! Writing archive entries into a ZIP container

use crate::error::{ArchiveError, FolioError};
use crate::types::{ArchiveEntry, StoreMode};
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

fn options_for(mode: StoreMode) -> FileOptions {
    let method = match mode {
        StoreMode::Stored => CompressionMethod::Stored,
        StoreMode::Deflated => CompressionMethod::Deflated,
    };
    // Fixed timestamps keep repeated builds byte-identical
    FileOptions::default()
        .compression_method(method)
        .last_modified_time(zip::DateTime::default())
}

/// Write entries, in order, as a ZIP archive
pub fn write_archive<W: Write + Seek>(
    entries: &[ArchiveEntry],
    writer: W,
) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);

    for entry in entries {
        zip.start_file(entry.path.as_str(), options_for(entry.store_mode))?;
        zip.write_all(entry.content.as_bytes())
            .map_err(|e| ArchiveError::Zip(e.to_string()))?;
    }

    Ok(zip.finish()?)
}

/// Write the archive to `path`, replacing it only once the archive is complete.
///
/// The archive is first written to a temporary file next to `path`; if
/// anything fails the temporary file is removed and `path` is left untouched.
pub fn write_archive_atomically(entries: &[ArchiveEntry], path: &Path) -> Result<(), FolioError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".folio-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write_archive(entries, temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| ArchiveError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
