//! EPUB assembly driver
//!
//! Turns a manifest and its source files into the ordered list of archive
//! entries and writes them out. The `mimetype` marker is always the first
//! entry, stored uncompressed.

use crate::archive::write_archive_atomically;
use crate::error::{AssemblyError, FolioError, Result};
use crate::navigation::{Navigation, NavigationBuilder};
use crate::package::{
    assemble_package, fallback_image, Package, PackageInputs, COVER_PAGE, FALLBACK_IMAGE_HREF,
    NAV_FILE, NCX_FILE, TOC_PAGE,
};
use crate::scanner::{HtmlScanner, MarkupScanner, ScannedDocument};
use crate::sources::{check_package_path, expand_pattern, resolve_reference};
use crate::templates::{
    CoverContext, DefaultTemplates, NavContext, NcxContext, PackageContext, TemplateSet,
    TocPageContext,
};
use crate::types::{ArchiveEntry, Manifest, StoreMode};
use chrono::SecondsFormat;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Contents of the `mimetype` marker entry
pub const MIMETYPE: &str = "application/epub+zip";

/// Directory inside the container holding the package
pub const PACKAGE_DIR: &str = "OEBPS";

/// Package description file name
pub const PACKAGE_FILE: &str = "content.opf";

/// Package paths written by the driver itself
const RESERVED_PATHS: [&str; 6] = [
    PACKAGE_FILE,
    NCX_FILE,
    NAV_FILE,
    COVER_PAGE,
    TOC_PAGE,
    FALLBACK_IMAGE_HREF,
];

/// Options for a build
#[derive(Debug, Clone, Copy, Default)]
pub struct MakerOptions {
    /// Storage for every entry except the `mimetype` marker
    pub compression: StoreMode,
}

/// A content document read from disk and scanned
#[derive(Debug)]
struct LoadedDocument {
    path: String,
    bytes: Vec<u8>,
    scanned: ScannedDocument,
}

/// The result of assembling a book, before it is written
#[derive(Debug)]
pub struct Assembly {
    /// Archive entries in write order
    pub entries: Vec<ArchiveEntry>,

    pub navigation: Navigation,

    pub package: Package,
}

/// Summary of a finished build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub title: String,
    pub documents: usize,
    pub images: usize,
    pub nav_points: usize,
    pub entries: usize,
}

/// Builds EPUB archives from manifests
pub struct EpubMaker {
    options: MakerOptions,
    templates: Box<dyn TemplateSet>,
    scanner: Box<dyn MarkupScanner>,
}

impl EpubMaker {
    pub fn new() -> Self {
        Self {
            options: MakerOptions::default(),
            templates: Box::new(DefaultTemplates),
            scanner: Box::new(HtmlScanner::new()),
        }
    }

    /// Set build options
    pub fn with_options(mut self, options: MakerOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a different template set
    pub fn with_templates(mut self, templates: impl TemplateSet + 'static) -> Self {
        self.templates = Box::new(templates);
        self
    }

    /// Use a different markup scanner
    pub fn with_scanner(mut self, scanner: impl MarkupScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    /// Build `output` from the manifest file at `manifest_path`.
    ///
    /// Relative paths in the manifest resolve against the manifest's directory.
    pub fn make_epub(&self, manifest_path: &Path, output: &Path) -> Result<BuildReport> {
        let manifest = Manifest::from_path(manifest_path)?;
        let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        self.make_epub_from_manifest(&manifest, base_dir, output)
    }

    /// Build `output` from an in-memory manifest
    pub fn make_epub_from_manifest(
        &self,
        manifest: &Manifest,
        base_dir: &Path,
        output: &Path,
    ) -> Result<BuildReport> {
        let assembly = self.assemble(manifest, base_dir)?;
        write_archive_atomically(&assembly.entries, output)?;

        let report = BuildReport {
            title: manifest.title()?.to_string(),
            documents: assembly.package.documents.len(),
            images: assembly.package.images.len(),
            nav_points: assembly.navigation.len(),
            entries: assembly.entries.len(),
        };
        tracing::info!(
            output = %output.display(),
            documents = report.documents,
            nav_points = report.nav_points,
            "Wrote EPUB"
        );
        Ok(report)
    }

    /// Build only the outline of a manifest's documents
    pub fn outline(&self, manifest: &Manifest, base_dir: &Path) -> Result<Navigation> {
        let documents = self.load_documents(manifest, base_dir)?;
        Ok(build_navigation(manifest, &documents))
    }

    /// Produce every archive entry for the book, in write order
    pub fn assemble(&self, manifest: &Manifest, base_dir: &Path) -> Result<Assembly> {
        let documents = self.load_documents(manifest, base_dir)?;
        let navigation = build_navigation(manifest, &documents);

        let mut images = BTreeSet::new();
        for doc in &documents {
            for src in &doc.scanned.images {
                images.insert(resolve_reference(&doc.path, src)?);
            }
        }

        let cover_image = manifest.cover()?;
        let stylesheet = manifest.stylesheet();
        check_package_path(cover_image)?;
        check_package_path(stylesheet)?;
        let document_paths: Vec<String> = documents.iter().map(|d| d.path.clone()).collect();
        let package = assemble_package(&PackageInputs {
            cover_image,
            stylesheet,
            documents: &document_paths,
            images: &images,
            guide: manifest.guide.as_deref(),
        })?;

        let title = manifest.title()?;
        let author = manifest.primary_author()?;
        let identifier = manifest.identifier()?;
        let language = manifest.language()?;

        let compression = self.options.compression;
        let mut entries = Vec::new();

        entries.push(ArchiveEntry::bytes(
            "mimetype",
            MIMETYPE.as_bytes().to_vec(),
            StoreMode::Stored,
        ));
        entries.push(ArchiveEntry::text(
            "META-INF/container.xml",
            finish_generated(
                &self.templates.container(&format!("{PACKAGE_DIR}/{PACKAGE_FILE}")),
                false,
            ),
            StoreMode::Stored,
        ));

        let package_text = self.templates.package(&PackageContext {
            title: title.to_string(),
            authors: manifest.authors.clone(),
            rights: manifest.rights()?.to_string(),
            language: language.to_string(),
            publisher: manifest.publisher()?.to_string(),
            identifier: identifier.value.clone(),
            identifier_scheme: identifier.scheme.clone(),
            modified: manifest
                .modified()?
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            manifest: package.entries.clone(),
            spine: package.spine.clone(),
            guide: package.guide.clone(),
            webp_fallback: package.webp_fallback,
        });
        entries.push(generated(PACKAGE_FILE, &package_text, false, compression));

        let ncx_text = self.templates.ncx(&NcxContext {
            title: title.to_string(),
            author_name: author.name.clone(),
            identifier: identifier.value.clone(),
            depth: navigation.max_level().max(1),
            nav_points: navigation.ncx_nav_points(),
        });
        entries.push(generated(NCX_FILE, &ncx_text, true, compression));

        let nav_text = self.templates.nav(&NavContext {
            title: title.to_string(),
            author_name: author.name.clone(),
            identifier: identifier.value.clone(),
            language: language.to_string(),
            nav_items: navigation.nav_list_items(),
        });
        entries.push(generated(NAV_FILE, &nav_text, true, compression));

        let cover_text = self.templates.cover(&CoverContext {
            title: title.to_string(),
            cover_image: cover_image.to_string(),
            stylesheet: stylesheet.to_string(),
        });
        entries.push(generated(COVER_PAGE, &cover_text, true, compression));

        let toc_text = self.templates.toc_page(&TocPageContext {
            title: title.to_string(),
            stylesheet: stylesheet.to_string(),
            outline: navigation.flat_outline(),
        });
        entries.push(generated(TOC_PAGE, &toc_text, true, compression));

        for asset in [stylesheet, cover_image]
            .into_iter()
            .chain(package.images.iter().map(String::as_str))
        {
            entries.push(ArchiveEntry::bytes(
                format!("{PACKAGE_DIR}/{asset}"),
                read_source(base_dir, asset)?,
                compression,
            ));
        }

        if package.webp_fallback {
            entries.push(ArchiveEntry::bytes(
                format!("{PACKAGE_DIR}/{FALLBACK_IMAGE_HREF}"),
                fallback_image(),
                compression,
            ));
        }

        for doc in documents {
            entries.push(ArchiveEntry::bytes(
                format!("{PACKAGE_DIR}/{}", doc.path),
                doc.bytes,
                compression,
            ));
        }

        Ok(Assembly {
            entries,
            navigation,
            package,
        })
    }

    /// Resolve content items to document paths, in reading order.
    ///
    /// Paths of generated package files cannot be used by source documents.
    fn resolve_documents(&self, manifest: &Manifest, base_dir: &Path) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for item in manifest.contents.iter().filter(|item| !item.generate) {
            let paths = if item.is_pattern() {
                let matches = expand_pattern(base_dir, &item.source)?;
                if matches.is_empty() {
                    tracing::warn!(pattern = %item.source, "Content pattern matched no files");
                }
                matches
            } else {
                vec![item.source.clone()]
            };

            for path in paths {
                check_package_path(&path)?;
                if RESERVED_PATHS.contains(&path.as_str()) {
                    return Err(AssemblyError::ReservedPath(path).into());
                }
                if seen.insert(path.clone()) {
                    documents.push(path);
                }
            }
        }

        Ok(documents)
    }

    /// Read and scan every content document; order follows the manifest
    fn load_documents(&self, manifest: &Manifest, base_dir: &Path) -> Result<Vec<LoadedDocument>> {
        let paths = self.resolve_documents(manifest, base_dir)?;
        let scanner = self.scanner.as_ref();

        paths
            .into_par_iter()
            .map(|path| {
                let bytes = read_source(base_dir, &path)?;
                let scanned = scanner.scan(&String::from_utf8_lossy(&bytes));
                tracing::debug!(
                    document = %path,
                    headings = scanned.headings.len(),
                    images = scanned.images.len(),
                    "Scanned content document"
                );
                Ok(LoadedDocument {
                    path,
                    bytes,
                    scanned,
                })
            })
            .collect()
    }
}

impl Default for EpubMaker {
    fn default() -> Self {
        Self::new()
    }
}

fn build_navigation(manifest: &Manifest, documents: &[LoadedDocument]) -> Navigation {
    let mut builder = NavigationBuilder::new(manifest.depth());
    for doc in documents {
        builder.add_document(&doc.path, &doc.scanned.headings);
    }
    builder.finish()
}

fn read_source(base_dir: &Path, path: &str) -> Result<Vec<u8>> {
    let full = base_dir.join(path);
    fs::read(&full).map_err(|e| FolioError::from(AssemblyError::missing(full, e)))
}

/// Archive entry for a generated package document
fn generated(name: &str, text: &str, strip: bool, mode: StoreMode) -> ArchiveEntry {
    ArchiveEntry::text(
        format!("{PACKAGE_DIR}/{name}"),
        finish_generated(text, strip),
        mode,
    )
}

/// Post-process generated text: optionally drop the doctype, end with one newline
pub fn finish_generated(text: &str, strip: bool) -> String {
    let text = if strip {
        strip_doctype(text)
    } else {
        text.to_string()
    };
    normalize_trailing_newline(&text)
}

/// Remove a leading document type declaration, keeping any XML declaration.
///
/// Processing instructions between the XML declaration and the doctype are
/// removed along with it. Text without a leading doctype is returned unchanged.
pub fn strip_doctype(text: &str) -> String {
    static DOCTYPE: OnceLock<Regex> = OnceLock::new();
    let re = DOCTYPE.get_or_init(|| {
        Regex::new(r"\A(\s*<\?xml\s[^>]*\?>\s*)?(?:<\?[^>]*\?>\s*)*(?i:<!DOCTYPE)[^>]*>\s*")
            .expect("static doctype pattern")
    });
    re.replace(text, "${1}").into_owned()
}

/// Replace any run of trailing newlines with exactly one
pub fn normalize_trailing_newline(text: &str) -> String {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    let re = TRAILING
        .get_or_init(|| Regex::new(r"[\n\r]*\z").expect("static trailing newline pattern"));
    re.replace(text, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_doctype_keeps_xml_declaration() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>\n<html/>";
        assert_eq!(
            strip_doctype(text),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html/>"
        );
    }

    #[test]
    fn test_strip_doctype_with_processing_instruction() {
        let text = "<?xml version=\"1.0\"?>\n<?xml-stylesheet href=\"a.css\"?>\n<!doctype html PUBLIC \"x\" \"y\">\n<html/>";
        assert_eq!(strip_doctype(text), "<?xml version=\"1.0\"?>\n<html/>");
    }

    #[test]
    fn test_strip_doctype_without_declaration() {
        assert_eq!(strip_doctype("<!DOCTYPE html><html/>"), "<html/>");
        assert_eq!(strip_doctype("<html><!DOCTYPE x></html>"), "<html><!DOCTYPE x></html>");
    }

    #[test]
    fn test_normalize_trailing_newline() {
        assert_eq!(normalize_trailing_newline("a\n\n\r\n"), "a\n");
        assert_eq!(normalize_trailing_newline("a"), "a\n");
        assert_eq!(normalize_trailing_newline("a\nb\n"), "a\nb\n");
    }
}
