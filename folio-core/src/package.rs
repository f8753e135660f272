//! Package manifest assembly
//!
//! Collects every packaged file into one ordered, deduplicated list of
//! manifest entries with deterministic ids, and derives the spine and guide.

use crate::classify::{media_type_for, MediaType};
use crate::error::{AssemblyError, FolioError, ManifestError};
use crate::types::{GuideReference, ManifestEntry};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::{BTreeSet, HashSet};

/// Generated cover page
pub const COVER_PAGE: &str = "cover.html";

/// Generated flat table of contents page
pub const TOC_PAGE: &str = "toc.html";

/// Generated NCX index
pub const NCX_FILE: &str = "toc.ncx";

/// Generated hyperlink navigation document
pub const NAV_FILE: &str = "nav.xhtml";

/// Manifest id of the bundled fallback image
pub const FALLBACK_IMAGE_ID: &str = "fallbackimage";

/// Package path of the bundled fallback image
pub const FALLBACK_IMAGE_HREF: &str = "images/folio-fallback.png";

/// 1x1 transparent PNG
const FALLBACK_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Bytes of the bundled fallback image
pub fn fallback_image() -> Vec<u8> {
    STANDARD
        .decode(FALLBACK_PNG)
        .expect("bundled fallback image is valid base64")
}

/// Everything the assembler needs to know about the book's files
#[derive(Debug, Clone)]
pub struct PackageInputs<'a> {
    pub cover_image: &'a str,
    pub stylesheet: &'a str,

    /// Content documents in reading order
    pub documents: &'a [String],

    /// Images discovered in the content documents
    pub images: &'a BTreeSet<String>,

    pub guide: Option<&'a [GuideReference]>,
}

/// The assembled package description data
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Manifest entries in declaration order
    pub entries: Vec<ManifestEntry>,

    /// Item ids in reading order
    pub spine: Vec<String>,

    /// Images to copy, sorted, excluding the cover image
    pub images: Vec<String>,

    /// Content documents after deduplication, in reading order
    pub documents: Vec<String>,

    pub guide: Option<Vec<GuideReference>>,

    /// Whether the fallback image was registered
    pub webp_fallback: bool,
}

/// Classify an image path, rejecting anything that is not an image
fn image_type(path: &str) -> Result<MediaType, AssemblyError> {
    let media_type = MediaType::from_path(path)?;
    if media_type.is_image() {
        Ok(media_type)
    } else {
        Err(AssemblyError::NotAnImage(path.to_string()))
    }
}

/// Build the manifest entry list, spine and guide
pub fn assemble_package(inputs: &PackageInputs<'_>) -> Result<Package, FolioError> {
    let mut entries = Vec::new();

    entries.push(ManifestEntry::new("ncx", NCX_FILE, MediaType::Ncx.as_str()));
    entries.push(
        ManifestEntry::new("nav", NAV_FILE, MediaType::Xhtml.as_str()).with_properties("nav"),
    );
    entries.push(ManifestEntry::new(
        "style",
        inputs.stylesheet,
        media_type_for(inputs.stylesheet)?,
    ));

    let cover_type = image_type(inputs.cover_image)?;
    let mut needs_fallback = cover_type.needs_fallback();
    entries.push(
        ManifestEntry::new("coverimage", inputs.cover_image, cover_type.as_str())
            .with_properties("cover-image"),
    );

    // BTreeSet iteration is already sorted and deduplicated
    let images: Vec<String> = inputs
        .images
        .iter()
        .filter(|img| img.as_str() != inputs.cover_image)
        .cloned()
        .collect();

    for (idx, image) in images.iter().enumerate() {
        if image == FALLBACK_IMAGE_HREF {
            return Err(AssemblyError::ReservedPath(image.clone()).into());
        }
        let media_type = image_type(image)?;
        needs_fallback |= media_type.needs_fallback();
        entries.push(ManifestEntry::new(
            format!("image{idx}"),
            image.as_str(),
            media_type.as_str(),
        ));
    }

    if needs_fallback {
        tracing::debug!("Registering fallback image for next-generation image formats");
        for entry in entries.iter_mut() {
            let needs = MediaType::from_path(&entry.href)
                .map(|m| m.needs_fallback())
                .unwrap_or(false);
            if needs {
                entry.fallback = Some(FALLBACK_IMAGE_ID.to_string());
            }
        }
        entries.push(ManifestEntry::new(
            FALLBACK_IMAGE_ID,
            FALLBACK_IMAGE_HREF,
            MediaType::Png.as_str(),
        ));
    }

    let mut seen = HashSet::new();
    let documents: Vec<String> = inputs
        .documents
        .iter()
        .filter(|doc| seen.insert(doc.as_str()))
        .cloned()
        .collect();

    let pages = [COVER_PAGE, TOC_PAGE];
    let mut spine = Vec::new();
    for (idx, href) in pages
        .into_iter()
        .chain(documents.iter().map(String::as_str))
        .enumerate()
    {
        let id = format!("item{idx}");
        entries.push(ManifestEntry::new(
            id.as_str(),
            href,
            media_type_for(href)?,
        ));
        spine.push(id);
    }

    let guide = inputs
        .guide
        .map(|refs| resolve_guide(refs, &entries))
        .transpose()?;

    Ok(Package {
        entries,
        spine,
        images,
        documents,
        guide,
        webp_fallback: needs_fallback,
    })
}

/// Check that every guide reference targets a packaged file
fn resolve_guide(
    references: &[GuideReference],
    entries: &[ManifestEntry],
) -> Result<Vec<GuideReference>, ManifestError> {
    references
        .iter()
        .map(|reference| {
            let target = reference.href.split('#').next().unwrap_or_default();
            if entries.iter().any(|e| e.href == target) {
                Ok(reference.clone())
            } else {
                Err(ManifestError::UnresolvedGuideReference(reference.href.clone()))
            }
        })
        .collect()
}
