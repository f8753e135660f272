//! Asset classification: file name to media type

use crate::error::AssemblyError;
use std::path::Path;

/// Media types of files that can be packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    Svg,
    Webp,
    Avif,
    Xhtml,
    Css,
    Ncx,
}

impl MediaType {
    /// Classify a path by its extension
    pub fn from_path(path: &str) -> Result<Self, AssemblyError> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" => Ok(MediaType::Jpeg),
            "png" => Ok(MediaType::Png),
            "gif" => Ok(MediaType::Gif),
            "svg" => Ok(MediaType::Svg),
            "webp" => Ok(MediaType::Webp),
            "avif" => Ok(MediaType::Avif),
            "xhtml" | "html" | "htm" => Ok(MediaType::Xhtml),
            "css" => Ok(MediaType::Css),
            "ncx" => Ok(MediaType::Ncx),
            _ => Err(AssemblyError::UnrecognizedFormat(path.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::Svg => "image/svg+xml",
            MediaType::Webp => "image/webp",
            MediaType::Avif => "image/avif",
            MediaType::Xhtml => "application/xhtml+xml",
            MediaType::Css => "text/css",
            MediaType::Ncx => "application/x-dtbncx+xml",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            MediaType::Jpeg
                | MediaType::Png
                | MediaType::Gif
                | MediaType::Svg
                | MediaType::Webp
                | MediaType::Avif
        )
    }

    /// Image formats older reading systems cannot display
    pub fn needs_fallback(&self) -> bool {
        matches!(self, MediaType::Webp | MediaType::Avif)
    }
}

/// Media type string for a path
pub fn media_type_for(path: &str) -> Result<&'static str, AssemblyError> {
    MediaType::from_path(path).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_types() {
        assert_eq!(media_type_for("cover.jpg").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("cover.JPEG").unwrap(), "image/jpeg");
        assert_eq!(media_type_for("images/a.png").unwrap(), "image/png");
        assert_eq!(media_type_for("a.webp").unwrap(), "image/webp");
    }

    #[test]
    fn test_document_types() {
        assert_eq!(media_type_for("ch1.xhtml").unwrap(), "application/xhtml+xml");
        assert_eq!(media_type_for("toc.html").unwrap(), "application/xhtml+xml");
        assert_eq!(media_type_for("style.css").unwrap(), "text/css");
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let err = media_type_for("diagram.bmp").unwrap_err();
        assert!(matches!(err, AssemblyError::UnrecognizedFormat(p) if p == "diagram.bmp"));
        assert!(media_type_for("README").is_err());
    }

    #[test]
    fn test_fallback_formats() {
        assert!(MediaType::Webp.needs_fallback());
        assert!(MediaType::Avif.needs_fallback());
        assert!(!MediaType::Png.needs_fallback());
        assert!(!MediaType::Xhtml.is_image());
    }
}
