//! Templates for the generated package documents
//!
//! Every generated file is produced by one method of [`TemplateSet`] from a
//! typed context. Values are escaped by the templates; the navigation
//! fragments in the contexts are already-rendered markup and are inserted
//! as-is.

use crate::navigation::{render_outline_groups, OutlineGroup};
use crate::package::TOC_PAGE;
use crate::types::{Author, GuideReference, ManifestEntry};
use serde::Serialize;
use std::fmt::Write;

/// Context for the cover page
#[derive(Debug, Clone, Serialize)]
pub struct CoverContext {
    pub title: String,
    pub cover_image: String,
    pub stylesheet: String,
}

/// Context for the package description (`content.opf`)
#[derive(Debug, Clone, Serialize)]
pub struct PackageContext {
    pub title: String,

    /// Authors in display order
    pub authors: Vec<Author>,

    pub rights: String,
    pub language: String,
    pub publisher: String,
    pub identifier: String,
    pub identifier_scheme: Option<String>,

    /// Last-modified timestamp, already formatted
    pub modified: Option<String>,

    pub manifest: Vec<ManifestEntry>,

    /// Item ids in reading order
    pub spine: Vec<String>,

    pub guide: Option<Vec<GuideReference>>,

    /// Whether a fallback image is registered for next-generation formats
    pub webp_fallback: bool,
}

/// Context for the NCX index document
#[derive(Debug, Clone, Serialize)]
pub struct NcxContext {
    pub title: String,
    pub author_name: String,
    pub identifier: String,
    pub depth: u8,

    /// Rendered `navPoint` elements
    pub nav_points: String,
}

/// Context for the hyperlink navigation document
#[derive(Debug, Clone, Serialize)]
pub struct NavContext {
    pub title: String,
    pub author_name: String,
    pub identifier: String,
    pub language: String,

    /// Rendered `<li>` items
    pub nav_items: String,
}

/// Context for the flat table of contents page
#[derive(Debug, Clone, Serialize)]
pub struct TocPageContext {
    pub title: String,
    pub stylesheet: String,
    pub outline: Vec<OutlineGroup>,
}

/// Renders the generated documents of a package
pub trait TemplateSet: Send + Sync {
    fn container(&self, package_path: &str) -> String;
    fn cover(&self, ctx: &CoverContext) -> String;
    fn package(&self, ctx: &PackageContext) -> String;
    fn ncx(&self, ctx: &NcxContext) -> String;
    fn nav(&self, ctx: &NavContext) -> String;
    fn toc_page(&self, ctx: &TocPageContext) -> String;
}

/// Built-in templates producing EPUB 3 documents with EPUB 2 compatibility
#[derive(Debug, Clone, Default)]
pub struct DefaultTemplates;

impl TemplateSet for DefaultTemplates {
    fn container(&self, package_path: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>
"#,
            escape_xml(package_path)
        )
    }

    fn cover(&self, ctx: &CoverContext) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
	<title>{title}</title>
	<link rel="stylesheet" type="text/css" href="{css}"/>
</head>
<body>
	<div class="cover">
		<img src="{img}" alt="{title}"/>
	</div>
</body>
</html>
"#,
            title = escape_xml(&ctx.title),
            css = escape_xml(&ctx.stylesheet),
            img = escape_xml(&ctx.cover_image),
        )
    }

    fn package(&self, ctx: &PackageContext) -> String {
        let mut opf = String::new();

        opf.push_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
        );
        let _ = writeln!(opf, "        <dc:title>{}</dc:title>", escape_xml(&ctx.title));
        for (idx, author) in ctx.authors.iter().enumerate() {
            let _ = writeln!(
                opf,
                "        <dc:creator id=\"creator{idx}\" opf:file-as=\"{}\" opf:role=\"aut\">{}</dc:creator>",
                escape_xml(author.sort_key()),
                escape_xml(&author.name)
            );
            let _ = writeln!(
                opf,
                "        <meta refines=\"#creator{idx}\" property=\"file-as\">{}</meta>",
                escape_xml(author.sort_key())
            );
        }
        let _ = writeln!(opf, "        <dc:rights>{}</dc:rights>", escape_xml(&ctx.rights));
        let _ = writeln!(opf, "        <dc:language>{}</dc:language>", escape_xml(&ctx.language));
        let _ = writeln!(opf, "        <dc:publisher>{}</dc:publisher>", escape_xml(&ctx.publisher));
        match &ctx.identifier_scheme {
            Some(scheme) => {
                let _ = writeln!(
                    opf,
                    "        <dc:identifier id=\"BookId\" opf:scheme=\"{}\">{}</dc:identifier>",
                    escape_xml(scheme),
                    escape_xml(&ctx.identifier)
                );
            }
            None => {
                let _ = writeln!(
                    opf,
                    "        <dc:identifier id=\"BookId\">{}</dc:identifier>",
                    escape_xml(&ctx.identifier)
                );
            }
        }
        if let Some(modified) = &ctx.modified {
            let _ = writeln!(
                opf,
                "        <meta property=\"dcterms:modified\">{}</meta>",
                escape_xml(modified)
            );
        }
        let _ = writeln!(
            opf,
            "        <meta name=\"cover\" content=\"coverimage\"/>"
        );
        opf.push_str("    </metadata>\n");

        opf.push_str("    <manifest>\n");
        for item in &ctx.manifest {
            let _ = write!(
                opf,
                "        <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
                escape_xml(&item.id),
                escape_xml(&item.href),
                escape_xml(&item.media_type)
            );
            if let Some(properties) = &item.properties {
                let _ = write!(opf, " properties=\"{}\"", escape_xml(properties));
            }
            if let Some(fallback) = &item.fallback {
                let _ = write!(opf, " fallback=\"{}\"", escape_xml(fallback));
            }
            opf.push_str("/>\n");
        }
        opf.push_str("    </manifest>\n");

        opf.push_str("    <spine toc=\"ncx\">\n");
        for idref in &ctx.spine {
            let _ = writeln!(opf, "        <itemref idref=\"{}\"/>", escape_xml(idref));
        }
        opf.push_str("    </spine>\n");

        if let Some(guide) = &ctx.guide {
            opf.push_str("    <guide>\n");
            for reference in guide {
                let _ = writeln!(
                    opf,
                    "        <reference type=\"{}\" title=\"{}\" href=\"{}\"/>",
                    escape_xml(&reference.kind),
                    escape_xml(&reference.title),
                    escape_xml(&reference.href)
                );
            }
            opf.push_str("    </guide>\n");
        }

        opf.push_str("</package>\n");
        opf
    }

    fn ncx(&self, ctx: &NcxContext) -> String {
        let nav_points = indent_block(&ctx.nav_points, "        ");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <head>
        <meta name="dtb:uid" content="{uid}"/>
        <meta name="dtb:depth" content="{depth}"/>
        <meta name="dtb:totalPageCount" content="0"/>
        <meta name="dtb:maxPageNumber" content="0"/>
    </head>
    <docTitle>
        <text>{title}</text>
    </docTitle>
    <docAuthor>
        <text>{author}</text>
    </docAuthor>
    <navMap>
{nav_points}    </navMap>
</ncx>
"#,
            uid = escape_xml(&ctx.identifier),
            depth = ctx.depth,
            title = escape_xml(&ctx.title),
            author = escape_xml(&ctx.author_name),
        )
    }

    fn nav(&self, ctx: &NavContext) -> String {
        // An empty <ol> is not allowed in the toc nav, so point at the contents page
        let items = if ctx.nav_items.trim().is_empty() {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_xml(TOC_PAGE),
                escape_xml(&ctx.title)
            )
        } else {
            ctx.nav_items.clone()
        };
        let nav_items = indent_block(&items, "            ");
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
<head>
    <title>{title}</title>
    <meta name="author" content="{author}"/>
    <meta name="identifier" content="{uid}"/>
</head>
<body>
    <nav epub:type="toc" id="toc">
        <h1>{title}</h1>
        <ol>
{nav_items}        </ol>
    </nav>
</body>
</html>
"#,
            lang = escape_xml(&ctx.language),
            title = escape_xml(&ctx.title),
            author = escape_xml(&ctx.author_name),
            uid = escape_xml(&ctx.identifier),
        )
    }

    fn toc_page(&self, ctx: &TocPageContext) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title>{title}</title>
<link rel="stylesheet" type="text/css" href="{css}"/>
</head>
<body>
<h1>{title}</h1>
{outline}</body>
</html>
"#,
            title = escape_xml(&ctx.title),
            css = escape_xml(&ctx.stylesheet),
            outline = render_outline_groups(&ctx.outline),
        )
    }
}

/// Prefix every non-empty line of `block` with `indent`
fn indent_block(block: &str, indent: &str) -> String {
    let mut out = String::with_capacity(block.len());
    for line in block.lines() {
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
