//! Outline command implementation

use anyhow::{Context, Result};
use folio_core::{EpubMaker, Manifest, OutlineGroup};
use serde::Serialize;
use std::path::Path;

/// Outline output
#[derive(Serialize)]
struct OutlineReport {
    title: Option<String>,
    nav_points: usize,
    documents: Vec<OutlineGroup>,
}

/// Print the flattened table of contents of a manifest's documents
pub fn outline(manifest: &str, json: bool) -> Result<()> {
    let manifest_path = Path::new(manifest);
    let parsed = Manifest::from_path(manifest_path)
        .with_context(|| format!("Failed to load manifest: {}", manifest))?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new(""));

    let navigation = EpubMaker::new()
        .outline(&parsed, base_dir)
        .with_context(|| format!("Failed to read the documents of {}", manifest))?;

    let report = OutlineReport {
        title: parsed.title.clone(),
        nav_points: navigation.len(),
        documents: navigation.flat_outline(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(title) = &report.title {
        println!("{}", title);
    }
    for group in &report.documents {
        println!("  {}", group.document);
        for line in &group.lines {
            let indent = "  ".repeat(usize::from(line.indent) + 2);
            match &line.href {
                Some(href) => println!("{}{}. {} ({})", indent, line.play_order, line.label, href),
                None => println!("{}{}. {}", indent, line.play_order, line.label),
            }
        }
    }
    println!("{} navigation points", report.nav_points);

    Ok(())
}
