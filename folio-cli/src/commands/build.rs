//! Build command implementation

use anyhow::{Context, Result};
use folio_core::{EpubMaker, MakerOptions, StoreMode};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Build an EPUB from a manifest
pub fn build(manifest: &str, output: &str, compression: StoreMode) -> Result<()> {
    let manifest_path = Path::new(manifest);
    let output_path = Path::new(output);

    let maker = EpubMaker::new().with_options(MakerOptions { compression });

    // Set up progress bar with animation
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Assembling {}...", manifest));

    let report = match maker.make_epub(manifest_path, output_path) {
        Ok(report) => report,
        Err(err) => {
            pb.finish_and_clear();
            return Err(err).with_context(|| format!("Failed to build {}", output));
        }
    };

    tracing::info!(
        "Packaged {} documents, {} images and {} navigation points",
        report.documents,
        report.images,
        report.nav_points
    );

    pb.finish_with_message(format!("Built '{}' -> {}", report.title, output));

    Ok(())
}
