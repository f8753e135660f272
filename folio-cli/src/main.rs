//! Folio CLI - Command-line interface for assembling EPUB books

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_core::StoreMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse the storage mode for archive entries
fn parse_compression(s: &str) -> Result<StoreMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "stored" | "store" | "none" => Ok(StoreMode::Stored),
        "deflated" | "deflate" => Ok(StoreMode::Deflated),
        _ => Err(format!(
            "'{}' is not a compression mode (expected 'stored' or 'deflated')",
            s
        )),
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an EPUB from a book manifest
    Build {
        /// Manifest file path
        manifest: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// Storage for archive entries (stored, deflated)
        #[arg(short, long, default_value = "deflated", value_parser = parse_compression)]
        compression: StoreMode,
    },

    /// Print the table of contents a manifest would produce
    Outline {
        /// Manifest file path
        manifest: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "folio_cli=debug,folio_core=debug"
    } else {
        "folio_cli=info,folio_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            compression,
        } => commands::build(&manifest, &output, compression),

        Commands::Outline { manifest, json } => commands::outline(&manifest, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compression() {
        assert_eq!(parse_compression("stored").unwrap(), StoreMode::Stored);
        assert_eq!(parse_compression("Deflated").unwrap(), StoreMode::Deflated);
        assert!(parse_compression("zstd").is_err());
    }
}
