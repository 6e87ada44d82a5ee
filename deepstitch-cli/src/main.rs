//! DeepStitch CLI - Command-line interface
//!
//! Rebuilds a full image from one tile URL of a deep-zoom viewer.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::analyze::AnalyzeArgs;
use commands::common::RunOverrides;
use commands::fetch::FetchArgs;

#[derive(Parser)]
#[command(name = "deepstitch")]
#[command(version, about = "Rebuild full-resolution images from deep-zoom tile pyramids", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tile source inferred from a tile URL
    Analyze {
        /// A single tile URL, e.g. https://host/path/<id>/<scale>/<row>_<col>.jpg
        url: String,

        /// Print the tile source as JSON, suitable for `fetch --source`
        #[arg(long)]
        json: bool,
    },

    /// Reconstruct the full image and save it as JPEG
    Fetch {
        /// A single tile URL of the image
        #[arg(required_unless_present = "source", conflicts_with = "source")]
        url: Option<String>,

        /// Tile source JSON saved with `analyze --json`
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory for the output image (default: from config, else current dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Concurrent tile downloads
        #[arg(long)]
        concurrency: Option<usize>,

        /// Retries for tiles failing at the network level
        #[arg(long)]
        retries: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,

        /// Overall deadline in seconds (0 disables)
        #[arg(long)]
        timeout: Option<u64>,

        /// Config file (default: ~/.deepstitch/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { url, json } => commands::analyze::run(AnalyzeArgs { url, json }),
        Commands::Fetch {
            url,
            source,
            output_dir,
            concurrency,
            retries,
            quality,
            timeout,
            config,
        } => commands::fetch::run(FetchArgs {
            url,
            source,
            output_dir,
            overrides: RunOverrides {
                concurrency,
                retries,
                quality,
                timeout,
            },
            config,
        }),
    };

    if let Err(e) = result {
        e.exit();
    }
}
