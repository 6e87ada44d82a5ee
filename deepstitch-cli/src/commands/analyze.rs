//! Analyze command - show what a tile URL reveals about its pyramid.

use super::common::source_from_url;
use crate::error::CliError;

/// Arguments for the analyze command.
pub struct AnalyzeArgs {
    pub url: String,
    pub json: bool,
}

/// Run the analyze command.
pub fn run(args: AnalyzeArgs) -> Result<(), CliError> {
    let source = source_from_url(&args.url)?;

    if args.json {
        let json = serde_json::to_string_pretty(&source)
            .map_err(|e| CliError::Usage(format!("Failed to serialize tile source: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    println!("Tile source:");
    println!("  Identifier: {}", source.identifier());
    println!("  Scheme:     {}", source.addressing_scheme());
    println!("  Template:   {}", source.url_template());
    if let Some(manifest) = source.manifest_url() {
        println!("  Manifest:   {}", manifest);
    }
    println!(
        "  Sample:     scale {}, row {}, col {}",
        source.sample_scale(),
        source.sample_row(),
        source.sample_col()
    );
    println!("  Layout:     {:?}", source.addressing_variant());
    Ok(())
}
