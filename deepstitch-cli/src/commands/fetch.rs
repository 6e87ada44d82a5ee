//! Fetch command - reconstruct the full image behind a tile URL.

use std::path::PathBuf;
use std::time::Instant;

use deepstitch::Reconstructor;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::common::{
    resolve_reconstruct_config, source_from_file, source_from_url, RunOverrides,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub url: Option<String>,
    pub source: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub overrides: RunOverrides,
    pub config: Option<PathBuf>,
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref())?;
    runner.log_startup("fetch");
    let config = runner.config();

    let source = match (&args.url, &args.source) {
        (Some(url), None) => source_from_url(url)?,
        (None, Some(path)) => source_from_file(path)?,
        _ => {
            return Err(CliError::Usage(
                "Give either a tile URL or --source, not both".to_string(),
            ))
        }
    };
    let run_config = resolve_reconstruct_config(&args.overrides, config);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    // Ctrl-C cancels the run; outstanding requests are dropped
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling...");
        trigger.cancel();
    })
    .map_err(|e| CliError::Usage(format!("Failed to set signal handler: {}", e)))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    println!("Reconstructing {}", source.identifier());
    println!("  Scheme: {}", source.addressing_scheme());
    println!("  Workers: {}", run_config.harvest_concurrency());
    println!();

    let start = Instant::now();
    let result = runtime.block_on(async {
        let reconstructor = Reconstructor::with_reqwest(run_config).map_err(CliError::HttpClient)?;
        reconstructor
            .reconstruct(&source, cancel)
            .await
            .map_err(CliError::from)
    });
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!(identifier = source.identifier(), error = %e, "Fetch failed");
            return Err(e);
        }
    };

    let geometry = result.geometry();
    println!(
        "Fetched {}/{} tiles at scale {} in {:.2}s",
        result.tiles_drawn(),
        result.tiles_total(),
        geometry.max_scale,
        start.elapsed().as_secs_f64()
    );
    if !result.is_complete() {
        println!(
            "  {} tiles could not be fetched and are left black",
            result.tiles_total() - result.tiles_drawn()
        );
    }

    let path = output_dir.join(result.suggested_filename());
    runner.write_output(&path, result.image().bytes())?;
    println!(
        "Saved {}×{} image to {}",
        result.image().width(),
        result.image().height(),
        path.display()
    );

    Ok(())
}
