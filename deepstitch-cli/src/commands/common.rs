//! Common types and utilities shared across CLI commands.

use deepstitch::config::ConfigFile;
use deepstitch::{analyze, ReconstructConfig, TileSource};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::CliError;

/// Run settings given on the command line; `None` defers to the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub concurrency: Option<usize>,
    pub retries: Option<u32>,
    pub quality: Option<u8>,
    pub timeout: Option<u64>,
}

/// Resolve run settings from CLI args and config.
pub fn resolve_reconstruct_config(
    overrides: &RunOverrides,
    config: &ConfigFile,
) -> ReconstructConfig {
    // CLI takes precedence, then config
    let mut run = config.to_reconstruct_config();
    if let Some(workers) = overrides.concurrency {
        run = run.with_harvest_concurrency(workers);
    }
    if let Some(retries) = overrides.retries {
        run = run.with_tile_retries(retries);
    }
    if let Some(quality) = overrides.quality {
        run = run.with_jpeg_quality(quality);
    }
    if let Some(secs) = overrides.timeout {
        run = run.with_timeout((secs > 0).then_some(Duration::from_secs(secs)));
    }
    run
}

/// Turn a tile URL into a tile source.
pub fn source_from_url(url: &str) -> Result<TileSource, CliError> {
    analyze(url).ok_or_else(|| CliError::NotATile(url.to_string()))
}

/// Read a tile source saved with `deepstitch analyze --json`.
pub fn source_from_file(path: &Path) -> Result<TileSource, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::SourceFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::SourceFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_config() {
        let config =
            ConfigFile::from_ini_str("[download]\nconcurrency = 4\nretries = 5\n").unwrap();

        let run = resolve_reconstruct_config(&RunOverrides::default(), &config);
        assert_eq!(run.harvest_concurrency(), 4);
        assert_eq!(run.tile_retries(), 5);

        let overrides = RunOverrides {
            concurrency: Some(16),
            quality: Some(70),
            timeout: Some(600),
            ..Default::default()
        };
        let run = resolve_reconstruct_config(&overrides, &config);
        assert_eq!(run.harvest_concurrency(), 16);
        assert_eq!(run.tile_retries(), 5);
        assert_eq!(run.jpeg_quality(), 70);
        assert_eq!(run.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = ConfigFile::from_ini_str("[download]\nrun_timeout = 60\n").unwrap();
        let overrides = RunOverrides {
            timeout: Some(0),
            ..Default::default()
        };

        let run = resolve_reconstruct_config(&overrides, &config);
        assert_eq!(run.timeout(), None);
    }

    #[test]
    fn test_source_from_url() {
        let source = source_from_url("https://h/maps/plan/3/1_2.jpg").unwrap();
        assert_eq!(source.identifier(), "plan");

        assert!(matches!(
            source_from_url("https://h/logo.png"),
            Err(CliError::NotATile(_))
        ));
    }

    #[test]
    fn test_source_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("source.json");
        let source = source_from_url("https://h/maps/plan/3/1_2.jpg").unwrap();
        fs::write(&path, serde_json::to_string_pretty(&source).unwrap()).unwrap();

        assert_eq!(source_from_file(&path).unwrap(), source);
    }

    #[test]
    fn test_bad_source_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("source.json");
        fs::write(&path, "{\"identifier\": 3}").unwrap();

        assert!(matches!(
            source_from_file(&path),
            Err(CliError::SourceFile { .. })
        ));
        assert!(matches!(
            source_from_file(&temp.path().join("missing.json")),
            Err(CliError::SourceFile { .. })
        ));
    }
}
