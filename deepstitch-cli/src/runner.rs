//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and output writing
//! so command handlers only deal with their own work.

use crate::error::CliError;
use deepstitch::config::ConfigFile;
use deepstitch::logging::{default_log_file, init_logging, LoggingGuard};
use std::fs;
use std::path::Path;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration and start logging.
    ///
    /// `config_path` overrides the default `~/.deepstitch/config.ini`.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let logging_guard = init_logging(&config.logging.directory, default_log_file())
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("DeepStitch v{}", env!("CARGO_PKG_VERSION"));
        info!("DeepStitch CLI: {} command", command);
    }

    /// Write `bytes` to `path`, creating parent directories.
    pub fn write_output(&self, path: &Path, bytes: &[u8]) -> Result<(), CliError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)
        };
        write().map_err(|error| CliError::FileWrite {
            path: path.to_path_buf(),
            error,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "Image written");
        Ok(())
    }
}
