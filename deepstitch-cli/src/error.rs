//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use deepstitch::config::ConfigFileError;
use deepstitch::provider::ProviderError;
use deepstitch::ReconstructError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Config file could not be read or holds an invalid value
    Config(ConfigFileError),
    /// Invalid combination of arguments or environment problem
    Usage(String),
    /// Input URL is not a recognised tile URL
    NotATile(String),
    /// Saved tile source could not be read
    SourceFile { path: PathBuf, reason: String },
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// Failed to start the async runtime
    Runtime(io::Error),
    /// Reconstruction failed
    Reconstruct(ReconstructError),
    /// Failed to write output file
    FileWrite { path: PathBuf, error: io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NotATile(_) => {
                eprintln!();
                eprintln!("Expected a tile URL such as:");
                eprintln!("  https://host/path/<id>/<scale>/<row>_<col>.jpg");
                eprintln!("  https://host/path/<id>/dzc_output_files/<scale>/<row>_<col>.jpg");
                eprintln!("  https://host/iip?DeepZoom=/path/<id>_files/<scale>/<col>_<row>.jpg");
            }
            CliError::Reconstruct(ReconstructError::Precondition(_)) => {
                eprintln!();
                eprintln!("The server did not expose a usable tile grid. Try a tile URL");
                eprintln!("captured while zoomed in on the image.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::NotATile(url) => write!(f, "Not a tile URL: {}", url),
            CliError::SourceFile { path, reason } => {
                write!(f, "Failed to read tile source '{}': {}", path.display(), reason)
            }
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Reconstruct(e) => write!(f, "Reconstruction failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Reconstruct(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ReconstructError> for CliError {
    fn from(e: ReconstructError) -> Self {
        CliError::Reconstruct(e)
    }
}
