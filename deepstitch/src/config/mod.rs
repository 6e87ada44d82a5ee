//! Configuration types for DeepStitch.
//!
//! - [`ReconstructConfig`]: knobs for one reconstruction run (worker count,
//!   probe limits, output quality, deadlines)
//! - [`ConfigFile`]: the user's `~/.deepstitch/config.ini`, which converts
//!   into a [`ReconstructConfig`]
//!
//! # Example
//!
//! ```
//! use deepstitch::config::{ConfigFile, ReconstructConfig};
//!
//! let file = ConfigFile::default();
//! let run: ReconstructConfig = file.to_reconstruct_config();
//! assert_eq!(run.harvest_concurrency(), 32);
//! ```

mod file;
mod reconstruct;

pub use file::{
    config_directory, config_file_path, ConfigFile, ConfigFileError, DownloadSettings,
    LoggingSettings, OutputSettings, ProbeSettings,
};
pub use reconstruct::{
    ReconstructConfig, DEFAULT_HARVEST_CONCURRENCY, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_GRID_EXTENT, DEFAULT_MAX_SCALE_PROBES, DEFAULT_TILE_RETRIES,
    MAX_GRID_EXTENT_CEILING, MAX_SCALE_PROBES_CEILING,
};
