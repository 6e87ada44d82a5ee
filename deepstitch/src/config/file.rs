//! Configuration file handling for ~/.deepstitch/config.ini.
//!
//! ```ini
//! ; timeout is per request, run_timeout covers the whole run (0 disables)
//! [download]
//! timeout = 30
//! concurrency = 32
//! retries = 2
//! run_timeout = 0
//!
//! ; values above 20 steps or 2000 rows/columns are capped
//! [probe]
//! max_scale_steps = 20
//! max_grid_extent = 2000
//!
//! [output]
//! quality = 90
//! directory = ~/Pictures
//!
//! [logging]
//! directory = ~/.deepstitch/logs
//! ```

use super::reconstruct::{
    ReconstructConfig, DEFAULT_HARVEST_CONCURRENCY, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_GRID_EXTENT, DEFAULT_MAX_SCALE_PROBES, DEFAULT_TILE_RETRIES,
};
use crate::provider::DEFAULT_REQUEST_TIMEOUT_SECS;
use ini::{Ini, Properties};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[download]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Harvest worker count
    pub concurrency: usize,
    /// Transport-failure retries per tile
    pub retries: u32,
    /// Whole-run deadline in seconds; 0 disables it
    pub run_timeout: u64,
}

/// `[probe]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub max_scale_steps: u32,
    pub max_grid_extent: u32,
}

/// `[output]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// JPEG quality 1-100
    pub quality: u8,
    /// Directory the CLI writes images into
    pub directory: PathBuf,
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub download: DownloadSettings,
    pub probe: ProbeSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            download: DownloadSettings {
                timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
                concurrency: DEFAULT_HARVEST_CONCURRENCY,
                retries: DEFAULT_TILE_RETRIES,
                run_timeout: 0,
            },
            probe: ProbeSettings {
                max_scale_steps: DEFAULT_MAX_SCALE_PROBES,
                max_grid_extent: DEFAULT_MAX_GRID_EXTENT,
            },
            output: OutputSettings {
                quality: DEFAULT_JPEG_QUALITY,
                directory: PathBuf::from("."),
            },
            logging: LoggingSettings {
                directory: config_directory().join("logs"),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.deepstitch/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))?;
        parse_ini(&ini)
    }

    /// Build the run configuration these settings describe.
    pub fn to_reconstruct_config(&self) -> ReconstructConfig {
        let run_timeout = match self.download.run_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        ReconstructConfig::new()
            .with_request_timeout_secs(self.download.timeout)
            .with_harvest_concurrency(self.download.concurrency)
            .with_tile_retries(self.download.retries)
            .with_timeout(run_timeout)
            .with_max_scale_probes(self.probe.max_scale_steps)
            .with_max_grid_extent(self.probe.max_grid_extent)
            .with_jpeg_quality(self.output.quality)
    }
}

/// Reads `key` from `section` and parses it, mapping failures to
/// [`ConfigFileError::InvalidValue`].
fn parse_value<T: FromStr>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    let Some(raw) = props.get(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        })
}

fn positive<T: PartialOrd + Default>(
    value: Option<T>,
    section: &str,
    key: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ConfigFileError> {
    match value {
        Some(v) if v <= T::default() => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: raw.unwrap_or_default().to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        other => Ok(other),
    }
}

const SECONDS: &str = "must be a non-negative integer (seconds)";
const POSITIVE: &str = "must be a positive integer";
const NON_NEGATIVE: &str = "must be a non-negative integer";
const QUALITY: &str = "must be an integer between 1 and 100";

fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        let timeout = parse_value(section, "download", "timeout", SECONDS)?;
        if let Some(v) = positive(timeout, "download", "timeout", section.get("timeout"))? {
            config.download.timeout = v;
        }
        let concurrency = parse_value(section, "download", "concurrency", POSITIVE)?;
        let raw = section.get("concurrency");
        if let Some(v) = positive(concurrency, "download", "concurrency", raw)? {
            config.download.concurrency = v;
        }
        if let Some(v) = parse_value(section, "download", "retries", NON_NEGATIVE)? {
            config.download.retries = v;
        }
        if let Some(v) = parse_value(section, "download", "run_timeout", SECONDS)? {
            config.download.run_timeout = v;
        }
    }

    // [probe] section
    if let Some(section) = ini.section(Some("probe")) {
        if let Some(v) = parse_value(section, "probe", "max_scale_steps", NON_NEGATIVE)? {
            config.probe.max_scale_steps = v;
        }
        let extent = parse_value(section, "probe", "max_grid_extent", POSITIVE)?;
        let raw = section.get("max_grid_extent");
        if let Some(v) = positive(extent, "probe", "max_grid_extent", raw)? {
            config.probe.max_grid_extent = v;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        let quality: Option<u8> = parse_value(section, "output", "quality", QUALITY)?;
        if let Some(v) = quality {
            if !(1..=100).contains(&v) {
                return Err(ConfigFileError::InvalidValue {
                    section: "output".to_string(),
                    key: "quality".to_string(),
                    value: v.to_string(),
                    reason: QUALITY.to_string(),
                });
            }
            config.output.quality = v;
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Expands a leading `~/` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

/// Get the path to the config directory (~/.deepstitch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deepstitch")
}

/// Get the path to the config file (~/.deepstitch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
