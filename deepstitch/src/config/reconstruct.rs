//! Reconstruction run configuration.

use crate::provider::DEFAULT_REQUEST_TIMEOUT_SECS;
use std::time::Duration;

/// Default number of concurrent tile downloads.
pub const DEFAULT_HARVEST_CONCURRENCY: usize = 32;

/// Default retry attempts for a tile whose request failed below HTTP.
pub const DEFAULT_TILE_RETRIES: u32 = 2;

/// Hard ceiling on scale-up probes, whatever the configuration asks for.
pub const MAX_SCALE_PROBES_CEILING: u32 = 20;

/// Hard ceiling on rows and columns probed per axis.
pub const MAX_GRID_EXTENT_CEILING: u32 = 2000;

/// Default cap on scale-up probes.
pub const DEFAULT_MAX_SCALE_PROBES: u32 = MAX_SCALE_PROBES_CEILING;

/// Default cap on rows and columns probed per axis.
pub const DEFAULT_MAX_GRID_EXTENT: u32 = MAX_GRID_EXTENT_CEILING;

/// Default JPEG quality of the stitched output.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration for one reconstruction run.
///
/// # Example
///
/// ```
/// use deepstitch::config::ReconstructConfig;
/// use std::time::Duration;
///
/// let config = ReconstructConfig::default();
/// assert_eq!(config.harvest_concurrency(), 32);
/// assert_eq!(config.jpeg_quality(), 90);
///
/// let config = ReconstructConfig::new()
///     .with_harvest_concurrency(8)
///     .with_timeout(Some(Duration::from_secs(300)));
/// assert_eq!(config.harvest_concurrency(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructConfig {
    harvest_concurrency: usize,
    tile_retries: u32,
    max_scale_probes: u32,
    max_grid_extent: u32,
    jpeg_quality: u8,
    timeout: Option<Duration>,
    request_timeout_secs: u64,
}

impl ReconstructConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of harvest workers. Clamped to at least 1.
    pub fn with_harvest_concurrency(mut self, workers: usize) -> Self {
        self.harvest_concurrency = workers.max(1);
        self
    }

    /// Set retry attempts for tiles failing at the transport level.
    pub fn with_tile_retries(mut self, retries: u32) -> Self {
        self.tile_retries = retries;
        self
    }

    /// Set the maximum number of scale-up probes. Clamped to
    /// [`MAX_SCALE_PROBES_CEILING`].
    pub fn with_max_scale_probes(mut self, probes: u32) -> Self {
        self.max_scale_probes = probes.min(MAX_SCALE_PROBES_CEILING);
        self
    }

    /// Set the maximum rows/columns probed per axis. Clamped to
    /// [`MAX_GRID_EXTENT_CEILING`].
    pub fn with_max_grid_extent(mut self, extent: u32) -> Self {
        self.max_grid_extent = extent.min(MAX_GRID_EXTENT_CEILING);
        self
    }

    /// Set the JPEG output quality. Clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set an overall deadline for the run; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-request HTTP timeout used when building a client.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn harvest_concurrency(&self) -> usize {
        self.harvest_concurrency
    }

    pub fn tile_retries(&self) -> u32 {
        self.tile_retries
    }

    pub fn max_scale_probes(&self) -> u32 {
        self.max_scale_probes
    }

    pub fn max_grid_extent(&self) -> u32 {
        self.max_grid_extent
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            harvest_concurrency: DEFAULT_HARVEST_CONCURRENCY,
            tile_retries: DEFAULT_TILE_RETRIES,
            max_scale_probes: DEFAULT_MAX_SCALE_PROBES,
            max_grid_extent: DEFAULT_MAX_GRID_EXTENT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            timeout: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
