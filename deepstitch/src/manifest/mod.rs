//! Pyramid manifest reading.
//!
//! Manifest-described pyramids publish their geometry in an IIIF
//! `info.json`-shaped document:
//!
//! ```json
//! {
//!   "width": 40000,
//!   "height": 30000,
//!   "tiles": [{ "width": 256, "height": 256, "scaleFactors": [1, 2, 4, 8] }]
//! }
//! ```
//!
//! Only the fields needed for reconstruction are read; everything else is
//! ignored.

use crate::provider::{AsyncHttpClient, ProviderError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest could not be downloaded
    #[error("failed to fetch manifest: {0}")]
    Fetch(#[from] ProviderError),

    /// Manifest body is not the expected JSON shape
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// Manifest parsed but describes an unusable pyramid
    #[error("invalid manifest: {0}")]
    Invalid(String),

    /// Source has no manifest URL
    #[error("tile source has no manifest URL")]
    Missing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTileSpec {
    width: u32,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    scale_factors: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    width: u32,
    height: u32,
    #[serde(default)]
    tiles: Vec<RawTileSpec>,
    #[serde(default)]
    scale_factors: Vec<u32>,
}

/// Pyramid description read from a manifest.
///
/// Parsing only guarantees a non-empty scale-factor list. Image and tile
/// sizes are checked separately by [`Manifest::validate_grid`], so a
/// manifest can yield a max scale even when its grid is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Full image width in pixels
    pub width: u32,
    /// Full image height in pixels
    pub height: u32,
    /// Tile width in pixels, zero when no tiles entry was given
    pub tile_width: u32,
    /// Tile height in pixels, zero when no tiles entry was given
    pub tile_height: u32,
    /// Available scale factors, never empty
    pub scale_factors: Vec<u32>,
}

impl Manifest {
    /// Parses a manifest document and checks its scale factors.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;

        let tiles = raw.tiles.first();
        let tile_width = tiles.map_or(0, |t| t.width);
        let tile_height = tiles.and_then(|t| t.height).unwrap_or(tile_width);

        let scale_factors = match tiles {
            Some(t) if !t.scale_factors.is_empty() => t.scale_factors.clone(),
            _ => raw.scale_factors,
        };
        if scale_factors.is_empty() {
            return Err(ManifestError::Invalid("no scale factors".to_string()));
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            tile_width,
            tile_height,
            scale_factors,
        })
    }

    /// Checks the manifest describes a drawable grid.
    pub fn validate_grid(&self) -> Result<(), ManifestError> {
        if self.width == 0 || self.height == 0 {
            return Err(ManifestError::Invalid(format!(
                "image size {}×{} is empty",
                self.width, self.height
            )));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ManifestError::Invalid(format!(
                "tile size {}×{} is empty",
                self.tile_width, self.tile_height
            )));
        }
        Ok(())
    }

    /// Largest advertised scale factor.
    pub fn max_scale(&self) -> u32 {
        self.scale_factors.iter().copied().max().unwrap_or(0)
    }

    /// Tile columns needed to cover the full width, zero without a tile size.
    pub fn columns(&self) -> u32 {
        if self.tile_width == 0 {
            return 0;
        }
        self.width.div_ceil(self.tile_width)
    }

    /// Tile rows needed to cover the full height, zero without a tile size.
    pub fn rows(&self) -> u32 {
        if self.tile_height == 0 {
            return 0;
        }
        self.height.div_ceil(self.tile_height)
    }
}

/// Downloads and parses the manifest at `url`.
pub async fn fetch_manifest<C>(client: &C, url: &str) -> Result<Manifest, ManifestError>
where
    C: AsyncHttpClient + ?Sized,
{
    debug!(url = url, "Fetching manifest");
    let body = client.get(url).await?;
    let manifest = Manifest::from_slice(&body)?;
    debug!(
        url = url,
        width = manifest.width,
        height = manifest.height,
        tile_width = manifest.tile_width,
        tile_height = manifest.tile_height,
        "Manifest parsed"
    );
    Ok(manifest)
}
