//! Geometry and error types shared by the resolvers and later stages.

use crate::manifest::ManifestError;
use crate::source::AddressingVariant;
use std::fmt;
use thiserror::Error;

/// Largest canvas side, in pixels, the compositor will allocate.
///
/// Matches the common 2-D surface limit of 32767 px per axis. JPEG itself
/// allows up to 65535.
pub const MAX_CANVAS_DIMENSION: u32 = 32767;

/// Resolved layout of one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub max_scale: u32,
    pub num_rows: u32,
    pub num_cols: u32,
    /// Width of the first measured tile, canonical for layout
    pub tile_width: u32,
    /// Height of the first measured tile, canonical for layout
    pub tile_height: u32,
}

impl GridGeometry {
    /// Number of grid cells.
    pub fn tile_count(&self) -> usize {
        self.num_rows as usize * self.num_cols as usize
    }

    /// Checks every field is non-zero.
    pub fn validate(&self) -> Result<(), PreconditionFailure> {
        if self.num_rows == 0 {
            return Err(PreconditionFailure::ZeroRows);
        }
        if self.num_cols == 0 {
            return Err(PreconditionFailure::ZeroColumns);
        }
        if self.tile_width == 0 {
            return Err(PreconditionFailure::ZeroTileWidth);
        }
        if self.tile_height == 0 {
            return Err(PreconditionFailure::ZeroTileHeight);
        }
        Ok(())
    }

    /// Canvas size in pixels for the given placement rule.
    ///
    /// Fails if any field is zero or either side exceeds
    /// [`MAX_CANVAS_DIMENSION`].
    pub fn canvas_dimensions(
        &self,
        variant: AddressingVariant,
    ) -> Result<(u32, u32), PreconditionFailure> {
        self.validate()?;

        let (across, down) = match variant {
            AddressingVariant::Standard => (self.num_cols, self.num_rows),
            AddressingVariant::Transposed => (self.num_rows, self.num_cols),
        };
        let width = u64::from(across) * u64::from(self.tile_width);
        let height = u64::from(down) * u64::from(self.tile_height);

        if width == 0 || height == 0 {
            return Err(PreconditionFailure::EmptyCanvas);
        }
        let max = u64::from(MAX_CANVAS_DIMENSION);
        if width > max || height > max {
            return Err(PreconditionFailure::CanvasTooLarge {
                width,
                height,
                max: MAX_CANVAS_DIMENSION,
            });
        }

        Ok((width as u32, height as u32))
    }
}

impl fmt::Display for GridGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scale {}: {} rows × {} cols of {}×{} px",
            self.max_scale, self.num_rows, self.num_cols, self.tile_width, self.tile_height
        )
    }
}

/// A geometry that cannot produce an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("no tile rows found")]
    ZeroRows,

    #[error("no tile columns found")]
    ZeroColumns,

    #[error("tile width is zero")]
    ZeroTileWidth,

    #[error("tile height is zero")]
    ZeroTileHeight,

    #[error("canvas {width}×{height} exceeds the {max} px limit")]
    CanvasTooLarge { width: u64, height: u64, max: u32 },

    #[error("canvas has no area")]
    EmptyCanvas,
}

/// Failure resolving scale or grid from a manifest.
///
/// Probing never fails; only a manifest that was required and could not be
/// read is an error.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve scale from {url}: {source}")]
    ScaleResolution {
        url: String,
        #[source]
        source: ManifestError,
    },

    #[error("cannot resolve grid from {url}: {source}")]
    GridResolution {
        url: String,
        #[source]
        source: ManifestError,
    },
}
