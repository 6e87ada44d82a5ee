//! Canvas compositing and JPEG output
//!
//! Places every present tile of a [`TileGrid`] at its offset on one canvas
//! and encodes the result. Two placement rules exist:
//!
//! | Variant      | Tile `(r, c)` at     | Canvas                  |
//! |--------------|----------------------|-------------------------|
//! | `Standard`   | `(c·tw, r·th)`       | `cols·tw × rows·th`     |
//! | `Transposed` | `(r·tw, c·th)`       | `rows·tw × cols·th`     |
//!
//! Absent cells stay black. Oversized tiles are clipped at the canvas edge.
//! Everything here is synchronous and CPU-bound; async callers should run
//! it on the blocking pool. The cancel token is checked between tiles and
//! before encoding; an encode already in progress runs to completion.

use crate::harvest::TileGrid;
use crate::resolve::{GridGeometry, PreconditionFailure};
use crate::source::AddressingVariant;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Failure producing the output image.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Geometry cannot produce a canvas; nothing was drawn
    #[error("cannot compose: {0}")]
    Precondition(#[from] PreconditionFailure),

    /// Canvas was drawn but JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// Token fired before the image was finished
    #[error("compositing cancelled")]
    Cancelled,
}

/// An encoded reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    tiles_drawn: usize,
}

impl ReconstructedImage {
    /// JPEG-encoded image data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tiles placed on the canvas.
    pub fn tiles_drawn(&self) -> usize {
        self.tiles_drawn
    }
}

/// Composites `grid` onto one canvas and encodes it as JPEG.
///
/// The canvas size is checked before anything is allocated. Stops with
/// [`ComposeError::Cancelled`] once `cancel` fires.
pub fn stitch(
    grid: TileGrid,
    geometry: &GridGeometry,
    variant: AddressingVariant,
    quality: u8,
    cancel: &CancellationToken,
) -> Result<ReconstructedImage, ComposeError> {
    let (canvas, tiles_drawn) = compose_canvas(&grid, geometry, variant, cancel)?;
    drop(grid);

    if cancel.is_cancelled() {
        return Err(ComposeError::Cancelled);
    }
    let (width, height) = canvas.dimensions();
    let bytes = encode_jpeg(&canvas, quality)?;
    debug!(
        width,
        height,
        tiles_drawn,
        bytes = bytes.len(),
        "Canvas encoded"
    );

    Ok(ReconstructedImage {
        bytes,
        width,
        height,
        tiles_drawn,
    })
}

/// Pixel offset of tile `(row, col)` under `variant`.
pub fn tile_offset(
    row: u32,
    col: u32,
    geometry: &GridGeometry,
    variant: AddressingVariant,
) -> (u64, u64) {
    let (across, down) = match variant {
        AddressingVariant::Standard => (col, row),
        AddressingVariant::Transposed => (row, col),
    };
    (
        u64::from(across) * u64::from(geometry.tile_width),
        u64::from(down) * u64::from(geometry.tile_height),
    )
}

fn compose_canvas(
    grid: &TileGrid,
    geometry: &GridGeometry,
    variant: AddressingVariant,
    cancel: &CancellationToken,
) -> Result<(RgbImage, usize), ComposeError> {
    let (width, height) = geometry.canvas_dimensions(variant)?;
    if cancel.is_cancelled() {
        return Err(ComposeError::Cancelled);
    }
    let mut canvas = RgbImage::new(width, height);
    let mut drawn = 0;

    for (row, col, tile) in grid.iter() {
        if cancel.is_cancelled() {
            return Err(ComposeError::Cancelled);
        }
        let (x, y) = tile_offset(row, col, geometry, variant);
        if x >= u64::from(width) || y >= u64::from(height) {
            continue;
        }
        imageops::replace(&mut canvas, tile, x as i64, y as i64);
        drawn += 1;
    }

    Ok((canvas, drawn))
}

fn encode_jpeg(canvas: &RgbImage, quality: u8) -> Result<Vec<u8>, ComposeError> {
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    encoder
        .encode_image(canvas)
        .map_err(|e| ComposeError::EncodingFailed(e.to_string()))?;
    Ok(output)
}
