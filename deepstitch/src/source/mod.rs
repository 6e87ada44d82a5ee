//! Tile source inference
//!
//! Recognises tile URLs of deep-zoom style pyramids and derives a
//! [`TileSource`]: the URL template, identifier, sample coordinates and
//! addressing scheme needed to reach every other tile of the same pyramid.

mod analyzer;
mod types;

pub use analyzer::{analyze, MANIFEST_FILE_NAME};
pub use types::{
    AddressingScheme, AddressingVariant, TileSource, DZC_SEGMENT, PLACEHOLDER_COL,
    PLACEHOLDER_IDENTIFIER, PLACEHOLDER_ROW, PLACEHOLDER_SCALE,
};
