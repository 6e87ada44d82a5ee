//! Pyramid geometry resolution
//!
//! Two stages run between URL analysis and harvesting:
//!
//! 1. [`resolve_max_scale`] finds the highest level served.
//! 2. [`resolve_grid`] finds that level's rows, columns and tile size.
//!
//! Both read the manifest when the source has one and otherwise probe tile
//! existence one request at a time. The `*_from_manifest` helpers let a
//! caller that already holds a [`Manifest`](crate::manifest::Manifest) skip
//! the second download.

mod grid;
mod scale;
mod types;

pub use grid::{grid_from_manifest, resolve_grid};
pub use scale::{resolve_max_scale, scale_from_manifest};
pub use types::{GridGeometry, PreconditionFailure, ResolveError, MAX_CANVAS_DIMENSION};
