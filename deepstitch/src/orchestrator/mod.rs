//! Reconstruction orchestration
//!
//! Chains scale resolution, grid resolution, harvesting and compositing into
//! one cancellable run that yields an encoded image.

mod reconstructor;
mod types;

pub use reconstructor::Reconstructor;
pub use types::{ReconstructError, Reconstruction};
