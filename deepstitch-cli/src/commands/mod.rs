//! CLI command implementations.
//!
//! - [`analyze`] - Show the tile source inferred from a URL
//! - [`fetch`] - Reconstruct and save the full image

pub mod analyze;
pub mod common;
pub mod fetch;
