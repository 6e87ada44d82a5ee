//! DeepStitch - full-image reconstruction from deep-zoom tile pyramids
//!
//! Given a single tile URL observed from a pyramidal image viewer, this
//! library infers how the rest of the pyramid is addressed, discovers its
//! highest resolution level and grid extent, downloads every tile of that
//! level and stitches them into one JPEG.
//!
//! ```ignore
//! use deepstitch::{analyze, ReconstructConfig, Reconstructor};
//! use tokio_util::sync::CancellationToken;
//!
//! let source = analyze("https://tiles.example.com/maps/plan42/12/3_4.jpg")
//!     .ok_or("not a tile URL")?;
//! let reconstructor = Reconstructor::with_reqwest(ReconstructConfig::default())?;
//! let result = reconstructor.reconstruct(&source, CancellationToken::new()).await?;
//! std::fs::write(result.suggested_filename(), result.image().bytes())?;
//! ```

pub mod compose;
pub mod config;
pub mod harvest;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod provider;
pub mod resolve;
pub mod source;

pub use config::ReconstructConfig;
pub use orchestrator::{ReconstructError, Reconstruction, Reconstructor};
pub use source::{analyze, TileSource};
