//! Orchestrator types and errors

use crate::compose::{ComposeError, ReconstructedImage};
use crate::harvest::HarvestError;
use crate::manifest::ManifestError;
use crate::resolve::{GridGeometry, PreconditionFailure, ResolveError};
use std::time::Duration;
use thiserror::Error;

/// Errors that end a reconstruction run.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// Maximum scale could not be read from a required manifest
    #[error("scale resolution failed for {url}: {source}")]
    ScaleResolution {
        url: String,
        #[source]
        source: ManifestError,
    },

    /// Grid geometry could not be read from a required manifest
    #[error("grid resolution failed for {url}: {source}")]
    GridResolution {
        url: String,
        #[source]
        source: ManifestError,
    },

    /// Resolved geometry cannot produce an image
    #[error("{0}")]
    Precondition(#[from] PreconditionFailure),

    /// Every tile of the grid was absent
    #[error("none of the {total} tiles could be fetched")]
    NoTilesFetched { total: usize },

    /// Canvas was drawn but could not be encoded
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Caller cancelled the run
    #[error("reconstruction cancelled")]
    Cancelled,

    /// Run exceeded its overall deadline
    #[error("reconstruction timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },

    /// Blocking compose task failed to complete
    #[error("compose task failed: {0}")]
    Task(String),
}

impl From<ResolveError> for ReconstructError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::ScaleResolution { url, source } => {
                ReconstructError::ScaleResolution { url, source }
            }
            ResolveError::GridResolution { url, source } => {
                ReconstructError::GridResolution { url, source }
            }
        }
    }
}

impl From<HarvestError> for ReconstructError {
    fn from(e: HarvestError) -> Self {
        match e {
            HarvestError::Cancelled => ReconstructError::Cancelled,
        }
    }
}

impl From<ComposeError> for ReconstructError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::Precondition(p) => ReconstructError::Precondition(p),
            ComposeError::EncodingFailed(msg) => ReconstructError::Encode(msg),
            ComposeError::Cancelled => ReconstructError::Cancelled,
        }
    }
}

/// A finished reconstruction.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    identifier: String,
    geometry: GridGeometry,
    image: ReconstructedImage,
    tiles_total: usize,
}

impl Reconstruction {
    pub(crate) fn new(
        identifier: String,
        geometry: GridGeometry,
        image: ReconstructedImage,
        tiles_total: usize,
    ) -> Self {
        Self {
            identifier,
            geometry,
            image,
            tiles_total,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Geometry the image was composed with.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn image(&self) -> &ReconstructedImage {
        &self.image
    }

    pub fn into_image(self) -> ReconstructedImage {
        self.image
    }

    pub fn tiles_drawn(&self) -> usize {
        self.image.tiles_drawn()
    }

    pub fn tiles_total(&self) -> usize {
        self.tiles_total
    }

    /// Whether every tile of the grid made it onto the canvas.
    pub fn is_complete(&self) -> bool {
        self.tiles_drawn() == self.tiles_total
    }

    /// File name for the image: `<identifier>_scale<max_scale>_full.jpg`.
    ///
    /// Characters that are not safe in a file name are replaced with `_`.
    pub fn suggested_filename(&self) -> String {
        let stem: String = self
            .identifier
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_scale{}_full.jpg", stem, self.geometry.max_scale)
    }
}
