//! End-to-end reconstruction of one pyramid.

use super::types::{ReconstructError, Reconstruction};
use crate::compose::stitch;
use crate::config::ReconstructConfig;
use crate::harvest::harvest;
use crate::manifest::{fetch_manifest, ManifestError};
use crate::provider::{AsyncHttpClient, AsyncReqwestClient, ProviderError};
use crate::resolve::{
    grid_from_manifest, resolve_grid, resolve_max_scale, scale_from_manifest, GridGeometry,
};
use crate::source::{AddressingScheme, TileSource};
use std::future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the resolve → harvest → compose pipeline for a [`TileSource`].
///
/// Holds nothing between runs besides the HTTP client and configuration,
/// so one instance can reconstruct any number of sources, concurrently or
/// not.
///
/// # Example
///
/// ```ignore
/// use deepstitch::{analyze, Reconstructor, ReconstructConfig};
/// use tokio_util::sync::CancellationToken;
///
/// let source = analyze(url).ok_or("not a tile URL")?;
/// let reconstructor = Reconstructor::with_reqwest(ReconstructConfig::default())?;
/// let result = reconstructor.reconstruct(&source, CancellationToken::new()).await?;
/// std::fs::write(result.suggested_filename(), result.image().bytes())?;
/// ```
pub struct Reconstructor<C> {
    client: Arc<C>,
    config: ReconstructConfig,
}

impl Reconstructor<AsyncReqwestClient> {
    /// Creates a reconstructor backed by reqwest, using the configured
    /// per-request timeout.
    pub fn with_reqwest(config: ReconstructConfig) -> Result<Self, ProviderError> {
        let client = AsyncReqwestClient::with_timeout(config.request_timeout_secs())?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<C> Reconstructor<C>
where
    C: AsyncHttpClient + 'static,
{
    pub fn new(client: Arc<C>, config: ReconstructConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ReconstructConfig {
        &self.config
    }

    /// Rebuilds the full image at the highest available scale.
    ///
    /// The run stops with [`ReconstructError::Cancelled`] as soon as
    /// `cancel` fires and with [`ReconstructError::TimedOut`] when the
    /// configured deadline passes; outstanding requests are dropped and no
    /// partial image is returned. A compositing task already on the blocking
    /// pool is told to stop as well, though a JPEG encode in progress
    /// finishes before its result is discarded.
    pub async fn reconstruct(
        &self,
        source: &TileSource,
        cancel: CancellationToken,
    ) -> Result<Reconstruction, ReconstructError> {
        let start = Instant::now();
        let limit = self.config.timeout();
        let deadline = async {
            match limit {
                Some(after) => tokio::time::sleep(after).await,
                None => future::pending::<()>().await,
            }
        };

        info!(
            identifier = source.identifier(),
            scheme = %source.addressing_scheme(),
            "Reconstruction starting"
        );

        // Fires on caller cancel and on deadline, so detached blocking
        // work stops with the run.
        let run_cancel = cancel.child_token();
        let outcome = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(ReconstructError::Cancelled),
            _ = deadline => Err(ReconstructError::TimedOut {
                after: limit.unwrap_or_default(),
            }),
            result = self.run(source, &run_cancel) => result,
        };
        run_cancel.cancel();

        match &outcome {
            Ok(done) => info!(
                identifier = done.identifier(),
                scale = done.geometry().max_scale,
                width = done.image().width(),
                height = done.image().height(),
                tiles_drawn = done.tiles_drawn(),
                tiles_total = done.tiles_total(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Reconstruction complete"
            ),
            Err(e) => warn!(
                identifier = source.identifier(),
                url = source.original_url(),
                error = %e,
                "Reconstruction failed"
            ),
        }
        outcome
    }

    async fn run(
        &self,
        source: &TileSource,
        cancel: &CancellationToken,
    ) -> Result<Reconstruction, ReconstructError> {
        let geometry = self.resolve(source).await?;
        let variant = source.addressing_variant();

        // Reject impossible canvases before any tile is requested
        let (width, height) = geometry.canvas_dimensions(variant)?;
        debug!(%geometry, width, height, ?variant, "Geometry resolved");

        let grid = harvest(
            Arc::clone(&self.client),
            source,
            geometry.max_scale,
            &geometry,
            &self.config,
            cancel,
        )
        .await?;

        let tiles_total = grid.len();
        if grid.present_count() == 0 {
            return Err(ReconstructError::NoTilesFetched { total: tiles_total });
        }

        if cancel.is_cancelled() {
            return Err(ReconstructError::Cancelled);
        }
        let quality = self.config.jpeg_quality();
        let compose_cancel = cancel.clone();
        let image = tokio::task::spawn_blocking(move || {
            stitch(grid, &geometry, variant, quality, &compose_cancel)
        })
        .await
        .map_err(|e| ReconstructError::Task(e.to_string()))??;

        Ok(Reconstruction::new(
            source.identifier().to_string(),
            geometry,
            image,
            tiles_total,
        ))
    }

    async fn resolve(&self, source: &TileSource) -> Result<GridGeometry, ReconstructError> {
        match source.addressing_scheme() {
            // One manifest read serves both scale and grid
            AddressingScheme::ManifestDescribed => {
                let url = source
                    .manifest_url()
                    .ok_or_else(|| ReconstructError::ScaleResolution {
                        url: source.original_url().to_string(),
                        source: ManifestError::Missing,
                    })?;
                let manifest = fetch_manifest(self.client.as_ref(), url)
                    .await
                    .map_err(|e| ReconstructError::ScaleResolution {
                        url: url.to_string(),
                        source: e,
                    })?;
                let scale = scale_from_manifest(&manifest);
                grid_from_manifest(&manifest, scale).map_err(|e| {
                    ReconstructError::GridResolution {
                        url: url.to_string(),
                        source: e,
                    }
                })
            }
            AddressingScheme::PathTiled => {
                let client = self.client.as_ref();
                let scale = resolve_max_scale(client, source, &self.config).await?;
                Ok(resolve_grid(client, source, scale, &self.config).await?)
            }
        }
    }
}
