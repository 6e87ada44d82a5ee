//! Tile harvesting
//!
//! Downloads every tile of one level with a fixed number of workers. Each
//! worker claims the next coordinate from a shared cursor, fetches and
//! decodes it, and keeps the result until it is joined. Results are merged
//! into the [`TileGrid`] by index once all workers have finished, so the
//! grid is never shared while it is being filled.
//!
//! A tile that cannot be obtained becomes an absent cell. Failures below the
//! HTTP layer are retried with a short backoff first; an HTTP status or an
//! undecodable body is final.

mod grid;

pub use grid::TileGrid;

use crate::config::ReconstructConfig;
use crate::provider::{fetch_tile, AsyncHttpClient};
use crate::resolve::GridGeometry;
use crate::source::TileSource;
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Base delay before retrying a tile; doubles on each attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Harvesting stopped before every tile settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HarvestError {
    #[error("harvest cancelled")]
    Cancelled,
}

/// Fetches every tile of `geometry` at `scale`.
///
/// Returns once every coordinate has either a decoded tile or has been
/// given up on. Only cancellation turns into an error; in-flight requests
/// are dropped and no grid is returned.
pub async fn harvest<C>(
    client: Arc<C>,
    source: &TileSource,
    scale: u32,
    geometry: &GridGeometry,
    config: &ReconstructConfig,
    cancel: &CancellationToken,
) -> Result<TileGrid, HarvestError>
where
    C: AsyncHttpClient + 'static,
{
    if cancel.is_cancelled() {
        return Err(HarvestError::Cancelled);
    }

    let mut grid = TileGrid::new(geometry.num_rows, geometry.num_cols);
    let total = grid.len();
    if total == 0 {
        return Ok(grid);
    }

    let workers = config.harvest_concurrency().min(total);
    let retries = config.tile_retries();
    let cols = geometry.num_cols as usize;
    let cursor = Arc::new(AtomicUsize::new(0));
    let source = Arc::new(source.clone());
    let start = Instant::now();

    debug!(
        identifier = source.identifier(),
        scale,
        tiles = total,
        workers,
        "Starting harvest"
    );

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let client = Arc::clone(&client);
        let source = Arc::clone(&source);
        let cursor = Arc::clone(&cursor);

        pool.spawn(async move {
            let mut claimed: Vec<(usize, Option<RgbImage>)> = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                if index >= total {
                    break;
                }
                let row = (index / cols) as u32;
                let col = (index % cols) as u32;
                let url = source.tile_url(scale, row, col);
                let tile = fetch_with_retries(client.as_ref(), &url, retries).await;
                claimed.push((index, tile));
            }
            claimed
        });
    }

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                pool.abort_all();
                debug!(identifier = source.identifier(), "Harvest cancelled");
                return Err(HarvestError::Cancelled);
            }

            joined = pool.join_next() => match joined {
                Some(Ok(claimed)) => {
                    for (index, tile) in claimed {
                        grid.set_index(index, tile);
                    }
                }
                Some(Err(e)) => warn!(error = %e, "Harvest worker failed"),
                None => break,
            },
        }
    }

    info!(
        identifier = source.identifier(),
        scale,
        fetched = grid.present_count(),
        total,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Harvest complete"
    );
    Ok(grid)
}

async fn fetch_with_retries<C>(client: &C, url: &str, retries: u32) -> Option<RgbImage>
where
    C: AsyncHttpClient + ?Sized,
{
    let mut attempt = 0;
    loop {
        match fetch_tile(client, url).await {
            Ok(tile) => return Some(tile),
            Err(e) if e.is_retryable() && attempt < retries => {
                let delay = RETRY_BACKOFF * 2u32.pow(attempt);
                attempt += 1;
                debug!(url = url, error = %e, attempt, "Retrying tile");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    attempts = attempt + 1,
                    "Tile unavailable, leaving blank"
                );
                return None;
            }
        }
    }
}
