//! Tile-level network primitives: existence probing and fetch+decode.
//!
//! Probing answers a yes/no question and never fails; a missing tile is the
//! normal way a scan ends. Fetching returns a decoded image or a
//! [`TileFetchError`] that callers may downgrade to "absent".

use super::http::AsyncHttpClient;
use super::types::ProviderError;
use image::RgbImage;
use thiserror::Error;
use tracing::trace;

/// Failure to obtain a decoded tile.
#[derive(Debug, Error)]
pub enum TileFetchError {
    /// Network or HTTP status failure
    #[error("fetch failed: {0}")]
    Provider(#[from] ProviderError),

    /// Body was retrieved but is not a decodable raster
    #[error("decode failed for {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl TileFetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TileFetchError::Provider(e) if e.is_transport())
    }
}

/// Checks whether a URL exists on the server.
///
/// Issues a HEAD first. If HEAD fails at the transport level (some servers
/// and proxies refuse the method outright), retries once with a GET and
/// treats a success response as existence. An HTTP status on HEAD is taken
/// as the answer.
pub async fn tile_exists<C>(client: &C, url: &str) -> bool
where
    C: AsyncHttpClient + ?Sized,
{
    match client.head(url).await {
        Ok(()) => true,
        Err(e) if e.is_transport() => {
            trace!(url = url, error = %e, "HEAD rejected, falling back to GET");
            client.get(url).await.is_ok()
        }
        Err(_) => false,
    }
}

/// Fetches a tile and decodes it to RGB.
pub async fn fetch_tile<C>(client: &C, url: &str) -> Result<RgbImage, TileFetchError>
where
    C: AsyncHttpClient + ?Sized,
{
    let bytes = client.get(url).await?;
    decode_tile(url, &bytes)
}

/// Decodes raw tile bytes, guessing the format from content.
pub fn decode_tile(url: &str, bytes: &[u8]) -> Result<RgbImage, TileFetchError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| TileFetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
