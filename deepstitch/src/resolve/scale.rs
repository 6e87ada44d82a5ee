//! Maximum scale discovery.

use super::types::ResolveError;
use crate::config::ReconstructConfig;
use crate::manifest::{fetch_manifest, Manifest, ManifestError};
use crate::provider::{tile_exists, AsyncHttpClient};
use crate::source::{AddressingScheme, TileSource};
use tracing::{debug, info};

/// Finds the highest scale level the pyramid serves.
///
/// Manifest-described sources read it from the manifest; any failure to
/// read the manifest is fatal. Path-tiled sources probe `(scale + 1, 0, 0)`
/// upward from the sample scale, at most `max_scale_probes` times.
pub async fn resolve_max_scale<C>(
    client: &C,
    source: &TileSource,
    config: &ReconstructConfig,
) -> Result<u32, ResolveError>
where
    C: AsyncHttpClient + ?Sized,
{
    match source.addressing_scheme() {
        AddressingScheme::ManifestDescribed => {
            let url = source.manifest_url().ok_or_else(|| ResolveError::ScaleResolution {
                url: source.original_url().to_string(),
                source: ManifestError::Missing,
            })?;
            let manifest = fetch_manifest(client, url)
                .await
                .map_err(|e| ResolveError::ScaleResolution {
                    url: url.to_string(),
                    source: e,
                })?;
            let scale = scale_from_manifest(&manifest);
            info!(identifier = source.identifier(), scale, "Max scale read from manifest");
            Ok(scale)
        }
        AddressingScheme::PathTiled => {
            Ok(probe_max_scale(client, source, config.max_scale_probes()).await)
        }
    }
}

/// Maximum scale advertised by a manifest.
pub fn scale_from_manifest(manifest: &Manifest) -> u32 {
    manifest.max_scale()
}

async fn probe_max_scale<C>(client: &C, source: &TileSource, max_probes: u32) -> u32
where
    C: AsyncHttpClient + ?Sized,
{
    let mut scale = source.sample_scale();

    for _ in 0..max_probes {
        let Some(next) = scale.checked_add(1) else {
            break;
        };
        let url = source.tile_url(next, 0, 0);
        if !tile_exists(client, &url).await {
            debug!(url = %url, "Scale probe missed");
            break;
        }
        scale = next;
    }

    info!(
        identifier = source.identifier(),
        start = source.sample_scale(),
        scale,
        "Max scale found by probing"
    );
    scale
}
