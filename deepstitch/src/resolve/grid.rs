//! Grid extent and tile size discovery.

use super::types::{GridGeometry, ResolveError};
use crate::config::ReconstructConfig;
use crate::manifest::{fetch_manifest, Manifest, ManifestError};
use crate::provider::{fetch_tile, tile_exists, AsyncHttpClient};
use crate::source::{AddressingScheme, TileSource};
use tracing::{debug, info, warn};

/// Resolves rows, columns and tile size of level `max_scale`.
///
/// Manifest-described sources compute everything from the manifest.
/// Path-tiled sources probe down column 0 and along row 0, each axis
/// stopping at its first missing tile or at `max_grid_extent`. Tile size is
/// measured by decoding the first tile found in column 0.
///
/// Probing reports what it found: zero rows, columns or tile size come back
/// as zeros for the caller to reject. Gaps near the origin make the grid
/// look smaller than it is.
pub async fn resolve_grid<C>(
    client: &C,
    source: &TileSource,
    max_scale: u32,
    config: &ReconstructConfig,
) -> Result<GridGeometry, ResolveError>
where
    C: AsyncHttpClient + ?Sized,
{
    match source.addressing_scheme() {
        AddressingScheme::ManifestDescribed => {
            let url = source.manifest_url().ok_or_else(|| ResolveError::GridResolution {
                url: source.original_url().to_string(),
                source: ManifestError::Missing,
            })?;
            let manifest = fetch_manifest(client, url)
                .await
                .map_err(|e| ResolveError::GridResolution {
                    url: url.to_string(),
                    source: e,
                })?;
            let geometry = grid_from_manifest(&manifest, max_scale).map_err(|e| {
                ResolveError::GridResolution {
                    url: url.to_string(),
                    source: e,
                }
            })?;
            info!(identifier = source.identifier(), %geometry, "Grid read from manifest");
            Ok(geometry)
        }
        AddressingScheme::PathTiled => {
            Ok(probe_grid(client, source, max_scale, config.max_grid_extent()).await)
        }
    }
}

/// Grid geometry described by a manifest.
///
/// Fails when the manifest has no usable image or tile size.
pub fn grid_from_manifest(
    manifest: &Manifest,
    max_scale: u32,
) -> Result<GridGeometry, ManifestError> {
    manifest.validate_grid()?;
    Ok(GridGeometry {
        max_scale,
        num_rows: manifest.rows(),
        num_cols: manifest.columns(),
        tile_width: manifest.tile_width,
        tile_height: manifest.tile_height,
    })
}

async fn probe_grid<C>(client: &C, source: &TileSource, scale: u32, cap: u32) -> GridGeometry
where
    C: AsyncHttpClient + ?Sized,
{
    let mut num_rows = 0;
    let mut tile_size: Option<(u32, u32)> = None;

    while num_rows < cap {
        let url = source.tile_url(scale, num_rows, 0);
        if !tile_exists(client, &url).await {
            break;
        }
        if tile_size.is_none() {
            match fetch_tile(client, &url).await {
                Ok(tile) => {
                    debug!(
                        url = %url,
                        width = tile.width(),
                        height = tile.height(),
                        "Tile size measured"
                    );
                    tile_size = Some(tile.dimensions());
                }
                Err(e) => warn!(url = %url, error = %e, "Could not measure tile size"),
            }
        }
        num_rows += 1;
    }

    let mut num_cols = 0;
    if num_rows > 0 && tile_size.is_some() {
        while num_cols < cap {
            let url = source.tile_url(scale, 0, num_cols);
            if !tile_exists(client, &url).await {
                break;
            }
            num_cols += 1;
        }
    }

    let (tile_width, tile_height) = tile_size.unwrap_or((0, 0));
    let geometry = GridGeometry {
        max_scale: scale,
        num_rows,
        num_cols,
        tile_width,
        tile_height,
    };
    info!(identifier = source.identifier(), %geometry, "Grid found by probing");
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{pyramid_level, MockAsyncHttpClient};
    use crate::source::analyze;

    #[tokio::test]
    async fn test_probe_three_by_four() {
        let source = analyze("http://h/img/5/1_1.jpg").unwrap();
        let client = pyramid_level(MockAsyncHttpClient::new(), &source, 5, 3, 4, (16, 12));

        let geometry = resolve_grid(&client, &source, 5, &ReconstructConfig::default())
            .await
            .unwrap();

        assert_eq!(
            geometry,
            GridGeometry {
                max_scale: 5,
                num_rows: 3,
                num_cols: 4,
                tile_width: 16,
                tile_height: 12,
            }
        );
        // Only the first tile is downloaded for measurement
        assert_eq!(client.gets(), 1);
    }

    #[tokio::test]
    async fn test_empty_level_reports_zeros() {
        let source = analyze("http://h/img/5/0_0.jpg").unwrap();
        let client = MockAsyncHttpClient::new();

        let geometry = resolve_grid(&client, &source, 5, &ReconstructConfig::default())
            .await
            .unwrap();

        assert_eq!(geometry.num_rows, 0);
        assert_eq!(geometry.num_cols, 0);
        assert_eq!(geometry.tile_width, 0);
        // Columns are not probed without a row
        assert_eq!(client.heads(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_tiles_skip_column_probe() {
        let source = analyze("http://h/img/1/0_0.jpg").unwrap();
        let client = MockAsyncHttpClient::new()
            .with_resource(source.tile_url(1, 0, 0), b"garbage".to_vec())
            .with_resource(source.tile_url(1, 0, 1), b"garbage".to_vec());

        let geometry = resolve_grid(&client, &source, 1, &ReconstructConfig::default())
            .await
            .unwrap();

        assert_eq!(geometry.num_rows, 1);
        assert_eq!(geometry.num_cols, 0);
        assert_eq!(geometry.tile_width, 0);
    }

    #[tokio::test]
    async fn test_extent_cap() {
        let source = analyze("http://h/img/0/0_0.jpg").unwrap();
        let client = pyramid_level(MockAsyncHttpClient::new(), &source, 0, 6, 6, (2, 2));
        let config = ReconstructConfig::new().with_max_grid_extent(4);

        let geometry = resolve_grid(&client, &source, 0, &config).await.unwrap();
        assert_eq!((geometry.num_rows, geometry.num_cols), (4, 4));
    }

    #[tokio::test]
    async fn test_grid_from_manifest() {
        let source = analyze("http://h/iip?DeepZoom=/s/img_files/2/0_0.jpg").unwrap();
        let client = MockAsyncHttpClient::new().with_resource(
            "http://h/iip?DeepZoom=/s/img/info.json",
            br#"{"width": 100, "height": 50, "tiles": [{"width": 32, "height": 16, "scaleFactors": [1, 2]}]}"#
                .to_vec(),
        );

        let geometry = resolve_grid(&client, &source, 2, &ReconstructConfig::default())
            .await
            .unwrap();

        assert_eq!(geometry.num_cols, 4);
        assert_eq!(geometry.num_rows, 4);
        assert_eq!((geometry.tile_width, geometry.tile_height), (32, 16));
        assert_eq!(client.heads(), 0);
    }

    #[tokio::test]
    async fn test_grid_manifest_error_is_fatal() {
        let source = analyze("http://h/iip?DeepZoom=/s/img_files/2/0_0.jpg").unwrap();
        let client = MockAsyncHttpClient::new().with_resource(
            "http://h/iip?DeepZoom=/s/img/info.json",
            br#"{"width": 100, "height": 50, "tiles": [], "scaleFactors": [1, 2]}"#.to_vec(),
        );

        let err = resolve_grid(&client, &source, 2, &ReconstructConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::GridResolution {
                source: ManifestError::Invalid(_),
                ..
            }
        ));
    }
}
