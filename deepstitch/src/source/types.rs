//! Tile source descriptor types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Template placeholder for the pyramid identifier.
pub const PLACEHOLDER_IDENTIFIER: &str = "{IDENTIFIER}";
/// Template placeholder for the scale level.
pub const PLACEHOLDER_SCALE: &str = "{SCALE}";
/// Template placeholder for the tile row.
pub const PLACEHOLDER_ROW: &str = "{ROW}";
/// Template placeholder for the tile column.
pub const PLACEHOLDER_COL: &str = "{COL}";

/// Path segment that marks a Deep Zoom Composer export.
pub const DZC_SEGMENT: &str = "dzc_output_files";

/// How tiles of a pyramid are addressed and discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingScheme {
    /// `{scale}/{row}_{col}` in the URL path, discovered by probing.
    PathTiled,
    /// Tile path carried in a query parameter, geometry read from a manifest.
    ManifestDescribed,
}

impl fmt::Display for AddressingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingScheme::PathTiled => write!(f, "path-tiled"),
            AddressingScheme::ManifestDescribed => write!(f, "manifest-described"),
        }
    }
}

/// Physical placement of logical grid cells on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingVariant {
    /// Tile `(r, c)` lands at `(c·w, r·h)`.
    Standard,
    /// Tile `(r, c)` lands at `(r·w, c·h)`; rows run along the x axis.
    Transposed,
}

/// Everything needed to address any tile of one pyramid.
///
/// Produced by [`analyze`](super::analyze) from a single observed tile URL
/// and never mutated afterwards. It serializes to JSON so a caller can keep
/// it around between observing a tile and reconstructing the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    identifier: String,
    url_template: String,
    addressing_scheme: AddressingScheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manifest_url: Option<String>,
    sample_scale: u32,
    sample_row: u32,
    sample_col: u32,
    original_url: String,
}

impl TileSource {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        identifier: String,
        url_template: String,
        addressing_scheme: AddressingScheme,
        manifest_url: Option<String>,
        sample_scale: u32,
        sample_row: u32,
        sample_col: u32,
        original_url: String,
    ) -> Self {
        Self {
            identifier,
            url_template,
            addressing_scheme,
            manifest_url,
            sample_scale,
            sample_row,
            sample_col,
            original_url,
        }
    }

    /// The pyramid's identifier as it appears in the tile path.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// URL template with `{IDENTIFIER}`, `{SCALE}`, `{ROW}` and `{COL}`.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn addressing_scheme(&self) -> AddressingScheme {
        self.addressing_scheme
    }

    /// Manifest location, present only for manifest-described pyramids.
    pub fn manifest_url(&self) -> Option<&str> {
        self.manifest_url.as_deref()
    }

    pub fn sample_scale(&self) -> u32 {
        self.sample_scale
    }

    pub fn sample_row(&self) -> u32 {
        self.sample_row
    }

    pub fn sample_col(&self) -> u32 {
        self.sample_col
    }

    /// The tile URL this source was derived from.
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Binds the template to concrete coordinates.
    pub fn tile_url(&self, scale: u32, row: u32, col: u32) -> String {
        self.url_template
            .replace(PLACEHOLDER_IDENTIFIER, &self.identifier)
            .replace(PLACEHOLDER_SCALE, &scale.to_string())
            .replace(PLACEHOLDER_ROW, &row.to_string())
            .replace(PLACEHOLDER_COL, &col.to_string())
    }

    /// Canvas placement rule for this pyramid.
    ///
    /// Deep Zoom Composer exports store tiles transposed relative to the
    /// plain path-tiled layout.
    pub fn addressing_variant(&self) -> AddressingVariant {
        if self.addressing_scheme == AddressingScheme::PathTiled
            && self.original_url.contains(DZC_SEGMENT)
        {
            AddressingVariant::Transposed
        } else {
            AddressingVariant::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(template: &str, original: &str) -> TileSource {
        TileSource::new(
            "pic".to_string(),
            template.to_string(),
            AddressingScheme::PathTiled,
            None,
            3,
            1,
            2,
            original.to_string(),
        )
    }

    #[test]
    fn test_tile_url_binds_all_placeholders() {
        let src = source(
            "https://h/a/{IDENTIFIER}/{SCALE}/{ROW}_{COL}.jpg",
            "https://h/a/pic/3/1_2.jpg",
        );
        assert_eq!(src.tile_url(12, 4, 7), "https://h/a/pic/12/4_7.jpg");
    }

    #[test]
    fn test_variant_follows_original_url() {
        let plain = source("t", "https://h/a/pic/3/1_2.jpg");
        let dzc = source("t", "https://h/a/pic/dzc_output_files/3/1_2.jpg");
        assert_eq!(plain.addressing_variant(), AddressingVariant::Standard);
        assert_eq!(dzc.addressing_variant(), AddressingVariant::Transposed);
    }

    #[test]
    fn test_json_round_trip_keeps_fields() {
        let src = source(
            "https://h/{IDENTIFIER}/{SCALE}/{ROW}_{COL}.jpg",
            "https://h/pic/3/1_2.jpg",
        );
        let json = serde_json::to_string(&src).unwrap();
        assert!(json.contains("\"addressing_scheme\":\"PathTiled\""));
        assert!(!json.contains("manifest_url"));
        let back: TileSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, src);
    }
}
