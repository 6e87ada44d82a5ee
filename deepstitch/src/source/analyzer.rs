//! Tile URL pattern analysis.
//!
//! Turns one observed tile URL into a [`TileSource`]. Two layouts are
//! recognised:
//!
//! ```text
//! path-tiled:          https://host/prefix/{id}/{scale}/{row}_{col}.jpg
//! path-tiled (dzc):    https://host/prefix/{id}/dzc_output_files/{scale}/{row}_{col}.jpg
//! manifest-described:  https://host/iip?DeepZoom=/prefix/{id}_files/{scale}/{col}_{row}.jpg
//! ```

use super::types::{
    AddressingScheme, TileSource, DZC_SEGMENT, PLACEHOLDER_COL, PLACEHOLDER_IDENTIFIER,
    PLACEHOLDER_ROW, PLACEHOLDER_SCALE,
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};
use url::Url;

/// Suffix of the tile directory in a Deep Zoom pyramid (`{id}_files`).
const MANIFEST_MARKER: &str = "_files";

/// File name of the manifest next to a manifest-described pyramid.
pub const MANIFEST_FILE_NAME: &str = "info.json";

fn tile_leaf_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)_(\d+)\.(jpg|jpeg|png)$").expect("valid regex"))
}

fn scale_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

/// Tile coordinate read from the last two segments of a tile path.
///
/// `first`/`second` are in file-name order; which of them is the row depends
/// on the addressing scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TileLeaf {
    scale: u32,
    first: u32,
    second: u32,
    extension: String,
}

/// Matches `{scale}` and `{a}_{b}.{ext}` segments.
fn match_tile_leaf(scale_segment: &str, leaf_segment: &str) -> Option<TileLeaf> {
    if !scale_regex().is_match(scale_segment) {
        return None;
    }
    let caps = tile_leaf_regex().captures(leaf_segment)?;
    Some(TileLeaf {
        scale: scale_segment.parse().ok()?,
        first: caps[1].parse().ok()?,
        second: caps[2].parse().ok()?,
        extension: caps[3].to_string(),
    })
}

/// Splits a path into segments and matches its trailing tile coordinate.
///
/// Returns the segments and the index of the scale segment.
fn split_tile_path(path: &str) -> Option<(Vec<&str>, usize, TileLeaf)> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let scale_idx = segments.len() - 2;
    let leaf = match_tile_leaf(segments[scale_idx], segments[scale_idx + 1])?;
    Some((segments, scale_idx, leaf))
}

/// Joins `head` segments, the identifier placeholder, `between` segments and
/// the coordinate tail into one path.
fn join_template_path(head: &[&str], id_segment: &str, between: &[&str], tail: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(head.len() + between.len() + 2);
    parts.extend_from_slice(head);
    parts.push(id_segment);
    parts.extend_from_slice(between);
    parts.push(tail);
    parts.join("/")
}

/// Analyzes an observed tile URL.
///
/// Returns `None` when the URL does not look like a tile of a known pyramid
/// layout. That is an ordinary outcome: most images on a page are not tiles.
///
/// # Example
///
/// ```
/// use deepstitch::source::{analyze, AddressingScheme};
///
/// let src = analyze("https://cdn.example.com/maps/plan42/12/3_4.jpg").unwrap();
/// assert_eq!(src.identifier(), "plan42");
/// assert_eq!(src.sample_scale(), 12);
/// assert_eq!(src.addressing_scheme(), AddressingScheme::PathTiled);
/// assert_eq!(src.tile_url(12, 3, 4), "https://cdn.example.com/maps/plan42/12/3_4.jpg");
/// ```
pub fn analyze(url: &str) -> Option<TileSource> {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            trace!(url = url, error = %e, "Not a parseable URL");
            return None;
        }
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let source =
        analyze_path_tiled(url, &parsed).or_else(|| analyze_manifest_described(url, &parsed));
    match &source {
        Some(src) => debug!(
            url = url,
            identifier = src.identifier(),
            scheme = %src.addressing_scheme(),
            scale = src.sample_scale(),
            "Recognised tile URL"
        ),
        None => trace!(url = url, "URL is not a tile"),
    }
    source
}

fn analyze_path_tiled(url: &str, parsed: &Url) -> Option<TileSource> {
    let (segments, scale_idx, leaf) = split_tile_path(parsed.path())?;

    // Identifier sits before dzc_output_files when present, else right
    // before the scale segment. Segment 0 is the empty root.
    let id_idx = match segments[..scale_idx].iter().rposition(|s| *s == DZC_SEGMENT) {
        Some(dzc_idx) => dzc_idx.checked_sub(1)?,
        None => scale_idx.checked_sub(1)?,
    };
    let identifier = segments[id_idx];
    if id_idx == 0 || identifier.is_empty() {
        return None;
    }

    let tail = format!(
        "{}/{}_{}.{}",
        PLACEHOLDER_SCALE, PLACEHOLDER_ROW, PLACEHOLDER_COL, leaf.extension
    );
    let path = join_template_path(
        &segments[..id_idx],
        PLACEHOLDER_IDENTIFIER,
        &segments[id_idx + 1..scale_idx],
        &tail,
    );
    let mut template = format!("{}{}", parsed.origin().ascii_serialization(), path);
    if let Some(query) = parsed.query() {
        template.push('?');
        template.push_str(query);
    }

    Some(TileSource::new(
        identifier.to_string(),
        template,
        AddressingScheme::PathTiled,
        None,
        leaf.scale,
        leaf.first,
        leaf.second,
        url.to_string(),
    ))
}

/// Splits a raw query value on `/` and its percent-encoded form `%2F`.
///
/// Returns the raw segments and the separators found between them, so the
/// value can be reassembled byte for byte.
fn split_raw_value(raw: &str) -> (Vec<&str>, Vec<&str>) {
    let bytes = raw.as_bytes();
    let mut segments = Vec::new();
    let mut separators = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let sep_len = if bytes[i] == b'/' {
            1
        } else if bytes[i] == b'%'
            && raw
                .get(i..i + 3)
                .is_some_and(|s| s.eq_ignore_ascii_case("%2f"))
        {
            3
        } else {
            0
        };
        if sep_len == 0 {
            i += 1;
            continue;
        }
        segments.push(&raw[start..i]);
        separators.push(&raw[i..i + sep_len]);
        i += sep_len;
        start = i;
    }
    segments.push(&raw[start..]);
    (segments, separators)
}

/// Interleaves segments with the separators that sat between them.
fn join_raw(segments: &[&str], separators: &[&str]) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            joined.push_str(separators.get(i - 1).copied().unwrap_or("/"));
        }
        joined.push_str(segment);
    }
    joined
}

fn analyze_manifest_described(url: &str, parsed: &Url) -> Option<TileSource> {
    let query = parsed.query()?;
    let pairs: Vec<&str> = query.split('&').collect();

    // Work on the raw query text: the identifier and prefix keep their
    // original percent-encoding, so binding the sample coordinates gives the
    // observed URL back.
    for (pair_idx, raw_pair) in pairs.iter().enumerate() {
        let Some((raw_key, raw_value)) = raw_pair.split_once('=') else {
            continue;
        };
        let (segments, separators) = split_raw_value(raw_value);
        if segments.len() < 3 {
            continue;
        }
        let scale_idx = segments.len() - 2;
        let id_idx = scale_idx - 1;
        let Some(leaf) = match_tile_leaf(segments[scale_idx], segments[scale_idx + 1]) else {
            continue;
        };
        let Some(identifier) = segments[id_idx].strip_suffix(MANIFEST_MARKER) else {
            continue;
        };
        if identifier.is_empty() {
            continue;
        }

        let id_dir = format!("{}{}", PLACEHOLDER_IDENTIFIER, MANIFEST_MARKER);
        let tail = format!("{}_{}.{}", PLACEHOLDER_COL, PLACEHOLDER_ROW, leaf.extension);
        let mut template_segments = segments.clone();
        template_segments[id_idx] = &id_dir;
        template_segments[scale_idx] = PLACEHOLDER_SCALE;
        template_segments[scale_idx + 1] = &tail;
        let template_value = join_raw(&template_segments, &separators);

        let mut manifest_segments = segments[..id_idx].to_vec();
        manifest_segments.push(identifier);
        manifest_segments.push(MANIFEST_FILE_NAME);
        let manifest_value = join_raw(&manifest_segments, &separators[..=id_idx]);

        let rebuild = |value: &str| -> String {
            let mut rebuilt: Vec<String> = pairs.iter().map(|p| p.to_string()).collect();
            rebuilt[pair_idx] = format!("{}={}", raw_key, value);
            format!(
                "{}{}?{}",
                parsed.origin().ascii_serialization(),
                parsed.path(),
                rebuilt.join("&")
            )
        };

        // File names are {col}_{row} in this layout.
        return Some(TileSource::new(
            identifier.to_string(),
            rebuild(&template_value),
            AddressingScheme::ManifestDescribed,
            Some(rebuild(&manifest_value)),
            leaf.scale,
            leaf.second,
            leaf.first,
            url.to_string(),
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::AddressingVariant;

    #[test]
    fn test_path_tiled_basic() {
        let url = "https://tiles.example.com/collections/pic_01/12/3_4.jpg";
        let src = analyze(url).unwrap();

        assert_eq!(src.identifier(), "pic_01");
        assert_eq!(src.sample_scale(), 12);
        assert_eq!(src.sample_row(), 3);
        assert_eq!(src.sample_col(), 4);
        assert_eq!(src.addressing_scheme(), AddressingScheme::PathTiled);
        assert_eq!(
            src.url_template(),
            "https://tiles.example.com/collections/{IDENTIFIER}/{SCALE}/{ROW}_{COL}.jpg"
        );
        assert_eq!(src.tile_url(12, 3, 4), url);
        assert_eq!(src.manifest_url(), None);
        assert_eq!(src.addressing_variant(), AddressingVariant::Standard);
    }

    #[test]
    fn test_path_tiled_identifier_at_root() {
        let src = analyze("http://h:8080/pic/0/0_0.png").unwrap();
        assert_eq!(src.identifier(), "pic");
        assert_eq!(src.url_template(), "http://h:8080/{IDENTIFIER}/{SCALE}/{ROW}_{COL}.png");
    }

    #[test]
    fn test_path_tiled_keeps_query() {
        let url = "https://h/a/pic/5/0_1.jpg?token=abc";
        let src = analyze(url).unwrap();
        assert_eq!(src.tile_url(5, 0, 1), url);
    }

    #[test]
    fn test_identifier_equal_to_host_is_not_confused() {
        // The identifier also appears in the host; substitution is positional.
        let url = "https://pic.example.com/pic/2/1_1.jpg";
        let src = analyze(url).unwrap();
        assert_eq!(
            src.url_template(),
            "https://pic.example.com/{IDENTIFIER}/{SCALE}/{ROW}_{COL}.jpg"
        );
        assert_eq!(src.tile_url(2, 1, 1), url);
    }

    #[test]
    fn test_dzc_variant() {
        let url = "https://h/galleries/x/mural/dzc_output_files/14/2_5.jpg";
        let src = analyze(url).unwrap();

        assert_eq!(src.identifier(), "mural");
        assert_eq!(src.sample_scale(), 14);
        assert_eq!(src.sample_row(), 2);
        assert_eq!(src.sample_col(), 5);
        assert_eq!(
            src.url_template(),
            "https://h/galleries/x/{IDENTIFIER}/dzc_output_files/{SCALE}/{ROW}_{COL}.jpg"
        );
        assert_eq!(src.tile_url(14, 2, 5), url);
        assert_eq!(src.addressing_variant(), AddressingVariant::Transposed);
    }

    #[test]
    fn test_dzc_without_identifier_is_rejected() {
        assert!(analyze("https://h/dzc_output_files/1/0_0.jpg").is_none());
    }

    #[test]
    fn test_missing_identifier_is_rejected() {
        assert!(analyze("https://h/0/1_2.jpg").is_none());
    }

    #[test]
    fn test_non_tile_urls() {
        assert!(analyze("https://h/images/photo.jpg").is_none());
        assert!(analyze("https://h/a/b/x/1_2.jpg").is_none());
        assert!(analyze("https://h/a/b/3/1-2.jpg").is_none());
        assert!(analyze("https://h/a/b/3/1_2.gif").is_none());
        assert!(analyze("https://h/a/b/3/1_2.jpg/").is_none());
        assert!(analyze("ftp://h/a/b/3/1_2.jpg").is_none());
        assert!(analyze("not a url").is_none());
    }

    #[test]
    fn test_oversized_numbers_are_rejected() {
        assert!(analyze("https://h/pic/99999999999/1_2.jpg").is_none());
    }

    #[test]
    fn test_manifest_described() {
        let url = "https://iip.example.org/fcgi-bin/iipsrv.fcgi?DeepZoom=/slides/case7.tif_files/11/4_9.jpg";
        let src = analyze(url).unwrap();

        assert_eq!(src.addressing_scheme(), AddressingScheme::ManifestDescribed);
        assert_eq!(src.identifier(), "case7.tif");
        assert_eq!(src.sample_scale(), 11);
        // File name order is col_row
        assert_eq!(src.sample_col(), 4);
        assert_eq!(src.sample_row(), 9);
        assert_eq!(
            src.url_template(),
            "https://iip.example.org/fcgi-bin/iipsrv.fcgi?DeepZoom=/slides/{IDENTIFIER}_files/{SCALE}/{COL}_{ROW}.jpg"
        );
        assert_eq!(
            src.manifest_url(),
            Some("https://iip.example.org/fcgi-bin/iipsrv.fcgi?DeepZoom=/slides/case7.tif/info.json")
        );
        assert_eq!(src.tile_url(11, 9, 4), url);
        assert_eq!(src.addressing_variant(), AddressingVariant::Standard);
    }

    #[test]
    fn test_manifest_described_preserves_other_params() {
        let url = "https://h/iip?session=1&DeepZoom=%2Fs%2Fimg_files%2F3%2F0_1.jpg&v=2";
        let src = analyze(url).unwrap();

        assert_eq!(src.identifier(), "img");
        assert_eq!(src.sample_row(), 1);
        assert_eq!(src.sample_col(), 0);
        assert_eq!(
            src.manifest_url(),
            Some("https://h/iip?session=1&DeepZoom=%2Fs%2Fimg%2Finfo.json&v=2")
        );
        assert_eq!(src.tile_url(3, 1, 0), url);
    }

    #[test]
    fn test_manifest_described_keeps_encoded_identifier() {
        let url = "https://h/iip?DeepZoom=%2Fs%2FR%26D+lab_files%2F3%2F0_1.jpg&v=2";
        let src = analyze(url).unwrap();

        assert_eq!(src.identifier(), "R%26D+lab");
        assert_eq!(
            src.url_template(),
            "https://h/iip?DeepZoom=%2Fs%2F{IDENTIFIER}_files%2F{SCALE}%2F{COL}_{ROW}.jpg&v=2"
        );
        assert_eq!(src.tile_url(3, 1, 0), url);

        let manifest = Url::parse(src.manifest_url().unwrap()).unwrap();
        let pairs: Vec<(String, String)> = manifest.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("DeepZoom".to_string(), "/s/R&D lab/info.json".to_string()),
                ("v".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_manifest_described_mixed_separators() {
        let url = "https://h/iip?DeepZoom=/s%2Fimg_files/3%2F2_5.png";
        let src = analyze(url).unwrap();
        assert_eq!(src.identifier(), "img");
        assert_eq!(src.tile_url(3, 5, 2), url);
        assert_eq!(src.manifest_url(), Some("https://h/iip?DeepZoom=/s%2Fimg/info.json"));
    }

    #[test]
    fn test_query_without_marker_is_rejected() {
        assert!(analyze("https://h/iip?DeepZoom=/s/img/3/0_1.jpg").is_none());
        assert!(analyze("https://h/iip?DeepZoom=/s/_files/3/0_1.jpg").is_none());
    }

    #[test]
    fn test_path_scheme_wins_over_query() {
        let src = analyze("https://h/pic/1/0_0.jpg?DeepZoom=/s/img_files/3/0_1.jpg").unwrap();
        assert_eq!(src.addressing_scheme(), AddressingScheme::PathTiled);
        assert_eq!(src.identifier(), "pic");
    }
}
