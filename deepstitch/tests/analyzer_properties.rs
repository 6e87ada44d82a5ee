//! Property tests for tile URL analysis.

use deepstitch::analyze;
use deepstitch::source::{AddressingScheme, AddressingVariant};
use proptest::prelude::*;
use url::form_urlencoded;
use url::Url;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,11}".prop_filter("reserved segment", |s| s != "dzc_output_files")
}

proptest! {
    #[test]
    fn test_path_tiled_round_trip(
        host in "[a-z]{1,10}\\.(com|org|net)",
        prefix in prop::collection::vec(segment(), 0..3),
        identifier in segment(),
        scale in 0u32..30,
        row in 0u32..5000,
        col in 0u32..5000,
        ext in prop::sample::select(vec!["jpg", "jpeg", "png"]),
    ) {
        let mut path = String::new();
        for part in &prefix {
            path.push('/');
            path.push_str(part);
        }
        let url = format!(
            "https://{}{}/{}/{}/{}_{}.{}",
            host, path, identifier, scale, row, col, ext
        );

        let source = analyze(&url).unwrap();

        prop_assert_eq!(source.identifier(), identifier.as_str());
        prop_assert_eq!(source.sample_scale(), scale);
        prop_assert_eq!(source.sample_row(), row);
        prop_assert_eq!(source.sample_col(), col);
        prop_assert_eq!(source.addressing_scheme(), AddressingScheme::PathTiled);
        prop_assert_eq!(source.addressing_variant(), AddressingVariant::Standard);
        prop_assert_eq!(source.tile_url(scale, row, col), url);
    }

    #[test]
    fn test_dzc_round_trip(
        identifier in segment(),
        scale in 0u32..30,
        row in 0u32..500,
        col in 0u32..500,
    ) {
        let url = format!(
            "http://dzc.example.com/out/{}/dzc_output_files/{}/{}_{}.jpg",
            identifier, scale, row, col
        );

        let source = analyze(&url).unwrap();

        prop_assert_eq!(source.identifier(), identifier.as_str());
        let keeps_dzc = source.url_template().contains("/dzc_output_files/{SCALE}/");
        prop_assert!(keeps_dzc, "template {} lost the dzc segment", source.url_template());
        prop_assert_eq!(source.addressing_variant(), AddressingVariant::Transposed);
        prop_assert_eq!(source.tile_url(scale, row, col), url);
    }

    #[test]
    fn test_manifest_described_round_trip(
        prefix in prop::collection::vec("[a-z][a-z0-9.]{0,7}", 0..3),
        identifier in "[A-Za-z0-9][A-Za-z0-9 &+#%=?.-]{0,15}",
        scale in 0u32..30,
        row in 0u32..5000,
        col in 0u32..5000,
        extra in prop::collection::vec(("[a-z]{1,6}", "[a-z0-9]{0,6}"), 0..3),
    ) {
        let mut sub_path = String::new();
        for part in &prefix {
            sub_path.push('/');
            sub_path.push_str(part);
        }
        let manifest_path = format!("{}/{}/info.json", sub_path, identifier);
        sub_path.push_str(&format!("/{}_files/{}/{}_{}.jpg", identifier, scale, col, row));
        let encoded: String = form_urlencoded::byte_serialize(sub_path.as_bytes()).collect();

        let mut query = String::from("DeepZoom=");
        query.push_str(&encoded);
        for (key, value) in &extra {
            query.push_str(&format!("&{}={}", key, value));
        }
        let url = format!("https://iip.example.org/fcgi-bin/iipsrv.fcgi?{}", query);

        let source = analyze(&url).unwrap();

        prop_assert_eq!(source.addressing_scheme(), AddressingScheme::ManifestDescribed);
        prop_assert_eq!(source.sample_scale(), scale);
        prop_assert_eq!(source.sample_row(), row);
        prop_assert_eq!(source.sample_col(), col);
        prop_assert_eq!(
            source.tile_url(source.sample_scale(), source.sample_row(), source.sample_col()),
            url.clone()
        );

        let manifest = Url::parse(source.manifest_url().unwrap()).unwrap();
        let pairs: Vec<(String, String)> = manifest.query_pairs().into_owned().collect();
        let mut expected = vec![("DeepZoom".to_string(), manifest_path)];
        expected.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        prop_assert_eq!(pairs, expected);
    }

    #[test]
    fn test_arbitrary_text_never_panics(input in ".{0,200}") {
        let _ = analyze(&input);
    }
}
