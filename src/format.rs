//! GeoJSON reading/writing and the text shown to the user.

use geojson::{Feature, FeatureCollection, GeoJson};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::MapResult;
use crate::model::{FeatureData, FeatureSource, MapFeature};

/// The characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DATA_URI_PREFIX: &str = "data:application/json;charset=utf-8,";

/// Accepts a FeatureCollection, a single Feature or a bare Geometry.
/// Either every feature converts or the whole document is rejected.
pub fn read_features(text: &str) -> MapResult<Vec<FeatureData>> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![Feature::from(g)],
    };
    features.into_iter().map(FeatureData::try_from).collect()
}

pub fn write_features(source: &FeatureSource) -> MapResult<String> {
    let collection = FeatureCollection {
        bbox: None,
        features: source.features().iter().map(|f| f.source().clone()).collect(),
        foreign_members: None,
    };
    Ok(serde_json::to_string(&collection)?)
}

pub fn to_data_uri(json: &str) -> String {
    format!("{DATA_URI_PREFIX}{}", utf8_percent_encode(json, URI_COMPONENT))
}

/// Target for the download link.
pub fn export_href(source: &FeatureSource) -> MapResult<String> {
    Ok(to_data_uri(&write_features(source)?))
}

pub fn popup_html(feature: &MapFeature) -> String {
    format!(
        "<b>{}</b><br><p>{}</p>",
        feature.name(),
        feature.description()
    )
}

/// Leading non-breaking space keeps the status line from collapsing.
pub fn status_text(hovered: Option<&MapFeature>) -> String {
    match hovered {
        Some(f) => format!("\u{a0}Hovering: {}", f.name()),
        None => "\u{a0}".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::tests::square;
    use percent_encoding::percent_decode_str;

    pub(crate) fn decode_href(href: &str) -> String {
        let encoded = href.strip_prefix(DATA_URI_PREFIX).expect("data uri prefix");
        percent_decode_str(encoded).decode_utf8().unwrap().into_owned()
    }

    #[test]
    fn reads_collection_feature_and_geometry() {
        let fc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"A"},"geometry":{"type":"Point","coordinates":[1,2]}},
            {"type":"Feature","properties":{"name":"B"},"geometry":null}]}"#;
        assert_eq!(read_features(fc).unwrap().len(), 2);

        let single = r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1,2]}}"#;
        assert_eq!(read_features(single).unwrap().len(), 1);

        let bare = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#;
        let parsed = read_features(bare).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].geometry.is_some());
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(read_features("name,description\nForest,Dark woods").is_err());
        assert!(read_features(r#"{"type":"Nonsense"}"#).is_err());
        assert!(read_features("").is_err());
    }

    #[test]
    fn popup_markup() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("Forest", "Dark woods", [0.0, 0.0], 1.0)]);
        assert_eq!(
            popup_html(&src.features()[0]),
            "<b>Forest</b><br><p>Dark woods</p>"
        );
    }

    #[test]
    fn status_line() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("Forest", "", [0.0, 0.0], 1.0)]);
        assert_eq!(status_text(src.features().first()), "\u{a0}Hovering: Forest");
        assert_eq!(status_text(None), "\u{a0}");
    }

    #[test]
    fn data_uri_uses_uri_component_escaping() {
        let uri = to_data_uri(r#"{"a":"b c/é(ok)"}"#);
        assert_eq!(
            uri,
            "data:application/json;charset=utf-8,%7B%22a%22%3A%22b%20c%2F%C3%A9(ok)%22%7D"
        );
    }

    #[test]
    fn export_decodes_to_current_collection() {
        let mut src = FeatureSource::default();
        src.add_features(vec![
            square("Forest", "Dark woods", [0.0, 0.0], 10.0),
            square("Lake & Shore", "50% water", [20.0, 0.0], 10.0),
        ]);
        let decoded = decode_href(&export_href(&src).unwrap());
        let back = read_features(&decoded).unwrap();
        let expected: Vec<_> = src.features().iter().map(|f| f.source().clone()).collect();
        let got: Vec<_> = back.into_iter().map(|d| d.source).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn empty_collection_exports_empty_feature_list() {
        let decoded = decode_href(&export_href(&FeatureSource::default()).unwrap());
        let value: serde_json::Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().map(Vec::len), Some(0));
    }
}
