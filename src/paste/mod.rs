//! Format-sniffing parser for pasted geodata
//!
//! Pasted text carries no format marker, so interpretations are tried in
//! a fixed priority order until one matches: JSON (GeoJSON, then the Esri
//! JSON shapes), ArcGIS Pro clipboard XML, and finally bare
//! comma-separated coordinates. Failing to *recognize* a format is
//! silent; failing *inside* a recognized format is an error.
//!
//! # Submodules
//! - `clipboard` - ArcGIS Pro clipboard XML interpretation
//! - `coords` - Comma-separated coordinate fallback

mod clipboard;
mod coords;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::ParseError;
use crate::geometry::{esri_json, geojson, Feature};
use crate::parse_xml::parse_xml_str;

/// Features extracted from one paste, plus whether their coordinate
/// system is known. When it is not, the caller decides what frame the
/// coordinates were meant in.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub features: Vec<Feature>,
    pub unknown_spatial_reference: bool,
}

/// One JSON interpretation. `None` means "not this shape of object, keep
/// probing"; `Some` means the interpretation is committed and its outcome
/// (success or failure) is final.
type JsonClassifier = fn(&Value) -> Option<Result<ParseResult, ParseError>>;

/// JSON interpretations in priority order. The order is deliberate:
/// GeoJSON documents always declare a `type`, Esri feature sets a
/// `features` array, single Esri features a `geometry`, and only then is
/// the object probed as a bare Esri geometry.
const JSON_CLASSIFIERS: &[(&str, JsonClassifier)] = &[
    ("geojson", classify_geojson),
    ("esri-featureset", classify_esri_featureset),
    ("esri-feature", classify_esri_feature),
    ("esri-geometry", classify_esri_geometry),
];

/// Parse arbitrary pasted text into features.
///
/// Fails with [`ParseError::UnknownFormat`] when no interpretation
/// recognizes the input; errors inside a recognized interpretation
/// propagate as-is.
pub fn parse(source: &str) -> Result<ParseResult, ParseError> {
    // Opportunistic: pasted URLs arrive percent-encoded, but a failed
    // decode just means the text was never encoded.
    let source = match percent_decode_str(source).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => source.to_string(),
    };

    if let Ok(json) = serde_json::from_str::<Value>(&source) {
        if json.is_object() {
            for &(name, classifier) in JSON_CLASSIFIERS {
                if let Some(result) = classifier(&json) {
                    tracing::debug!(interpretation = name, "matched JSON paste");
                    return result;
                }
            }
        }
    }

    if let Ok(document) = parse_xml_str(&source) {
        if let Some(features) = clipboard::parse_clipboard_document(&document)? {
            tracing::debug!(interpretation = "clipboard-xml", "matched XML paste");
            return Ok(ParseResult {
                features,
                unknown_spatial_reference: false,
            });
        }
    }

    if let Some(geometry) = coords::parse_coordinate_list(&source) {
        tracing::debug!(interpretation = "coordinates", "matched coordinate paste");
        return Ok(ParseResult {
            features: vec![Feature::from_geometry(geometry)],
            unknown_spatial_reference: true,
        });
    }

    Err(ParseError::UnknownFormat)
}

fn classify_geojson(json: &Value) -> Option<Result<ParseResult, ParseError>> {
    // GeoJSON always declares a `type`; its coordinates are WGS84 by
    // definition, so the spatial reference is known on this path.
    json.get("type")?;
    Some(geojson::read_features(json).map(|features| ParseResult {
        features,
        unknown_spatial_reference: false,
    }))
}

fn classify_esri_featureset(json: &Value) -> Option<Result<ParseResult, ParseError>> {
    // A feature set's declared spatial reference is authoritative.
    json.get("features")?;
    Some(esri_json::featureset_from_json(json).map(|features| ParseResult {
        features,
        unknown_spatial_reference: false,
    }))
}

fn classify_esri_feature(json: &Value) -> Option<Result<ParseResult, ParseError>> {
    let geometry = json.get("geometry")?;
    let has_spatial_reference = geometry
        .get("spatialReference")
        .map_or(false, |sr| !sr.is_null());
    Some(Ok(ParseResult {
        features: vec![esri_json::feature_from_json(json)],
        unknown_spatial_reference: !has_spatial_reference,
    }))
}

fn classify_esri_geometry(json: &Value) -> Option<Result<ParseResult, ParseError>> {
    let geometry = esri_json::geometry_from_json(json)?;
    let has_spatial_reference = json
        .get("spatialReference")
        .map_or(false, |sr| !sr.is_null());
    Some(Ok(ParseResult {
        features: vec![Feature::from_geometry(geometry)],
        unknown_spatial_reference: !has_spatial_reference,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn json_classifier_order_prefers_geojson() {
        // `type` wins over `features` when both are present.
        let result = parse(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(result.features.is_empty());
        assert!(!result.unknown_spatial_reference);
    }

    #[test]
    fn esri_feature_without_spatial_reference_is_unknown() {
        let result = parse(r#"{"geometry": {"x": 1, "y": 2}}"#).unwrap();
        assert_eq!(result.features.len(), 1);
        assert!(result.unknown_spatial_reference);
        assert!(matches!(
            result.features[0].geometry,
            Some(Geometry::Point(_))
        ));
    }

    #[test]
    fn esri_feature_with_spatial_reference_is_known() {
        let result = parse(
            r#"{"geometry": {"x": 1, "y": 2, "spatialReference": {"wkid": 3857}}}"#,
        )
        .unwrap();
        assert!(!result.unknown_spatial_reference);
    }

    #[test]
    fn bare_esri_geometry_is_recognized_last() {
        let result = parse(r#"{"rings": [[[0,0],[1,0],[0,1],[0,0]]]}"#).unwrap();
        assert!(result.unknown_spatial_reference);
        assert!(matches!(
            result.features[0].geometry,
            Some(Geometry::Polygon(_))
        ));
    }

    #[test]
    fn unrecognized_json_object_falls_through_to_unknown() {
        let err = parse(r#"{"name": "just an object"}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownFormat));
    }

    #[test]
    fn percent_encoded_coordinates_decode_first() {
        let result = parse("25%2C65").unwrap();
        assert!(result.unknown_spatial_reference);
        match result.features[0].geometry.as_ref().unwrap() {
            Geometry::Point(point) => {
                assert_eq!(point.x, 25.0);
                assert_eq!(point.y, 65.0);
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn garbage_is_unknown_format() {
        assert!(matches!(
            parse("not json {{{").unwrap_err(),
            ParseError::UnknownFormat
        ));
    }
}
