// ArcGIS Pro clipboard XML paste, including embedded binary shapes
use geopaste::{parse, Geometry, ParseError, SpatialReference};

// type word 1 (point), x = -117.123, y = 34.456
const POINT_BYTES: &str = "AQAAAB1aZDvfR13A7nw/NV46QUA=";
// type word 3 (polyline), 2 parts, 5 points, part starts [0, 3]
const POLYLINE_BYTES: &str = "AwAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQQAAAAAAAABBAAgAAAAUAAAAAAAAAAwAA\
                              AAAAAAAAAAAAAAAAAAAAAAAAAAAAAADwPwAAAAAAAPA/AAAAAAAAAEAAAAAAAAAAQAAA\
                              AAAAAAhAAAAAAAAACEAAAAAAAAAQQAAAAAAAABBA";
// type word 1 with the curves modifier bit set
const CURVED_BYTES: &str = "AQAAIAAAAAAAAPA/AAAAAAAAAEA=";

fn clipboard_document(value_type: &str, wkid: i32, bytes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfPropertySet xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                    xmlns:xs="http://www.w3.org/2001/XMLSchema"
                    xmlns:typens="http://www.esri.com/schemas/ArcGIS/3.2">
  <PropertySet xsi:type="typens:PropertySet">
    <PropertyArray xsi:type="typens:ArrayOfPropertySetProperty">
      <PropertySetProperty xsi:type="typens:PropertySetProperty">
        <Key>NAME</Key>
        <Value xsi:type="xs:string">Station 12</Value>
      </PropertySetProperty>
      <PropertySetProperty xsi:type="typens:PropertySetProperty">
        <Key>SHAPE</Key>
        <Value xsi:type="typens:{value_type}">
          <Bytes>{bytes}</Bytes>
          <SpatialReference xsi:type="typens:ProjectedCoordinateSystem">
            <WKID>{wkid}</WKID>
          </SpatialReference>
        </Value>
      </PropertySetProperty>
    </PropertyArray>
  </PropertySet>
</ArrayOfPropertySet>"#
    )
}

#[test]
fn test_point_property_decodes_with_string_attribute() {
    let source = clipboard_document("PointB", 3857, POINT_BYTES);
    let result = parse(&source).expect("clipboard XML must parse");

    assert_eq!(result.features.len(), 1);
    assert!(!result.unknown_spatial_reference);

    let feature = &result.features[0];
    assert_eq!(
        feature.attributes["NAME"],
        serde_json::json!("Station 12")
    );

    match feature.geometry.as_ref().expect("geometry expected") {
        Geometry::Point(point) => {
            assert!((point.x - -117.123).abs() < 1e-9);
            assert!((point.y - 34.456).abs() < 1e-9);
            assert_eq!(point.spatial_reference, Some(SpatialReference::new(3857)));
        }
        other => panic!("expected a point, got {:?}", other),
    }
}

#[test]
fn test_polyline_property_splits_parts() {
    let source = clipboard_document("PolylineB", 4326, POLYLINE_BYTES);
    let result = parse(&source).expect("clipboard XML must parse");

    match result.features[0].geometry.as_ref().expect("geometry expected") {
        Geometry::Polyline(polyline) => {
            assert_eq!(polyline.paths.len(), 2);
            assert_eq!(polyline.paths[0].len(), 3);
            assert_eq!(polyline.paths[1].len(), 2);
        }
        other => panic!("expected a polyline, got {:?}", other),
    }
}

#[test]
fn test_multiple_property_sets_yield_multiple_features() {
    let one = clipboard_document("PointB", 3857, POINT_BYTES);
    // Duplicate the PropertySet inside the same ArrayOfPropertySet.
    let set_start = one.find("<PropertySet").expect("document has a set");
    let set_end = one.find("</PropertySet>").expect("document closes the set") + "</PropertySet>".len();
    let set = &one[set_start..set_end];
    let source = one.replace(set, &format!("{set}{set}"));

    let result = parse(&source).expect("clipboard XML must parse");
    assert_eq!(result.features.len(), 2);
    for feature in &result.features {
        assert!(feature.geometry.is_some());
    }
}

#[test]
fn test_curved_shape_fails_the_whole_paste() {
    // Inside recognized clipboard XML a bad shape is fatal, unlike the
    // silent fall-through of the outer sniffing loop.
    let source = clipboard_document("PointB", 3857, CURVED_BYTES);
    let err = parse(&source).expect_err("curved shapes must be rejected");
    assert!(matches!(err, ParseError::UnsupportedGeometry(_)));
}

#[test]
fn test_invalid_base64_fails_the_whole_paste() {
    let source = clipboard_document("PointB", 3857, "!!!not base64!!!");
    let err = parse(&source).expect_err("invalid base64 must be rejected");
    assert!(matches!(err, ParseError::MalformedInput(_)));
}

#[test]
fn test_non_clipboard_xml_falls_through_to_unknown() {
    let err = parse("<Other><Thing>1</Thing></Other>").expect_err("plain XML is not a format");
    assert!(matches!(err, ParseError::UnknownFormat));
}
