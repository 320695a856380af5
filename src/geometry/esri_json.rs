//! Esri JSON geometry and feature codec
//!
//! Esri JSON carries no format marker; geometry objects are recognized by
//! field presence, probed in a fixed order: point (`x`/`y`), multipoint
//! (`points`), polyline (`paths`), polygon (`rings`), extent (`xmin`..).
//! The same module serializes geometries and features back out for the
//! copy path.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::error::ParseError;
use crate::geometry::types::{
    Coordinate, Extent, Feature, Geometry, Multipoint, Point, Polygon, Polyline,
    SpatialReference,
};

/// Read an embedded `spatialReference` object, if one is present.
pub fn spatial_reference_from_json(value: &Value) -> Option<SpatialReference> {
    let wkid = value.get("spatialReference")?.get("wkid")?.as_i64()?;
    Some(SpatialReference::new(wkid as i32))
}

fn number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64()
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// One vertex as a JSON array of numbers (x, y, then optional z and m).
fn coordinate_from_json(value: &Value) -> Option<Coordinate> {
    let components = value.as_array()?;
    if components.len() < 2 {
        return None;
    }
    components.iter().map(Value::as_f64).collect()
}

fn point_run_from_json(value: &Value) -> Option<Vec<Coordinate>> {
    value.as_array()?.iter().map(coordinate_from_json).collect()
}

fn parts_from_json(value: &Value) -> Option<Vec<Vec<Coordinate>>> {
    value.as_array()?.iter().map(point_run_from_json).collect()
}

/// Recognize a bare Esri JSON geometry object.
///
/// Returns `None` when the object matches none of the five geometry shapes,
/// which lets the bare-geometry interpretation fall through during sniffing.
pub fn geometry_from_json(value: &Value) -> Option<Geometry> {
    let object = value.as_object()?;
    let spatial_reference = spatial_reference_from_json(value);

    if object.contains_key("x") && object.contains_key("y") {
        let x = number(object.get("x"))?;
        let y = number(object.get("y"))?;
        return Some(Geometry::Point(Point {
            x,
            y,
            z: number(object.get("z")),
            m: number(object.get("m")),
            spatial_reference,
        }));
    }

    if let Some(points) = object.get("points") {
        return Some(Geometry::Multipoint(Multipoint {
            points: point_run_from_json(points)?,
            has_z: flag(object, "hasZ"),
            has_m: flag(object, "hasM"),
            spatial_reference,
        }));
    }

    if let Some(paths) = object.get("paths") {
        return Some(Geometry::Polyline(Polyline {
            paths: parts_from_json(paths)?,
            has_z: flag(object, "hasZ"),
            has_m: flag(object, "hasM"),
            spatial_reference,
        }));
    }

    if let Some(rings) = object.get("rings") {
        return Some(Geometry::Polygon(Polygon {
            rings: parts_from_json(rings)?,
            has_z: flag(object, "hasZ"),
            has_m: flag(object, "hasM"),
            spatial_reference,
        }));
    }

    if object.contains_key("xmin") {
        return Some(Geometry::Extent(Extent {
            xmin: number(object.get("xmin"))?,
            ymin: number(object.get("ymin"))?,
            xmax: number(object.get("xmax"))?,
            ymax: number(object.get("ymax"))?,
            spatial_reference,
        }));
    }

    None
}

/// Read an Esri JSON feature: an `attributes` map plus an optional
/// `geometry`. Unrecognized or missing geometry leaves the feature bare.
pub fn feature_from_json(value: &Value) -> Feature {
    let mut attributes = IndexMap::new();
    if let Some(map) = value.get("attributes").and_then(Value::as_object) {
        for (key, attribute) in map {
            attributes.insert(key.clone(), attribute.clone());
        }
    }

    let geometry = value.get("geometry").and_then(geometry_from_json);

    Feature {
        attributes,
        geometry,
    }
}

/// Read an Esri JSON feature set. The set's declared spatial reference is
/// authoritative: it is stamped onto member geometries that lack their own.
pub fn featureset_from_json(value: &Value) -> Result<Vec<Feature>, ParseError> {
    let members = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ParseError::MalformedInput("feature set has no features array".to_string())
        })?;

    let set_spatial_reference = spatial_reference_from_json(value);

    let mut features = Vec::with_capacity(members.len());
    for member in members {
        let mut feature = feature_from_json(member);
        if let (Some(spatial_reference), Some(geometry)) =
            (set_spatial_reference, feature.geometry.as_mut())
        {
            if geometry.spatial_reference().is_none() {
                geometry.set_spatial_reference(spatial_reference);
            }
        }
        features.push(feature);
    }

    Ok(features)
}

fn spatial_reference_to_json(spatial_reference: Option<SpatialReference>) -> Option<Value> {
    spatial_reference.map(|sr| json!({ "wkid": sr.wkid }))
}

/// Serialize a geometry to its Esri JSON object.
pub fn geometry_to_json(geometry: &Geometry) -> Value {
    let mut object = Map::new();
    match geometry {
        Geometry::Point(point) => {
            object.insert("x".to_string(), json!(point.x));
            object.insert("y".to_string(), json!(point.y));
            if let Some(z) = point.z {
                object.insert("z".to_string(), json!(z));
            }
            if let Some(m) = point.m {
                object.insert("m".to_string(), json!(m));
            }
            if let Some(sr) = spatial_reference_to_json(point.spatial_reference) {
                object.insert("spatialReference".to_string(), sr);
            }
        }
        Geometry::Multipoint(multipoint) => {
            if multipoint.has_z {
                object.insert("hasZ".to_string(), json!(true));
            }
            if multipoint.has_m {
                object.insert("hasM".to_string(), json!(true));
            }
            object.insert("points".to_string(), json!(multipoint.points));
            if let Some(sr) = spatial_reference_to_json(multipoint.spatial_reference) {
                object.insert("spatialReference".to_string(), sr);
            }
        }
        Geometry::Polyline(polyline) => {
            if polyline.has_z {
                object.insert("hasZ".to_string(), json!(true));
            }
            if polyline.has_m {
                object.insert("hasM".to_string(), json!(true));
            }
            object.insert("paths".to_string(), json!(polyline.paths));
            if let Some(sr) = spatial_reference_to_json(polyline.spatial_reference) {
                object.insert("spatialReference".to_string(), sr);
            }
        }
        Geometry::Polygon(polygon) => {
            if polygon.has_z {
                object.insert("hasZ".to_string(), json!(true));
            }
            if polygon.has_m {
                object.insert("hasM".to_string(), json!(true));
            }
            object.insert("rings".to_string(), json!(polygon.rings));
            if let Some(sr) = spatial_reference_to_json(polygon.spatial_reference) {
                object.insert("spatialReference".to_string(), sr);
            }
        }
        Geometry::Extent(extent) => {
            object.insert("xmin".to_string(), json!(extent.xmin));
            object.insert("ymin".to_string(), json!(extent.ymin));
            object.insert("xmax".to_string(), json!(extent.xmax));
            object.insert("ymax".to_string(), json!(extent.ymax));
            if let Some(sr) = spatial_reference_to_json(extent.spatial_reference) {
                object.insert("spatialReference".to_string(), sr);
            }
        }
    }
    Value::Object(object)
}

/// Serialize a feature as `{"attributes": .., "geometry": ..}`. The
/// geometry key is omitted for geometry-less features.
pub fn feature_to_json(feature: &Feature) -> Value {
    let mut object = Map::new();
    let mut attributes = Map::new();
    for (key, value) in &feature.attributes {
        attributes.insert(key.clone(), value.clone());
    }
    object.insert("attributes".to_string(), Value::Object(attributes));
    if let Some(geometry) = &feature.geometry {
        object.insert("geometry".to_string(), geometry_to_json(geometry));
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_point_with_spatial_reference() {
        let value = json!({"x": 1.5, "y": 2.5, "spatialReference": {"wkid": 3857}});
        match geometry_from_json(&value).unwrap() {
            Geometry::Point(point) => {
                assert_eq!(point.x, 1.5);
                assert_eq!(point.spatial_reference, Some(SpatialReference::new(3857)));
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn recognizes_polygon_rings() {
        let value = json!({"rings": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]]});
        match geometry_from_json(&value).unwrap() {
            Geometry::Polygon(polygon) => {
                assert_eq!(polygon.rings.len(), 1);
                assert_eq!(polygon.rings[0].len(), 4);
                assert_eq!(polygon.spatial_reference, None);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn recognizes_extent() {
        let value = json!({"xmin": 0.0, "ymin": 0.0, "xmax": 10.0, "ymax": 10.0});
        assert!(matches!(
            geometry_from_json(&value),
            Some(Geometry::Extent(_))
        ));
    }

    #[test]
    fn rejects_non_geometry_objects() {
        assert!(geometry_from_json(&json!({"name": "nothing spatial"})).is_none());
        assert!(geometry_from_json(&json!({"x": "not a number", "y": 2.0})).is_none());
        assert!(geometry_from_json(&json!(42)).is_none());
    }

    #[test]
    fn feature_set_stamps_declared_spatial_reference() {
        let value = json!({
            "spatialReference": {"wkid": 26911},
            "features": [
                {"attributes": {"name": "a"}, "geometry": {"x": 1.0, "y": 2.0}},
                {"geometry": {"x": 3.0, "y": 4.0, "spatialReference": {"wkid": 4326}}}
            ]
        });
        let features = featureset_from_json(&value).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0].geometry.as_ref().unwrap().spatial_reference(),
            Some(SpatialReference::new(26911))
        );
        // A member's own spatial reference is not overwritten.
        assert_eq!(
            features[1].geometry.as_ref().unwrap().spatial_reference(),
            Some(SpatialReference::new(4326))
        );
    }

    #[test]
    fn feature_set_without_array_is_malformed() {
        let err = featureset_from_json(&json!({"features": "nope"})).unwrap_err();
        assert!(matches!(err, ParseError::MalformedInput(_)));
    }

    #[test]
    fn point_round_trips_through_json() {
        let value = json!({"x": 7.0, "y": 8.0, "z": 9.0, "spatialReference": {"wkid": 4326}});
        let geometry = geometry_from_json(&value).unwrap();
        assert_eq!(geometry_to_json(&geometry), value);
    }
}
