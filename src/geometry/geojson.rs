//! GeoJSON reading
//!
//! Converts GeoJSON documents into normalized features. Input is
//! normalized first: a bare geometry becomes a single feature with empty
//! attributes, a bare feature becomes a one-element collection, and a
//! FeatureCollection is used as-is. GeoJSON coordinates are WGS84 by
//! definition, so every geometry read here is stamped with that frame.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParseError;
use crate::geometry::types::{
    Coordinate, Feature, Geometry, Multipoint, Point, Polygon, Polyline, SpatialReference,
};

/// Read any GeoJSON document (geometry, feature, or collection) into
/// features. The caller has already committed to the GeoJSON
/// interpretation, so malformed content is an error rather than a
/// fall-through.
pub fn read_features(value: &Value) -> Result<Vec<Feature>, ParseError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::MalformedInput("GeoJSON type is not a string".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let members = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ParseError::MalformedInput(
                        "FeatureCollection has no features array".to_string(),
                    )
                })?;
            members.iter().map(feature_from_json).collect()
        }
        "Feature" => Ok(vec![feature_from_json(value)?]),
        _ => Ok(vec![Feature::from_geometry(geometry_from_json(value)?)]),
    }
}

fn feature_from_json(value: &Value) -> Result<Feature, ParseError> {
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(geometry) => Some(geometry_from_json(geometry)?),
    };

    let mut attributes = IndexMap::new();
    if let Some(properties) = value.get("properties").and_then(Value::as_object) {
        for (key, property) in properties {
            attributes.insert(key.clone(), property.clone());
        }
    }

    Ok(Feature {
        attributes,
        geometry,
    })
}

/// Convert one GeoJSON geometry object. MultiLineString folds into a
/// multi-path polyline and MultiPolygon into a polygon carrying all member
/// rings, matching how the normalized model represents multi-part shapes.
pub fn geometry_from_json(value: &Value) -> Result<Geometry, ParseError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::MalformedInput("GeoJSON type is not a string".to_string()))?;
    let coordinates = value.get("coordinates").ok_or_else(|| {
        ParseError::MalformedInput(format!("GeoJSON {kind} has no coordinates"))
    })?;

    match kind {
        "Point" => {
            let position = position_from_json(coordinates)?;
            Ok(Geometry::Point(Point {
                x: position[0],
                y: position[1],
                z: position.get(2).copied(),
                m: None,
                spatial_reference: Some(SpatialReference::WGS84),
            }))
        }
        "MultiPoint" => {
            let points = position_run_from_json(coordinates)?;
            Ok(Geometry::Multipoint(Multipoint {
                has_z: has_z(&points),
                has_m: false,
                spatial_reference: Some(SpatialReference::WGS84),
                points,
            }))
        }
        "LineString" => {
            let path = position_run_from_json(coordinates)?;
            Ok(Geometry::Polyline(Polyline {
                has_z: has_z(&path),
                has_m: false,
                spatial_reference: Some(SpatialReference::WGS84),
                paths: vec![path],
            }))
        }
        "MultiLineString" => {
            let paths = part_runs_from_json(coordinates)?;
            Ok(Geometry::Polyline(Polyline {
                has_z: paths.iter().any(|path| has_z(path)),
                has_m: false,
                spatial_reference: Some(SpatialReference::WGS84),
                paths,
            }))
        }
        "Polygon" => {
            let rings = part_runs_from_json(coordinates)?;
            Ok(Geometry::Polygon(Polygon {
                has_z: rings.iter().any(|ring| has_z(ring)),
                has_m: false,
                spatial_reference: Some(SpatialReference::WGS84),
                rings,
            }))
        }
        "MultiPolygon" => {
            let polygons = coordinates.as_array().ok_or_else(|| {
                ParseError::MalformedInput("MultiPolygon coordinates are not an array".to_string())
            })?;
            let mut rings = Vec::new();
            for polygon in polygons {
                rings.extend(part_runs_from_json(polygon)?);
            }
            Ok(Geometry::Polygon(Polygon {
                has_z: rings.iter().any(|ring| has_z(ring)),
                has_m: false,
                spatial_reference: Some(SpatialReference::WGS84),
                rings,
            }))
        }
        other => Err(ParseError::MalformedInput(format!(
            "unsupported GeoJSON geometry type {other}"
        ))),
    }
}

/// One GeoJSON position: longitude, latitude, optional altitude. Any
/// further components are dropped.
fn position_from_json(value: &Value) -> Result<Coordinate, ParseError> {
    let components = value
        .as_array()
        .ok_or_else(|| ParseError::MalformedInput("GeoJSON position is not an array".to_string()))?;
    if components.len() < 2 {
        return Err(ParseError::MalformedInput(
            "GeoJSON position has fewer than two components".to_string(),
        ));
    }
    components
        .iter()
        .take(3)
        .map(|component| {
            component.as_f64().ok_or_else(|| {
                ParseError::MalformedInput("GeoJSON position component is not a number".to_string())
            })
        })
        .collect()
}

fn position_run_from_json(value: &Value) -> Result<Vec<Coordinate>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| {
            ParseError::MalformedInput("GeoJSON coordinate run is not an array".to_string())
        })?
        .iter()
        .map(position_from_json)
        .collect()
}

fn part_runs_from_json(value: &Value) -> Result<Vec<Vec<Coordinate>>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| {
            ParseError::MalformedInput("GeoJSON coordinate parts are not an array".to_string())
        })?
        .iter()
        .map(position_run_from_json)
        .collect()
}

fn has_z(points: &[Coordinate]) -> bool {
    points.iter().any(|point| point.len() > 2)
}
