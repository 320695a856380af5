//! Binary shape decoding for ArcGIS Pro clipboard geometry
//!
//! ArcGIS Pro places geometry on the clipboard as a little-endian buffer:
//! a 4-byte type word (low byte selects the shape type, high byte carries
//! modifier flags), followed by fields laid out per geometry category.
//! This module decodes one such buffer into a [`Geometry`].
//!
//! Known limitation: when the id modifier bit is set, the point-id payload
//! bytes are detected but never consumed, so any data trailing an
//! id-bearing shape would be read misaligned.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::ParseError;
use crate::geometry::types::{
    Coordinate, Geometry, Multipoint, Point, Polygon, Polyline, SpatialReference,
};

/// Shape type codes (supported types only)
mod shape_types {
    pub const POINT: i32 = 1;
    pub const POINT_Z: i32 = 9;
    pub const POINT_M: i32 = 21;
    pub const POINT_ZM: i32 = 11;
    pub const MULTIPOINT: i32 = 8;
    pub const MULTIPOINT_Z: i32 = 20;
    pub const MULTIPOINT_M: i32 = 28;
    pub const MULTIPOINT_ZM: i32 = 18;
    pub const POLYLINE: i32 = 3;
    pub const POLYLINE_Z: i32 = 10;
    pub const POLYLINE_M: i32 = 23;
    pub const POLYLINE_ZM: i32 = 13;
    pub const POLYGON: i32 = 5;
    pub const POLYGON_M: i32 = 25;
    pub const POLYGON_Z: i32 = 19;
    pub const POLYGON_ZM: i32 = 15;
    pub const GENERAL_POINT: i32 = 52;
    pub const GENERAL_MULTIPOINT: i32 = 53;
    pub const GENERAL_POLYLINE: i32 = 50;
    pub const GENERAL_POLYGON: i32 = 51;
}

/// Modifier bits in the high byte of the type word.
const MODIFIER_HAS_Z: u32 = 0x8000_0000;
const MODIFIER_HAS_M: u32 = 0x4000_0000;
const MODIFIER_HAS_CURVES: u32 = 0x2000_0000;
const MODIFIER_HAS_ID: u32 = 0x1000_0000;

/// Z and M values below this threshold are the "no data" sentinel.
const NO_DATA_THRESHOLD: f64 = -1.0e38;

/// Geometry category selected by the low byte of the type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeCategory {
    Point,
    Multipoint,
    Polyline,
    Polygon,
}

/// Optional-field flags, combining modifier bits with the intrinsic
/// dimensionality of the type code itself.
struct ShapeFlags {
    has_z: bool,
    has_m: bool,
    // Detected but its payload is never consumed; see the module docs.
    #[allow(dead_code)]
    has_id: bool,
}

fn translate_nan(value: f64) -> f64 {
    if value < NO_DATA_THRESHOLD {
        f64::NAN
    } else {
        value
    }
}

fn classify(type_code: i32) -> Option<ShapeCategory> {
    use shape_types::*;
    match type_code {
        POINT | POINT_M | POINT_ZM | POINT_Z | GENERAL_POINT => Some(ShapeCategory::Point),
        MULTIPOINT | MULTIPOINT_M | MULTIPOINT_ZM | MULTIPOINT_Z | GENERAL_MULTIPOINT => {
            Some(ShapeCategory::Multipoint)
        }
        POLYLINE | POLYLINE_M | POLYLINE_ZM | POLYLINE_Z | GENERAL_POLYLINE => {
            Some(ShapeCategory::Polyline)
        }
        POLYGON | POLYGON_M | POLYGON_ZM | POLYGON_Z | GENERAL_POLYGON => {
            Some(ShapeCategory::Polygon)
        }
        _ => None,
    }
}

fn intrinsic_has_z(type_code: i32) -> bool {
    use shape_types::*;
    matches!(
        type_code,
        POINT_Z | POINT_ZM
            | MULTIPOINT_Z
            | MULTIPOINT_ZM
            | POLYLINE_Z
            | POLYLINE_ZM
            | POLYGON_Z
            | POLYGON_ZM
    )
}

fn intrinsic_has_m(type_code: i32) -> bool {
    use shape_types::*;
    matches!(
        type_code,
        POINT_M | POINT_ZM
            | MULTIPOINT_M
            | MULTIPOINT_ZM
            | POLYLINE_M
            | POLYLINE_ZM
            | POLYGON_M
            | POLYGON_ZM
    )
}

/// Decode one binary shape buffer into a geometry tagged with the given
/// coordinate system.
///
/// Fails with [`ParseError::UnsupportedGeometry`] when the curves bit is set
/// or the type code is outside the supported table, and with
/// [`ParseError::MalformedInput`] when the buffer ends before the fields its
/// type word promises.
pub fn decode_shape(
    bytes: &[u8],
    spatial_reference: SpatialReference,
) -> Result<Geometry, ParseError> {
    let mut cursor = Cursor::new(bytes);

    let type_word = cursor.read_i32::<LittleEndian>()?;
    let type_code = type_word & 0x0000_00ff;
    let modifier = (type_word as u32) & 0xff00_0000;

    let flags = ShapeFlags {
        has_z: modifier & MODIFIER_HAS_Z != 0 || intrinsic_has_z(type_code),
        has_m: modifier & MODIFIER_HAS_M != 0 || intrinsic_has_m(type_code),
        has_id: modifier & MODIFIER_HAS_ID != 0,
    };

    if modifier & MODIFIER_HAS_CURVES != 0 {
        return Err(ParseError::UnsupportedGeometry(
            "geometries with curves are unsupported".to_string(),
        ));
    }

    let category = classify(type_code).ok_or_else(|| {
        ParseError::UnsupportedGeometry(format!("unrecognized shape type code {type_code}"))
    })?;

    match category {
        ShapeCategory::Point => {
            let x = cursor.read_f64::<LittleEndian>()?;
            let y = cursor.read_f64::<LittleEndian>()?;

            let z = if flags.has_z {
                Some(translate_nan(cursor.read_f64::<LittleEndian>()?))
            } else {
                None
            };
            let m = if flags.has_m {
                Some(translate_nan(cursor.read_f64::<LittleEndian>()?))
            } else {
                None
            };

            Ok(Geometry::Point(Point {
                x,
                y,
                z,
                m,
                spatial_reference: Some(spatial_reference),
            }))
        }
        ShapeCategory::Multipoint => {
            skip_bounding_box(&mut cursor);

            let point_count = cursor.read_i32::<LittleEndian>()?;
            let points = read_point_array(&mut cursor, point_count, &flags)?;

            Ok(Geometry::Multipoint(Multipoint {
                points,
                has_z: flags.has_z,
                has_m: flags.has_m,
                spatial_reference: Some(spatial_reference),
            }))
        }
        ShapeCategory::Polyline | ShapeCategory::Polygon => {
            skip_bounding_box(&mut cursor);

            let part_count = cursor.read_i32::<LittleEndian>()?;
            let point_count = cursor.read_i32::<LittleEndian>()?;

            let mut part_indices = Vec::new();
            for _ in 0..part_count {
                part_indices.push(cursor.read_i32::<LittleEndian>()?);
            }

            let points = read_point_array(&mut cursor, point_count, &flags)?;
            let parts = split_parts(&points, &part_indices);

            if category == ShapeCategory::Polyline {
                Ok(Geometry::Polyline(Polyline {
                    paths: parts,
                    has_z: flags.has_z,
                    has_m: flags.has_m,
                    spatial_reference: Some(spatial_reference),
                }))
            } else {
                Ok(Geometry::Polygon(Polygon {
                    rings: parts,
                    has_z: flags.has_z,
                    has_m: flags.has_m,
                    spatial_reference: Some(spatial_reference),
                }))
            }
        }
    }
}

/// Skip the 4-field (xmin, ymin, xmax, ymax) bounding box.
fn skip_bounding_box(cursor: &mut Cursor<&[u8]>) {
    cursor.set_position(cursor.position() + 4 * 8);
}

/// Skip a 2-field (min, max) range box preceding a z or m value run.
fn skip_range_box(cursor: &mut Cursor<&[u8]>) {
    cursor.set_position(cursor.position() + 2 * 8);
}

/// Read `point_count` x/y pairs, then the optional z and m runs (each
/// preceded by a range box), appending components to each point in order.
fn read_point_array(
    cursor: &mut Cursor<&[u8]>,
    point_count: i32,
    flags: &ShapeFlags,
) -> Result<Vec<Coordinate>, ParseError> {
    let mut points = Vec::new();
    for _ in 0..point_count {
        let x = cursor.read_f64::<LittleEndian>()?;
        let y = cursor.read_f64::<LittleEndian>()?;
        points.push(vec![x, y]);
    }

    if flags.has_z {
        skip_range_box(cursor);
        for point in points.iter_mut() {
            point.push(translate_nan(cursor.read_f64::<LittleEndian>()?));
        }
    }

    if flags.has_m {
        skip_range_box(cursor);
        for point in points.iter_mut() {
            point.push(translate_nan(cursor.read_f64::<LittleEndian>()?));
        }
    }

    Ok(points)
}

/// Split a flat point run into parts using the start-index table. Part i
/// spans [start[i], start[i+1]); the last part runs to the end. Indices are
/// clamped to the available range.
fn split_parts(points: &[Coordinate], part_indices: &[i32]) -> Vec<Vec<Coordinate>> {
    let mut parts = Vec::with_capacity(part_indices.len());
    for (i, &start_index) in part_indices.iter().enumerate() {
        let start = (start_index.max(0) as usize).min(points.len());
        let end = match part_indices.get(i + 1) {
            Some(&next) => (next.max(0) as usize).min(points.len()),
            None => points.len(),
        };
        let end = end.max(start);
        parts.push(points[start..end].to_vec());
    }
    parts
}
