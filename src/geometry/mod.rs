//! Geometry module for pasted geodata
//!
//! This module provides the normalized geometry model and the codecs that
//! read and write it.
//!
//! # Submodules
//! - `types` - Core types (SpatialReference, Geometry variants, Feature)
//! - `shape` - Binary shape decoding for ArcGIS Pro clipboard buffers
//! - `esri_json` - Esri JSON geometry/feature codec
//! - `geojson` - GeoJSON reading

pub mod esri_json;
pub mod geojson;
mod shape;
mod types;

pub use shape::decode_shape;

pub use types::{
    Coordinate,
    Extent,
    Feature,
    Geometry,
    Multipoint,
    Point,
    Polygon,
    Polyline,
    SpatialReference,
};
