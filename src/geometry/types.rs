//! Normalized geometry and feature types
//!
//! Every paste format reduces to the same in-memory representation: a list
//! of features, each carrying an attribute map and an optional geometry
//! tagged with its coordinate system.

use indexmap::IndexMap;
use serde_json::Value;

/// Coordinate system identified by its well-known integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialReference {
    pub wkid: i32,
}

impl SpatialReference {
    /// WGS84 geographic coordinates, the fixed frame of all GeoJSON input.
    pub const WGS84: SpatialReference = SpatialReference { wkid: 4326 };

    pub fn new(wkid: i32) -> Self {
        SpatialReference { wkid }
    }
}

/// A single vertex: x, y, then z and m appended in that order when present.
pub type Coordinate = Vec<f64>;

/// A single location, with optional elevation and measure values.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub m: Option<f64>,
    pub spatial_reference: Option<SpatialReference>,
}

impl Point {
    /// A bare x/y point with no elevation, measure, or coordinate system.
    pub fn new(x: f64, y: f64) -> Self {
        Point {
            x,
            y,
            z: None,
            m: None,
            spatial_reference: None,
        }
    }
}

/// An unordered set of locations sharing one coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct Multipoint {
    pub points: Vec<Coordinate>,
    pub has_z: bool,
    pub has_m: bool,
    pub spatial_reference: Option<SpatialReference>,
}

/// One or more connected paths.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub paths: Vec<Vec<Coordinate>>,
    pub has_z: bool,
    pub has_m: bool,
    pub spatial_reference: Option<SpatialReference>,
}

/// One or more closed rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Vec<Coordinate>>,
    pub has_z: bool,
    pub has_m: bool,
    pub spatial_reference: Option<SpatialReference>,
}

/// An axis-aligned bounding rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub spatial_reference: Option<SpatialReference>,
}

/// Closed set of geometry variants produced by the paste pipeline.
///
/// Consumers match exhaustively; there is no open hierarchy behind this.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    Multipoint(Multipoint),
    Polyline(Polyline),
    Polygon(Polygon),
    Extent(Extent),
}

impl Geometry {
    pub fn spatial_reference(&self) -> Option<SpatialReference> {
        match self {
            Geometry::Point(g) => g.spatial_reference,
            Geometry::Multipoint(g) => g.spatial_reference,
            Geometry::Polyline(g) => g.spatial_reference,
            Geometry::Polygon(g) => g.spatial_reference,
            Geometry::Extent(g) => g.spatial_reference,
        }
    }

    pub fn set_spatial_reference(&mut self, spatial_reference: SpatialReference) {
        match self {
            Geometry::Point(g) => g.spatial_reference = Some(spatial_reference),
            Geometry::Multipoint(g) => g.spatial_reference = Some(spatial_reference),
            Geometry::Polyline(g) => g.spatial_reference = Some(spatial_reference),
            Geometry::Polygon(g) => g.spatial_reference = Some(spatial_reference),
            Geometry::Extent(g) => g.spatial_reference = Some(spatial_reference),
        }
    }
}

/// Attributes plus optional geometry, the unit every format reduces to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub attributes: IndexMap<String, Value>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// A feature carrying only geometry, with an empty attribute map.
    pub fn from_geometry(geometry: Geometry) -> Self {
        Feature {
            attributes: IndexMap::new(),
            geometry: Some(geometry),
        }
    }
}
