//! Feature re-serialization
//!
//! The copy path: a feature's geometry is projected into the requested
//! coordinate system (through an opaque projection seam), optionally
//! reduced to its extent or centroid, and formatted as an Esri JSON
//! feature, a bare Esri JSON geometry, or comma-separated text. CSV
//! output exists only for points (`x,y`) and extents
//! (`xmin,ymin,xmax,ymax`); other shapes produce no CSV.

use crate::geometry::{esri_json, Extent, Feature, Geometry, Point, SpatialReference};

/// Geometry reduction applied before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryReduction {
    Original,
    Extent,
    Centroid,
}

impl GeometryReduction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "original" => Some(GeometryReduction::Original),
            "extent" => Some(GeometryReduction::Extent),
            "centroid" => Some(GeometryReduction::Centroid),
            _ => None,
        }
    }
}

/// Output text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    JsonFeature,
    JsonGeometry,
    Csv,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json-feature" => Some(OutputFormat::JsonFeature),
            "json-geometry" => Some(OutputFormat::JsonGeometry),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringifyOptions {
    pub reduction: GeometryReduction,
    pub format: OutputFormat,
    pub spatial_reference: SpatialReference,
}

/// Reprojection seam. The math lives elsewhere; this pipeline only needs
/// `project` to return the same shape expressed in the target frame.
pub trait ProjectGeometry {
    fn project(
        &self,
        geometry: &Geometry,
        target: SpatialReference,
    ) -> anyhow::Result<Geometry>;
}

/// Seam implementation for pipelines with no projection engine wired in:
/// refuses any cross-frame request.
pub struct NoProjection;

impl ProjectGeometry for NoProjection {
    fn project(
        &self,
        geometry: &Geometry,
        target: SpatialReference,
    ) -> anyhow::Result<Geometry> {
        let source = geometry
            .spatial_reference()
            .map(|sr| sr.wkid.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        anyhow::bail!(
            "no projection engine configured (cannot project wkid {} to {})",
            source,
            target.wkid
        )
    }
}

/// Serialize one feature. Returns `Ok(None)` when the requested format
/// has no representation for the feature's geometry.
pub fn stringify(
    feature: &Feature,
    options: &StringifyOptions,
    projector: &dyn ProjectGeometry,
) -> anyhow::Result<Option<String>> {
    let mut geometry = None;
    if let Some(original) = &feature.geometry {
        let projected = match original.spatial_reference() {
            Some(source) if source != options.spatial_reference => {
                projector.project(original, options.spatial_reference)?
            }
            _ => original.clone(),
        };
        geometry = match options.reduction {
            GeometryReduction::Original => Some(projected),
            GeometryReduction::Extent => extent_of(&projected).map(Geometry::Extent),
            GeometryReduction::Centroid => centroid_of(&projected).map(Geometry::Point),
        };
    }

    match options.format {
        OutputFormat::JsonFeature => {
            let reduced = Feature {
                attributes: feature.attributes.clone(),
                geometry,
            };
            let text = serde_json::to_string(&esri_json::feature_to_json(&reduced))?;
            Ok(Some(text))
        }
        OutputFormat::JsonGeometry => match geometry {
            Some(geometry) => {
                let text = serde_json::to_string(&esri_json::geometry_to_json(&geometry))?;
                Ok(Some(text))
            }
            None => Ok(None),
        },
        OutputFormat::Csv => Ok(geometry.as_ref().and_then(csv_of)),
    }
}

fn csv_of(geometry: &Geometry) -> Option<String> {
    match geometry {
        Geometry::Point(point) => Some(format!("{},{}", point.x, point.y)),
        Geometry::Extent(extent) => Some(format!(
            "{},{},{},{}",
            extent.xmin, extent.ymin, extent.xmax, extent.ymax
        )),
        _ => None,
    }
}

/// Axis-aligned bounds of a geometry. `None` when there are no vertices
/// to bound.
pub fn extent_of(geometry: &Geometry) -> Option<Extent> {
    let spatial_reference = geometry.spatial_reference();

    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    let mut cover = |x: f64, y: f64| {
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((xmin, ymin, xmax, ymax)) => {
                (xmin.min(x), ymin.min(y), xmax.max(x), ymax.max(y))
            }
        });
    };

    match geometry {
        Geometry::Point(point) => cover(point.x, point.y),
        Geometry::Multipoint(multipoint) => {
            for point in &multipoint.points {
                cover(point[0], point[1]);
            }
        }
        Geometry::Polyline(polyline) => {
            for path in &polyline.paths {
                for point in path {
                    cover(point[0], point[1]);
                }
            }
        }
        Geometry::Polygon(polygon) => {
            for ring in &polygon.rings {
                for point in ring {
                    cover(point[0], point[1]);
                }
            }
        }
        Geometry::Extent(extent) => return Some(extent.clone()),
    }

    bounds.map(|(xmin, ymin, xmax, ymax)| Extent {
        xmin,
        ymin,
        xmax,
        ymax,
        spatial_reference,
    })
}

/// Representative point of a geometry: the point itself, an extent's
/// center, the vertex mean of a multipoint or polyline, or the area
/// centroid of a polygon's first ring (vertex mean when the ring is
/// degenerate).
pub fn centroid_of(geometry: &Geometry) -> Option<Point> {
    let spatial_reference = geometry.spatial_reference();
    let at = |x: f64, y: f64| Point {
        x,
        y,
        z: None,
        m: None,
        spatial_reference,
    };

    match geometry {
        Geometry::Point(point) => Some(point.clone()),
        Geometry::Extent(extent) => Some(at(
            (extent.xmin + extent.xmax) / 2.0,
            (extent.ymin + extent.ymax) / 2.0,
        )),
        Geometry::Multipoint(multipoint) => vertex_mean(&multipoint.points).map(|(x, y)| at(x, y)),
        Geometry::Polyline(polyline) => {
            let all: Vec<_> = polyline.paths.iter().flatten().cloned().collect();
            vertex_mean(&all).map(|(x, y)| at(x, y))
        }
        Geometry::Polygon(polygon) => {
            let ring = polygon.rings.first()?;
            ring_centroid(ring)
                .or_else(|| vertex_mean(ring))
                .map(|(x, y)| at(x, y))
        }
    }
}

fn vertex_mean(points: &[Vec<f64>]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), point| (sx + point[0], sy + point[1]));
    let n = points.len() as f64;
    Some((sx / n, sy / n))
}

/// Shoelace centroid of a closed ring. `None` when the signed area is too
/// small to divide by.
fn ring_centroid(ring: &[Vec<f64>]) -> Option<(f64, f64)> {
    if ring.len() < 3 {
        return None;
    }
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let (x0, y0) = (ring[i][0], ring[i][1]);
        let j = (i + 1) % ring.len();
        let (x1, y1) = (ring[j][0], ring[j][1]);
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    area /= 2.0;
    if area.abs() < f64::EPSILON {
        return None;
    }
    Some((cx / (6.0 * area), cy / (6.0 * area)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn point_feature(x: f64, y: f64, wkid: i32) -> Feature {
        Feature::from_geometry(Geometry::Point(Point {
            x,
            y,
            z: None,
            m: None,
            spatial_reference: Some(SpatialReference::new(wkid)),
        }))
    }

    fn options(
        reduction: GeometryReduction,
        format: OutputFormat,
        wkid: i32,
    ) -> StringifyOptions {
        StringifyOptions {
            reduction,
            format,
            spatial_reference: SpatialReference::new(wkid),
        }
    }

    /// Records whether `project` ran; shifts x by 1000 so the move is
    /// visible in output.
    struct ShiftProjector {
        called: Cell<bool>,
    }

    impl ProjectGeometry for ShiftProjector {
        fn project(
            &self,
            geometry: &Geometry,
            target: SpatialReference,
        ) -> anyhow::Result<Geometry> {
            self.called.set(true);
            let mut projected = geometry.clone();
            if let Geometry::Point(point) = &mut projected {
                point.x += 1000.0;
            }
            projected.set_spatial_reference(target);
            Ok(projected)
        }
    }

    #[test]
    fn csv_point_is_two_fields() {
        let feature = point_feature(25.0, 65.0, 4326);
        let text = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 4326),
            &NoProjection,
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("25,65"));
    }

    #[test]
    fn csv_extent_is_four_fields() {
        let feature = Feature::from_geometry(Geometry::Extent(Extent {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 10.0,
            spatial_reference: Some(SpatialReference::WGS84),
        }));
        let text = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 4326),
            &NoProjection,
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("0,0,10,10"));
    }

    #[test]
    fn csv_of_a_polygon_yields_nothing() {
        let feature = Feature::from_geometry(Geometry::Polygon(crate::geometry::Polygon {
            rings: vec![vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![0.0, 4.0], vec![0.0, 0.0]]],
            has_z: false,
            has_m: false,
            spatial_reference: Some(SpatialReference::WGS84),
        }));
        let text = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 4326),
            &NoProjection,
        )
        .unwrap();
        assert_eq!(text, None);
    }

    #[test]
    fn extent_reduction_bounds_the_polygon() {
        let feature = Feature::from_geometry(Geometry::Polygon(crate::geometry::Polygon {
            rings: vec![vec![vec![1.0, 2.0], vec![5.0, 2.0], vec![5.0, 8.0], vec![1.0, 2.0]]],
            has_z: false,
            has_m: false,
            spatial_reference: Some(SpatialReference::WGS84),
        }));
        let text = stringify(
            &feature,
            &options(GeometryReduction::Extent, OutputFormat::Csv, 4326),
            &NoProjection,
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("1,2,5,8"));
    }

    #[test]
    fn centroid_reduction_of_an_extent_is_its_center() {
        let feature = Feature::from_geometry(Geometry::Extent(Extent {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 20.0,
            spatial_reference: Some(SpatialReference::WGS84),
        }));
        let text = stringify(
            &feature,
            &options(GeometryReduction::Centroid, OutputFormat::Csv, 4326),
            &NoProjection,
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("5,10"));
    }

    #[test]
    fn square_ring_centroid_is_its_middle() {
        let ring = vec![
            vec![0.0, 0.0],
            vec![4.0, 0.0],
            vec![4.0, 4.0],
            vec![0.0, 4.0],
            vec![0.0, 0.0],
        ];
        let (cx, cy) = ring_centroid(&ring).unwrap();
        assert!((cx - 2.0).abs() < 1e-9);
        assert!((cy - 2.0).abs() < 1e-9);
    }

    #[test]
    fn matching_frames_skip_the_projector() {
        let feature = point_feature(1.0, 2.0, 4326);
        let projector = ShiftProjector {
            called: Cell::new(false),
        };
        stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 4326),
            &projector,
        )
        .unwrap();
        assert!(!projector.called.get());
    }

    #[test]
    fn mismatched_frames_project_first() {
        let feature = point_feature(1.0, 2.0, 4326);
        let projector = ShiftProjector {
            called: Cell::new(false),
        };
        let text = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 3857),
            &projector,
        )
        .unwrap();
        assert!(projector.called.get());
        assert_eq!(text.as_deref(), Some("1001,2"));
    }

    #[test]
    fn json_feature_keeps_attributes() {
        let mut feature = point_feature(1.0, 2.0, 4326);
        feature
            .attributes
            .insert("name".to_string(), json!("sample"));
        let text = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::JsonFeature, 4326),
            &NoProjection,
        )
        .unwrap()
        .unwrap();
        let round: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(round["attributes"]["name"], json!("sample"));
        assert_eq!(round["geometry"]["x"], json!(1.0));
    }

    #[test]
    fn no_projection_refuses_cross_frame_requests() {
        let feature = point_feature(1.0, 2.0, 4326);
        let result = stringify(
            &feature,
            &options(GeometryReduction::Original, OutputFormat::Csv, 3857),
            &NoProjection,
        );
        assert!(result.is_err());
    }
}
