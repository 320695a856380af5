//! Comma-separated coordinate fallback
//!
//! The last interpretation tried: a bare list of comma-delimited floats.
//! Two values make a point, four make an extent; anything else yields no
//! geometry. No coordinate system is ever known from this format.

use crate::geometry::{Extent, Geometry, Point};

/// Parse `x,y` or `xmin,ymin,xmax,ymax`. Returns `None` unless every
/// token parses as a float and the count is exactly 2 or 4.
pub fn parse_coordinate_list(source: &str) -> Option<Geometry> {
    let mut values = Vec::new();
    for token in source.split(',') {
        values.push(token.trim().parse::<f64>().ok()?);
    }

    match values.as_slice() {
        [x, y] => Some(Geometry::Point(Point::new(*x, *y))),
        [xmin, ymin, xmax, ymax] => Some(Geometry::Extent(Extent {
            xmin: *xmin,
            ymin: *ymin,
            xmax: *xmax,
            ymax: *ymax,
            spatial_reference: None,
        })),
        _ => None,
    }
}
