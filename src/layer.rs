//! Imported layer construction
//!
//! A successful paste is promoted to a layer: the raw source text is kept
//! for re-copying, and the features share one resolved coordinate system.
//! When the paste format could not name its coordinate system, every
//! geometry is forced to the caller-supplied default; otherwise the layer
//! takes the first feature's frame.

use crate::error::ParseError;
use crate::geometry::{Feature, SpatialReference};
use crate::paste::{parse, ParseResult};

/// A pasted dataset promoted to a layer.
#[derive(Debug, Clone)]
pub struct ImportedLayer {
    /// The text that was pasted, kept verbatim.
    pub source: String,
    /// The coordinate system shared by all features after resolution.
    pub spatial_reference: SpatialReference,
    /// Display color, as a CSS color string.
    pub color: String,
    pub features: Vec<Feature>,
}

/// Parse pasted text and resolve its coordinate system into a layer.
pub fn parse_as_layer(
    source: &str,
    default_spatial_reference: SpatialReference,
    color: &str,
) -> Result<ImportedLayer, ParseError> {
    let ParseResult {
        mut features,
        unknown_spatial_reference,
    } = parse(source)?;

    let spatial_reference = if unknown_spatial_reference {
        for feature in features.iter_mut() {
            if let Some(geometry) = feature.geometry.as_mut() {
                geometry.set_spatial_reference(default_spatial_reference);
            }
        }
        default_spatial_reference
    } else {
        features
            .iter()
            .find_map(|feature| feature.geometry.as_ref())
            .and_then(|geometry| geometry.spatial_reference())
            .unwrap_or(default_spatial_reference)
    };

    Ok(ImportedLayer {
        source: source.to_string(),
        spatial_reference,
        color: color.to_string(),
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    #[test]
    fn unknown_frame_gets_the_default_stamped_on_every_geometry() {
        let layer = parse_as_layer("25,65", SpatialReference::new(3857), "#ff0000").unwrap();
        assert_eq!(layer.spatial_reference, SpatialReference::new(3857));
        match layer.features[0].geometry.as_ref().unwrap() {
            Geometry::Point(point) => {
                assert_eq!(point.spatial_reference, Some(SpatialReference::new(3857)));
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn known_frame_comes_from_the_first_feature() {
        let source = r#"{"geometry": {"x": 1, "y": 2, "spatialReference": {"wkid": 26911}}}"#;
        let layer = parse_as_layer(source, SpatialReference::WGS84, "#00ff00").unwrap();
        assert_eq!(layer.spatial_reference, SpatialReference::new(26911));
    }

    #[test]
    fn source_text_is_kept_verbatim() {
        let layer = parse_as_layer("0,0,10,10", SpatialReference::WGS84, "#0000ff").unwrap();
        assert_eq!(layer.source, "0,0,10,10");
        assert_eq!(layer.color, "#0000ff");
    }
}
