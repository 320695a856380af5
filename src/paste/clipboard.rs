//! ArcGIS Pro clipboard XML interpretation
//!
//! Copying rows in ArcGIS Pro puts an ArrayOfPropertySet document on the
//! clipboard: one PropertySet per row, each holding a PropertyArray of
//! key/value properties. A property whose value is typed as a binary
//! shape nests the coordinate system WKID and a base64 byte payload;
//! every other property becomes a plain string attribute.

use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParseError;
use crate::geometry::{decode_shape, Feature, SpatialReference};
use crate::parse_xml::XmlNode;

/// Property value types that carry a binary shape payload.
fn is_shape_value_type(value_type: &str) -> bool {
    value_type.ends_with("PointB")
        || value_type.ends_with("MultipointB")
        || value_type.ends_with("PolylineB")
        || value_type.ends_with("PolygonB")
}

/// Interpret a parsed XML document as ArcGIS Pro clipboard content.
///
/// Returns `Ok(None)` when the document is not clipboard-shaped, so the
/// sniffing loop can move on. Once a PropertyArray has been recognized
/// the interpretation is committed: a malformed embedded shape fails the
/// whole paste instead of falling through.
pub fn parse_clipboard_document(root: &XmlNode) -> Result<Option<Vec<Feature>>, ParseError> {
    if root.name != "ArrayOfPropertySet" {
        return Ok(None);
    }

    let mut features = Vec::new();
    for property_set in root.children.iter().filter(|n| n.name == "PropertySet") {
        for property_array in property_set
            .children
            .iter()
            .filter(|n| n.name == "PropertyArray")
        {
            features.push(feature_from_property_array(property_array)?);
        }
    }

    if features.is_empty() {
        return Ok(None);
    }
    tracing::debug!(count = features.len(), "read clipboard property sets");
    Ok(Some(features))
}

fn feature_from_property_array(property_array: &XmlNode) -> Result<Feature, ParseError> {
    let mut attributes = IndexMap::new();
    let mut geometry = None;

    for property in property_array
        .children
        .iter()
        .filter(|n| n.name == "PropertySetProperty")
    {
        let key = property
            .children
            .iter()
            .find(|n| n.name == "Key")
            .ok_or_else(|| {
                ParseError::MalformedInput("clipboard property has no Key element".to_string())
            })?;
        let value = property
            .children
            .iter()
            .find(|n| n.name == "Value")
            .ok_or_else(|| {
                ParseError::MalformedInput("clipboard property has no Value element".to_string())
            })?;

        let value_type = value
            .attributes
            .get("xsi:type")
            .map(String::as_str)
            .unwrap_or("");

        if is_shape_value_type(value_type) {
            let spatial_reference = shape_spatial_reference(value)?;
            let bytes = shape_bytes(value)?;
            geometry = Some(decode_shape(&bytes, spatial_reference)?);
        } else {
            attributes.insert(
                key.text_content.clone(),
                Value::String(value.text_content.clone()),
            );
        }
    }

    Ok(Feature {
        attributes,
        geometry,
    })
}

fn shape_spatial_reference(value: &XmlNode) -> Result<SpatialReference, ParseError> {
    let wkid = value
        .children
        .iter()
        .find(|n| n.name == "SpatialReference")
        .and_then(|sr| sr.children.iter().find(|n| n.name == "WKID"))
        .ok_or_else(|| {
            ParseError::MalformedInput("binary shape value has no WKID".to_string())
        })?;
    let wkid = wkid.text_content.parse::<i32>().map_err(|_| {
        ParseError::MalformedInput(format!("WKID '{}' is not an integer", wkid.text_content))
    })?;
    Ok(SpatialReference::new(wkid))
}

fn shape_bytes(value: &XmlNode) -> Result<Vec<u8>, ParseError> {
    let bytes = value
        .children
        .iter()
        .find(|n| n.name == "Bytes")
        .ok_or_else(|| {
            ParseError::MalformedInput("binary shape value has no Bytes element".to_string())
        })?;
    // Clipboard base64 may be wrapped; strip any whitespace before decoding.
    let payload: String = bytes
        .text_content
        .split_whitespace()
        .collect();
    Ok(general_purpose::STANDARD.decode(payload)?)
}
