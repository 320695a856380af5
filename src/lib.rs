//! Clipboard geodata parsing and re-serialization
//!
//! Pasted geographic data arrives in one of several unmarked formats:
//! GeoJSON, Esri JSON, ArcGIS Pro clipboard XML with embedded binary
//! shapes, or bare comma-separated coordinates. This crate sniffs the
//! format, decodes the geometry into a normalized feature model, and can
//! serialize features back out as JSON or CSV text.
//!
//! # Module Structure
//! - `parse_xml` - Generic XML tree parsing
//! - `geometry` - Normalized geometry model, shape decoding, JSON codecs
//! - `paste` - Format-sniffing parser
//! - `layer` - Imported-layer construction and spatial-reference policy
//! - `stringify` - Feature re-serialization
//! - `rpc` - JSON-RPC stdio server
//! - `error` - Error taxonomy

pub mod error;
pub mod geometry;
pub mod layer;
pub mod parse_xml;
pub mod paste;
pub mod rpc;
pub mod stringify;

// Re-export the types most callers need
pub use error::ParseError;
pub use geometry::{Feature, Geometry, SpatialReference};
pub use layer::{parse_as_layer, ImportedLayer};
pub use paste::{parse, ParseResult};
