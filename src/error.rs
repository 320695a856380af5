//! Error taxonomy for the paste pipeline

use thiserror::Error;

/// Errors produced while interpreting pasted data.
///
/// During format sniffing, recognition failures are swallowed and the next
/// interpretation runs; only `UnknownFormat` escapes the sniffing loop
/// itself. Once an interpretation has committed (recognized clipboard XML,
/// a JSON document with a GeoJSON `type` field), failures inside it
/// propagate as `MalformedInput` or `UnsupportedGeometry`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The binary shape carries curves or an unrecognized type code.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// A committed interpretation failed partway through: truncated shape
    /// buffer, invalid base64, or an embedded structure that does not hold
    /// what its wrapper promised.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// No interpretation recognized the pasted text.
    #[error("unknown format")]
    UnknownFormat,
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::MalformedInput(format!("shape buffer ended early: {err}"))
    }
}

impl From<base64::DecodeError> for ParseError {
    fn from(err: base64::DecodeError) -> Self {
        ParseError::MalformedInput(format!("invalid base64 shape payload: {err}"))
    }
}
