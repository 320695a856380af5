//! Request handlers for the paste server

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::protocol::{error_codes, Response};
use super::state::ServerState;
use crate::error::ParseError;
use crate::geometry::{esri_json, SpatialReference};
use crate::layer::parse_as_layer;
use crate::stringify::{
    stringify, GeometryReduction, NoProjection, OutputFormat, StringifyOptions,
};

/// Frame assumed for pastes that do not name their coordinate system and
/// callers that do not override it.
const DEFAULT_WKID: i32 = 4326;
const DEFAULT_COLOR: &str = "#ff0000";

fn decode_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| "missing params".to_string())?;
    serde_json::from_value(params).map_err(|err| format!("invalid params: {err}"))
}

fn error_code_for(err: &ParseError) -> i32 {
    match err {
        ParseError::UnsupportedGeometry(_) => error_codes::UNSUPPORTED_GEOMETRY,
        ParseError::MalformedInput(_) => error_codes::MALFORMED_INPUT,
        ParseError::UnknownFormat => error_codes::UNKNOWN_FORMAT,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasteParams {
    source: String,
    default_wkid: Option<i32>,
    color: Option<String>,
}

pub fn handle_paste(
    state: &mut ServerState,
    id: Option<Value>,
    params: Option<Value>,
) -> Response {
    let params: PasteParams = match decode_params(params) {
        Ok(params) => params,
        Err(message) => return Response::error(id, error_codes::INVALID_PARAMS, message),
    };

    let default_spatial_reference =
        SpatialReference::new(params.default_wkid.unwrap_or(DEFAULT_WKID));
    let color = params.color.as_deref().unwrap_or(DEFAULT_COLOR);

    match parse_as_layer(&params.source, default_spatial_reference, color) {
        Ok(layer) => {
            let feature_count = layer.features.len();
            let wkid = layer.spatial_reference.wkid;
            let layer_id = state.add_layer(layer);
            tracing::info!(layer_id, feature_count, wkid, "imported pasted layer");
            Response::success(
                id,
                json!({
                    "layerId": layer_id,
                    "featureCount": feature_count,
                    "wkid": wkid,
                }),
            )
        }
        Err(err) => {
            tracing::warn!(error = %err, "paste failed");
            Response::error(id, error_code_for(&err), err.to_string())
        }
    }
}

pub fn handle_layers(state: &ServerState, id: Option<Value>) -> Response {
    let layers: Vec<Value> = state
        .layers()
        .map(|(layer_id, layer)| {
            json!({
                "layerId": layer_id,
                "featureCount": layer.features.len(),
                "wkid": layer.spatial_reference.wkid,
                "color": layer.color,
            })
        })
        .collect();
    Response::success(id, json!({ "layers": layers }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerParams {
    layer_id: u32,
}

pub fn handle_features(
    state: &ServerState,
    id: Option<Value>,
    params: Option<Value>,
) -> Response {
    let params: LayerParams = match decode_params(params) {
        Ok(params) => params,
        Err(message) => return Response::error(id, error_codes::INVALID_PARAMS, message),
    };

    match state.layer(params.layer_id) {
        Some(layer) => {
            let features: Vec<Value> =
                layer.features.iter().map(esri_json::feature_to_json).collect();
            Response::success(id, json!({ "features": features }))
        }
        None => Response::error(
            id,
            error_codes::LAYER_NOT_FOUND,
            format!("no layer with id {}", params.layer_id),
        ),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringifyParams {
    layer_id: u32,
    feature_index: usize,
    format: String,
    geometry_type: Option<String>,
    wkid: Option<i32>,
}

pub fn handle_stringify(
    state: &ServerState,
    id: Option<Value>,
    params: Option<Value>,
) -> Response {
    let params: StringifyParams = match decode_params(params) {
        Ok(params) => params,
        Err(message) => return Response::error(id, error_codes::INVALID_PARAMS, message),
    };

    let layer = match state.layer(params.layer_id) {
        Some(layer) => layer,
        None => {
            return Response::error(
                id,
                error_codes::LAYER_NOT_FOUND,
                format!("no layer with id {}", params.layer_id),
            )
        }
    };

    let feature = match layer.features.get(params.feature_index) {
        Some(feature) => feature,
        None => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("no feature at index {}", params.feature_index),
            )
        }
    };

    let format = match OutputFormat::from_name(&params.format) {
        Some(format) => format,
        None => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("unknown output format '{}'", params.format),
            )
        }
    };

    let reduction = match params.geometry_type.as_deref() {
        None => GeometryReduction::Original,
        Some(name) => match GeometryReduction::from_name(name) {
            Some(reduction) => reduction,
            None => {
                return Response::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("unknown geometry type '{name}'"),
                )
            }
        },
    };

    let options = StringifyOptions {
        reduction,
        format,
        spatial_reference: SpatialReference::new(
            params.wkid.unwrap_or(layer.spatial_reference.wkid),
        ),
    };

    match stringify(feature, &options, &NoProjection) {
        Ok(text) => Response::success(id, json!({ "text": text })),
        Err(err) => Response::error(id, error_codes::INTERNAL_ERROR, err.to_string()),
    }
}

pub fn handle_remove_layer(
    state: &mut ServerState,
    id: Option<Value>,
    params: Option<Value>,
) -> Response {
    let params: LayerParams = match decode_params(params) {
        Ok(params) => params,
        Err(message) => return Response::error(id, error_codes::INVALID_PARAMS, message),
    };

    if state.remove_layer(params.layer_id) {
        Response::success(id, json!({ "removed": true }))
    } else {
        Response::error(
            id,
            error_codes::LAYER_NOT_FOUND,
            format!("no layer with id {}", params.layer_id),
        )
    }
}
