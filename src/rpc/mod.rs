//! JSON-RPC stdio server for clipboard geodata
//!
//! Line-delimited JSON-RPC: one request object per stdin line, one
//! response object per stdout line. Status and logging go to stderr so
//! stdout stays a clean protocol channel.
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types
//! - `state` - Imported-layer store
//! - `handlers` - Request handlers

pub mod handlers;
pub mod protocol;
pub mod state;

pub use protocol::{error_codes, ErrorResponse, Request, Response};
pub use state::ServerState;

use std::io::{BufRead, Write};

/// Dispatch one request to its handler.
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    match request.method.as_str() {
        "paste" => handlers::handle_paste(state, request.id, request.params),
        "layers" => handlers::handle_layers(state, request.id),
        "features" => handlers::handle_features(state, request.id, request.params),
        "stringify" => handlers::handle_stringify(state, request.id, request.params),
        "removeLayer" => handlers::handle_remove_layer(state, request.id, request.params),
        _ => Response::error(
            request.id,
            error_codes::METHOD_NOT_FOUND,
            format!("unknown method: {}", request.method),
        ),
    }
}

/// Serve line-delimited JSON-RPC until the input ends.
pub fn serve(input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
    let mut state = ServerState::new();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                tracing::debug!(method = %request.method, "handling request");
                dispatch(&mut state, request)
            }
            Err(err) => Response::error(
                None,
                error_codes::PARSE_ERROR,
                format!("invalid request: {err}"),
            ),
        };

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }

    Ok(())
}
