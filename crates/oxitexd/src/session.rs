//! The stdio message loop.
//!
//! Newline-delimited JSON-RPC 2.0: one message per line in, one reply per
//! line out. Notifications get no reply; an unparseable line gets a null-id
//! parse error, and valid JSON that is not a request object gets an
//! invalid-request reply under whatever id it carried. Nothing a client
//! sends can take the loop down short of closing the stream.

use anyhow::Result;
use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{self, Request, Response};
use crate::tools::ToolHost;

/// Protocol revision advertised in the initialize handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name advertised in `serverInfo`.
pub const SERVER_NAME: &str = "oxitex-server";

/// One client connection's worth of state.
pub struct Session {
    host: ToolHost,
}

impl Session {
    pub fn new(host: ToolHost) -> Self {
        Self { host }
    }

    /// Runs the message loop until the reader reaches end of input.
    ///
    /// Generic over its streams so tests can drive a whole session through
    /// in-memory buffers.
    pub async fn run<R, W>(&self, reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut payload = serde_json::to_string(&response)?;
                payload.push('\n');
                writer.write_all(payload.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        info!("client closed the stream, shutting down");
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Option<Response> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!("unparseable message: {err}");
                return Some(Response::failure(
                    Value::Null,
                    protocol::PARSE_ERROR,
                    format!("Parse error: {err}"),
                ));
            }
        };
        // Valid JSON that is not a request object still carries a usable id.
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<Request>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(err) => {
                warn!("invalid request object: {err}");
                Some(Response::failure(
                    id,
                    protocol::INVALID_REQUEST,
                    format!("Invalid request: {err}"),
                ))
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Option<Response> {
        if request.jsonrpc != protocol::JSONRPC_VERSION {
            let id = request.id.unwrap_or(Value::Null);
            return Some(Response::failure(
                id,
                protocol::INVALID_REQUEST,
                "Invalid request: expected jsonrpc \"2.0\"",
            ));
        }

        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => info!("client initialization complete"),
                other => debug!("ignoring notification: {other}"),
            }
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => Response::success(id, initialize_result()),
            "ping" => Response::success(id, json!({})),
            "tools/list" => Response::success(id, json!({ "tools": ToolHost::descriptors() })),
            "tools/call" => self.call_tool(id, request.params).await,
            other => Response::failure(
                id,
                protocol::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };
        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> Response {
        let Some(params) = params else {
            return Response::failure(
                id,
                protocol::INVALID_PARAMS,
                "tools/call requires params",
            );
        };
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return Response::failure(
                id,
                protocol::INVALID_PARAMS,
                "tools/call requires a tool name",
            );
        };
        let arguments = match params.get("arguments") {
            None => serde_json::Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Response::failure(
                    id,
                    protocol::INVALID_PARAMS,
                    "tool arguments must be an object",
                )
            }
        };

        let record = self.host.call(name, &arguments).await;
        let is_error = record.get("error").is_some();
        match serde_json::to_string_pretty(&record) {
            Ok(text) => Response::success(
                id,
                json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": is_error,
                }),
            ),
            Err(err) => Response::failure(
                id,
                protocol::INTERNAL_ERROR,
                format!("Failed to serialize tool result: {err}"),
            ),
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}
