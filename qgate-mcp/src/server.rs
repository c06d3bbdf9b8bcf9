//! Line-delimited JSON-RPC loop exposing the quality tool.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use jsonschema::Validator;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use qgate::StepRunner;

use crate::protocol::{ErrorCode, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse};
use crate::tool::{self, TOOL_NAME, ToolArgs};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "qgate-mcp";

pub struct McpServer<R> {
    project_dir: PathBuf,
    runner: R,
    validator: Validator,
}

impl<R: StepRunner> McpServer<R> {
    pub fn new(project_dir: PathBuf, runner: R) -> Result<Self> {
        Ok(Self {
            project_dir,
            runner,
            validator: tool::argument_validator()?,
        })
    }

    /// Serve requests from `input` until EOF. One JSON message per line.
    pub fn serve<Rd: BufRead, W: Write>(&self, input: Rd, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("read request")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle(request),
                Err(err) => {
                    warn!(%err, "unparseable request");
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        ErrorCode::ParseError,
                        format!("parse error: {err}"),
                    ))
                }
            };
            if let Some(response) = response {
                let encoded = serde_json::to_string(&response).context("encode response")?;
                writeln!(output, "{encoded}").context("write response")?;
                output.flush().context("flush response")?;
            }
        }
        info!("input closed");
        Ok(())
    }

    /// Dispatch one request. Notifications never get a response.
    pub fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "request");
        if request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                ErrorCode::InvalidRequest,
                format!("unsupported jsonrpc version {:?}", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => match tool::descriptor() {
                Ok(descriptor) => JsonRpcResponse::success(id, json!({ "tools": [descriptor] })),
                Err(err) => {
                    JsonRpcResponse::error(id, ErrorCode::InternalError, format!("{err:#}"))
                }
            },
            "tools/call" => self.call_tool(id, request.params.as_ref()),
            other => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("method not found: {other}"),
            ),
        };
        Some(response)
    }

    fn call_tool(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if name != TOOL_NAME {
            return JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                format!("unknown tool: {name:?}"),
            );
        }
        let args: ToolArgs =
            match tool::parse_args(&self.validator, params.and_then(|p| p.get("arguments"))) {
                Ok(args) => args,
                Err(err) => {
                    return JsonRpcResponse::error(id, ErrorCode::InvalidParams, err.to_string());
                }
            };

        info!(mode = ?args.mode, "running quality checks");
        let output = tool::run_quality_checks(&self.project_dir, &self.runner, &args);
        JsonRpcResponse::success(
            id,
            json!({
                "content": [{ "type": "text", "text": output.text }],
                "isError": output.is_error,
            }),
        )
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
