use std::io::{BufRead, Write};

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::error::McpError;
use super::protocol::{
    Capabilities, InitializeResponse, JSONRPC_VERSION, JsonRpcError, JsonRpcMessage,
    JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ServerInfo, ToolCallResult,
    ToolListResponse, ToolsCapability,
};
use super::tools;
use crate::core::{AreaRateTable, RateSchedule};

const SERVER_NAME: &str = "universal-credit-calculator";

/// Stdio MCP server over one rate schedule and area-rate table.
pub struct McpServer {
    rates: RateSchedule,
    area_rates: AreaRateTable,
}

impl McpServer {
    pub fn new(rates: RateSchedule, area_rates: AreaRateTable) -> Self {
        Self { rates, area_rates }
    }

    /// Serves stdin/stdout until stdin closes.
    pub fn run(&self) -> Result<(), McpError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Reads one JSON-RPC message per line and writes one response per line.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<(), McpError> {
        info!(policy_year = %self.rates.policy_year, "MCP server started");

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            debug!(request = %line, "received request");

            if let Some(message) = self.handle_line(&line) {
                write_response(&mut writer, &message)?;
            }
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Handles one raw line. Notifications produce no response.
    fn handle_line(&self, line: &str) -> Option<JsonRpcMessage> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "failed to parse request");
                return Some(JsonRpcMessage::Error(JsonRpcError::new(
                    None,
                    -32700,
                    format!("Parse error: {e}"),
                )));
            }
        };

        if request.id.is_none() {
            debug!(method = %request.method, "notification");
            return None;
        }

        let id = request.id.clone();
        Some(match self.handle_request(request) {
            Ok(result) => JsonRpcMessage::Response(JsonRpcResponse::new(id, result)),
            Err(e) => {
                warn!(error = %e, "request failed");
                JsonRpcMessage::Error(JsonRpcError::new(id, e.error_code(), e.to_string()))
            }
        })
    }

    fn handle_request(&self, request: JsonRpcRequest) -> Result<Value, McpError> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(McpError::InvalidRequest(format!(
                "unsupported jsonrpc version {}",
                request.jsonrpc
            )));
        }

        match request.method.as_str() {
            "initialize" => Ok(serde_json::to_value(InitializeResponse {
                protocol_version: PROTOCOL_VERSION,
                server_info: ServerInfo {
                    name: SERVER_NAME,
                    version: env!("CARGO_PKG_VERSION"),
                },
                capabilities: Capabilities {
                    tools: ToolsCapability {
                        list_changed: false,
                    },
                },
            })?),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(serde_json::to_value(ToolListResponse {
                tools: tools::definitions(),
            })?),
            "tools/call" => self.handle_tool_call(request.params),
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_tool_call(&self, params: Value) -> Result<Value, McpError> {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return Err(McpError::InvalidParams("Missing tool name".to_string()));
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let outcome = match name {
            tools::CALCULATE_UC => tools::calculate_uc(arguments, &self.rates, &self.area_rates),
            tools::GET_LHA_RATE => tools::get_lha_rate(arguments, &self.area_rates),
            tools::LIST_LHA_RATES => tools::list_lha_rates(arguments, &self.area_rates),
            other => return Err(McpError::ToolNotFound(other.to_string())),
        };

        let result = match outcome {
            Ok(text) => {
                info!(tool = name, "tool call completed");
                ToolCallResult::text(text)
            }
            Err(message) => {
                warn!(tool = name, error = %message, "tool call rejected");
                ToolCallResult::error(message)
            }
        };
        Ok(serde_json::to_value(result)?)
    }
}

fn write_response<W: Write>(writer: &mut W, message: &JsonRpcMessage) -> Result<(), McpError> {
    let line = serde_json::to_string(message)?;
    writeln!(writer, "{line}")?;
    writer.flush()?;
    debug!(response = %line, "sent response");
    Ok(())
}
