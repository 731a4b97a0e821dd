use thiserror::Error;

/// Failures that end a request with a JSON-RPC error object.
///
/// Tool-level problems (bad arguments, unknown area) are reported inside a
/// successful `tools/call` result with `isError` set instead.
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code for this failure.
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::InvalidRequest(_) => -32600,
            McpError::InvalidParams(_) => -32602,
            McpError::MethodNotFound(_) => -32601,
            McpError::ToolNotFound(_) => -32601,
            McpError::JsonError(_) => -32603,
            McpError::IoError(_) => -32000,
        }
    }
}
