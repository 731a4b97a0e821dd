//! Model Context Protocol server for AI clients.
//!
//! Speaks JSON-RPC 2.0 over stdio, one message per line, and exposes three
//! tools backed by the same validation and engine as the HTTP API:
//! - `calculate_uc` - compute a monthly entitlement breakdown
//! - `get_lha_rate` - look up one Local Housing Allowance rate
//! - `list_lha_rates` - list every bedroom rate for an area

mod error;
mod protocol;
mod server;
mod tools;

pub use error::McpError;
pub use server::McpServer;
