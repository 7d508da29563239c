use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

/// A tool as advertised by the provider in `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

/// Session handle to the external tool provider.
///
/// Implementations must tolerate being dropped mid-call: the dispatcher abandons
/// `call_tool` futures on timeout.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError>;

    /// Returns the raw `tools/call` result object.
    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError>;
}
