//! Action dispatcher: validates a tool call against the catalog, coerces its
//! arguments and invokes the provider under a deadline.

mod coercion;
mod reasoning;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::perception::normalize_tool_response;
use crate::application::tooling::{ToolCatalog, ToolProvider};
use crate::types::{ToolCall, ToolResult};

pub use coercion::{CoercionError, coerce_arguments};
pub use reasoning::{REASONING_DISPLAYED, parse_steps, render_plan, show_reasoning};

pub struct ActionDispatcher {
    provider: Arc<dyn ToolProvider>,
    catalog: ToolCatalog,
    timeout: Duration,
}

impl ActionDispatcher {
    pub fn new(provider: Arc<dyn ToolProvider>, catalog: ToolCatalog, timeout: Duration) -> Self {
        Self {
            provider,
            catalog,
            timeout,
        }
    }

    /// Executes one call. Every fault is folded into a failed [`ToolResult`].
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.is_show_reasoning() {
            let result = show_reasoning(&call.args);
            info!(tool = %call.name, success = result.success, "Reasoning displayed");
            return result;
        }

        let Some(descriptor) = self.catalog.get(&call.name) else {
            warn!(tool = %call.name, "Unknown tool requested by model");
            return ToolResult::failure(format!("unknown tool: {}", call.name));
        };

        let arguments = match coerce_arguments(descriptor, &call.args) {
            Ok(arguments) => arguments,
            Err(err) => {
                warn!(tool = %call.name, %err, "Argument coercion failed");
                return ToolResult::failure(err.to_string());
            }
        };

        debug!(tool = %call.name, timeout = ?self.timeout, "Dispatching tool call");
        let invocation = self
            .provider
            .call_tool(&call.name, Value::Object(arguments));
        let result = match tokio::time::timeout(self.timeout, invocation).await {
            Err(_) => {
                warn!(tool = %call.name, timeout = ?self.timeout, "Tool call timed out");
                return ToolResult::failure_with_content(
                    format!(
                        "{} execution timed out but the action may have completed",
                        call.name
                    ),
                    "no response within timeout",
                );
            }
            Ok(Err(err)) => {
                warn!(tool = %call.name, %err, "Tool execution failed");
                return ToolResult::failure(err.to_string());
            }
            Ok(Ok(raw)) => normalize_tool_response(&raw),
        };

        info!(tool = %call.name, success = result.success, "Tool executed");
        result
    }
}
