//! Normalisation at the edges of the loop: the operator's query going in and
//! raw tool responses coming back.

use serde_json::Value;

use crate::types::{ContentItem, ToolResponse, ToolResult, UserQuery};

/// Renders the structured query as the task text given to the model.
pub fn process_user_query(query: &UserQuery) -> String {
    format!(
        "{}\n\nStyle preference: {}",
        query.description.trim(),
        query.style_preference.trim()
    )
}

/// Reads a `tools/call` result object into its tagged form.
pub fn read_tool_response(result: &Value) -> ToolResponse {
    match result.get("content") {
        Some(Value::Array(items)) => ToolResponse::StructuredItems(
            items
                .iter()
                .map(|item| match item.get("text").and_then(Value::as_str) {
                    Some(text) => ContentItem::Text(text.to_string()),
                    None => ContentItem::Other(item.clone()),
                })
                .collect(),
        ),
        Some(Value::String(text)) => ToolResponse::Text(text.clone()),
        Some(other) => ToolResponse::Text(other.to_string()),
        None => ToolResponse::Text(result.to_string()),
    }
}

/// Converts a raw provider response into the canonical [`ToolResult`].
pub fn normalize_tool_response(result: &Value) -> ToolResult {
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let content = read_tool_response(result).into_text();

    if is_error {
        let error = if content.trim().is_empty() {
            "tool reported an error".to_string()
        } else {
            content.clone()
        };
        ToolResult::failure_with_content(content, error)
    } else {
        ToolResult::success(content)
    }
}
