use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the planning pseudo-tool handled locally by the dispatcher.
pub const SHOW_REASONING: &str = "show_reasoning";

/// A requested invocation of one tool, as chosen by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn is_show_reasoning(&self) -> bool {
        self.name == SHOW_REASONING
    }

    /// Arguments rendered as compact JSON, the form used in transcripts.
    pub fn args_json(&self) -> String {
        Value::Object(self.args.clone()).to_string()
    }
}

/// Outcome of executing a [`ToolCall`].
///
/// `content` is always present (possibly empty); `error` is only set on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn failure_with_content(content: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
            error: Some(error.into()),
        }
    }
}

/// What the decision engine concluded for one iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Call(ToolCall),
    FinalAnswer(String),
}

/// Structured creative request supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
    pub description: String,
    pub style_preference: String,
}

impl UserQuery {
    pub fn new(description: impl Into<String>, style_preference: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            style_preference: style_preference.into(),
        }
    }
}

/// Content returned by an external tool before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    Text(String),
    StructuredItems(Vec<ContentItem>),
}

/// One element of a structured tool response.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    Other(Value),
}

impl ContentItem {
    pub fn render(&self) -> String {
        match self {
            ContentItem::Text(text) => text.clone(),
            ContentItem::Other(value) => value.to_string(),
        }
    }
}

impl ToolResponse {
    /// Joins structured items with a single space; plain text is returned as is.
    pub fn into_text(self) -> String {
        match self {
            ToolResponse::Text(text) => text,
            ToolResponse::StructuredItems(items) => items
                .iter()
                .map(ContentItem::render)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
