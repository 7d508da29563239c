//! Application constants

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Client name announced to MCP servers during `initialize`
pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");

/// Client version announced to MCP servers during `initialize`
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
