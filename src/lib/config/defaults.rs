pub const DEFAULT_PROVIDER_TYPE: &str = "gemini";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_SERVER_NAME: &str = "paint";
pub const DEFAULT_SERVER_COMMAND: &str = "python";
pub const DEFAULT_SERVER_ARGS: &[&str] = &["paint_mcp_tools.py"];

pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_STYLE: &str = "abstract";
pub const DEFAULT_DESCRIPTION: &str = "Get creative with shapes! Open paint and draw a rectangle with corner points (272,310) and (559, 657). Then draw some more ovals, rectangles, and arrows in the canvas. The final image should represent an abstract idea from Greek mythology. Add text in the canvas to describe the idea you've drawn.";

pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
