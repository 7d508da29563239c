mod catalog;
mod error;
mod interface;
mod process;
mod startup;

pub use catalog::{ParamSpec, ParamType, ToolCatalog, ToolDescriptor};
pub use error::ToolInvokeError;
pub use interface::{ServerToolInfo, ToolProvider};
pub use process::McpProcess;
pub use startup::{StartupError, connect};
