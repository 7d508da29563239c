pub mod app;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod provider;
pub mod server;

/// Default config file path - can be overridden via CLI argument
pub const CONFIG_PATH: &str = "config/agent.toml";

pub use app::{AgentSettings, AppConfig, QuerySource, SessionLogConfig};
pub use error::ConfigError;
pub use provider::ModelProviderConfig;
pub use server::ServerConfig;
