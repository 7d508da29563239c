use super::defaults::{
    DEFAULT_DESCRIPTION, DEFAULT_LOG_DIRECTORY, DEFAULT_MODEL, DEFAULT_STARTUP_TIMEOUT_SECS,
    DEFAULT_STYLE, DEFAULT_TOOL_TIMEOUT_SECS,
};
use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use crate::types::UserQuery;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ModelProviderConfig,
    pub model: String,
    pub server: ServerConfig,
    pub agent: AgentSettings,
    pub query: QuerySource,
    pub session_log: SessionLogConfig,
}

/// Timing limits for the agent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub tool_timeout: Duration,
    pub startup_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
        }
    }
}

/// Where the creative request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Fixed(UserQuery),
    /// Ask on the terminal; the style falls back to `default_style` when left blank.
    Interactive { default_style: String },
}

impl Default for QuerySource {
    fn default() -> Self {
        QuerySource::Fixed(UserQuery::new(DEFAULT_DESCRIPTION, DEFAULT_STYLE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLogConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for SessionLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ModelProviderConfig::default(),
            model: DEFAULT_MODEL.to_string(),
            server: ServerConfig::default(),
            agent: AgentSettings::default(),
            query: QuerySource::default(),
            session_log: SessionLogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text; `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, origin)
    }
}
