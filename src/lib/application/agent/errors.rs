use crate::application::tooling::StartupError;
use crate::config::ConfigError;
use thiserror::Error;

use super::memory::MemoryError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("agent state violation: {0}")]
    Memory(#[from] MemoryError),
    #[error("failed to read user input: {0}")]
    Input(#[from] std::io::Error),
}
