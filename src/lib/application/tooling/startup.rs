use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use super::catalog::ToolCatalog;
use super::error::ToolInvokeError;
use super::interface::ToolProvider;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("tool provider was not ready within {0:?}")]
    TimedOut(Duration),
    #[error("tool provider failed to start: {0}")]
    Failed(#[from] ToolInvokeError),
    #[error("tool provider returned an empty tool catalog")]
    EmptyCatalog,
}

/// Establishes the provider session and fetches the catalog under a single deadline.
pub async fn connect(
    provider: &dyn ToolProvider,
    deadline: Duration,
) -> Result<ToolCatalog, StartupError> {
    info!(?deadline, "Waiting for tool provider");
    let tools = match tokio::time::timeout(deadline, provider.list_tools()).await {
        Ok(result) => result?,
        Err(_) => {
            error!(?deadline, "Timed out waiting for tool provider");
            return Err(StartupError::TimedOut(deadline));
        }
    };

    let catalog = ToolCatalog::from_server_tools(tools);
    if catalog.is_empty() {
        return Err(StartupError::EmptyCatalog);
    }
    info!(tools = catalog.len(), "Tool catalog loaded");
    Ok(catalog)
}
