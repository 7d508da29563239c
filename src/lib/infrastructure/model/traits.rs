//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// A text-generation backend: one prompt in, free text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Get the client ID
    fn id(&self) -> &str;

    /// Generate a completion for a single prompt
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
