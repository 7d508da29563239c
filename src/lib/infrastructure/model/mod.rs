//! Model infrastructure module
//!
//! Text-generation backends used by the decision engine.
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - ModelClient trait
//! - `factory` - Creates the configured client
//! - `clients` - Individual client implementations

pub mod clients;
pub mod factory;
pub mod traits;
pub mod types;

pub use factory::ProviderFactory;
pub use traits::ModelClient;
pub use types::{ModelError, ModelRequest, ModelResponse};
