use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("model provider '{provider}' is missing required field 'endpoint'")]
    MissingEndpoint { provider: String },

    #[error("server '{server}' has an empty command")]
    EmptyServerCommand { server: String },

    #[error("'{field}' must be greater than zero")]
    InvalidTimeout { field: &'static str },

    #[error("query description must not be empty in fixed mode")]
    EmptyDescription,

    #[error("unknown query mode '{mode}' (expected 'fixed' or 'interactive')")]
    UnknownQueryMode { mode: String },
}
