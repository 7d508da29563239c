use super::CONFIG_PATH;
use super::app::{AgentSettings, AppConfig, QuerySource, SessionLogConfig};
use super::defaults::{DEFAULT_DESCRIPTION, DEFAULT_MODEL, DEFAULT_STYLE};
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawModelSection};
use super::server::{RawServer, ServerConfig};
use crate::types::UserQuery;
use dotenvy::from_filename;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    model: RawModelSection,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    agent: RawAgent,
    #[serde(default)]
    query: RawQuery,
    #[serde(default)]
    session_log: RawSessionLog,
}

#[derive(Debug, Deserialize, Default)]
struct RawAgent {
    tool_timeout_secs: Option<u64>,
    startup_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawQuery {
    mode: Option<String>,
    description: Option<String>,
    style: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawSessionLog {
    #[serde(default)]
    enabled: bool,
    directory: Option<String>,
}

/// Ensures environment variables are loaded from config/.env and .env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename("config/.env");
        let _ = dotenvy::dotenv();
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. Without one, `config/agent.toml` is used when present and
/// the built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)
            } else {
                info!(path = CONFIG_PATH, "No configuration file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let (provider, model) = build_provider(parsed.model)?;

    if parsed.server.command_is_blank() {
        return Err(ConfigError::EmptyServerCommand {
            server: parsed.server.display_name(),
        });
    }
    let server = ServerConfig::from(parsed.server);

    let agent = build_agent(parsed.agent)?;
    let query = build_query(parsed.query)?;
    let session_log = SessionLogConfig {
        enabled: parsed.session_log.enabled,
        directory: parsed
            .session_log
            .directory
            .map(PathBuf::from)
            .unwrap_or_else(|| SessionLogConfig::default().directory),
    };

    Ok(AppConfig {
        provider,
        model,
        server,
        agent,
        query,
        session_log,
    })
}

fn build_provider(raw: RawModelSection) -> Result<(ModelProviderConfig, String), ConfigError> {
    let defaults = ModelProviderConfig::default();
    let provider_type = raw
        .provider_type
        .unwrap_or_else(|| defaults.provider_type.clone());
    let id = raw.id.unwrap_or_else(|| provider_type.clone());

    // Only the Gemini endpoint has a sensible public default.
    let endpoint = match raw.endpoint {
        Some(endpoint) if !endpoint.trim().is_empty() => endpoint,
        Some(_) => return Err(ConfigError::MissingEndpoint { provider: id }),
        None if provider_type.eq_ignore_ascii_case("gemini") => defaults.endpoint.clone(),
        None => return Err(ConfigError::MissingEndpoint { provider: id }),
    };

    let api_key = match raw.api_key {
        Some(key) => Some(key),
        None if provider_type.eq_ignore_ascii_case("gemini") => defaults.api_key.clone(),
        None => None,
    };

    let provider = ModelProviderConfig {
        id,
        provider_type,
        endpoint,
        api_key,
        api_path: raw.api_path,
    };
    let model = raw.name.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    Ok((provider, model))
}

fn build_agent(raw: RawAgent) -> Result<AgentSettings, ConfigError> {
    let defaults = AgentSettings::default();
    let tool_timeout = match raw.tool_timeout_secs {
        Some(0) => {
            return Err(ConfigError::InvalidTimeout {
                field: "agent.tool_timeout_secs",
            });
        }
        Some(secs) => Duration::from_secs(secs),
        None => defaults.tool_timeout,
    };
    let startup_timeout = match raw.startup_timeout_secs {
        Some(0) => {
            return Err(ConfigError::InvalidTimeout {
                field: "agent.startup_timeout_secs",
            });
        }
        Some(secs) => Duration::from_secs(secs),
        None => defaults.startup_timeout,
    };
    Ok(AgentSettings {
        tool_timeout,
        startup_timeout,
    })
}

fn build_query(raw: RawQuery) -> Result<QuerySource, ConfigError> {
    let style = raw
        .style
        .map(|style| style.trim().to_string())
        .filter(|style| !style.is_empty())
        .unwrap_or_else(|| DEFAULT_STYLE.to_string());

    match raw.mode.as_deref().map(str::trim) {
        None | Some("fixed") => {
            let description = raw
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
            if description.trim().is_empty() {
                return Err(ConfigError::EmptyDescription);
            }
            Ok(QuerySource::Fixed(UserQuery::new(description, style)))
        }
        Some("interactive") => Ok(QuerySource::Interactive {
            default_style: style,
        }),
        Some(other) => Err(ConfigError::UnknownQueryMode {
            mode: other.to_string(),
        }),
    }
}
