// Config loading tests - AppConfig::load parsing, defaults and validation errors.

use canvas_agent::config::{AppConfig, ConfigError, QuerySource};
use canvas_agent::types::UserQuery;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("agent.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_explicit_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/agent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "");

    let config = AppConfig::load(Some(&path)).expect("config");
    assert_eq!(config.provider.provider_type, "gemini");
    assert_eq!(config.provider.api_key.as_deref(), Some("GEMINI_API_KEY"));
    assert_eq!(config.model, "gemini-2.0-flash");
    assert_eq!(config.server.name, "paint");
    assert_eq!(config.server.command, PathBuf::from("python"));
    assert_eq!(config.server.args, vec!["paint_mcp_tools.py".to_string()]);
    assert_eq!(config.agent.tool_timeout, Duration::from_secs(30));
    assert_eq!(config.agent.startup_timeout, Duration::from_secs(10));
    assert!(!config.session_log.enabled);
    assert_eq!(config.session_log.directory, PathBuf::from("logs"));
    match config.query {
        QuerySource::Fixed(query) => {
            assert!(!query.description.is_empty());
            assert_eq!(query.style_preference, "abstract");
        }
        other => panic!("expected fixed query, got {other:?}"),
    }
}

#[test]
fn parses_full_configuration() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
type = "ollama"
endpoint = "http://127.0.0.1:11434"
name = "llama3"

[server]
name = "canvas"
command = "uv"
args = ["run", "paint_mcp_tools.py"]
env = { PAINT_DEBUG = "1" }

[agent]
tool_timeout_secs = 45
startup_timeout_secs = 5

[query]
description = "A labyrinth seen from above"
style = "line art"

[session_log]
enabled = true
directory = "runs"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config");
    assert!(config.provider.is_ollama());
    assert_eq!(config.provider.endpoint, "http://127.0.0.1:11434");
    assert_eq!(config.provider.api_key, None);
    assert_eq!(config.model, "llama3");
    assert_eq!(config.server.name, "canvas");
    assert_eq!(config.server.args, vec!["run", "paint_mcp_tools.py"]);
    assert_eq!(
        config.server.env.get("PAINT_DEBUG").map(String::as_str),
        Some("1")
    );
    assert_eq!(config.agent.tool_timeout, Duration::from_secs(45));
    assert_eq!(config.agent.startup_timeout, Duration::from_secs(5));
    assert_eq!(
        config.query,
        QuerySource::Fixed(UserQuery::new("A labyrinth seen from above", "line art"))
    );
    assert!(config.session_log.enabled);
    assert_eq!(config.session_log.directory, PathBuf::from("runs"));
}

#[test]
fn interactive_mode_keeps_default_style() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[query]
mode = "interactive"
style = "watercolor"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config");
    assert_eq!(
        config.query,
        QuerySource::Interactive {
            default_style: "watercolor".into()
        }
    );
}

#[test]
fn returns_error_when_non_gemini_provider_has_no_endpoint() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
type = "openai"
name = "gpt-4o-mini"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::MissingEndpoint { provider }) if provider == "openai"));
}

#[test]
fn returns_error_for_blank_server_command() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[server]
name = "paint"
command = "   "
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::EmptyServerCommand { .. })));
}

#[test]
fn returns_error_for_zero_timeout() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[agent]\ntool_timeout_secs = 0\n");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidTimeout {
            field: "agent.tool_timeout_secs"
        })
    ));
}

#[test]
fn returns_error_for_empty_description_and_unknown_mode() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[query]\ndescription = \"  \"\n");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::EmptyDescription)
    ));

    let path = write_config(dir.path(), "[query]\nmode = \"batch\"\n");
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::UnknownQueryMode { mode }) if mode == "batch"
    ));
}

#[test]
fn returns_parse_error_for_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[model\ntype = ");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}
