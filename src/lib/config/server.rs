use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::defaults::{DEFAULT_SERVER_ARGS, DEFAULT_SERVER_COMMAND, DEFAULT_SERVER_NAME};

/// How to launch the MCP server that provides the drawing tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            command: PathBuf::from(DEFAULT_SERVER_COMMAND),
            args: DEFAULT_SERVER_ARGS.iter().map(|arg| arg.to_string()).collect(),
            env: HashMap::new(),
            workdir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct RawServer {
    name: Option<String>,
    command: Option<String>,
    args: Option<Vec<String>>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
}

impl RawServer {
    pub(crate) fn command_is_blank(&self) -> bool {
        self.command
            .as_deref()
            .map(|command| command.trim().is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string())
    }
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let expand = |s: &str| -> String {
            shellexpand::full(s)
                .map(|cow| cow.into_owned())
                .unwrap_or_else(|_| s.to_string())
        };

        let defaults = ServerConfig::default();
        let command = raw
            .command
            .as_deref()
            .map(|command| PathBuf::from(expand(command)))
            .unwrap_or(defaults.command);
        let args = raw
            .args
            .map(|args| args.iter().map(|arg| expand(arg)).collect())
            .unwrap_or(defaults.args);
        let workdir = raw.workdir.map(|dir| PathBuf::from(expand(&dir)));

        Self {
            name: raw.name.unwrap_or(defaults.name),
            command,
            args,
            env: raw.env,
            workdir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn expands_env_vars_in_command_args_and_workdir() {
        unsafe {
            env::set_var("CANVAS_TEST_ROOT", "/opt/paint");
            env::set_var("CANVAS_TEST_ARG", "tools.py");
        }

        let raw = RawServer {
            name: Some("paint".to_string()),
            command: Some("${CANVAS_TEST_ROOT}/bin/python".to_string()),
            args: Some(vec!["${CANVAS_TEST_ARG}".to_string()]),
            env: HashMap::new(),
            workdir: Some("${CANVAS_TEST_ROOT}/work".to_string()),
        };

        let config = ServerConfig::from(raw);

        let cmd = config.command.to_str().expect("valid utf8");
        assert!(cmd.contains("/opt/paint/bin/python"));
        assert_eq!(config.args, vec!["tools.py".to_string()]);
        let workdir = config.workdir.expect("workdir exists");
        assert!(workdir.to_str().expect("valid utf8").contains("/opt/paint/work"));

        unsafe {
            env::remove_var("CANVAS_TEST_ROOT");
            env::remove_var("CANVAS_TEST_ARG");
        }
    }

    #[test]
    fn missing_fields_fall_back_to_paint_server() {
        let config = ServerConfig::from(RawServer::default());
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.args, vec!["paint_mcp_tools.py".to_string()]);
    }
}
