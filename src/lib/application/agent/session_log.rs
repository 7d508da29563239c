//! Optional post-run dump of the session state to a timestamped file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

use super::memory::AgentState;

const CONTENT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum SessionLogError {
    #[error("failed to create log directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session log {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise agent state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes `state` to `{directory}/session_{YYYYmmdd_HHMMSS}.log` and returns the path.
pub fn write_session_log(directory: &Path, state: &AgentState) -> Result<PathBuf, SessionLogError> {
    write_session_log_at(directory, state, Local::now())
}

pub(crate) fn write_session_log_at(
    directory: &Path,
    state: &AgentState,
    now: DateTime<Local>,
) -> Result<PathBuf, SessionLogError> {
    std::fs::create_dir_all(directory).map_err(|source| SessionLogError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })?;

    let path = directory.join(format!("session_{}.log", now.format("%Y%m%d_%H%M%S")));
    let body = render_session_log(state, now)?;
    std::fs::write(&path, body).map_err(|source| SessionLogError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "Session log written");
    Ok(path)
}

pub fn render_session_log(
    state: &AgentState,
    now: DateTime<Local>,
) -> Result<String, SessionLogError> {
    let mut out = String::new();
    let _ = writeln!(out, "Session log: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Iterations: {}", state.iteration);
    let _ = writeln!(out, "Task complete: {}", state.task_complete);
    if let Some(answer) = &state.final_answer {
        let _ = writeln!(out, "Final answer: {answer}");
    }
    out.push('\n');

    for record in &state.history {
        let _ = writeln!(out, "--- Iteration {} ---", record.iteration + 1);
        if let Some(action) = &record.action {
            let args = serde_json::to_string_pretty(&action.args)?;
            let _ = writeln!(out, "Action: {}", action.name);
            let _ = writeln!(out, "Arguments: {args}");
        }
        if let Some(result) = &record.result {
            let _ = writeln!(out, "Success: {}", result.success);
            let _ = writeln!(out, "Content: {}", truncate(&result.content));
            if let Some(error) = &result.error {
                let _ = writeln!(out, "Error: {error}");
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Full state:");
    out.push_str(&serde_json::to_string_pretty(state)?);
    out.push('\n');
    Ok(out)
}

fn truncate(content: &str) -> String {
    match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}... [truncated]", &content[..cut]),
        None => content.to_string(),
    }
}
