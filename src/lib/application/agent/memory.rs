use serde::Serialize;
use thiserror::Error;

use crate::types::{ToolCall, ToolResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("session already completed; no further actions can be recorded")]
    SessionComplete,
    #[error("no pending action to attach a result to")]
    NoPendingAction,
}

/// One iteration's action and, once it finished, its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub iteration: usize,
    pub action: Option<ToolCall>,
    pub result: Option<ToolResult>,
}

impl HistoryRecord {
    pub fn is_complete(&self) -> bool {
        self.action.is_some() && self.result.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentState {
    pub iteration: usize,
    pub history: Vec<HistoryRecord>,
    pub task_complete: bool,
    pub final_answer: Option<String>,
}

impl AgentState {
    /// Narrates every completed record, one paragraph each, for the next prompt.
    pub fn format_history(&self) -> String {
        self.history
            .iter()
            .filter_map(|record| match (&record.action, &record.result) {
                (Some(action), Some(result)) => Some(format!(
                    "In iteration {}, you called {} with arguments {}, and the function returned {}.",
                    record.iteration + 1,
                    action.name,
                    action.args_json(),
                    result.content
                )),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Owner of the session state; the loop is its only writer.
#[derive(Debug, Default)]
pub struct Memory {
    state: AgentState,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn record_action(&mut self, call: ToolCall) -> Result<(), MemoryError> {
        if self.state.task_complete {
            return Err(MemoryError::SessionComplete);
        }
        self.state.history.push(HistoryRecord {
            iteration: self.state.iteration,
            action: Some(call),
            result: None,
        });
        Ok(())
    }

    /// Attaches `result` to the most recent record, which must still be waiting for one.
    pub fn record_result(&mut self, result: ToolResult) -> Result<(), MemoryError> {
        match self.state.history.last_mut() {
            Some(record) if record.result.is_none() => {
                record.result = Some(result);
                Ok(())
            }
            _ => Err(MemoryError::NoPendingAction),
        }
    }

    pub fn increment_iteration(&mut self) {
        self.state.iteration += 1;
    }

    pub fn complete(&mut self, final_answer: impl Into<String>) {
        self.state.task_complete = true;
        self.state.final_answer = Some(final_answer.into());
    }

    pub fn reset(&mut self) {
        self.state = AgentState::default();
    }
}
