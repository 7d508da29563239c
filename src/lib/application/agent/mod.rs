//! # Agent Module
//!
//! The drawing agent: a loop that asks the model for one action at a time,
//! executes it against the tool provider and feeds the outcome back.
//!
//! ## Layers
//!
//! - [`perception`] - query rendering and tool response normalisation
//! - [`memory`] - session state and the history transcript
//! - [`decision`] - prompt composition and response parsing
//! - [`action`] - tool dispatch with argument coercion and a deadline
//!
//! [`Agent`] runs the loop; [`write_session_log`] optionally persists its state.

pub mod action;
pub mod decision;
mod errors;
pub mod memory;
mod models;
pub mod perception;
mod runner;
mod session_log;


pub use action::ActionDispatcher;
pub use decision::DecisionEngine;
pub use errors::AgentError;
pub use memory::{AgentState, HistoryRecord, Memory, MemoryError};
pub use models::AgentOutcome;
pub use runner::Agent;
pub use session_log::{SessionLogError, render_session_log, write_session_log};
