//! # Application Module
//!
//! ## Submodules
//!
//! - [`agent`] - The perceive, decide, act loop and its state
//! - [`tooling`] - MCP tool provider session and tool catalog
pub mod agent;
pub mod tooling;
