//! # Infrastructure Module
//!
//! Adapters to external services. [`model`] holds the text-generation clients
//! the decision engine talks to.

pub mod model;
