//! API Module
//!
//! Boundary between the form front end and the prediction pipeline.
//!
//! Usage:
//! - `api::handle_json(&pipeline, line)` - one JSON submission in, one response out
//! - `api::get_engine_status(&pipeline)` - counters for the status view

pub mod commands;

// Re-export current version as default
pub use commands::*;
