//! Services layer: logic that does not own widgets.
//!
//! - Config and session persistence
//! - Recent files and console history
//! - Text operations and status texts
//! - Syntax highlighting
//! - Script runner

pub mod config_store;
pub mod console_history;
pub mod file_filters;
pub mod recent_files;
pub mod script_runner;
pub mod session;
pub mod status;
pub mod syntax;
pub mod text_ops;
