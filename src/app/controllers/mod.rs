//! Controllers layer: coordination between domain, services and widgets.
//!
//! - Tab management
//! - Syntax highlighting orchestration
//! - Script console

pub mod console;
pub mod highlight;
pub mod tabs;
