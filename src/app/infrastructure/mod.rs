//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - FLTK buffer utilities
//! - Platform-specific detection
//! - Error types
//! - Log subscriber setup

pub mod buffer;
pub mod error;
pub mod logging;
pub mod platform;
