//! PyEdit: a tabbed Python editor with an integrated script runner and
//! debugger console, built on FLTK.

pub mod app;
pub mod ui;
