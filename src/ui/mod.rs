//! Widget construction and theming. Nothing here owns application state;
//! widgets talk back through `Message`s on the FLTK channel.

pub mod console_panel;
pub mod dialogs;
pub mod file_dialogs;
pub mod main_window;
pub mod menu;
pub mod status_bar;
pub mod tab_bar;
pub mod theme;
