use fltk::dialog::{FileDialogOptions, FileDialogType, NativeFileChooser};

use crate::app::services::file_filters::{open_filter, save_filter, suggested_file_name};

fn chosen_path(nfc: &NativeFileChooser) -> Option<String> {
    let filename = nfc.filename();
    let s = filename.to_string_lossy();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

pub fn native_open_dialog(directory: Option<&str>) -> Option<String> {
    let mut nfc = NativeFileChooser::new(FileDialogType::BrowseFile);
    nfc.set_title("Open File");
    nfc.set_filter(&open_filter());
    if let Some(dir) = directory {
        let _ = nfc.set_directory(&dir);
    }
    nfc.show(); // blocks until close
    chosen_path(&nfc)
}

/// Save dialog preset with a name derived from the tab's display name.
pub fn native_save_dialog(directory: Option<&str>, display_name: &str) -> Option<String> {
    let mut nfc = NativeFileChooser::new(FileDialogType::BrowseSaveFile);
    nfc.set_title("Save As");
    nfc.set_filter(&save_filter());
    nfc.set_option(FileDialogOptions::SaveAsConfirm);
    nfc.set_preset_file(&suggested_file_name(display_name));
    if let Some(dir) = directory {
        let _ = nfc.set_directory(&dir);
    }
    nfc.show(); // blocks until close
    chosen_path(&nfc)
}
