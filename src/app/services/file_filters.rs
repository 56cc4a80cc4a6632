//! Filter strings for the native open/save dialogs.
//!
//! FLTK format: "Description\tPattern\nDescription2\tPattern2". FLTK adds
//! its own "All Files" entry on most platforms, but we list it explicitly so
//! the order is the same everywhere.

/// Filters offered by the Open dialog: Python first.
pub fn open_filter() -> String {
    [
        "Python Files\t*.{py,pyw}",
        "Text Files\t*.{txt,md,rst,cfg,ini,toml}",
        "All Files\t*",
    ]
    .join("\n")
}

/// Save dialogs default to Python with a fallback to any name.
pub fn save_filter() -> String {
    ["Python Files\t*.py", "All Files\t*"].join("\n")
}

/// Default file name offered when saving an untitled buffer.
pub fn suggested_file_name(display_name: &str) -> String {
    let stem = display_name.trim();
    if stem.is_empty() {
        return "untitled.py".to_string();
    }
    let base = stem.to_lowercase().replace(' ', "_");
    if base.contains('.') {
        base
    } else {
        format!("{}.py", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_filter_lists_python_first() {
        let filter = open_filter();
        let first = filter.lines().next().unwrap();
        assert!(first.starts_with("Python Files\t"));
        assert!(first.contains("py"));
        assert!(filter.lines().all(|l| l.contains('\t')));
        assert!(filter.ends_with("All Files\t*"));
    }

    #[test]
    fn test_save_filter() {
        assert_eq!(save_filter(), "Python Files\t*.py\nAll Files\t*");
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name("Untitled 3"), "untitled_3.py");
        assert_eq!(suggested_file_name("notes.txt"), "notes.txt");
        assert_eq!(suggested_file_name("  "), "untitled.py");
    }
}
