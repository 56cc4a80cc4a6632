//! Text shown in the status bar.

use std::path::Path;

/// Label for the file-type area: "Python" for `.py`, ".ext" for other
/// extensions, "Plain Text" when there is no path or no extension.
pub fn file_type_label(path: Option<&str>) -> String {
    let Some(ext) = path
        .map(Path::new)
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    else {
        return "Plain Text".to_string();
    };
    if ext.eq_ignore_ascii_case("py") || ext.eq_ignore_ascii_case("pyw") {
        "Python".to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Persistent message for the active document.
pub fn document_status(path: Option<&str>, dirty: bool) -> String {
    let subject = path.unwrap_or("New file");
    let state = if dirty { "Unsaved changes" } else { "Ready" };
    format!("{} - {}", subject, state)
}

pub fn cursor_label(line: usize, col: usize) -> String {
    format!("Ln {}, Col {}", line, col)
}

/// Escape text for an FLTK widget label, where '@' starts a symbol.
pub fn label_text(text: &str) -> String {
    text.replace('@', "@@")
}

pub fn window_title(display_name: &str, dirty: bool) -> String {
    let prefix = if dirty { "*" } else { "" };
    format!("{}{} - PyEdit", prefix, display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text_escapes_at_sign() {
        assert_eq!(label_text("Saved: /home/me/@work/a.py"), "Saved: /home/me/@@work/a.py");
        assert_eq!(label_text("@@"), "@@@@");
        assert_eq!(label_text("Ln 1, Col 1"), "Ln 1, Col 1");
    }

    #[test]
    fn test_file_type_label() {
        assert_eq!(file_type_label(Some("/tmp/main.py")), "Python");
        assert_eq!(file_type_label(Some("/tmp/MAIN.PY")), "Python");
        assert_eq!(file_type_label(Some("/tmp/notes.txt")), ".txt");
        assert_eq!(file_type_label(Some("/tmp/Makefile")), "Plain Text");
        assert_eq!(file_type_label(None), "Plain Text");
    }

    #[test]
    fn test_document_status() {
        assert_eq!(document_status(Some("/a/b.py"), false), "/a/b.py - Ready");
        assert_eq!(document_status(Some("/a/b.py"), true), "/a/b.py - Unsaved changes");
        assert_eq!(document_status(None, false), "New file - Ready");
        assert_eq!(document_status(None, true), "New file - Unsaved changes");
    }

    #[test]
    fn test_cursor_label() {
        assert_eq!(cursor_label(3, 14), "Ln 3, Col 14");
    }

    #[test]
    fn test_window_title() {
        assert_eq!(window_title("main.py", false), "main.py - PyEdit");
        assert_eq!(window_title("main.py", true), "*main.py - PyEdit");
    }
}
