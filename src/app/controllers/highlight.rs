use fltk::{
    app::Sender,
    enums::Font,
    prelude::*,
    text::{StyleTableEntry, TextEditor},
};

use crate::app::controllers::tabs::TabManager;
use crate::app::domain::document::DocumentId;
use crate::app::domain::messages::Message;
use crate::app::domain::settings::SyntaxTheme;
use crate::app::infrastructure::buffer::buffer_text_no_leak;
use crate::app::services::syntax::{make_default_style, DirtyLines, SyntaxHighlighter};

/// Delay between the last keystroke and the re-highlight pass.
const REHIGHLIGHT_DELAY: f64 = 0.05;

/// Byte range edited since the last pass, widened as more edits arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEdit {
    id: DocumentId,
    first: i32,
    last: i32,
}

impl PendingEdit {
    fn widen(&mut self, pos: i32, inserted: i32) {
        if pos <= self.last {
            self.last += inserted;
        }
        self.first = self.first.min(pos);
        self.last = self.last.max(pos + inserted);
    }
}

/// Owns the syntect highlighter and keeps each document's style buffer in
/// step with its text.
pub struct HighlightController {
    highlighter: SyntaxHighlighter,
    pending: Option<PendingEdit>,
    timer_active: bool,
    enabled: bool,
}

impl HighlightController {
    pub fn new(theme: SyntaxTheme, font: Font, font_size: i32, enabled: bool) -> Self {
        Self {
            highlighter: SyntaxHighlighter::new(theme, font, font_size),
            pending: None,
            timer_active: false,
            enabled,
        }
    }

    pub fn highlighter(&self) -> &SyntaxHighlighter {
        &self.highlighter
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style_table(&self) -> Vec<StyleTableEntry> {
        self.highlighter.style_table()
    }

    pub fn set_theme(&mut self, theme: SyntaxTheme) {
        self.highlighter.set_theme(theme);
    }

    pub fn set_font(&mut self, font: Font, size: i32) {
        self.highlighter.set_font(font, size);
    }

    /// Point the editor at the active document's style buffer.
    pub fn bind_editor(&mut self, tab_manager: &TabManager, editor: &mut TextEditor) {
        if let Some(doc) = tab_manager.active_doc() {
            editor.set_highlight_data(doc.style_buffer.clone(), self.highlighter.style_table());
            self.highlighter.reset_style_table_changed();
        }
    }

    /// Pick a grammar from the document's path and run a full pass.
    pub fn detect_and_highlight(&mut self, id: DocumentId, tab_manager: &mut TabManager) {
        let Some(doc) = tab_manager.doc_by_id_mut(id) else {
            return;
        };
        doc.syntax_name = self.highlighter.detect_syntax(doc.file_path.as_deref());
        tracing::debug!(doc = id.0, syntax = ?doc.syntax_name, "syntax detected");
        self.highlight_document(id, tab_manager);
    }

    fn highlight_document(&mut self, id: DocumentId, tab_manager: &mut TabManager) {
        let Some(doc) = tab_manager.doc_by_id_mut(id) else {
            return;
        };
        let text = buffer_text_no_leak(&doc.buffer);
        let styles = match (&doc.syntax_name, self.enabled) {
            (Some(name), true) => self.highlighter.highlight_full(&text, name, &mut doc.line_states),
            _ => {
                doc.line_states.clear();
                make_default_style(&text)
            }
        };
        doc.style_buffer.set_text(&styles);
    }

    /// Record an edit and arm the debounce timer.
    pub fn schedule_rehighlight(
        &mut self,
        id: DocumentId,
        pos: i32,
        inserted: i32,
        tab_manager: &mut TabManager,
        sender: &Sender<Message>,
        editor: &mut TextEditor,
    ) {
        if !self.enabled {
            return;
        }

        match self.pending.as_mut() {
            Some(p) if p.id == id => p.widen(pos, inserted),
            _ => {
                // Edits moved to another document; finish the old one first.
                if let Some(previous) = self.pending.take() {
                    self.rehighlight(previous, tab_manager, editor);
                }
                self.pending = Some(PendingEdit {
                    id,
                    first: pos,
                    last: pos + inserted,
                });
            }
        }

        if !self.timer_active {
            self.timer_active = true;
            let s = *sender;
            fltk::app::add_timeout3(REHIGHLIGHT_DELAY, move |_| {
                s.send(Message::DoRehighlight);
            });
        }
    }

    pub fn do_pending_rehighlight(&mut self, tab_manager: &mut TabManager, editor: &mut TextEditor) {
        self.timer_active = false;
        if let Some(edit) = self.pending.take() {
            self.rehighlight(edit, tab_manager, editor);
        }
    }

    fn rehighlight(&mut self, edit: PendingEdit, tab_manager: &mut TabManager, editor: &mut TextEditor) {
        let Some(doc) = tab_manager.doc_by_id_mut(edit.id) else {
            return;
        };
        let Some(syntax_name) = doc.syntax_name.clone() else {
            return;
        };

        let len = doc.buffer.length();
        let dirty = DirtyLines {
            first: doc.buffer.count_lines(0, edit.first.clamp(0, len)) as usize,
            last: doc.buffer.count_lines(0, edit.last.clamp(0, len)) as usize,
        };
        let text = buffer_text_no_leak(&doc.buffer);
        let result = self
            .highlighter
            .highlight_incremental(&text, dirty, &syntax_name, &mut doc.line_states);

        let start = result.byte_start as i32;
        let end = (start + result.style_chars.len() as i32).min(doc.style_buffer.length());
        doc.style_buffer.replace(start, end, &result.style_chars);

        if tab_manager.active_id() == Some(edit.id) {
            if self.highlighter.style_table_changed() {
                self.bind_editor(tab_manager, editor);
            }
            editor.redraw();
        }
    }

    /// Full pass over every open document, e.g. after a theme change.
    pub fn rehighlight_all_documents(&mut self, tab_manager: &mut TabManager) {
        self.pending = None;
        for id in tab_manager.ids() {
            self.highlight_document(id, tab_manager);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool, tab_manager: &mut TabManager, editor: &mut TextEditor) {
        self.enabled = enabled;
        self.rehighlight_all_documents(tab_manager);
        self.bind_editor(tab_manager, editor);
        editor.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(first: i32, last: i32) -> PendingEdit {
        PendingEdit { id: DocumentId(1), first, last }
    }

    #[test]
    fn test_widen_after_range() {
        let mut p = edit(10, 12);
        p.widen(40, 3);
        assert_eq!(p, edit(10, 43));
    }

    #[test]
    fn test_widen_before_range_shifts_end() {
        let mut p = edit(10, 12);
        p.widen(2, 5);
        assert_eq!(p, edit(2, 17));
    }

    #[test]
    fn test_widen_deletion() {
        let mut p = edit(10, 12);
        p.widen(11, 0);
        assert_eq!(p, edit(10, 12));
    }
}
