use fltk::app::Sender;
use fltk::text::TextBuffer;

use crate::app::domain::document::{untitled_name, Document, DocumentId};
use crate::app::domain::messages::Message;
use crate::app::infrastructure::buffer::buffer_text_no_leak;
use crate::app::services::session::RestoredTab;

/// Owns every open document in tab order and tracks which one is active.
pub struct TabManager {
    documents: Vec<Document>,
    active_id: Option<DocumentId>,
    next_id: u64,
    untitled_counter: u32,
    sender: Sender<Message>,
}

impl TabManager {
    pub fn new(sender: Sender<Message>) -> Self {
        Self {
            documents: Vec::new(),
            active_id: None,
            next_id: 1,
            untitled_counter: 0,
            sender,
        }
    }

    fn next_document_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_active(&mut self, doc: Document) -> DocumentId {
        let id = doc.id;
        self.documents.push(doc);
        self.active_id = Some(id);
        id
    }

    pub fn add_untitled(&mut self) -> DocumentId {
        self.untitled_counter += 1;
        let id = self.next_document_id();
        let doc = Document::new_untitled(id, self.untitled_counter, self.sender);
        self.push_active(doc)
    }

    pub fn add_from_file(&mut self, path: String, content: &str) -> DocumentId {
        let id = self.next_document_id();
        let doc = Document::new_from_file(id, path, content, self.sender);
        self.push_active(doc)
    }

    /// Re-create a tab from the saved session, including its dirty flag.
    pub fn add_restored(&mut self, tab: &RestoredTab) -> DocumentId {
        let id = self.next_document_id();
        let mut doc = match &tab.file_path {
            Some(path) => Document::new_from_file(id, path.clone(), &tab.content, self.sender),
            None => {
                self.untitled_counter += 1;
                Document::new_with_content(
                    id,
                    untitled_name(self.untitled_counter),
                    &tab.content,
                    tab.is_dirty,
                    self.sender,
                )
            }
        };
        if tab.is_dirty {
            doc.mark_dirty();
        }
        doc.cursor_position = tab.cursor_position;
        if let Some((start, end)) = tab.selection {
            doc.buffer.select(start, end);
        }
        self.push_active(doc)
    }

    /// Copy a document's text into a new untitled, modified tab placed
    /// right after the original.
    pub fn duplicate(&mut self, source: DocumentId) -> Option<DocumentId> {
        let idx = self.index_of(source)?;
        let original = &self.documents[idx];
        let text = buffer_text_no_leak(&original.buffer);
        let name = format!("{} (copy)", original.display_name);
        let cursor = original.cursor_position;
        let syntax = original.syntax_name.clone();

        let id = self.next_document_id();
        let mut doc = Document::new_with_content(id, name, &text, true, self.sender);
        doc.cursor_position = cursor.min(text.len() as i32);
        doc.syntax_name = syntax;
        self.documents.insert(idx + 1, doc);
        self.active_id = Some(id);
        Some(id)
    }

    pub fn active_doc(&self) -> Option<&Document> {
        let active_id = self.active_id?;
        self.doc_by_id(active_id)
    }

    pub fn active_doc_mut(&mut self) -> Option<&mut Document> {
        let active_id = self.active_id?;
        self.doc_by_id_mut(active_id)
    }

    pub fn active_buffer(&self) -> Option<TextBuffer> {
        self.active_doc().map(|d| d.buffer.clone())
    }

    pub fn set_active(&mut self, id: DocumentId) {
        if self.index_of(id).is_some() {
            self.active_id = Some(id);
        }
    }

    /// Remove a document and activate its nearest neighbor. The buffer is
    /// cleaned up immediately.
    pub fn remove(&mut self, id: DocumentId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let mut doc = self.documents.remove(idx);
        doc.cleanup();

        if self.active_id == Some(id) {
            self.active_id = if self.documents.is_empty() {
                None
            } else {
                Some(self.documents[idx.min(self.documents.len() - 1)].id)
            };
        }
    }

    /// Move the tab at `from` so it lands before the tab currently at `to`
    /// (`to == count()` appends).
    pub fn move_tab(&mut self, from: usize, to: usize) {
        if let Some(dest) = move_index(self.documents.len(), from, to) {
            let doc = self.documents.remove(from);
            self.documents.insert(dest, doc);
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active_id
    }

    pub fn active_index(&self) -> Option<usize> {
        self.index_of(self.active_id?)
    }

    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    pub fn find_by_path(&self, path: &str) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.file_path.as_deref() == Some(path))
            .map(|d| d.id)
    }

    pub fn doc_by_id(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn doc_by_id_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|d| d.id).collect()
    }

    pub fn any_dirty(&self) -> bool {
        self.documents.iter().any(|d| d.is_dirty())
    }

    pub fn next_doc_id(&self) -> Option<DocumentId> {
        let idx = self.active_index()?;
        let next_idx = (idx + 1) % self.documents.len();
        Some(self.documents[next_idx].id)
    }

    pub fn prev_doc_id(&self) -> Option<DocumentId> {
        let idx = self.active_index()?;
        let prev_idx = idx.checked_sub(1).unwrap_or(self.documents.len() - 1);
        Some(self.documents[prev_idx].id)
    }
}

/// Final index of an element moved from `from` to insertion point `to`
/// (0..=len, measured before removal). `None` when nothing moves.
pub fn move_index(len: usize, from: usize, to: usize) -> Option<usize> {
    if from >= len {
        return None;
    }
    let to = to.min(len);
    let dest = if to > from { to - 1 } else { to };
    (dest != from).then_some(dest)
}
