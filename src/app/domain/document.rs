use std::cell::Cell;
use std::ffi::c_void;
use std::rc::Rc;

use fltk::app::Sender;
use fltk::text::TextBuffer;

use super::messages::Message;
use crate::app::services::syntax::LineStates;
use crate::app::services::text_ops::extract_filename;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// The closure type stored behind the FFI `void* cbArg`.
type ModifyCb = dyn FnMut(i32, i32, i32, i32, *const std::ffi::c_char);

type ModifyShim = unsafe extern "C" fn(
    std::ffi::c_int,
    std::ffi::c_int,
    std::ffi::c_int,
    std::ffi::c_int,
    *const std::ffi::c_char,
    *mut c_void,
);

/// Fixed C callback handed to FLTK. Using one function pointer for every
/// buffer lets `Fl_Text_Buffer_remove_modify_callback` find the entry again
/// by pointer equality, which the fltk-rs wrapper cannot do.
///
/// # Safety
///
/// `cb_arg` must be the pointer produced by `register_modify_callback` and
/// not yet released by `Document::cleanup`.
unsafe extern "C" fn modify_shim(
    pos: std::ffi::c_int,
    n_inserted: std::ffi::c_int,
    n_deleted: std::ffi::c_int,
    n_restyled: std::ffi::c_int,
    deleted_text: *const std::ffi::c_char,
    cb_arg: *mut c_void,
) {
    if cb_arg.is_null() {
        tracing::warn!("modify callback fired with a null argument");
        return;
    }
    // SAFETY: non-null, and valid until cleanup() unregisters it.
    unsafe {
        let cb: &mut Box<ModifyCb> = &mut *(cb_arg as *mut Box<ModifyCb>);
        cb(pos, n_inserted, n_deleted, n_restyled, deleted_text);
    }
}

unsafe extern "C" {
    fn Fl_Text_Buffer_add_modify_callback(buf: *mut c_void, cb: Option<ModifyShim>, cb_arg: *mut c_void);
    fn Fl_Text_Buffer_remove_modify_callback(buf: *mut c_void, cb: Option<ModifyShim>, cb_arg: *mut c_void);
}

/// Box the closure and register it via FFI. The returned pointer must be
/// kept for `cleanup`.
///
/// The closure marks the document dirty, mirrors inserts/deletes into the
/// style buffer with the plain 'A' style so both buffers stay byte-aligned,
/// and posts `BufferModified` so highlighting and the status bar can react.
fn register_modify_callback(
    buffer: &TextBuffer,
    style_buffer: &TextBuffer,
    has_unsaved_changes: &Rc<Cell<bool>>,
    doc_id: DocumentId,
    sender: Sender<Message>,
) -> *mut c_void {
    let changes = has_unsaved_changes.clone();
    let mut style_buf = style_buffer.clone();

    let cb: Box<ModifyCb> = Box::new(
        move |pos: i32, inserted: i32, deleted: i32, _restyled: i32, _deleted_text: *const std::ffi::c_char| {
            if inserted > 0 || deleted > 0 {
                changes.set(true);
                if deleted > 0 {
                    style_buf.remove(pos, pos + deleted);
                }
                if inserted > 0 {
                    style_buf.insert(pos, &"A".repeat(inserted as usize));
                }
                sender.send(Message::BufferModified(doc_id, pos, inserted));
            }
        },
    );

    let data = Box::into_raw(Box::new(cb)) as *mut c_void;

    // SAFETY: `data` stays alive until cleanup() removes the callback and
    // reclaims the box; Document calls cleanup() from Drop.
    unsafe {
        Fl_Text_Buffer_add_modify_callback(buffer.as_ptr() as *mut c_void, Some(modify_shim), data);
    }

    data
}

pub fn untitled_name(counter: u32) -> String {
    format!("Untitled {}", counter)
}

pub struct Document {
    pub id: DocumentId,
    pub buffer: TextBuffer,
    pub style_buffer: TextBuffer,
    pub file_path: Option<String>,
    pub has_unsaved_changes: Rc<Cell<bool>>,
    pub display_name: String,
    pub cursor_position: i32,
    pub line_states: LineStates,
    pub syntax_name: Option<String>,
    modify_cb_data: *mut c_void,
}

impl Document {
    fn build(
        id: DocumentId,
        display_name: String,
        file_path: Option<String>,
        content: &str,
        dirty: bool,
        sender: Sender<Message>,
    ) -> Self {
        let buffer = TextBuffer::default();
        let mut style_buffer = TextBuffer::default();
        let has_unsaved_changes = Rc::new(Cell::new(false));

        let modify_cb_data =
            register_modify_callback(&buffer, &style_buffer, &has_unsaved_changes, id, sender);

        if !content.is_empty() {
            buffer.clone().set_text(content);
            style_buffer.set_text(&"A".repeat(content.len()));
        }
        has_unsaved_changes.set(dirty);

        Self {
            id,
            buffer,
            style_buffer,
            file_path,
            has_unsaved_changes,
            display_name,
            cursor_position: 0,
            line_states: LineStates::default(),
            syntax_name: None,
            modify_cb_data,
        }
    }

    pub fn new_untitled(id: DocumentId, counter: u32, sender: Sender<Message>) -> Self {
        Self::build(id, untitled_name(counter), None, "", false, sender)
    }

    /// Untitled buffer pre-filled with text, e.g. a duplicated tab or
    /// unsaved content restored from the session.
    pub fn new_with_content(
        id: DocumentId,
        display_name: String,
        content: &str,
        dirty: bool,
        sender: Sender<Message>,
    ) -> Self {
        Self::build(id, display_name, None, content, dirty, sender)
    }

    pub fn new_from_file(id: DocumentId, path: String, content: &str, sender: Sender<Message>) -> Self {
        let display_name = extract_filename(&path);
        Self::build(id, display_name, Some(path), content, false, sender)
    }

    pub fn is_dirty(&self) -> bool {
        self.has_unsaved_changes.get()
    }

    pub fn mark_clean(&self) {
        self.has_unsaved_changes.set(false);
    }

    pub fn mark_dirty(&self) {
        self.has_unsaved_changes.set(true);
    }

    pub fn is_untitled(&self) -> bool {
        self.file_path.is_none()
    }

    pub fn update_display_name(&mut self) {
        if let Some(ref path) = self.file_path {
            self.display_name = extract_filename(path);
        }
    }

    /// Label used in the tab bar: a dot marks unsaved changes.
    pub fn tab_label(&self) -> String {
        if self.is_dirty() {
            format!("\u{25cf} {}", self.display_name)
        } else {
            self.display_name.clone()
        }
    }

    /// Selected byte range, if any.
    pub fn selection(&self) -> Option<(i32, i32)> {
        self.buffer
            .selection_position()
            .filter(|(start, end)| start != end)
    }

    /// Release the FFI callback. Idempotent; also called from Drop.
    pub fn cleanup(&mut self) {
        if self.modify_cb_data.is_null() {
            return;
        }

        // SAFETY: unregister first so FLTK never calls the shim with a freed
        // pointer, then reclaim the box. Nulling the field prevents a double free.
        unsafe {
            Fl_Text_Buffer_remove_modify_callback(
                self.buffer.as_ptr() as *mut c_void,
                Some(modify_shim),
                self.modify_cb_data,
            );
            let _ = Box::from_raw(self.modify_cb_data as *mut Box<ModifyCb>);
        }
        self.modify_cb_data = std::ptr::null_mut();

        self.buffer.set_text("");
        self.style_buffer.set_text("");
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        self.cleanup();
    }
}
