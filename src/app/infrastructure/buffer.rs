/// Read text from an FLTK TextBuffer without leaking the C-allocated copy.
///
/// fltk-rs's `TextBuffer::text()` calls `Fl_Text_Buffer_text()`, which
/// returns a `malloc()`'d C string. The wrapper copies it into a `String`
/// and never frees the original, so every call leaks a buffer-sized block.
/// Session autosave and find/replace read whole buffers often, so this
/// helper goes through the FFI directly and frees the allocation.
pub fn buffer_text_no_leak(buf: &fltk::text::TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut std::ffi::c_void) -> *mut std::ffi::c_char;
        fn free(ptr: *mut std::ffi::c_void);
    }

    // SAFETY: `buf.as_ptr()` is the live FLTK buffer. The returned pointer is
    // a malloc'd, NUL-terminated copy (or null for an empty buffer) that we
    // own; it is read once and released with the matching `free`.
    unsafe {
        let inner = buf.as_ptr() as *mut std::ffi::c_void;
        let ptr = Fl_Text_Buffer_text(inner);
        if ptr.is_null() {
            return String::new();
        }
        let text = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut std::ffi::c_void);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fltk::text::TextBuffer;

    #[test]
    fn test_reads_buffer_contents() {
        let mut buf = TextBuffer::default();
        assert_eq!(buffer_text_no_leak(&buf), "");
        buf.set_text("def main():\n    print('héllo')\n");
        assert_eq!(buffer_text_no_leak(&buf), "def main():\n    print('héllo')\n");
    }
}
