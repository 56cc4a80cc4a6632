use fltk::{
    button::Button,
    dialog,
    enums::CallbackTrigger,
    frame::Frame,
    input::IntInput,
    prelude::*,
    text::{TextBuffer, TextEditor},
    window::Window,
};

use super::run_dialog;
use crate::app::infrastructure::buffer::buffer_text_no_leak;
use crate::app::services::text_ops::{line_count, line_number_to_byte_position};

/// Parse the typed line number against the buffer. Errors carry the
/// message shown to the user.
pub fn resolve_line(input: &str, text: &str) -> Result<usize, String> {
    let total = line_count(text);
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| line_number_to_byte_position(text, n))
        .ok_or_else(|| format!("Line number must be between 1 and {}", total))
}

/// Returns true when the cursor moved.
pub fn show_goto_line_dialog(buffer: &TextBuffer, editor: &mut TextEditor) -> bool {
    let total = line_count(&buffer_text_no_leak(buffer));
    let mut dialog_win = Window::default()
        .with_size(260, 120)
        .with_label("Go To Line")
        .center_screen();
    Frame::default()
        .with_pos(20, 20)
        .with_size(110, 30)
        .with_label(&format!("Line (1-{}):", total));
    let mut line_input = IntInput::default().with_pos(140, 20).with_size(100, 30);

    let mut go_btn = Button::default()
        .with_pos(70, 70).with_size(80, 30).with_label("Go");
    let mut cancel_btn = Button::default()
        .with_pos(160, 70).with_size(80, 30).with_label("Cancel");

    dialog_win.end();
    dialog_win.make_resizable(false);
    dialog_win.show();
    let _ = line_input.take_focus();

    let moved = std::rc::Rc::new(std::cell::Cell::new(false));

    let mut tb = buffer.clone();
    let mut te = editor.clone();
    let dialog_go = dialog_win.clone();
    let line_input_go = line_input.clone();
    let moved_go = moved.clone();
    go_btn.set_callback(move |_| {
        let text = buffer_text_no_leak(&tb);
        match resolve_line(&line_input_go.value(), &text) {
            Ok(pos) => {
                tb.unselect();
                te.set_insert_position(pos as i32);
                te.show_insert_position();
                moved_go.set(true);
                dialog_go.clone().hide();
            }
            Err(msg) => dialog::message_default(&msg),
        }
    });

    // Enter in the input triggers Go
    let mut go_btn2 = go_btn.clone();
    line_input.set_trigger(CallbackTrigger::EnterKey);
    line_input.set_callback(move |_| {
        go_btn2.do_callback();
    });

    let dialog_close = dialog_win.clone();
    cancel_btn.set_callback(move |_| {
        dialog_close.clone().hide();
    });

    let dialog_x = dialog_win.clone();
    dialog_win.set_callback(move |_| {
        dialog_x.clone().hide();
    });

    run_dialog(&dialog_win);
    moved.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_line() {
        let text = "a\nbb\nccc";
        assert_eq!(resolve_line("1", text), Ok(0));
        assert_eq!(resolve_line(" 3 ", text), Ok(5));
    }

    #[test]
    fn test_resolve_line_out_of_range() {
        let text = "a\nbb\nccc";
        let err = "Line number must be between 1 and 3".to_string();
        assert_eq!(resolve_line("0", text), Err(err.clone()));
        assert_eq!(resolve_line("4", text), Err(err.clone()));
        assert_eq!(resolve_line("x", text), Err(err));
    }
}
