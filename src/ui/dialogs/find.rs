use fltk::{
    button::{Button, CheckButton},
    dialog,
    frame::Frame,
    input::Input,
    prelude::*,
    text::{TextBuffer, TextEditor},
    window::Window,
};

use super::run_dialog;
use crate::app::infrastructure::buffer::buffer_text_no_leak;
use crate::app::services::text_ops::{find_with_wrap, replace_all, selection_matches, SearchOptions};

fn read_options(case_check: &CheckButton, word_check: &CheckButton) -> SearchOptions {
    SearchOptions {
        case_sensitive: case_check.is_checked(),
        whole_word: word_check.is_checked(),
    }
}

/// Select the next match after the cursor, wrapping to the top.
/// Returns false when the query does not occur at all.
fn find_next(buffer: &mut TextBuffer, editor: &mut TextEditor, query: &str, options: SearchOptions) -> bool {
    let text = buffer_text_no_leak(buffer);
    let start = editor.insert_position().max(0) as usize;
    match find_with_wrap(&text, query, start, options) {
        Some(hit) => {
            buffer.select(hit.start as i32, hit.end as i32);
            editor.set_insert_position(hit.end as i32);
            editor.show_insert_position();
            true
        }
        None => false,
    }
}

/// Find & Replace dialog over the active buffer.
pub fn show_find_replace_dialog(buffer: &TextBuffer, editor: &mut TextEditor, title: &str) {
    let mut dialog_win = Window::default()
        .with_size(420, 200)
        .with_label(title)
        .center_screen();

    Frame::default().with_pos(20, 20).with_size(80, 30).with_label("Find:");
    let mut find_input = Input::default().with_pos(110, 20).with_size(290, 30);

    Frame::default().with_pos(20, 60).with_size(80, 30).with_label("Replace:");
    let replace_input = Input::default().with_pos(110, 60).with_size(290, 30);

    let case_check = CheckButton::default()
        .with_pos(110, 100).with_size(120, 25).with_label("Match case");
    let word_check = CheckButton::default()
        .with_pos(240, 100).with_size(120, 25).with_label("Whole word");

    let mut find_btn = Button::default()
        .with_pos(20, 150).with_size(90, 30).with_label("Find Next");
    let mut replace_btn = Button::default()
        .with_pos(118, 150).with_size(90, 30).with_label("Replace");
    let mut replace_all_btn = Button::default()
        .with_pos(216, 150).with_size(100, 30).with_label("Replace All");
    let mut close_btn = Button::default()
        .with_pos(324, 150).with_size(76, 30).with_label("Close");

    dialog_win.end();
    dialog_win.make_resizable(false);
    dialog_win.show();

    // Seed the query from a single-line selection.
    if let Some((start, end)) = buffer.selection_position()
        && start != end
    {
        let selected = buffer.selection_text();
        if !selected.contains('\n') {
            find_input.set_value(&selected);
        }
    }
    let _ = find_input.take_focus();

    // Find Next
    {
        let mut tb = buffer.clone();
        let mut te = editor.clone();
        let find_input = find_input.clone();
        let case_check = case_check.clone();
        let word_check = word_check.clone();
        find_btn.set_callback(move |_| {
            let query = find_input.value();
            if query.is_empty() {
                dialog::message_default("Please enter text to find.");
                return;
            }
            let options = read_options(&case_check, &word_check);
            if !find_next(&mut tb, &mut te, &query, options) {
                dialog::message_default(&format!("No occurrences of '{}' found.", query));
            }
        });
    }

    // Replace: swap the current selection if it is a match, then move on.
    {
        let mut tb = buffer.clone();
        let mut te = editor.clone();
        let find_input = find_input.clone();
        let replace_input = replace_input.clone();
        let case_check = case_check.clone();
        let word_check = word_check.clone();
        replace_btn.set_callback(move |_| {
            let query = find_input.value();
            if query.is_empty() {
                dialog::message_default("Please enter text to find.");
                return;
            }
            let replacement = replace_input.value();
            let options = read_options(&case_check, &word_check);

            if let Some((start, end)) = tb.selection_position()
                && start != end
                && selection_matches(&tb.selection_text(), &query, options)
            {
                tb.replace_selection(&replacement);
                te.set_insert_position(start + replacement.len() as i32);
            }

            if !find_next(&mut tb, &mut te, &query, options) {
                dialog::message_default("No more occurrences found.");
            }
        });
    }

    // Replace All
    {
        let mut tb = buffer.clone();
        let mut te = editor.clone();
        let find_input = find_input.clone();
        let replace_input = replace_input.clone();
        let case_check = case_check.clone();
        let word_check = word_check.clone();
        replace_all_btn.set_callback(move |_| {
            let query = find_input.value();
            if query.is_empty() {
                dialog::message_default("Please enter text to find.");
                return;
            }
            let text = buffer_text_no_leak(&tb);
            let options = read_options(&case_check, &word_check);
            let (new_text, count) = replace_all(&text, &query, &replace_input.value(), options);

            if count > 0 {
                let cursor = te.insert_position().min(new_text.len() as i32);
                tb.set_text(&new_text);
                te.set_insert_position(cursor);
                dialog::message_default(&format!("Replaced {} occurrence(s).", count));
            } else {
                dialog::message_default(&format!("No occurrences of '{}' found.", query));
            }
        });
    }

    let dialog_close = dialog_win.clone();
    close_btn.set_callback(move |_| {
        dialog_close.clone().hide();
    });

    let dialog_x = dialog_win.clone();
    dialog_win.set_callback(move |_| {
        dialog_x.clone().hide();
    });

    run_dialog(&dialog_win);
}
