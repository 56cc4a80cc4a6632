use fltk::{
    app::Sender,
    enums::{Align, CallbackTrigger, Color, Event, Font, FrameType, Key},
    frame::Frame,
    group::{Flex, FlexType},
    input::Input,
    prelude::*,
    text::{TextBuffer, TextDisplay},
};

use crate::app::domain::messages::Message;
use crate::app::services::console_history::HistoryDirection;

pub const CONSOLE_HEIGHT: i32 = 180;
const HEADER_HEIGHT: i32 = 22;
const INPUT_HEIGHT: i32 = 26;
const PROMPT_WIDTH: i32 = 56;

/// Output pane plus a one-line input for the running script's stdin.
pub struct ConsolePanel {
    pub group: Flex,
    header: Frame,
    output: TextDisplay,
    buffer: TextBuffer,
    prompt: Frame,
    input: Input,
}

impl ConsolePanel {
    pub fn new(sender: &Sender<Message>) -> Self {
        let mut group = Flex::default();
        group.set_type(FlexType::Column);
        group.set_frame(FrameType::FlatBox);

        let mut header = Frame::default().with_label(" Console");
        header.set_align(Align::Left | Align::Inside);
        header.set_label_size(12);
        group.fixed(&header, HEADER_HEIGHT);

        let buffer = TextBuffer::default();
        let mut output = TextDisplay::default();
        output.set_buffer(buffer.clone());
        output.set_frame(FrameType::FlatBox);
        output.set_scrollbar_size(12);

        let mut row = Flex::default();
        row.set_type(FlexType::Row);
        let mut prompt = Frame::default().with_label("> ");
        prompt.set_align(Align::Right | Align::Inside);
        row.fixed(&prompt, PROMPT_WIDTH);
        let mut input = Input::default();
        input.set_frame(FrameType::FlatBox);
        row.end();
        group.fixed(&row, INPUT_HEIGHT);
        group.end();

        input.set_trigger(CallbackTrigger::EnterKeyAlways);
        input.set_callback({
            let s = *sender;
            move |i| s.send(Message::ConsoleSubmit(i.value()))
        });
        input.handle({
            let s = *sender;
            move |_, ev| match ev {
                Event::KeyDown if fltk::app::event_key() == Key::Up => {
                    s.send(Message::ConsoleHistory(HistoryDirection::Older));
                    true
                }
                Event::KeyDown if fltk::app::event_key() == Key::Down => {
                    s.send(Message::ConsoleHistory(HistoryDirection::Newer));
                    true
                }
                _ => false,
            }
        });
        input.deactivate();

        Self {
            group,
            header,
            output,
            buffer,
            prompt,
            input,
        }
    }

    /// Append text and keep the last line in view.
    pub fn append(&mut self, text: &str) {
        self.buffer.append(text);
        let lines = self.buffer.count_lines(0, self.buffer.length());
        self.output.scroll(lines, 0);
    }

    pub fn append_line(&mut self, text: &str) {
        let needs_break = self.buffer.length() > 0
            && self
                .buffer
                .text_range(self.buffer.length() - 1, self.buffer.length())
                .is_some_and(|last| last != "\n");
        if needs_break {
            self.append("\n");
        }
        self.append(text);
        self.append("\n");
    }

    pub fn clear(&mut self) {
        self.buffer.set_text("");
    }

    /// Enable the input line with `prompt`, or disable it.
    pub fn set_input_enabled(&mut self, enabled: bool, prompt: &str) {
        self.prompt.set_label(prompt);
        if enabled {
            self.input.activate();
            let _ = self.input.take_focus();
        } else {
            self.input.set_value("");
            self.input.deactivate();
        }
        self.group.redraw();
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.input.set_value(text);
        let end = text.len() as i32;
        let _ = self.input.set_position(end);
    }

    pub fn clear_input(&mut self) {
        self.input.set_value("");
    }

    pub fn set_font(&mut self, font: Font, size: i32) {
        self.output.set_text_font(font);
        self.output.set_text_size(size);
        self.input.set_text_font(font);
        self.input.set_text_size(size);
        self.prompt.set_label_font(font);
        self.prompt.set_label_size(size);
        self.group.redraw();
    }

    pub fn apply_theme(&mut self, is_dark: bool) {
        let (bg, fg, chrome) = if is_dark {
            (Color::from_rgb(33, 33, 33), Color::from_rgb(230, 230, 230), Color::from_rgb(45, 45, 45))
        } else {
            (Color::from_rgb(250, 250, 250), Color::from_rgb(30, 30, 30), Color::from_rgb(225, 225, 225))
        };
        self.group.set_color(chrome);
        self.header.set_label_color(fg);
        self.output.set_color(bg);
        self.output.set_text_color(fg);
        self.prompt.set_label_color(fg);
        self.input.set_color(bg);
        self.input.set_text_color(fg);
        self.input.set_cursor_color(fg);
        self.group.redraw();
    }
}
