use fltk::{
    enums::{Align, Color, FrameType},
    frame::Frame,
    group::{Flex, FlexType},
    prelude::*,
};

use crate::app::services::status::label_text;

pub const STATUS_BAR_HEIGHT: i32 = 24;
const CURSOR_WIDTH: i32 = 120;
const FILE_TYPE_WIDTH: i32 = 100;

/// Message area on the left, cursor position and file type on the right.
pub struct StatusBar {
    pub row: Flex,
    message: Frame,
    cursor: Frame,
    file_type: Frame,
}

impl StatusBar {
    pub fn new() -> Self {
        let mut row = Flex::default();
        row.set_type(FlexType::Row);
        row.set_frame(FrameType::FlatBox);
        row.set_margins(6, 0, 6, 0);

        let mut message = Frame::default();
        message.set_align(Align::Left | Align::Inside | Align::Clip);
        let mut cursor = Frame::default().with_label("Ln 1, Col 1");
        cursor.set_align(Align::Right | Align::Inside);
        row.fixed(&cursor, CURSOR_WIDTH);
        let mut file_type = Frame::default();
        file_type.set_align(Align::Right | Align::Inside);
        row.fixed(&file_type, FILE_TYPE_WIDTH);
        row.end();

        for f in [&mut message, &mut cursor, &mut file_type] {
            f.set_label_size(12);
        }

        Self {
            row,
            message,
            cursor,
            file_type,
        }
    }

    pub fn set_message(&mut self, text: &str) {
        self.message.set_label(&label_text(text));
        self.message.redraw();
    }

    pub fn set_cursor(&mut self, text: &str) {
        self.cursor.set_label(&label_text(text));
        self.cursor.redraw();
    }

    pub fn set_file_type(&mut self, text: &str) {
        self.file_type.set_label(&label_text(text));
        self.file_type.redraw();
    }

    pub fn apply_theme(&mut self, is_dark: bool) {
        let (bg, fg) = if is_dark {
            (Color::from_rgb(35, 35, 35), Color::from_rgb(200, 200, 200))
        } else {
            (Color::from_rgb(225, 225, 225), Color::from_rgb(40, 40, 40))
        };
        self.row.set_color(bg);
        for f in [&mut self.message, &mut self.cursor, &mut self.file_type] {
            f.set_label_color(fg);
        }
        self.row.redraw();
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
