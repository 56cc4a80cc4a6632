use std::collections::HashMap;

use fltk::enums::{Color, Font};
use fltk::text::StyleTableEntry;
use syntect::highlighting::Color as SyntectColor;

/// Highest style character FLTK will see. Colors past 'Z' share it.
const LAST_STYLE: u8 = b'Z';

/// Maps syntect foreground colors to FLTK style characters ('A', 'B', ...)
/// and builds the matching `StyleTableEntry` table as colors appear.
pub struct StyleMap {
    color_to_char: HashMap<(u8, u8, u8), char>,
    entries: Vec<StyleTableEntry>,
    font: Font,
    font_size: i32,
    changed: bool,
}

impl StyleMap {
    pub fn new(font: Font, font_size: i32) -> Self {
        let mut map = Self {
            color_to_char: HashMap::new(),
            entries: Vec::new(),
            font,
            font_size,
            changed: true,
        };
        map.insert_default();
        map
    }

    // 'A' is plain text in the widget's foreground color.
    fn insert_default(&mut self) {
        self.entries.push(StyleTableEntry {
            color: Color::Foreground,
            font: self.font,
            size: self.font_size,
        });
        self.color_to_char.insert((0, 0, 0), 'A');
    }

    pub fn get_or_insert(&mut self, color: SyntectColor) -> char {
        let key = (color.r, color.g, color.b);
        if let Some(&ch) = self.color_to_char.get(&key) {
            return ch;
        }

        let idx = self.entries.len();
        if idx > (LAST_STYLE - b'A') as usize {
            return LAST_STYLE as char;
        }
        let ch = (b'A' + idx as u8) as char;
        self.entries.push(StyleTableEntry {
            color: Color::from_rgb(color.r, color.g, color.b),
            font: self.font,
            size: self.font_size,
        });
        self.color_to_char.insert(key, ch);
        self.changed = true;
        ch
    }

    pub fn entries(&self) -> &[StyleTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every mapping (theme change).
    pub fn clear(&mut self) {
        self.color_to_char.clear();
        self.entries.clear();
        self.insert_default();
        self.changed = true;
    }

    pub fn update_font(&mut self, font: Font, size: i32) {
        self.font = font;
        self.font_size = size;
        for entry in &mut self.entries {
            entry.font = font;
            entry.size = size;
        }
        self.changed = true;
    }

    pub fn has_new_entries(&self) -> bool {
        self.changed
    }

    pub fn reset_changed(&mut self) {
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> SyntectColor {
        SyntectColor { r, g, b, a: 255 }
    }

    #[test]
    fn test_assigns_sequential_chars() {
        let mut map = StyleMap::new(Font::Courier, 12);
        assert_eq!(map.get_or_insert(rgb(0, 0, 0)), 'A');
        assert_eq!(map.get_or_insert(rgb(200, 0, 0)), 'B');
        assert_eq!(map.get_or_insert(rgb(0, 200, 0)), 'C');
        assert_eq!(map.get_or_insert(rgb(200, 0, 0)), 'B');
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_caps_at_last_style() {
        let mut map = StyleMap::new(Font::Courier, 12);
        for i in 1..40u8 {
            let ch = map.get_or_insert(rgb(i, i, i));
            assert!(ch <= 'Z');
        }
        assert_eq!(map.len(), 26);
    }

    #[test]
    fn test_change_tracking() {
        let mut map = StyleMap::new(Font::Courier, 12);
        assert!(map.has_new_entries());
        map.reset_changed();
        map.get_or_insert(rgb(0, 0, 0));
        assert!(!map.has_new_entries());
        map.get_or_insert(rgb(1, 2, 3));
        assert!(map.has_new_entries());

        map.reset_changed();
        map.update_font(Font::Screen, 16);
        assert!(map.has_new_entries());
        assert!(map.entries().iter().all(|e| e.size == 16));
    }

    #[test]
    fn test_clear_keeps_default() {
        let mut map = StyleMap::new(Font::Courier, 12);
        map.get_or_insert(rgb(9, 9, 9));
        map.clear();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_or_insert(rgb(9, 9, 9)), 'B');
    }
}
