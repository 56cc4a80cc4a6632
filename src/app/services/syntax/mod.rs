mod highlighter;
mod style_map;

use std::path::Path;

use fltk::enums::Font;
use fltk::text::StyleTableEntry;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

pub use highlighter::{DirtyLines, IncrementalResult, LineStates};
use style_map::StyleMap;

use crate::app::domain::settings::SyntaxTheme;

/// Grammar used for buffers that have no file name yet.
pub const DEFAULT_SYNTAX: &str = "Python";

pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    style_map: StyleMap,
}

impl SyntaxHighlighter {
    pub fn new(theme: SyntaxTheme, font: Font, font_size: i32) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.theme_key().to_string(),
            style_map: StyleMap::new(font, font_size),
        }
    }

    /// Syntax name for a path, by extension. `None` means plain text.
    /// Untitled buffers (no path) get Python.
    pub fn detect_syntax(&self, file_path: Option<&str>) -> Option<String> {
        let Some(file_path) = file_path else {
            return Some(DEFAULT_SYNTAX.to_string());
        };
        let ext = Path::new(file_path).extension()?.to_str()?;
        let syntax = self.syntax_set.find_syntax_by_extension(ext)?;
        if syntax.name == "Plain Text" {
            return None;
        }
        Some(syntax.name.clone())
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set.themes.get(&self.theme_name)
    }

    /// Style string for the whole text, one char per byte. Refreshes `states`.
    pub fn highlight_full(&mut self, text: &str, syntax_name: &str, states: &mut LineStates) -> String {
        let Some(syntax) = self.syntax_set.find_syntax_by_name(syntax_name) else {
            states.clear();
            return make_default_style(text);
        };
        let Some(theme) = self.theme_set.themes.get(&self.theme_name) else {
            states.clear();
            return make_default_style(text);
        };
        highlighter::highlight_full(text, syntax, &self.syntax_set, theme, &mut self.style_map, states)
    }

    /// Re-highlight after edits in `dirty`. Falls back to a full pass
    /// when there is no usable cache.
    pub fn highlight_incremental(
        &mut self,
        text: &str,
        dirty: DirtyLines,
        syntax_name: &str,
        states: &mut LineStates,
    ) -> IncrementalResult {
        if let (Some(syntax), Some(theme)) = (
            self.syntax_set.find_syntax_by_name(syntax_name),
            self.theme_set.themes.get(&self.theme_name),
        ) && !states.is_empty()
        {
            return highlighter::highlight_incremental(
                text,
                dirty,
                syntax,
                &self.syntax_set,
                theme,
                &mut self.style_map,
                states,
            );
        }
        IncrementalResult {
            byte_start: 0,
            style_chars: self.highlight_full(text, syntax_name, states),
        }
    }

    /// Switch theme. Style chars are reassigned, so callers must re-highlight.
    pub fn set_theme(&mut self, theme: SyntaxTheme) {
        let key = theme.theme_key();
        if self.theme_name != key {
            self.theme_name = key.to_string();
            self.style_map.clear();
        }
    }

    /// Theme background as RGB, white when the theme has none.
    pub fn theme_background(&self) -> (u8, u8, u8) {
        self.theme()
            .and_then(|t| t.settings.background)
            .map(|bg| (bg.r, bg.g, bg.b))
            .unwrap_or((255, 255, 255))
    }

    pub fn theme_foreground(&self) -> (u8, u8, u8) {
        self.theme()
            .and_then(|t| t.settings.foreground)
            .map(|fg| (fg.r, fg.g, fg.b))
            .unwrap_or((0, 0, 0))
    }

    pub fn set_font(&mut self, font: Font, size: i32) {
        self.style_map.update_font(font, size);
    }

    /// Style table for FLTK's `set_highlight_data`.
    pub fn style_table(&self) -> Vec<StyleTableEntry> {
        self.style_map.entries().to_vec()
    }

    pub fn style_table_changed(&self) -> bool {
        self.style_map.has_new_entries()
    }

    pub fn reset_style_table_changed(&mut self) {
        self.style_map.reset_changed();
    }
}

pub fn make_default_style(text: &str) -> String {
    "A".repeat(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> SyntaxHighlighter {
        SyntaxHighlighter::new(SyntaxTheme::InspiredGitHub, Font::Courier, 12)
    }

    const SOURCE: &str = "import os\n\ndef main():\n    \"\"\"Doc.\"\"\"\n    return os.getcwd()  # cwd\n";

    #[test]
    fn test_detect_syntax() {
        let hl = highlighter();
        assert_eq!(hl.detect_syntax(Some("/tmp/a.py")).as_deref(), Some("Python"));
        assert_eq!(hl.detect_syntax(None).as_deref(), Some("Python"));
        assert_eq!(hl.detect_syntax(Some("/tmp/notes.txt")), None);
        assert_eq!(hl.detect_syntax(Some("/tmp/Makefile")), None);
    }

    #[test]
    fn test_full_highlight_is_byte_aligned() {
        let mut hl = highlighter();
        let mut states = LineStates::default();
        let text = "s = 'héllo'\nprint(s)\n";
        let styles = hl.highlight_full(text, "Python", &mut states);
        assert_eq!(styles.len(), text.len());
        assert_eq!(states.len(), 2);
        assert!(styles.chars().all(|c| c.is_ascii_uppercase()));
        // Keywords and strings get their own colors.
        assert!(styles.chars().any(|c| c != 'A'));
    }

    #[test]
    fn test_unknown_syntax_uses_plain_style() {
        let mut hl = highlighter();
        let mut states = LineStates::default();
        let styles = hl.highlight_full("abc", "No Such Grammar", &mut states);
        assert_eq!(styles, "AAA");
        assert!(states.is_empty());
    }

    fn apply(styles: &mut String, result: &IncrementalResult) {
        let end = (result.byte_start + result.style_chars.len()).min(styles.len());
        styles.replace_range(result.byte_start..end, &result.style_chars);
    }

    #[test]
    fn test_incremental_matches_full_after_edit() {
        let mut hl = highlighter();
        let mut states = LineStates::default();
        let mut styles = hl.highlight_full(SOURCE, "Python", &mut states);

        let edited = SOURCE.replace("return os.getcwd()", "return os.getcwd() + 'x'");
        // Mirror the style buffer insert done by the modify callback.
        let pos = SOURCE.find("  # cwd").unwrap();
        styles.insert_str(pos, &"A".repeat(edited.len() - SOURCE.len()));

        let result = hl.highlight_incremental(&edited, DirtyLines { first: 4, last: 4 }, "Python", &mut states);
        assert_eq!(result.byte_start, SOURCE.find("    return").unwrap());
        apply(&mut styles, &result);

        let mut fresh_states = LineStates::default();
        let expected = hl.highlight_full(&edited, "Python", &mut fresh_states);
        assert_eq!(styles, expected);
        assert_eq!(states.len(), fresh_states.len());
    }

    #[test]
    fn test_incremental_handles_inserted_lines() {
        let mut hl = highlighter();
        let mut states = LineStates::default();
        let mut styles = hl.highlight_full(SOURCE, "Python", &mut states);

        let insert = "x = \"\"\"\nopen\n\"\"\"\n";
        let pos = SOURCE.find("def main").unwrap();
        let edited = format!("{}{}{}", &SOURCE[..pos], insert, &SOURCE[pos..]);
        styles.insert_str(pos, &"A".repeat(insert.len()));

        let result = hl.highlight_incremental(&edited, DirtyLines { first: 2, last: 5 }, "Python", &mut states);
        apply(&mut styles, &result);

        let mut fresh_states = LineStates::default();
        let expected = hl.highlight_full(&edited, "Python", &mut fresh_states);
        assert_eq!(styles, expected);
        assert_eq!(states.len(), fresh_states.len());
    }

    #[test]
    fn test_incremental_without_cache_is_full() {
        let mut hl = highlighter();
        let mut states = LineStates::default();
        let result = hl.highlight_incremental(SOURCE, DirtyLines { first: 3, last: 3 }, "Python", &mut states);
        assert_eq!(result.byte_start, 0);
        assert_eq!(result.style_chars.len(), SOURCE.len());
        assert!(!states.is_empty());
    }

    #[test]
    fn test_theme_switch() {
        let mut hl = highlighter();
        let light_bg = hl.theme_background();
        hl.set_theme(SyntaxTheme::Base16OceanDark);
        assert_ne!(hl.theme_background(), light_bg);
        assert!(hl.style_table_changed());
        hl.reset_style_table_changed();
        assert!(!hl.style_table_changed());
    }
}
