use fltk::enums::Font;
use serde::{Deserialize, Serialize};

use crate::app::services::session::SessionRestore;

pub const MIN_FONT_SIZE: u32 = 6;
pub const MAX_FONT_SIZE: u32 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
    SystemDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FontChoice {
    ScreenBold,
    Courier,
    HelveticaMono,
}

impl FontChoice {
    pub fn to_fltk(self) -> Font {
        match self {
            FontChoice::ScreenBold => Font::ScreenBold,
            FontChoice::Courier => Font::Courier,
            FontChoice::HelveticaMono => Font::Screen,
        }
    }
}

/// Syntax highlighting themes bundled with syntect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SyntaxTheme {
    #[default]
    Base16OceanDark,
    Base16OceanLight,
    Base16EightiesDark,
    Base16MochaDark,
    SolarizedDark,
    SolarizedLight,
    InspiredGitHub,
}

impl SyntaxTheme {
    /// Key into syntect's default `ThemeSet`.
    pub fn theme_key(&self) -> &'static str {
        match self {
            Self::Base16OceanDark => "base16-ocean.dark",
            Self::Base16OceanLight => "base16-ocean.light",
            Self::Base16EightiesDark => "base16-eighties.dark",
            Self::Base16MochaDark => "base16-mocha.dark",
            Self::SolarizedDark => "Solarized (dark)",
            Self::SolarizedLight => "Solarized (light)",
            Self::InspiredGitHub => "InspiredGitHub",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_line_numbers")]
    pub line_numbers_enabled: bool,

    #[serde(default)]
    pub word_wrap_enabled: bool,

    #[serde(default = "default_highlighting")]
    pub highlighting_enabled: bool,

    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,

    #[serde(default = "default_font")]
    pub font: FontChoice,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_session_restore")]
    pub session_restore: SessionRestore,

    #[serde(default = "default_syntax_theme_light")]
    pub syntax_theme_light: SyntaxTheme,

    #[serde(default = "default_syntax_theme_dark")]
    pub syntax_theme_dark: SyntaxTheme,

    /// Tab width in spaces.
    #[serde(default = "default_tab_size")]
    pub tab_size: u32,

    /// Program used by Run Script and Run with Debugger.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Seconds between background session saves. 0 disables autosave.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u32,

    #[serde(default = "default_console_visible")]
    pub console_visible: bool,
}

fn default_line_numbers() -> bool {
    true
}

fn default_highlighting() -> bool {
    true
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::SystemDefault
}

fn default_font() -> FontChoice {
    FontChoice::Courier
}

fn default_font_size() -> u32 {
    12
}

fn default_session_restore() -> SessionRestore {
    SessionRestore::Full
}

fn default_syntax_theme_light() -> SyntaxTheme {
    SyntaxTheme::InspiredGitHub
}

fn default_syntax_theme_dark() -> SyntaxTheme {
    SyntaxTheme::Base16OceanDark
}

fn default_tab_size() -> u32 {
    4
}

fn default_interpreter() -> String {
    if cfg!(target_os = "windows") {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

fn default_autosave_interval() -> u32 {
    60
}

fn default_console_visible() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            line_numbers_enabled: default_line_numbers(),
            word_wrap_enabled: false,
            highlighting_enabled: default_highlighting(),
            theme_mode: default_theme_mode(),
            font: default_font(),
            font_size: default_font_size(),
            session_restore: default_session_restore(),
            syntax_theme_light: default_syntax_theme_light(),
            syntax_theme_dark: default_syntax_theme_dark(),
            tab_size: default_tab_size(),
            interpreter: default_interpreter(),
            autosave_interval_secs: default_autosave_interval(),
            console_visible: default_console_visible(),
        }
    }
}

impl AppSettings {
    pub fn current_syntax_theme(&self, is_dark: bool) -> SyntaxTheme {
        if is_dark {
            self.syntax_theme_dark
        } else {
            self.syntax_theme_light
        }
    }

    /// Grow the font by one point. Returns false when already at the maximum.
    pub fn increase_font_size(&mut self) -> bool {
        if self.font_size >= MAX_FONT_SIZE {
            return false;
        }
        self.font_size += 1;
        true
    }

    /// Shrink the font by one point. Returns false when already at the minimum.
    pub fn decrease_font_size(&mut self) -> bool {
        if self.font_size <= MIN_FONT_SIZE {
            return false;
        }
        self.font_size -= 1;
        true
    }

    /// Clamp values a hand-edited config file may have pushed out of range.
    pub fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if self.tab_size == 0 {
            self.tab_size = default_tab_size();
        }
        if self.interpreter.trim().is_empty() {
            self.interpreter = default_interpreter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.font_size, 12);
        assert!(settings.line_numbers_enabled);
        assert!(!settings.word_wrap_enabled);
        assert_eq!(settings.theme_mode, ThemeMode::SystemDefault);
        assert_eq!(settings.font, FontChoice::Courier);
        assert_eq!(settings.session_restore, SessionRestore::Full);
        assert_eq!(settings.tab_size, 4);
        assert_eq!(settings.autosave_interval_secs, 60);
        assert!(!settings.interpreter.is_empty());
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"line_numbers_enabled": false}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.font_size, 12);
        assert!(!settings.line_numbers_enabled);
    }

    #[test]
    fn test_theme_mode_serialization() {
        let settings = AppSettings {
            theme_mode: ThemeMode::Dark,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"Dark\""));
    }

    #[test]
    fn test_font_size_bounds() {
        let mut settings = AppSettings {
            font_size: MAX_FONT_SIZE - 1,
            ..Default::default()
        };
        assert!(settings.increase_font_size());
        assert!(!settings.increase_font_size());
        assert_eq!(settings.font_size, MAX_FONT_SIZE);

        settings.font_size = MIN_FONT_SIZE + 1;
        assert!(settings.decrease_font_size());
        assert!(!settings.decrease_font_size());
        assert_eq!(settings.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn test_sanitize_out_of_range_values() {
        let json = r#"{"font_size": 500, "tab_size": 0, "interpreter": "  "}"#;
        let mut settings: AppSettings = serde_json::from_str(json).unwrap();
        settings.sanitize();
        assert_eq!(settings.font_size, MAX_FONT_SIZE);
        assert_eq!(settings.tab_size, 4);
        assert_eq!(settings.interpreter, default_interpreter());
    }

    #[test]
    fn test_current_syntax_theme() {
        let settings = AppSettings::default();
        assert_eq!(settings.current_syntax_theme(true), SyntaxTheme::Base16OceanDark);
        assert_eq!(settings.current_syntax_theme(false), SyntaxTheme::InspiredGitHub);
    }

    #[test]
    fn test_font_choice_to_fltk() {
        assert_eq!(FontChoice::Courier.to_fltk(), Font::Courier);
        assert_eq!(FontChoice::HelveticaMono.to_fltk(), Font::Screen);
    }
}
