use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::recent_files::RecentFiles;
use super::session::SessionData;
use crate::app::domain::settings::AppSettings;
use crate::app::infrastructure::error::{AppError, Result};

/// Everything persisted between runs, stored as one JSON document.
/// Preferences sit at the top level so older flat settings files still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub settings: AppSettings,

    #[serde(default)]
    pub recent_files: RecentFiles,

    #[serde(default)]
    pub session: SessionData,
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config_dir>/pyedit/settings.json`, falling back to the working directory.
    pub fn default_location() -> Self {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("pyedit");
        path.push("settings.json");
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file is missing
    /// or unreadable. Values are sanitized and stale recent files pruned.
    pub fn load(&self) -> ConfigFile {
        let mut config = match self.try_load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no config file yet, using defaults");
                ConfigFile::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to load config, using defaults");
                ConfigFile::default()
            }
        };
        config.settings.sanitize();
        let pruned = config.recent_files.prune_missing();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped missing recent files");
        }
        config
    }

    /// Ok(None) when the file does not exist.
    pub fn try_load(&self) -> Result<Option<ConfigFile>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Err(AppError::Config("config file is empty".to_string()));
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write the config atomically: serialize to a sibling temp file, then
    /// rename over the real one so a crash never leaves half a file behind.
    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut config = config.clone();
        config.recent_files.prune_missing();
        let json = serde_json::to_string_pretty(&config)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::settings::ThemeMode;
    use crate::app::services::session::DocumentSession;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("nested").join("settings.json"))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.try_load().unwrap().is_none());
        assert_eq!(store.load(), ConfigFile::default());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ this is not json").unwrap();
        let store = ConfigStore::new(path);
        assert!(matches!(store.try_load(), Err(AppError::Json(_))));
        assert_eq!(store.load(), ConfigFile::default());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "\n").unwrap();
        let store = ConfigStore::new(path);
        assert!(matches!(store.try_load(), Err(AppError::Config(_))));
        assert_eq!(store.load().settings, AppSettings::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let script = dir.path().join("main.py");
        fs::write(&script, "print('hi')\n").unwrap();
        let script = script.to_string_lossy().to_string();

        let mut config = ConfigFile::default();
        config.settings.theme_mode = ThemeMode::Dark;
        config.settings.font_size = 15;
        config.recent_files.push(&script);
        config.session.active_index = 0;
        config.session.tabs.push(DocumentSession {
            path: Some(script.clone()),
            content: None,
            cursor_position: 3,
            selection: None,
            is_dirty: false,
        });

        store.save(&config).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());

        let loaded = store.load();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_prunes_missing_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut config = ConfigFile::default();
        config.recent_files.push("/definitely/not/here.py");
        store.save(&config).unwrap();
        let loaded = store.try_load().unwrap().unwrap();
        assert!(loaded.recent_files.is_empty());
    }

    #[test]
    fn test_flat_settings_file_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"font_size": 18, "theme_mode": "Light"}"#).unwrap();
        let loaded = ConfigStore::new(path).load();
        assert_eq!(loaded.settings.font_size, 18);
        assert_eq!(loaded.settings.theme_mode, ThemeMode::Light);
        assert!(loaded.session.tabs.is_empty());
    }

    #[test]
    fn test_load_sanitizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"font_size": 1}"#).unwrap();
        let loaded = ConfigStore::new(path).load();
        assert_eq!(loaded.settings.font_size, crate::app::domain::settings::MIN_FONT_SIZE);
    }
}
