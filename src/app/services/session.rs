//! Session capture and restore.
//!
//! The UI side turns open tabs into [`TabSnapshot`]s; everything here works
//! on those plain values so the rules can be tested without FLTK.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionRestore {
    /// Start with a single empty tab every time.
    Off,
    /// Reopen files that exist on disk; unsaved edits are dropped.
    SavedFiles,
    /// Reopen everything, including unsaved and untitled buffers.
    #[default]
    Full,
}

/// State of one open tab at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSnapshot {
    pub file_path: Option<String>,
    pub content: String,
    pub cursor_position: i32,
    pub selection: Option<(i32, i32)>,
    pub is_dirty: bool,
}

/// Persisted record of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSession {
    #[serde(default)]
    pub path: Option<String>,
    /// Buffer text, stored only for modified or untitled tabs.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cursor_position: i32,
    #[serde(default)]
    pub selection: Option<(i32, i32)>,
    #[serde(default)]
    pub is_dirty: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub active_index: usize,
    #[serde(default)]
    pub tabs: Vec<DocumentSession>,
    #[serde(default)]
    pub last_open_directory: Option<String>,
}

/// A tab to recreate at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredTab {
    /// None for an untitled buffer (including files that vanished while
    /// holding unsaved edits).
    pub file_path: Option<String>,
    pub content: String,
    pub is_dirty: bool,
    pub cursor_position: i32,
    pub selection: Option<(i32, i32)>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestorePlan {
    pub tabs: Vec<RestoredTab>,
    pub active_index: Option<usize>,
    pub warnings: Vec<String>,
}

pub fn missing_file_warning(path: &str) -> String {
    format!("Could not open file: {}. It may have been moved or deleted.", path)
}

/// Build the persisted session from the open tabs, in tab order.
///
/// Empty untitled tabs are skipped. `active` is the index of the focused
/// tab in `tabs`; it is remapped onto the filtered list.
pub fn capture_session(
    tabs: &[TabSnapshot],
    active: usize,
    mode: SessionRestore,
    last_open_directory: Option<&str>,
) -> SessionData {
    let mut data = SessionData {
        last_open_directory: last_open_directory.map(str::to_string),
        ..Default::default()
    };
    if mode == SessionRestore::Off {
        return data;
    }

    let mut kept_indices = Vec::new();
    for (i, tab) in tabs.iter().enumerate() {
        let untitled = tab.file_path.is_none();
        if untitled && tab.content.is_empty() {
            continue;
        }

        let entry = match mode {
            SessionRestore::SavedFiles => {
                if untitled {
                    continue;
                }
                DocumentSession {
                    path: tab.file_path.clone(),
                    content: None,
                    cursor_position: tab.cursor_position,
                    selection: tab.selection,
                    is_dirty: false,
                }
            }
            _ => DocumentSession {
                path: tab.file_path.clone(),
                content: (tab.is_dirty || untitled).then(|| tab.content.clone()),
                cursor_position: tab.cursor_position,
                selection: tab.selection,
                is_dirty: tab.is_dirty,
            },
        };
        kept_indices.push(i);
        data.tabs.push(entry);
    }

    data.active_index = remap_active(&kept_indices, active);
    data
}

/// Turn a loaded session into tabs to open, reading clean files from disk.
pub fn restore_session(data: &SessionData, mode: SessionRestore) -> RestorePlan {
    restore_with(data, mode, |path| fs::read_to_string(path).ok(), |path| Path::new(path).exists())
}

fn restore_with(
    data: &SessionData,
    mode: SessionRestore,
    read: impl Fn(&str) -> Option<String>,
    exists: impl Fn(&str) -> bool,
) -> RestorePlan {
    let mut plan = RestorePlan::default();
    if mode == SessionRestore::Off {
        return plan;
    }

    let mut kept_indices = Vec::new();
    for (i, entry) in data.tabs.iter().enumerate() {
        let stored = match mode {
            SessionRestore::Full => entry.content.as_ref(),
            _ => None,
        };

        let restored = match (&entry.path, stored) {
            (Some(path), Some(content)) if entry.is_dirty => {
                if exists(path) {
                    Some(RestoredTab::new(Some(path.clone()), content.clone(), true, entry))
                } else {
                    // Keep the unsaved edits even though the file is gone.
                    plan.warnings.push(missing_file_warning(path));
                    Some(RestoredTab::new(None, content.clone(), true, entry))
                }
            }
            (Some(path), _) => match read(path) {
                Some(content) => Some(RestoredTab::new(Some(path.clone()), content, false, entry)),
                None => {
                    plan.warnings.push(missing_file_warning(path));
                    None
                }
            },
            (None, Some(content)) if !content.is_empty() => {
                Some(RestoredTab::new(None, content.clone(), entry.is_dirty, entry))
            }
            (None, _) => None,
        };

        if let Some(tab) = restored {
            kept_indices.push(i);
            plan.tabs.push(tab);
        }
    }

    if !plan.tabs.is_empty() {
        plan.active_index = Some(remap_active(&kept_indices, data.active_index));
    }
    plan
}

impl RestoredTab {
    fn new(file_path: Option<String>, content: String, is_dirty: bool, entry: &DocumentSession) -> Self {
        let len = content.len() as i32;
        let cursor_position = entry.cursor_position.clamp(0, len);
        let selection = entry
            .selection
            .map(|(a, b)| (a.clamp(0, len), b.clamp(0, len)))
            .filter(|(a, b)| a != b);
        Self {
            file_path,
            content,
            is_dirty,
            cursor_position,
            selection,
        }
    }
}

/// Position of `active` among `kept` original indices. Falls back to the
/// closest kept tab before it, then to the first tab.
fn remap_active(kept: &[usize], active: usize) -> usize {
    kept.iter()
        .position(|&i| i == active)
        .or_else(|| kept.iter().rposition(|&i| i < active))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(path: Option<&str>, content: &str, dirty: bool, cursor: i32) -> TabSnapshot {
        TabSnapshot {
            file_path: path.map(str::to_string),
            content: content.to_string(),
            cursor_position: cursor,
            selection: None,
            is_dirty: dirty,
        }
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_round_trip_full() {
        let dir = tempfile::tempdir().unwrap();
        let clean = write(&dir, "clean.py", "print('clean')\n");
        let dirty = write(&dir, "dirty.py", "x = 1\n");

        let tabs = vec![
            snap(Some(&clean), "print('clean')\n", false, 5),
            snap(Some(&dirty), "x = 2  # edited\n", true, 3),
            snap(None, "scratch = True\n", true, 7),
        ];
        let data = capture_session(&tabs, 1, SessionRestore::Full, None);

        let json = serde_json::to_string(&data).unwrap();
        let loaded: SessionData = serde_json::from_str(&json).unwrap();
        let plan = restore_session(&loaded, SessionRestore::Full);

        assert!(plan.warnings.is_empty());
        assert_eq!(plan.active_index, Some(1));
        assert_eq!(plan.tabs.len(), 3);

        assert_eq!(plan.tabs[0].file_path.as_deref(), Some(clean.as_str()));
        assert_eq!(plan.tabs[0].content, "print('clean')\n");
        assert!(!plan.tabs[0].is_dirty);
        assert_eq!(plan.tabs[0].cursor_position, 5);

        assert_eq!(plan.tabs[1].file_path.as_deref(), Some(dirty.as_str()));
        assert_eq!(plan.tabs[1].content, "x = 2  # edited\n");
        assert!(plan.tabs[1].is_dirty);

        assert_eq!(plan.tabs[2].file_path, None);
        assert_eq!(plan.tabs[2].content, "scratch = True\n");
        assert!(plan.tabs[2].is_dirty);
        assert_eq!(plan.tabs[2].cursor_position, 7);
    }

    #[test]
    fn test_clean_tabs_do_not_store_content() {
        let tabs = vec![snap(Some("/tmp/a.py"), "a = 1\n", false, 0)];
        let data = capture_session(&tabs, 0, SessionRestore::Full, None);
        assert_eq!(data.tabs[0].content, None);
    }

    #[test]
    fn test_empty_untitled_tabs_skipped() {
        let tabs = vec![
            snap(None, "", false, 0),
            snap(Some("/tmp/a.py"), "a", false, 0),
            snap(None, "", true, 0),
        ];
        let data = capture_session(&tabs, 1, SessionRestore::Full, None);
        assert_eq!(data.tabs.len(), 1);
        assert_eq!(data.active_index, 0);
    }

    #[test]
    fn test_active_index_remapped_when_active_skipped() {
        let tabs = vec![
            snap(Some("/tmp/a.py"), "a", false, 0),
            snap(Some("/tmp/b.py"), "b", false, 0),
            snap(None, "", false, 0),
        ];
        let data = capture_session(&tabs, 2, SessionRestore::Full, None);
        assert_eq!(data.active_index, 1);
    }

    #[test]
    fn test_saved_files_mode() {
        let tabs = vec![
            snap(None, "untitled text", true, 0),
            snap(Some("/tmp/a.py"), "edited", true, 2),
        ];
        let data = capture_session(&tabs, 1, SessionRestore::SavedFiles, Some("/tmp"));
        assert_eq!(data.tabs.len(), 1);
        assert_eq!(data.tabs[0].content, None);
        assert!(!data.tabs[0].is_dirty);
        assert_eq!(data.active_index, 0);
        assert_eq!(data.last_open_directory.as_deref(), Some("/tmp"));
    }

    #[test]
    fn test_saved_files_mode_ignores_stored_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.py", "on disk\n");
        let data = SessionData {
            tabs: vec![DocumentSession {
                path: Some(path),
                content: Some("unsaved".to_string()),
                cursor_position: 0,
                selection: None,
                is_dirty: true,
            }],
            ..Default::default()
        };
        let plan = restore_session(&data, SessionRestore::SavedFiles);
        assert_eq!(plan.tabs[0].content, "on disk\n");
        assert!(!plan.tabs[0].is_dirty);
    }

    #[test]
    fn test_off_mode() {
        let tabs = vec![snap(Some("/tmp/a.py"), "a", false, 0)];
        let data = capture_session(&tabs, 0, SessionRestore::Off, None);
        assert!(data.tabs.is_empty());
        let plan = restore_session(&data, SessionRestore::Off);
        assert!(plan.tabs.is_empty());
        assert_eq!(plan.active_index, None);
    }

    #[test]
    fn test_missing_clean_file_warns_and_skips() {
        let data = SessionData {
            tabs: vec![DocumentSession {
                path: Some("/nonexistent/gone.py".to_string()),
                content: None,
                cursor_position: 0,
                selection: None,
                is_dirty: false,
            }],
            ..Default::default()
        };
        let plan = restore_session(&data, SessionRestore::Full);
        assert!(plan.tabs.is_empty());
        assert_eq!(
            plan.warnings,
            vec!["Could not open file: /nonexistent/gone.py. It may have been moved or deleted.".to_string()]
        );
        assert_eq!(plan.active_index, None);
    }

    #[test]
    fn test_missing_dirty_file_restored_as_untitled() {
        let data = SessionData {
            tabs: vec![DocumentSession {
                path: Some("/nonexistent/gone.py".to_string()),
                content: Some("keep me".to_string()),
                cursor_position: 4,
                selection: None,
                is_dirty: true,
            }],
            ..Default::default()
        };
        let plan = restore_session(&data, SessionRestore::Full);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.tabs.len(), 1);
        assert_eq!(plan.tabs[0].file_path, None);
        assert_eq!(plan.tabs[0].content, "keep me");
        assert!(plan.tabs[0].is_dirty);
    }

    #[test]
    fn test_cursor_and_selection_clamped() {
        let data = SessionData {
            tabs: vec![DocumentSession {
                path: None,
                content: Some("abc".to_string()),
                cursor_position: 99,
                selection: Some((1, 50)),
                is_dirty: true,
            }],
            ..Default::default()
        };
        let plan = restore_with(&data, SessionRestore::Full, |_| None, |_| true);
        assert_eq!(plan.tabs[0].cursor_position, 3);
        assert_eq!(plan.tabs[0].selection, Some((1, 3)));
    }

    #[test]
    fn test_file_shrunk_on_disk_clamps_cursor() {
        let data = SessionData {
            tabs: vec![DocumentSession {
                path: Some("/virtual/a.py".to_string()),
                content: None,
                cursor_position: 500,
                selection: Some((400, 450)),
                is_dirty: false,
            }],
            ..Default::default()
        };
        let plan = restore_with(&data, SessionRestore::Full, |_| Some("short".to_string()), |_| true);
        assert_eq!(plan.tabs[0].cursor_position, 5);
        assert_eq!(plan.tabs[0].selection, None);
    }

    #[test]
    fn test_active_index_after_skipped_entries() {
        let data = SessionData {
            active_index: 2,
            tabs: vec![
                DocumentSession {
                    path: Some("/virtual/a.py".to_string()),
                    content: None,
                    cursor_position: 0,
                    selection: None,
                    is_dirty: false,
                },
                DocumentSession {
                    path: Some("/virtual/missing.py".to_string()),
                    content: None,
                    cursor_position: 0,
                    selection: None,
                    is_dirty: false,
                },
                DocumentSession {
                    path: Some("/virtual/c.py".to_string()),
                    content: None,
                    cursor_position: 0,
                    selection: None,
                    is_dirty: false,
                },
            ],
            ..Default::default()
        };
        let plan = restore_with(
            &data,
            SessionRestore::Full,
            |p| (!p.contains("missing")).then(|| "x".to_string()),
            |_| true,
        );
        assert_eq!(plan.tabs.len(), 2);
        assert_eq!(plan.active_index, Some(1));
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_tolerates_sparse_json() {
        let json = r#"{"tabs": [{"path": "/x.py"}]}"#;
        let data: SessionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.active_index, 0);
        assert_eq!(data.tabs[0].path.as_deref(), Some("/x.py"));
        assert!(!data.tabs[0].is_dirty);
    }
}
