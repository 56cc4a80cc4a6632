use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MAX_RECENT_FILES: usize = 10;

/// Most-recently-used file list: newest first, no duplicates, bounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentFiles {
    paths: Vec<String>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `path` to the front, dropping an older copy and the oldest
    /// entry if the list is full.
    pub fn push(&mut self, path: &str) {
        self.paths.retain(|p| p != path);
        self.paths.insert(0, path.to_string());
        self.paths.truncate(MAX_RECENT_FILES);
    }

    /// Drop entries whose file no longer exists. Returns how many were removed.
    pub fn prune_missing(&mut self) -> usize {
        self.prune_where(|p| !Path::new(p).exists())
    }

    fn prune_where(&mut self, mut missing: impl FnMut(&str) -> bool) -> usize {
        let before = self.paths.len();
        self.paths.retain(|p| !missing(p));
        self.paths.truncate(MAX_RECENT_FILES);
        before - self.paths.len()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// Menu label for a recent entry: "1 script.py". '&' and '@' are doubled and
/// '/', '\\' and '_' are backslash-escaped so FLTK shows them literally
/// instead of treating them as shortcuts or submenu separators.
pub fn menu_label(index: usize, path: &str) -> String {
    let name = super::text_ops::extract_filename(path);
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '&' => escaped.push_str("&&"),
            '@' => escaped.push_str("@@"),
            '/' | '\\' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    format!("{} {}", index + 1, escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_orders_most_recent_first() {
        let mut recent = RecentFiles::new();
        recent.push("/a.py");
        recent.push("/b.py");
        recent.push("/c.py");
        assert_eq!(recent.paths(), ["/c.py", "/b.py", "/a.py"]);
    }

    #[test]
    fn test_push_deduplicates() {
        let mut recent = RecentFiles::new();
        recent.push("/a.py");
        recent.push("/b.py");
        recent.push("/a.py");
        assert_eq!(recent.paths(), ["/a.py", "/b.py"]);
    }

    #[test]
    fn test_bounded() {
        let mut recent = RecentFiles::new();
        for i in 0..25 {
            recent.push(&format!("/file{}.py", i));
        }
        assert_eq!(recent.len(), MAX_RECENT_FILES);
        assert_eq!(recent.paths()[0], "/file24.py");
        assert_eq!(recent.paths()[MAX_RECENT_FILES - 1], "/file15.py");
    }

    #[test]
    fn test_prune_missing() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.py");
        std::fs::write(&kept, "x = 1\n").unwrap();
        let kept = kept.to_string_lossy().to_string();
        let gone = dir.path().join("gone.py").to_string_lossy().to_string();

        let mut recent = RecentFiles::new();
        recent.push(&gone);
        recent.push(&kept);
        assert_eq!(recent.prune_missing(), 1);
        assert_eq!(recent.paths(), [kept]);
    }

    #[test]
    fn test_oversized_list_truncated_on_prune() {
        let json = serde_json::to_string(&(0..15).map(|i| format!("/f{}", i)).collect::<Vec<_>>()).unwrap();
        let mut recent: RecentFiles = serde_json::from_str(&json).unwrap();
        recent.prune_where(|_| false);
        assert_eq!(recent.len(), MAX_RECENT_FILES);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut recent = RecentFiles::new();
        recent.push("/a.py");
        assert_eq!(serde_json::to_string(&recent).unwrap(), r#"["/a.py"]"#);
    }

    #[test]
    fn test_clear() {
        let mut recent = RecentFiles::new();
        recent.push("/a.py");
        recent.clear();
        assert!(recent.is_empty());
    }

    #[test]
    fn test_menu_label() {
        assert_eq!(menu_label(0, "/home/me/main.py"), "1 main.py");
        assert_eq!(menu_label(9, "/tmp/a&b_c.py"), "10 a&&b\\_c.py");
        assert_eq!(menu_label(1, "/tmp/me@host.py"), "2 me@@host.py");
    }
}
