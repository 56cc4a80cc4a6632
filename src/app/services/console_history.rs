/// Which way the user is walking through console history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Older,
    Newer,
}

const MAX_HISTORY: usize = 200;

/// Commands typed into the console input, newest first.
///
/// `cursor` is None while the user is editing a fresh line; Older/Newer
/// walk the list and Newer past the newest entry returns to an empty line.
#[derive(Debug, Default)]
pub struct ConsoleHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl ConsoleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted command. Blank lines and a repeat of the newest
    /// entry are not stored. Always resets navigation.
    pub fn record(&mut self, command: &str) {
        self.cursor = None;
        if command.trim().is_empty() {
            return;
        }
        if self.entries.first().map(String::as_str) == Some(command) {
            return;
        }
        self.entries.insert(0, command.to_string());
        self.entries.truncate(MAX_HISTORY);
    }

    /// Step through history. Returns the text to put in the input line,
    /// or None when there is nowhere to go.
    pub fn navigate(&mut self, direction: HistoryDirection) -> Option<String> {
        match direction {
            HistoryDirection::Older => {
                let next = self.cursor.map_or(0, |c| c + 1);
                let entry = self.entries.get(next)?;
                self.cursor = Some(next);
                Some(entry.clone())
            }
            HistoryDirection::Newer => match self.cursor? {
                0 => {
                    self.cursor = None;
                    Some(String::new())
                }
                c => {
                    self.cursor = Some(c - 1);
                    self.entries.get(c - 1).cloned()
                }
            },
        }
    }

    pub fn reset_navigation(&mut self) {
        self.cursor = None;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HistoryDirection::{Newer, Older};

    #[test]
    fn test_walks_newest_first() {
        let mut h = ConsoleHistory::new();
        h.record("n");
        h.record("p x");
        h.record("c");
        assert_eq!(h.navigate(Older).as_deref(), Some("c"));
        assert_eq!(h.navigate(Older).as_deref(), Some("p x"));
        assert_eq!(h.navigate(Older).as_deref(), Some("n"));
        assert_eq!(h.navigate(Older), None);
        assert_eq!(h.navigate(Newer).as_deref(), Some("p x"));
        assert_eq!(h.navigate(Newer).as_deref(), Some("c"));
        assert_eq!(h.navigate(Newer).as_deref(), Some(""));
        assert_eq!(h.navigate(Newer), None);
    }

    #[test]
    fn test_empty_history() {
        let mut h = ConsoleHistory::new();
        assert_eq!(h.navigate(Older), None);
        assert_eq!(h.navigate(Newer), None);
    }

    #[test]
    fn test_consecutive_duplicates_collapse() {
        let mut h = ConsoleHistory::new();
        h.record("n");
        h.record("n");
        h.record("s");
        h.record("n");
        assert_eq!(h.entries(), ["n", "s", "n"]);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let mut h = ConsoleHistory::new();
        h.record("   ");
        h.record("");
        assert!(h.entries().is_empty());
    }

    #[test]
    fn test_record_resets_navigation() {
        let mut h = ConsoleHistory::new();
        h.record("a");
        h.record("b");
        h.navigate(Older);
        h.navigate(Older);
        h.record("c");
        assert_eq!(h.navigate(Older).as_deref(), Some("c"));
    }

    #[test]
    fn test_history_bounded() {
        let mut h = ConsoleHistory::new();
        for i in 0..(MAX_HISTORY + 20) {
            h.record(&i.to_string());
        }
        assert_eq!(h.entries().len(), MAX_HISTORY);
    }
}
