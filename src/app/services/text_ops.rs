use std::path::Path;

use regex_lite::{Regex, RegexBuilder};

/// Extract filename from a file path
///
/// Returns the filename component of a path, or "Unknown" if it can't be extracted.
pub fn extract_filename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Options shared by find, replace and replace-all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Only match when no ASCII word character touches either end.
    pub whole_word: bool,
}

/// A match located by [`find_with_wrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub start: usize,
    pub end: usize,
    /// True when the match was found only after restarting at the top.
    pub wrapped: bool,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Literal matcher for a query. Whole-word mode rejects candidates that
/// touch a word character on either side, so queries that start or end
/// with punctuation still match.
struct Matcher {
    re: Regex,
    whole_word: bool,
}

impl Matcher {
    /// None for an empty query.
    fn new(query: &str, options: SearchOptions) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        let re = RegexBuilder::new(&regex_lite::escape(query))
            .case_insensitive(!options.case_sensitive)
            .build()
            .ok()?;
        Some(Self {
            re,
            whole_word: options.whole_word,
        })
    }

    fn is_standalone(&self, text: &str, start: usize, end: usize) -> bool {
        if !self.whole_word {
            return true;
        }
        let bytes = text.as_bytes();
        let before = start > 0 && is_word_byte(bytes[start - 1]);
        let after = end < bytes.len() && is_word_byte(bytes[end]);
        !before && !after
    }

    /// First accepted match starting at or after `start` (a char boundary).
    fn find_at(&self, text: &str, mut start: usize) -> Option<(usize, usize)> {
        while start <= text.len() {
            let m = self.re.find_at(text, start)?;
            if self.is_standalone(text, m.start(), m.end()) {
                return Some((m.start(), m.end()));
            }
            // Retry one character later; the next candidate may overlap.
            start = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    /// Non-overlapping accepted matches, left to right.
    fn find_all(&self, text: &str) -> Vec<(usize, usize)> {
        let mut hits = Vec::new();
        let mut pos = 0;
        while let Some((start, end)) = self.find_at(text, pos) {
            hits.push((start, end));
            pos = if end > start { end } else { end + 1 };
        }
        hits
    }
}

/// Find the next match at or after `start_pos` (a byte offset).
/// Returns the byte range of the match.
pub fn find_next(text: &str, query: &str, start_pos: usize, options: SearchOptions) -> Option<(usize, usize)> {
    let matcher = Matcher::new(query, options)?;
    if start_pos > text.len() {
        return None;
    }
    // Positions from FLTK are byte offsets and may land inside a multi-byte char.
    let mut start = start_pos;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    matcher.find_at(text, start)
}

/// Find forward from `start_pos`; if nothing is found, retry from the top.
pub fn find_with_wrap(text: &str, query: &str, start_pos: usize, options: SearchOptions) -> Option<SearchHit> {
    if let Some((start, end)) = find_next(text, query, start_pos, options) {
        return Some(SearchHit { start, end, wrapped: false });
    }
    if start_pos == 0 {
        return None;
    }
    find_next(text, query, 0, options).map(|(start, end)| SearchHit { start, end, wrapped: true })
}

/// True when the whole of `selected` is a match for the query.
pub fn selection_matches(selected: &str, query: &str, options: SearchOptions) -> bool {
    let Some(matcher) = Matcher::new(query, options) else {
        return false;
    };
    matcher.find_at(selected, 0) == Some((0, selected.len()))
}

/// Replace every match in a single pass. The replacement is inserted
/// literally, so `$1` and friends are not expanded.
///
/// Returns (new_text, count_of_replacements)
pub fn replace_all(text: &str, query: &str, replacement: &str, options: SearchOptions) -> (String, usize) {
    let Some(matcher) = Matcher::new(query, options) else {
        return (text.to_string(), 0);
    };
    let hits = matcher.find_all(text);
    if hits.is_empty() {
        return (text.to_string(), 0);
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for &(start, end) in &hits {
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = end;
    }
    out.push_str(&text[last..]);
    (out, hits.len())
}

/// Number of lines as shown in the gutter: newlines + 1.
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count() + 1
}

/// Gutter width in pixels for a buffer with `lines` lines.
pub fn linenumber_width(lines: usize) -> i32 {
    let digits = lines.max(1).to_string().len() as i32;
    (digits * 8 + 16).max(40)
}

/// 1-based (line, column) for a byte position. Columns count characters,
/// not bytes, so "é" advances the column by one.
pub fn cursor_line_col(text: &str, pos: usize) -> (usize, usize) {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    let before = &text[..pos];
    let line = before.bytes().filter(|b| *b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

/// Convert a 1-based line number to a byte position in the text
///
/// Returns None if the line number is 0 or beyond the end of the text.
pub fn line_number_to_byte_position(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    if line == 1 {
        return Some(0);
    }

    let mut current_line = 1;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            current_line += 1;
            if current_line == line {
                return Some(i + 1);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: SearchOptions = SearchOptions { case_sensitive: true, whole_word: false };
    const NOCASE: SearchOptions = SearchOptions { case_sensitive: false, whole_word: false };
    const WORD: SearchOptions = SearchOptions { case_sensitive: true, whole_word: true };

    #[test]
    fn test_extract_filename_from_path() {
        assert_eq!(extract_filename("/home/user/test.py"), "test.py");
        assert_eq!(extract_filename("script.py"), "script.py");
        assert_eq!(extract_filename("/path/with/many/levels/main.py"), "main.py");
    }

    #[test]
    fn test_extract_filename_edge_cases() {
        assert_eq!(extract_filename("/home/user/"), "user");
        assert_eq!(extract_filename(""), "Unknown");
        assert_eq!(extract_filename("."), "Unknown");
        assert_eq!(extract_filename("/"), "Unknown");
    }

    #[test]
    fn test_find_next_case_insensitive() {
        let text = "Hello world, hello Rust";
        assert_eq!(find_next(text, "hello", 0, NOCASE), Some((0, 5)));
        assert_eq!(find_next(text, "hello", 1, NOCASE), Some((13, 18)));
    }

    #[test]
    fn test_find_next_case_sensitive() {
        let text = "Hello world, hello Rust";
        assert_eq!(find_next(text, "hello", 0, CASE), Some((13, 18)));
        assert_eq!(find_next(text, "HELLO", 0, CASE), None);
    }

    #[test]
    fn test_find_whole_word() {
        let text = "print(printer, print)";
        assert_eq!(find_next(text, "print", 1, WORD), Some((15, 20)));
        assert_eq!(find_next(text, "print", 1, CASE), Some((6, 11)));
    }

    #[test]
    fn test_find_whole_word_with_punctuation_edges() {
        assert_eq!(find_next("f( x)", "f(", 0, WORD), Some((0, 2)));
        assert_eq!(find_next("gf( f(", "f(", 0, WORD), Some((4, 6)));
        assert_eq!(find_next("x = .5 + a.5", ".5", 0, WORD), Some((4, 6)));
        assert!(selection_matches("f(", "f(", WORD));
    }

    #[test]
    fn test_find_whole_word_overlapping_candidates() {
        // The first "aa" starts inside "aaa"; the standalone one follows.
        assert_eq!(find_next("aaa aa", "aa", 0, WORD), Some((4, 6)));
    }

    #[test]
    fn test_replace_all_whole_word_punctuation() {
        let (text, count) = replace_all("f( x) gf( f(", "f(", "g(", WORD);
        assert_eq!(text, "g( x) gf( g(");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_find_treats_query_literally() {
        let text = "a.b axb a.b";
        assert_eq!(find_next(text, "a.b", 1, CASE), Some((8, 11)));
        assert_eq!(find_next("f(x) + f(y)", "f(y)", 0, CASE), Some((7, 11)));
    }

    #[test]
    fn test_find_empty_query() {
        assert_eq!(find_next("hello", "", 0, CASE), None);
        assert_eq!(find_with_wrap("hello", "", 3, CASE), None);
    }

    #[test]
    fn test_find_start_beyond_text() {
        assert_eq!(find_next("hello", "hello", 100, CASE), None);
    }

    #[test]
    fn test_find_with_wrap() {
        let text = "cat dog cat";
        let hit = find_with_wrap(text, "cat", 9, CASE).unwrap();
        assert_eq!((hit.start, hit.end, hit.wrapped), (0, 3, true));

        let hit = find_with_wrap(text, "cat", 1, CASE).unwrap();
        assert_eq!((hit.start, hit.wrapped), (8, false));

        assert_eq!(find_with_wrap(text, "bird", 5, CASE), None);
    }

    #[test]
    fn test_find_position_inside_multibyte_char() {
        let text = "é x é";
        // Byte 1 is inside the first "é"; search resumes at the next boundary.
        assert_eq!(find_next(text, "é", 1, CASE), Some((5, 7)));
    }

    #[test]
    fn test_selection_matches() {
        assert!(selection_matches("Foo", "foo", NOCASE));
        assert!(!selection_matches("Foo", "foo", CASE));
        assert!(!selection_matches("foobar", "foo", CASE));
        assert!(!selection_matches("", "foo", CASE));
        assert!(!selection_matches("foo", "", CASE));
    }

    #[test]
    fn test_replace_all_simple() {
        let (text, count) = replace_all("cat cat cat", "cat", "dog", NOCASE);
        assert_eq!(text, "dog dog dog");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_all_case_sensitive() {
        let (text, count) = replace_all("Cat cat CAT", "cat", "dog", CASE);
        assert_eq!(text, "Cat dog CAT");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_replace_all_case_insensitive() {
        let (text, count) = replace_all("Cat cat CAT", "cat", "dog", NOCASE);
        assert_eq!(text, "dog dog dog");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_all_whole_word() {
        let (text, count) = replace_all("x = xs + x", "x", "y", WORD);
        assert_eq!(text, "y = xs + y");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_replace_all_literal_replacement() {
        let (text, count) = replace_all("a b", "a", "$0$1", CASE);
        assert_eq!(text, "$0$1 b");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_replace_all_replacement_contains_query() {
        let (text, count) = replace_all("ab ab", "ab", "abab", CASE);
        assert_eq!(text, "abab abab");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_replace_all_no_matches() {
        let (text, count) = replace_all("hello world", "rust", "ferris", NOCASE);
        assert_eq!(text, "hello world");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_replace_all_empty_query() {
        let (text, count) = replace_all("hello world", "", "X", NOCASE);
        assert_eq!(text, "hello world");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_replace_unicode() {
        let (text, count) = replace_all("Hello 世界", "世界", "World", NOCASE);
        assert_eq!(text, "Hello World");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("one"), 1);
        assert_eq!(line_count("one\ntwo"), 2);
        assert_eq!(line_count("one\ntwo\n"), 3);
    }

    #[test]
    fn test_linenumber_width() {
        assert_eq!(linenumber_width(1), 40);
        assert_eq!(linenumber_width(999), 40);
        assert_eq!(linenumber_width(1000), 48);
        assert_eq!(linenumber_width(100_000), 64);
        assert_eq!(linenumber_width(0), 40);
    }

    #[test]
    fn test_linenumber_width_grows_with_line_count() {
        let small = "x\n".repeat(10);
        let large = "x\n".repeat(20_000);
        assert!(linenumber_width(line_count(&large)) > linenumber_width(line_count(&small)));
    }

    #[test]
    fn test_cursor_line_col() {
        let text = "def f():\n    return 1\n";
        assert_eq!(cursor_line_col(text, 0), (1, 1));
        assert_eq!(cursor_line_col(text, 4), (1, 5));
        assert_eq!(cursor_line_col(text, 9), (2, 1));
        assert_eq!(cursor_line_col(text, 13), (2, 5));
        assert_eq!(cursor_line_col(text, text.len()), (3, 1));
        assert_eq!(cursor_line_col(text, 10_000), (3, 1));
    }

    #[test]
    fn test_cursor_col_counts_chars() {
        let text = "é = 1";
        assert_eq!(cursor_line_col(text, 2), (1, 2));
        // Inside the "é" snaps back to its start.
        assert_eq!(cursor_line_col(text, 1), (1, 1));
    }

    #[test]
    fn test_line_to_pos() {
        let text = "first\nsecond\nthird";
        assert_eq!(line_number_to_byte_position(text, 1), Some(0));
        assert_eq!(line_number_to_byte_position(text, 2), Some(6));
        assert_eq!(line_number_to_byte_position(text, 3), Some(13));
        assert_eq!(line_number_to_byte_position(text, 4), None);
        assert_eq!(line_number_to_byte_position(text, 0), None);
    }

    #[test]
    fn test_line_to_pos_agrees_with_line_count() {
        let text = "a\nb\n";
        let lines = line_count(text);
        assert!(line_number_to_byte_position(text, lines).is_some());
        assert!(line_number_to_byte_position(text, lines + 1).is_none());
    }
}
