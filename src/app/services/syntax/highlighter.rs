use syntect::highlighting::{HighlightIterator, HighlightState, Highlighter, Theme};
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

use super::style_map::StyleMap;

/// Parser and highlighter state at the start of every line, kept per
/// document so an edit only re-parses from the edited line.
#[derive(Default, Clone)]
pub struct LineStates {
    parse: Vec<ParseState>,
    highlight: Vec<HighlightState>,
}

impl LineStates {
    pub fn len(&self) -> usize {
        self.parse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parse.is_empty()
    }

    pub fn clear(&mut self) {
        self.parse.clear();
        self.highlight.clear();
    }

    fn push(&mut self, parse: &ParseState, highlight: &HighlightState) {
        self.parse.push(parse.clone());
        self.highlight.push(highlight.clone());
    }
}

/// Range of lines touched since the last highlight pass, in current line
/// numbers (0-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyLines {
    pub first: usize,
    pub last: usize,
}

pub struct IncrementalResult {
    /// Byte offset in the style buffer where changes begin.
    pub byte_start: usize,
    /// New style chars for `byte_start .. byte_start + style_chars.len()`.
    pub style_chars: String,
}

pub fn highlight_full(
    text: &str,
    syntax: &SyntaxReference,
    syntax_set: &SyntaxSet,
    theme: &Theme,
    style_map: &mut StyleMap,
    states: &mut LineStates,
) -> String {
    let highlighter = Highlighter::new(theme);
    let mut parse_state = ParseState::new(syntax);
    let mut highlight_state = HighlightState::new(&highlighter, ScopeStack::new());
    let mut style_string = String::with_capacity(text.len());
    states.clear();

    for line in LinesWithEndings::new(text) {
        states.push(&parse_state, &highlight_state);
        style_line(line, &mut parse_state, &mut highlight_state, &highlighter, syntax_set, style_map, &mut style_string);
    }

    style_string
}

/// Re-highlight from `dirty.first`, resuming from cached states and
/// stopping once the state entering a line past `dirty.last` matches the
/// cache again.
///
/// Cached states after the dirty range are matched by shifting their index
/// by the change in line count.
pub fn highlight_incremental(
    text: &str,
    dirty: DirtyLines,
    syntax: &SyntaxReference,
    syntax_set: &SyntaxSet,
    theme: &Theme,
    style_map: &mut StyleMap,
    states: &mut LineStates,
) -> IncrementalResult {
    let highlighter = Highlighter::new(theme);
    let lines: Vec<&str> = LinesWithEndings::new(text).collect();
    let old = std::mem::take(states);

    let start_line = dirty.first.min(lines.len().saturating_sub(1)).min(old.len());
    let byte_start: usize = lines[..start_line].iter().map(|l| l.len()).sum();

    let (mut parse_state, mut highlight_state) = if start_line < old.len() {
        (old.parse[start_line].clone(), old.highlight[start_line].clone())
    } else {
        (ParseState::new(syntax), HighlightState::new(&highlighter, ScopeStack::new()))
    };

    states.parse = old.parse[..start_line].to_vec();
    states.highlight = old.highlight[..start_line].to_vec();

    let delta = lines.len() as isize - old.len() as isize;
    let old_index = |line: usize| -> Option<usize> {
        let k = line as isize - delta;
        (k >= 0 && (k as usize) < old.len()).then_some(k as usize)
    };

    let mut style_chars = String::new();
    for (i, line) in lines[start_line..].iter().enumerate() {
        let line_idx = start_line + i;
        states.push(&parse_state, &highlight_state);
        style_line(line, &mut parse_state, &mut highlight_state, &highlighter, syntax_set, style_map, &mut style_chars);

        let next = line_idx + 1;
        if next > dirty.last
            && next < lines.len()
            && let Some(k) = old_index(next)
            && parse_state == old.parse[k]
            && highlight_state == old.highlight[k]
        {
            states.parse.extend_from_slice(&old.parse[k..]);
            states.highlight.extend_from_slice(&old.highlight[k..]);
            break;
        }
    }

    IncrementalResult { byte_start, style_chars }
}

fn style_line(
    line: &str,
    parse_state: &mut ParseState,
    highlight_state: &mut HighlightState,
    highlighter: &Highlighter,
    syntax_set: &SyntaxSet,
    style_map: &mut StyleMap,
    out: &mut String,
) {
    let ops = parse_state.parse_line(line, syntax_set).unwrap_or_default();
    for (style, piece) in HighlightIterator::new(highlight_state, &ops, line, highlighter) {
        let ch = style_map.get_or_insert(style.foreground);
        // One style char per byte, not per char, to stay aligned with the text buffer.
        out.extend(std::iter::repeat_n(ch, piece.len()));
    }
}

/// Lines including their trailing '\n'.
pub(super) struct LinesWithEndings<'a> {
    text: &'a str,
}

impl<'a> LinesWithEndings<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self { text }
    }
}

impl<'a> Iterator for LinesWithEndings<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        let end = self.text.find('\n').map(|i| i + 1).unwrap_or(self.text.len());
        let line = &self.text[..end];
        self.text = &self.text[end..];
        Some(line)
    }
}
