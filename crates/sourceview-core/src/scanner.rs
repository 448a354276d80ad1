//! Bracket/context scanner.
//!
//! Character-by-character scans over the buffer that track `()`/`[]` or `{}` nesting and a
//! single-quote toggle, while skipping every character the [`SyntaxContext`] places inside a
//! comment or string. All scans are O(distance scanned) and allocation-free.
//!
//! A single quote toggles the quote state unless it is escaped. A quote is escaped only when
//! the previous character is `\` and the one before that is not, so `\\'` is an escaped
//! backslash followed by a real quote.

use crate::context::SyntaxContext;
use crate::iter::TextIter;

/// Returns `true` if the quote under `iter` toggles the single-quote state.
pub fn quote_toggles(iter: &TextIter<'_>) -> bool {
    iter.prev_char() != '\\' || iter.prev_prev_char() == '\\'
}

/// Transient counters for the backward `()`/`[]` scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// `)` seen minus `(` seen.
    pub paren_depth: i32,
    /// `]` seen minus `[` seen.
    pub bracket_depth: i32,
    /// Inside a single-quoted literal.
    pub in_single_quote: bool,
}

impl ScanState {
    /// Account for the character under `iter` while walking backward.
    pub fn observe_backward(&mut self, iter: &TextIter<'_>, ctx: &dyn SyntaxContext) {
        if ctx.is_comment_or_string(iter.offset()) {
            return;
        }
        match iter.char() {
            '\'' => {
                if quote_toggles(iter) {
                    self.in_single_quote = !self.in_single_quote;
                }
            }
            _ if self.in_single_quote => {}
            ')' => self.paren_depth += 1,
            ']' => self.bracket_depth += 1,
            '(' => self.paren_depth -= 1,
            '[' => self.bracket_depth -= 1,
            _ => {}
        }
    }

    /// Both depths are back to (or below) the starting level.
    pub fn is_closed(&self) -> bool {
        self.paren_depth <= 0 && self.bracket_depth <= 0
    }

    /// An opening symbol without a partner has been passed.
    pub fn has_open_symbol(&self) -> bool {
        self.paren_depth < 0 || self.bracket_depth < 0
    }
}

/// Walk backward from `from` to the first line start where `()`/`[]` nesting is closed.
///
/// The result is advanced past leading `indent_char` characters, but never past `from`.
/// Buffer start is a forced stop, so the scan always terminates.
pub fn find_enclosing_statement_start<'a>(
    from: TextIter<'a>,
    indent_char: char,
    ctx: &dyn SyntaxContext,
) -> TextIter<'a> {
    let mut iter = from;
    let mut state = ScanState::default();
    loop {
        state.observe_backward(&iter, ctx);
        if iter.starts_line() && state.is_closed() {
            break;
        }
        if !iter.backward_char() {
            break;
        }
    }

    while iter != from && iter.char() == indent_char && iter.forward_char() {}
    iter
}

/// Walk backward from `from` (exclusive) towards `until` (inclusive) looking for an unmatched
/// `(` or `[`.
pub fn find_open_expression_symbol<'a>(
    from: TextIter<'a>,
    until: TextIter<'a>,
    ctx: &dyn SyntaxContext,
) -> Option<TextIter<'a>> {
    let mut iter = from;
    let mut state = ScanState::default();
    while iter != until && iter.backward_char() {
        if ctx.is_comment_or_string(iter.offset()) {
            continue;
        }
        state.observe_backward(&iter, ctx);
        if state.has_open_symbol() {
            return Some(iter);
        }
    }
    None
}

#[derive(Debug, Default)]
struct BraceState {
    depth: i32,
    in_single_quote: bool,
}

impl BraceState {
    /// Returns `true` when `target` is reached at depth zero.
    fn observe(
        &mut self,
        iter: &TextIter<'_>,
        ctx: &dyn SyntaxContext,
        open: char,
        target: char,
    ) -> bool {
        if ctx.is_comment_or_string(iter.offset()) {
            return false;
        }
        let ch = iter.char();
        if ch == '\'' {
            if quote_toggles(iter) {
                self.in_single_quote = !self.in_single_quote;
            }
        } else if !self.in_single_quote {
            if ch == target {
                if self.depth == 0 {
                    return true;
                }
                self.depth -= 1;
            } else if ch == open {
                self.depth += 1;
            }
        }
        false
    }
}

/// Forward scan from `from` (exclusive) for the `}` closing the current block.
pub fn find_matching_close_brace<'a>(
    from: TextIter<'a>,
    ctx: &dyn SyntaxContext,
) -> Option<TextIter<'a>> {
    let mut iter = from;
    let mut state = BraceState::default();
    while iter.forward_char() {
        if state.observe(&iter, ctx, '{', '}') {
            return Some(iter);
        }
    }
    None
}

/// Backward scan from `from` (exclusive) for the `{` opening the current block.
pub fn find_matching_open_brace<'a>(
    from: TextIter<'a>,
    ctx: &dyn SyntaxContext,
) -> Option<TextIter<'a>> {
    let mut iter = from;
    let mut state = BraceState::default();
    while iter.backward_char() {
        if state.observe(&iter, ctx, '}', '{') {
            return Some(iter);
        }
    }
    None
}

/// ASCII identifier character (`[A-Za-z0-9_]`).
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Half-open offsets of the identifier around `iter` (empty if `iter` is not on one).
pub fn identifier_bounds(iter: TextIter<'_>) -> (usize, usize) {
    let mut start = iter;
    let mut back = iter;
    while is_identifier_char(back.char()) {
        start = back;
        if !back.backward_char() {
            break;
        }
    }

    let mut end = iter;
    while is_identifier_char(end.char()) {
        if !end.forward_char() {
            break;
        }
    }
    (start.offset(), end.offset())
}

/// The identifier around `iter`.
pub fn identifier_at(iter: TextIter<'_>) -> String {
    let (start, end) = identifier_bounds(iter);
    iter.buffer().slice(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::context::{ContextKind, ContextSpans, NoContext};
    use crate::iter::Position;

    fn offset_of(buffer: &TextBuffer, marker: &str) -> usize {
        let byte = buffer.text().find(marker).expect("marker");
        buffer.text()[..byte].chars().count()
    }

    #[test]
    fn test_quote_escape_rules() {
        // `\'` is an escaped quote.
        let buffer = TextBuffer::new(r"x\'");
        assert!(!quote_toggles(&buffer.iter_at_offset(2)));

        // `\\'` is an escaped backslash followed by a real quote.
        let buffer = TextBuffer::new(r"\\'");
        assert!(quote_toggles(&buffer.iter_at_offset(2)));
    }

    fn toggle_count(text: &str) -> usize {
        let buffer = TextBuffer::new(text);
        (0..buffer.len_chars())
            .map(|offset| buffer.iter_at_offset(offset))
            .filter(|iter| iter.char() == '\'' && quote_toggles(iter))
            .count()
    }

    #[test]
    fn test_quote_toggles_in_char_literals() {
        // '\\'' : opening quote, escaped backslash, closing quote, then a stray quote.
        assert_eq!(toggle_count(r"'\\''"), 3);
        // '\'' : opening quote, escaped quote, closing quote.
        assert_eq!(toggle_count(r"'\''"), 2);
    }

    #[test]
    fn test_open_symbol_after_char_literals() {
        // The stray quote leaves the scan inside a literal, so `(` is never counted.
        let buffer = TextBuffer::new(r"f('\\'', ");
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &NoContext);
        assert!(found.is_none());

        let buffer = TextBuffer::new(r"f('\'', ");
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &NoContext);
        assert_eq!(found.map(|it| it.offset()), Some(1));
    }

    #[test]
    fn test_statement_start_single_line() {
        let buffer = TextBuffer::new("    let x = foo(1);");
        let from = buffer.end_iter();
        let start = find_enclosing_statement_start(from, ' ', &NoContext);
        assert_eq!(start.position(), Position::new(0, 4));
    }

    #[test]
    fn test_statement_start_spans_open_call() {
        let buffer = TextBuffer::new("  bar(x,\n      y)");
        let start = find_enclosing_statement_start(buffer.end_iter(), ' ', &NoContext);
        assert_eq!(start.position(), Position::new(0, 2));
    }

    #[test]
    fn test_statement_start_never_passes_cursor() {
        let buffer = TextBuffer::new("x\n      ");
        let from = buffer.iter_at_offset(4);
        let start = find_enclosing_statement_start(from, ' ', &NoContext);
        assert_eq!(start.offset(), 4);
    }

    #[test]
    fn test_statement_start_only_skips_indent_char() {
        let buffer = TextBuffer::new("\t  x");
        let start = find_enclosing_statement_start(buffer.end_iter(), ' ', &NoContext);
        assert_eq!(start.offset(), 0);
        let start = find_enclosing_statement_start(buffer.end_iter(), '\t', &NoContext);
        assert_eq!(start.offset(), 1);
    }

    #[test]
    fn test_statement_start_forced_stop_at_buffer_start() {
        let buffer = TextBuffer::new("a)\nb)\nc");
        let start = find_enclosing_statement_start(buffer.end_iter(), ' ', &NoContext);
        assert_eq!(start.position(), Position::new(2, 0));

        let buffer = TextBuffer::new("x)\n)");
        let start = find_enclosing_statement_start(buffer.end_iter(), ' ', &NoContext);
        assert_eq!(start.offset(), 0);
    }

    #[test]
    fn test_open_symbol_found() {
        let buffer = TextBuffer::new("call(a, [b, c], ");
        let from = buffer.end_iter();
        let found = find_open_expression_symbol(from, buffer.start_iter(), &NoContext);
        assert_eq!(found.map(|it| it.offset()), Some(4));
    }

    #[test]
    fn test_open_symbol_respects_until() {
        let buffer = TextBuffer::new("call(\n  a, ");
        let until = buffer.iter_at_line(1);
        let found = find_open_expression_symbol(buffer.end_iter(), until, &NoContext);
        assert!(found.is_none());
    }

    #[test]
    fn test_open_symbol_skips_quoted_brackets() {
        let buffer = TextBuffer::new("call(')', ");
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &NoContext);
        assert_eq!(found.map(|it| it.offset()), Some(4));
    }

    #[test]
    fn test_open_symbol_escaped_quote_literal() {
        // call('\'', <cursor>
        let buffer = TextBuffer::new(r"call('\'', ");
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &NoContext);
        assert_eq!(found.map(|it| it.offset()), Some(4));
    }

    #[test]
    fn test_open_symbol_escaped_backslash_literal() {
        // call('\\', <cursor>
        let buffer = TextBuffer::new(r"call('\\', ");
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &NoContext);
        assert_eq!(found.map(|it| it.offset()), Some(4));
    }

    #[test]
    fn test_open_symbol_skips_context_spans() {
        let buffer = TextBuffer::new("f(x, \"(\" ");
        let quote = offset_of(&buffer, "\"");
        let spans = ContextSpans::from_ranges([(quote..quote + 3, ContextKind::String)]);
        let found = find_open_expression_symbol(buffer.end_iter(), buffer.start_iter(), &spans);
        assert_eq!(found.map(|it| it.offset()), Some(1));
    }

    #[test]
    fn test_matching_braces() {
        let buffer = TextBuffer::new("{ a { b } '}' c }");
        let open = buffer.start_iter();
        let close = find_matching_close_brace(open, &NoContext).expect("close");
        assert_eq!(close.offset(), buffer.len_chars() - 1);

        let back = find_matching_open_brace(buffer.end_iter(), &NoContext);
        assert!(back.is_none());
        let back = find_matching_open_brace(close, &NoContext).expect("open");
        assert_eq!(back.offset(), 0);
    }

    #[test]
    fn test_matching_brace_skips_comments() {
        let buffer = TextBuffer::new("{ // }\n}");
        let comment = offset_of(&buffer, "//");
        let spans = ContextSpans::from_ranges([(comment..comment + 4, ContextKind::Comment)]);
        let close = find_matching_close_brace(buffer.start_iter(), &spans).expect("close");
        assert_eq!(close.position(), Position::new(1, 0));
    }

    #[test]
    fn test_identifier_at() {
        let buffer = TextBuffer::new("  struct Foo {");
        assert_eq!(identifier_at(buffer.iter_at_offset(2)), "struct");
        assert_eq!(identifier_at(buffer.iter_at_offset(5)), "struct");
        assert_eq!(identifier_at(buffer.iter_at_offset(1)), "");
        assert_eq!(identifier_at(buffer.iter_at_offset(11)), "Foo");
    }
}
