//! Indentation style inference.
//!
//! A single forward pass over the buffer builds two histograms: leading spaces vs tabs, and the
//! absolute change of indentation between consecutive counted lines. The result is the most
//! frequent character and the most frequent change.
//!
//! For brace languages only lines following a line that ended with `{` are counted, and a `}`
//! steps the running baseline back by the last recorded change. Labels (lines whose content ends
//! in `:` before any `(`) and preprocessor lines (starting with `#`) are skipped. Text inside
//! quotes and comments is excluded.
//!
//! Every other language counts all lines outside quotes and open parentheses.

use crate::buffer::TextBuffer;
use crate::indent::IndentUnit;
use crate::iter::TextIter;
use sourceview_lang::LanguageConfig;
use std::collections::BTreeMap;

/// Raw inference result.
///
/// `ch` is `None` when no indentation character was seen and `width` is 0 when no change of
/// indentation was seen; either means "keep the configured default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TabStyle {
    /// Most frequent indentation character.
    pub ch: Option<char>,
    /// Most frequent indentation change.
    pub width: usize,
}

impl TabStyle {
    /// The inferred unit, if inference succeeded.
    pub fn to_indent_unit(self) -> Option<IndentUnit> {
        let ch = self.ch?;
        IndentUnit::new(ch, self.width).ok()
    }
}

#[derive(Debug, Default)]
struct Histograms {
    spaces: usize,
    tabs: usize,
    changes: BTreeMap<u64, usize>,
}

impl Histograms {
    /// Count `ch` if it is indentation. Returns `true` if it was.
    fn count_indent_char(&mut self, ch: char) -> bool {
        match ch {
            ' ' => self.spaces += 1,
            '\t' => self.tabs += 1,
            _ => return false,
        }
        true
    }

    fn record_change(&mut self, from: i64, to: i64) {
        if from != to {
            *self.changes.entry(from.abs_diff(to)).or_default() += 1;
        }
    }

    fn finish(self) -> TabStyle {
        let ch = if self.tabs > self.spaces {
            Some('\t')
        } else if self.spaces > 0 {
            Some(' ')
        } else {
            None
        };

        let mut width = 0;
        let mut best = 0;
        for (&change, &count) in &self.changes {
            if count > best {
                width = change as usize;
                best = count;
            }
        }
        TabStyle { ch, width }
    }
}

/// Escape-aware toggles for `'` and `"`.
#[derive(Debug, Default)]
struct Quotes {
    single: bool,
    double: bool,
}

impl Quotes {
    /// Update on the character under `iter`. Returns `true` if it toggled a quote.
    fn observe(&mut self, iter: &TextIter<'_>) -> bool {
        let escaped = iter.prev_char() == '\\' && iter.prev_prev_char() != '\\';
        match iter.char() {
            '\'' if !self.double && !escaped => self.single = !self.single,
            '"' if !self.single && !escaped => self.double = !self.double,
            _ => return false,
        }
        true
    }

    fn any(&self) -> bool {
        self.single || self.double
    }
}

/// Infer the indentation style of `buffer` for `language`.
#[tracing::instrument(level = "debug", skip_all, fields(chars = buffer.len_chars()))]
pub fn infer_tab_style(buffer: &TextBuffer, language: &LanguageConfig) -> TabStyle {
    let style = if language.infers_tabs_from_braces() {
        infer_brace_language(buffer)
    } else {
        infer_plain(buffer)
    };
    tracing::debug!(?style.ch, style.width, "inferred tab style");
    style
}

fn infer_brace_language(buffer: &TextBuffer) -> TabStyle {
    let mut hist = Histograms::default();
    let mut quotes = Quotes::default();
    let mut iter = buffer.start_iter();
    let mut tab_count: i64 = -1;
    let mut last_tab_count: i64 = 0;
    let mut last_tab_diff: Option<i64> = None;
    let mut line_comment = false;
    let mut block_comment = false;
    let mut after_open_brace = false;
    let mut last_char: Option<char> = None;

    while !iter.is_end() {
        if iter.starts_line() {
            line_comment = false;
            quotes = Quotes::default();
            tab_count = 0;
            after_open_brace = last_char == Some('{');
        }

        if after_open_brace && tab_count != -1 {
            let ch = iter.char();
            if hist.count_indent_char(ch) {
                tab_count += 1;
            } else if is_label_or_directive(iter) {
                tab_count = 0;
                let next_line = iter.line() + 1;
                if next_line < buffer.line_count() {
                    iter = buffer.iter_at_line(next_line);
                    continue;
                }
            } else if !iter.ends_line() {
                hist.record_change(last_tab_count, tab_count);
                last_tab_diff = Some(last_tab_count.abs_diff(tab_count) as i64);
                last_tab_count = tab_count;
                last_char = None;
            }
        }

        if !quotes.observe(&iter) && !quotes.any() {
            let (ch, next) = (iter.char(), iter.next_char());
            if ch == '/' && next == '/' {
                line_comment = true;
            } else if ch == '/' && next == '*' {
                block_comment = true;
            } else if ch == '*' && next == '/' {
                iter.forward_char();
                iter.forward_char();
                block_comment = false;
            }
        }

        let ch = iter.char();
        let in_code = !quotes.any() && !block_comment && !line_comment;
        if in_code && !matches!(ch, ' ' | '\t') && !iter.ends_line() {
            last_char = Some(ch);
        }
        if in_code
            && ch == '}'
            && tab_count != -1
            && let Some(diff) = last_tab_diff
        {
            last_tab_count -= diff;
        }
        if !matches!(ch, ' ' | '\t') {
            tab_count = -1;
        }

        iter.forward_char();
    }

    hist.finish()
}

/// The line at `iter` is a label (content ends in `:` before any `(`) or starts with `#`.
fn is_label_or_directive(iter: TextIter<'_>) -> bool {
    if iter.char() == '#' {
        return true;
    }
    let mut line_iter = iter;
    let mut last_line_char = None;
    while !line_iter.is_end() && !line_iter.ends_line() {
        let ch = line_iter.char();
        if !matches!(ch, ' ' | '\t') {
            last_line_char = Some(ch);
        }
        if ch == '(' {
            break;
        }
        line_iter.forward_char();
    }
    last_line_char == Some(':')
}

fn infer_plain(buffer: &TextBuffer) -> TabStyle {
    let mut hist = Histograms::default();
    let mut quotes = Quotes::default();
    let mut iter = buffer.start_iter();
    let mut tab_count: i64 = -1;
    let mut last_tab_count: i64 = 0;
    let mut paren_depth: i64 = 0;

    while !iter.is_end() {
        if iter.starts_line() {
            tab_count = 0;
        }
        let ch = iter.char();
        if tab_count != -1 && paren_depth == 0 && !quotes.any() {
            if hist.count_indent_char(ch) {
                tab_count += 1;
            } else if !iter.ends_line() {
                hist.record_change(last_tab_count, tab_count);
                last_tab_count = tab_count;
            }
        }

        if !quotes.observe(&iter) && !quotes.any() {
            match ch {
                '(' => paren_depth += 1,
                ')' => paren_depth -= 1,
                _ => {}
            }
        }
        if !matches!(ch, ' ' | '\t') {
            tab_count = -1;
        }

        iter.forward_char();
    }

    hist.finish()
}
