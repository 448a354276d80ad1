//! Smart paste.
//!
//! Pasting a block of code onto an otherwise empty, indented line re-bases the block onto that
//! line's indentation while keeping its relative nesting. Anything else is pasted verbatim.

use crate::buffer::TextBuffer;
use crate::indent::IndentUnit;
use crate::line_ending::normalize_newlines;

/// How a paste was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteMode {
    /// The text was re-indented onto the destination line.
    Reindented,
    /// The text was inserted as-is (replacing the selection, if any).
    Verbatim,
}

fn leading_units(line: &str, unit: char) -> usize {
    line.chars().take_while(|&ch| ch == unit).count()
}

/// Re-indent `lines` for insertion after `prefix`.
///
/// Only the indent unit character counts as indentation. The first line is stripped only if it
/// is itself indented; every other line gets `"\n" + prefix` and loses up to the smallest
/// indentation found among the non-blank lines.
pub fn reindent_block(lines: &[&str], prefix: &str, unit: char) -> String {
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let first_tabs = leading_units(first, unit);
    let mut min_tabs = (first_tabs != 0).then_some(first_tabs);
    for line in rest {
        let tabs = leading_units(line, unit);
        if tabs != line.chars().count() {
            min_tabs = Some(min_tabs.map_or(tabs, |min| min.min(tabs)));
        }
    }
    let min_tabs = min_tabs.unwrap_or(0);

    let mut out = String::new();
    if first_tabs != 0 {
        out.push_str(&first[first_tabs.min(min_tabs)..]);
    } else {
        out.push_str(first);
    }
    for line in rest {
        let strip = leading_units(line, unit).min(min_tabs);
        out.push('\n');
        out.push_str(prefix);
        out.push_str(&line[strip..]);
    }
    out
}

/// Paste `text` at the cursor.
///
/// Smart paste engages only when nothing is selected and the cursor sits at the end of a line
/// that holds nothing but indentation. CR and CRLF are normalized to LF first; a trailing
/// newline of the pasted text is dropped in smart mode.
pub fn paste(buffer: &mut TextBuffer, text: &str, unit: IndentUnit) -> PasteMode {
    let text = normalize_newlines(text);
    let cursor = buffer.cursor();
    let line = buffer.line_of(cursor);
    let indent_end = buffer.line_indent_end(line);

    if buffer.has_selection() || cursor != indent_end || indent_end != buffer.line_end(line) {
        buffer.delete_selection();
        buffer.insert_at_cursor(&text);
        return PasteMode::Verbatim;
    }

    let prefix = buffer.line_indent(line);
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    let block = reindent_block(&lines, &prefix, unit.ch());
    buffer.insert_at_cursor(&block);

    tracing::debug!(lines = lines.len(), prefix_len = prefix.len(), "smart paste");
    PasteMode::Reindented
}
