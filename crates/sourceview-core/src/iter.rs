//! Character-addressable positions and bidirectional iteration.
//!
//! [`TextIter`] is a small copyable cursor into a [`TextBuffer`]. Movement never faults at the
//! buffer bounds: [`TextIter::forward_char`] and [`TextIter::backward_char`] report "could not
//! advance" with `false`, so scans simply stop there.

use crate::buffer::TextBuffer;
use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A character offset bound to a buffer.
///
/// Dereferencing a line end yields `'\n'` and dereferencing the buffer end yields `'\0'`.
#[derive(Clone, Copy)]
pub struct TextIter<'a> {
    buffer: &'a TextBuffer,
    offset: usize,
}

impl<'a> TextIter<'a> {
    pub(crate) fn new(buffer: &'a TextBuffer, offset: usize) -> Self {
        Self {
            buffer,
            offset: offset.min(buffer.len_chars()),
        }
    }

    /// The buffer this iterator points into.
    pub fn buffer(&self) -> &'a TextBuffer {
        self.buffer
    }

    /// Character offset from buffer start.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The character at this position.
    pub fn char(&self) -> char {
        self.buffer.char_at(self.offset)
    }

    /// Character before this position; at buffer start this is the character itself.
    pub fn prev_char(&self) -> char {
        let mut it = *self;
        it.backward_char();
        it.char()
    }

    /// Character two before this position, clamped at buffer start like [`Self::prev_char`].
    pub fn prev_prev_char(&self) -> char {
        let mut it = *self;
        it.backward_char();
        it.backward_char();
        it.char()
    }

    /// Character after this position (`'\0'` past the end).
    pub fn next_char(&self) -> char {
        self.buffer.char_at(self.offset + 1)
    }

    /// Move one character forward.
    ///
    /// Returns `false` if the iterator could not move or moved onto the buffer end.
    pub fn forward_char(&mut self) -> bool {
        let len = self.buffer.len_chars();
        if self.offset >= len {
            return false;
        }
        self.offset += 1;
        self.offset < len
    }

    /// Move one character backward. Returns `false` (without moving) at buffer start.
    pub fn backward_char(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset -= 1;
        true
    }

    /// Move `count` characters backward, stopping at buffer start.
    ///
    /// Returns `false` if the full distance could not be covered or `count` is zero.
    pub fn backward_chars(&mut self, count: usize) -> bool {
        if count == 0 || count > self.offset {
            self.offset = self.offset.saturating_sub(count);
            return false;
        }
        self.offset -= count;
        true
    }

    /// Move `count` characters forward, clamped to buffer end.
    pub fn forward_chars(&mut self, count: usize) -> bool {
        let len = self.buffer.len_chars();
        self.offset = (self.offset + count).min(len);
        count > 0 && self.offset < len
    }

    /// Returns `true` at buffer start.
    pub fn is_start(&self) -> bool {
        self.offset == 0
    }

    /// Returns `true` at buffer end.
    pub fn is_end(&self) -> bool {
        self.offset >= self.buffer.len_chars()
    }

    /// Returns `true` if this is the first position of a line.
    pub fn starts_line(&self) -> bool {
        self.offset == 0 || self.buffer.char_at(self.offset - 1) == '\n'
    }

    /// Returns `true` if this position is a line terminator (or the buffer end).
    pub fn ends_line(&self) -> bool {
        self.is_end() || self.char() == '\n'
    }

    /// Zero-based line index.
    pub fn line(&self) -> usize {
        self.buffer.line_of(self.offset)
    }

    /// Zero-based column in characters.
    pub fn line_offset(&self) -> usize {
        self.offset - self.buffer.line_start(self.line())
    }

    /// `(line, column)` of this position.
    pub fn position(&self) -> Position {
        Position::new(self.line(), self.line_offset())
    }
}

impl PartialEq for TextIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl Eq for TextIter<'_> {}

impl PartialOrd for TextIter<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextIter<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl std::fmt::Debug for TextIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextIter")
            .field("offset", &self.offset)
            .field("char", &self.char())
            .finish()
    }
}
