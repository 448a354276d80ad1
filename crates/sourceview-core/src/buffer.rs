//! Rope-backed text buffer.
//!
//! The buffer stores LF-normalized text in a [`Rope`], which gives O(log N) line access,
//! insertion and deletion. On top of the text it keeps the two marks an editing widget needs
//! (the `insert` mark, i.e. the cursor, and the `selection_bound` mark) and a grouped undo
//! history.
//!
//! # Undo grouping
//!
//! Every edit between the outermost [`TextBuffer::begin_user_action`] and the matching
//! [`TextBuffer::end_user_action`] becomes a single undo step. Edits outside a user action are
//! their own step.

use crate::iter::{Position, TextIter};
use ropey::Rope;
use std::collections::VecDeque;

/// Oldest steps are dropped beyond this many.
const MAX_UNDO_STEPS: usize = 1000;

#[derive(Debug, Clone)]
struct TextEdit {
    start: usize,
    deleted_text: String,
    inserted_text: String,
}

impl TextEdit {
    fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marks {
    insert: usize,
    selection_bound: usize,
}

#[derive(Debug, Clone)]
struct UndoStep {
    edits: Vec<TextEdit>,
    marks_before: Marks,
    marks_after: Marks,
}

#[derive(Debug)]
struct UndoHistory {
    undo_stack: VecDeque<UndoStep>,
    redo_stack: Vec<UndoStep>,
    open: Option<UndoStep>,
    depth: usize,
    max_undo: usize,
}

impl UndoHistory {
    fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            open: None,
            depth: 0,
            max_undo,
        }
    }

    fn push_step(&mut self, step: UndoStep) {
        if step.edits.is_empty() {
            return;
        }
        self.redo_stack.clear();
        if self.undo_stack.len() >= self.max_undo {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(step);
    }
}

/// A mutable, line-addressable text buffer with cursor/selection marks and grouped undo.
///
/// # Example
///
/// ```rust
/// use sourceview_core::TextBuffer;
///
/// let mut buffer = TextBuffer::new("fn main() {\n}");
/// buffer.begin_user_action();
/// buffer.insert(11, "\n    body();");
/// buffer.end_user_action();
/// assert_eq!(buffer.line_text(1), "    body();");
///
/// buffer.undo();
/// assert_eq!(buffer.text(), "fn main() {\n}");
/// ```
#[derive(Debug)]
pub struct TextBuffer {
    rope: Rope,
    marks: Marks,
    history: UndoHistory,
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer holding `text`, with the cursor at the start.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            marks: Marks {
                insert: 0,
                selection_bound: 0,
            },
            history: UndoHistory::new(MAX_UNDO_STEPS),
            revision: 0,
        }
    }

    /// Get complete text
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text in the half-open character range `[start, end)` (clamped).
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.len_chars();
        let start = start.min(len);
        let end = end.clamp(start, len);
        self.rope.slice(start..end).to_string()
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Monotonic counter bumped on every text modification.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Character at `offset`, or `'\0'` at/after the buffer end.
    pub fn char_at(&self, offset: usize) -> char {
        if offset < self.rope.len_chars() {
            self.rope.char(offset)
        } else {
            '\0'
        }
    }

    /// Total line count (an empty buffer has one line; a trailing `'\n'` opens another).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line containing `offset` (clamped).
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    /// Offset of the first character of `line` (clamped to the last line).
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    /// Offset of the terminator of `line` (its `'\n'`, or the buffer end on the last line).
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - 1
        } else {
            self.rope.len_chars()
        }
    }

    /// Text of `line` without its terminator (empty for out-of-range lines).
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        self.slice(self.line_start(line), self.line_end(line))
    }

    /// Offset just past the leading spaces and tabs of `line`.
    pub fn line_indent_end(&self, line: usize) -> usize {
        let mut offset = self.line_start(line);
        let end = self.line_end(line);
        while offset < end && matches!(self.rope.char(offset), ' ' | '\t') {
            offset += 1;
        }
        offset
    }

    /// The leading spaces and tabs of `line`.
    pub fn line_indent(&self, line: usize) -> String {
        self.slice(self.line_start(line), self.line_indent_end(line))
    }

    /// Convert a character offset to a `(line, column)` position.
    pub fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.len_chars());
        let line = self.line_of(offset);
        Position::new(line, offset - self.line_start(line))
    }

    /// Convert a position to a character offset, clamping line and column.
    pub fn offset_of(&self, position: Position) -> usize {
        if position.line >= self.line_count() {
            return self.len_chars();
        }
        let start = self.line_start(position.line);
        let end = self.line_end(position.line);
        (start + position.column).min(end)
    }

    /// Iterator at `offset` (clamped).
    pub fn iter_at_offset(&self, offset: usize) -> TextIter<'_> {
        TextIter::new(self, offset)
    }

    /// Iterator at the start of `line`.
    pub fn iter_at_line(&self, line: usize) -> TextIter<'_> {
        TextIter::new(self, self.line_start(line))
    }

    /// Iterator at the terminator of `line`.
    pub fn iter_at_line_end(&self, line: usize) -> TextIter<'_> {
        TextIter::new(self, self.line_end(line))
    }

    /// Iterator at buffer start.
    pub fn start_iter(&self) -> TextIter<'_> {
        TextIter::new(self, 0)
    }

    /// Iterator at buffer end.
    pub fn end_iter(&self) -> TextIter<'_> {
        TextIter::new(self, self.len_chars())
    }

    /// Iterator at the cursor (`insert` mark).
    pub fn cursor_iter(&self) -> TextIter<'_> {
        TextIter::new(self, self.marks.insert)
    }

    /// Cursor offset.
    pub fn cursor(&self) -> usize {
        self.marks.insert
    }

    /// Cursor position.
    pub fn cursor_position(&self) -> Position {
        self.position_of(self.marks.insert)
    }

    /// Offset of the `selection_bound` mark (equals the cursor when nothing is selected).
    pub fn selection_bound(&self) -> usize {
        self.marks.selection_bound
    }

    /// Returns `true` if the two marks differ.
    pub fn has_selection(&self) -> bool {
        self.marks.insert != self.marks.selection_bound
    }

    /// Ordered `(start, end)` of the selection; both equal the cursor without a selection.
    pub fn selection_bounds(&self) -> (usize, usize) {
        let Marks {
            insert,
            selection_bound,
        } = self.marks;
        (insert.min(selection_bound), insert.max(selection_bound))
    }

    /// Move both marks to `offset`, clearing any selection.
    pub fn place_cursor(&mut self, offset: usize) {
        let offset = offset.min(self.len_chars());
        self.marks = Marks {
            insert: offset,
            selection_bound: offset,
        };
    }

    /// Select `[bound, insert)` with the cursor at `insert`.
    pub fn select_range(&mut self, insert: usize, bound: usize) {
        let len = self.len_chars();
        self.marks = Marks {
            insert: insert.min(len),
            selection_bound: bound.min(len),
        };
    }

    /// Move only the `insert` mark (extends or shrinks the selection).
    pub fn move_insert_mark(&mut self, offset: usize) {
        self.marks.insert = offset.min(self.len_chars());
    }

    /// Insert `text` at `offset`. Marks at or after `offset` move right.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.len_chars());
        self.apply_edit(TextEdit {
            start: offset,
            deleted_text: String::new(),
            inserted_text: text.to_string(),
        });
    }

    /// Insert `text` at the cursor; the cursor ends up after the inserted text.
    pub fn insert_at_cursor(&mut self, text: &str) {
        self.insert(self.marks.insert, text);
    }

    /// Erase the characters between `start` and `end` (order-insensitive, clamped).
    pub fn erase(&mut self, start: usize, end: usize) {
        let len = self.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        if start == end {
            return;
        }
        let deleted_text = self.rope.slice(start..end).to_string();
        self.apply_edit(TextEdit {
            start,
            deleted_text,
            inserted_text: String::new(),
        });
    }

    /// Erase the selection, if any. Returns `true` if text was removed.
    pub fn delete_selection(&mut self) -> bool {
        if !self.has_selection() {
            return false;
        }
        let (start, end) = self.selection_bounds();
        self.erase(start, end);
        self.place_cursor(start);
        true
    }

    /// Open an undo group. Groups nest; only the outermost pair delimits the step.
    pub fn begin_user_action(&mut self) {
        self.history.depth += 1;
        if self.history.depth == 1 {
            self.history.open = Some(UndoStep {
                edits: Vec::new(),
                marks_before: self.marks,
                marks_after: self.marks,
            });
        }
    }

    /// Close an undo group opened by [`Self::begin_user_action`].
    pub fn end_user_action(&mut self) {
        if self.history.depth == 0 {
            return;
        }
        self.history.depth -= 1;
        if self.history.depth == 0
            && let Some(mut step) = self.history.open.take()
        {
            step.marks_after = self.marks;
            self.history.push_step(step);
        }
    }

    /// Returns `true` while a user action is open.
    pub fn in_user_action(&self) -> bool {
        self.history.depth > 0
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Revert the most recent undo step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.close_open_groups();
        let Some(step) = self.history.undo_stack.pop_back() else {
            return false;
        };
        for edit in step.edits.iter().rev() {
            let end = edit.start + edit.inserted_len();
            self.rope.remove(edit.start..end);
            self.rope.insert(edit.start, &edit.deleted_text);
        }
        self.revision += 1;
        self.marks = step.marks_before;
        self.history.redo_stack.push(step);
        true
    }

    /// Re-apply the most recently undone step. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.close_open_groups();
        let Some(step) = self.history.redo_stack.pop() else {
            return false;
        };
        for edit in &step.edits {
            let end = edit.start + edit.deleted_len();
            self.rope.remove(edit.start..end);
            self.rope.insert(edit.start, &edit.inserted_text);
        }
        self.revision += 1;
        self.marks = step.marks_after;
        self.history.undo_stack.push_back(step);
        true
    }

    fn close_open_groups(&mut self) {
        while self.history.depth > 0 {
            self.end_user_action();
        }
    }

    fn apply_edit(&mut self, edit: TextEdit) {
        let marks_before = self.marks;
        let start = edit.start;
        let deleted = edit.deleted_len();
        let inserted = edit.inserted_len();

        if deleted > 0 {
            self.rope.remove(start..start + deleted);
        }
        if inserted > 0 {
            self.rope.insert(start, &edit.inserted_text);
        }
        self.revision += 1;

        let shift = |mark: usize| -> usize {
            if deleted > 0 {
                if mark > start + deleted {
                    mark - deleted
                } else if mark > start {
                    start
                } else {
                    mark
                }
            } else if mark >= start {
                mark + inserted
            } else {
                mark
            }
        };
        self.marks = Marks {
            insert: shift(self.marks.insert),
            selection_bound: shift(self.marks.selection_bound),
        };

        match self.history.open.as_mut() {
            Some(step) => step.edits.push(edit),
            None => {
                let step = UndoStep {
                    edits: vec![edit],
                    marks_before,
                    marks_after: self.marks,
                };
                self.history.push_step(step);
            }
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_queries() {
        let buffer = TextBuffer::new("ab\ncd\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_text(0), "ab");
        assert_eq!(buffer.line_text(2), "");
        assert_eq!(buffer.line_start(1), 3);
        assert_eq!(buffer.line_end(1), 5);
        assert_eq!(buffer.line_end(2), 6);
        assert_eq!(buffer.offset_of(Position::new(1, 100)), 5);
        assert_eq!(buffer.position_of(4), Position::new(1, 1));
    }

    #[test]
    fn test_marks_follow_edits() {
        let mut buffer = TextBuffer::new("hello world");
        buffer.select_range(8, 6);
        buffer.insert(0, ">> ");
        assert_eq!(buffer.selection_bounds(), (9, 11));

        buffer.erase(0, 10);
        assert_eq!(buffer.text(), "orld");
        assert_eq!(buffer.selection_bounds(), (0, 1));
    }

    #[test]
    fn test_insert_at_cursor_moves_cursor() {
        let mut buffer = TextBuffer::new("ac");
        buffer.place_cursor(1);
        buffer.insert_at_cursor("b");
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn test_user_action_groups_edits() {
        let mut buffer = TextBuffer::new("x");
        buffer.place_cursor(1);
        buffer.begin_user_action();
        buffer.insert_at_cursor("\n");
        buffer.begin_user_action();
        buffer.insert_at_cursor("    ");
        buffer.end_user_action();
        buffer.erase(0, 1);
        buffer.end_user_action();
        assert_eq!(buffer.text(), "\n    ");

        assert!(buffer.undo());
        assert_eq!(buffer.text(), "x");
        assert_eq!(buffer.cursor(), 1);
        assert!(!buffer.can_undo());

        assert!(buffer.redo());
        assert_eq!(buffer.text(), "\n    ");
        assert_eq!(buffer.cursor(), 5);
    }

    #[test]
    fn test_empty_group_is_not_recorded() {
        let mut buffer = TextBuffer::new("x");
        buffer.begin_user_action();
        buffer.end_user_action();
        assert!(!buffer.can_undo());
        buffer.end_user_action();
        assert!(!buffer.in_user_action());
    }

    #[test]
    fn test_undo_history_drops_oldest_steps() {
        let mut buffer = TextBuffer::new("");
        for _ in 0..MAX_UNDO_STEPS + 5 {
            let end = buffer.len_chars();
            buffer.insert(end, "x");
        }

        let mut undone = 0;
        while buffer.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_STEPS);
        assert_eq!(buffer.text(), "xxxxx");

        assert!(buffer.redo());
        assert_eq!(buffer.text(), "xxxxxx");
    }
}
