//! Keystroke handling.
//!
//! [`SourceSession::handle_key`] is the single entry point. It returns
//! [`KeyOutcome::PassThrough`] for keys the host should treat with its default behaviour;
//! [`SourceSession::press_key`] applies that default itself for hosts that have none.
//!
//! Dispatch order:
//!
//! 1. Ctrl+Up / Ctrl+Down move by paragraph.
//! 2. With a selection, or when the character before the cursor sits in a comment or string,
//!    only the language-independent handler runs.
//! 3. Brace languages get the brace-aware Enter / `{` / `}` handling, falling back to the
//!    language-independent handler for everything else.

use crate::iter::{Position, TextIter};
use crate::keys::{Key, KeyOutcome, Modifiers};
use crate::pattern::{LinePattern, leading_indent};
use crate::scanner::{
    find_enclosing_statement_start, find_matching_close_brace, find_matching_open_brace,
    find_open_expression_symbol, identifier_at,
};
use crate::session::SourceSession;

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn all_blank(text: &str) -> bool {
    text.chars().all(is_blank)
}

/// What an Enter press turns into.
#[derive(Debug, PartialEq, Eq)]
enum EnterEdit {
    /// Insert at the cursor, then move the cursor back.
    Insert { text: String, cursor_back: usize },
    /// Erase a range on the cursor line, then insert at the cursor.
    Dedent { erase: (usize, usize), text: String },
}

impl EnterEdit {
    fn newline(tabs: &str) -> Self {
        Self::Insert {
            text: format!("\n{tabs}"),
            cursor_back: 0,
        }
    }
}

impl SourceSession {
    /// Handle a key press. Every edit made here forms one undo group.
    pub fn handle_key(&mut self, key: Key, mods: Modifiers) -> KeyOutcome {
        self.sync_context();
        tracing::trace!(?key, ?mods, cursor = self.buffer.cursor(), "key");

        if mods.contains(Modifiers::CONTROL) && matches!(key, Key::Up | Key::Down) {
            self.move_paragraph(key == Key::Down, mods.contains(Modifiers::SHIFT));
            return KeyOutcome::Handled;
        }

        let cursor = self.buffer.cursor();
        let in_literal = cursor > 0 && self.context.kind_at(cursor - 1).is_some();
        if self.buffer.has_selection() || in_literal || !self.language.is_bracket_language() {
            return self.handle_key_basic(key, mods);
        }
        self.handle_key_bracket(key, mods)
    }

    /// [`Self::handle_key`], then the default behaviour for keys it passes through.
    pub fn press_key(&mut self, key: Key, mods: Modifiers) {
        if self.handle_key(key, mods).is_handled() {
            return;
        }
        self.grouped(|session| session.apply_default_key(key, mods));
    }

    fn handle_key_bracket(&mut self, key: Key, mods: Modifiers) -> KeyOutcome {
        match key {
            Key::Enter if !self.buffer.cursor_iter().starts_line() => {
                self.grouped(Self::bracket_enter);
                KeyOutcome::Handled
            }
            Key::Char('}') => {
                self.grouped(Self::close_brace);
                KeyOutcome::Handled
            }
            Key::Char('{') if self.grouped(Self::open_brace) => KeyOutcome::Handled,
            _ => self.handle_key_basic(key, mods),
        }
    }

    fn handle_key_basic(&mut self, key: Key, mods: Modifiers) -> KeyOutcome {
        let has_selection = self.buffer.has_selection();
        match key {
            Key::Enter if !has_selection && !self.buffer.cursor_iter().starts_line() => {
                self.grouped(Self::basic_enter);
                KeyOutcome::Handled
            }
            _ if key.is_unindent(mods) => {
                self.grouped(Self::unindent_lines);
                KeyOutcome::Handled
            }
            Key::Tab => {
                self.grouped(Self::indent_lines);
                KeyOutcome::Handled
            }
            Key::Backspace if !has_selection => self.grouped(Self::smart_backspace),
            Key::Delete if !has_selection => self.grouped(Self::smart_delete),
            Key::Home if !mods.contains(Modifiers::CONTROL) => {
                self.smart_home(mods.contains(Modifiers::SHIFT));
                KeyOutcome::Handled
            }
            Key::End if !mods.contains(Modifiers::CONTROL) => {
                self.smart_end(mods.contains(Modifiers::SHIFT));
                KeyOutcome::Handled
            }
            _ => KeyOutcome::PassThrough,
        }
    }

    /// Erase blanks around the cursor: those after it always, those before it only when
    /// something other than indentation precedes them on the line.
    fn trim_blanks_around_cursor(&mut self) {
        let buffer = &self.buffer;
        let cursor = buffer.cursor();
        let line = buffer.line_of(cursor);
        let line_start = buffer.line_start(line);
        let line_end = buffer.line_end(line);

        let mut end = cursor;
        while end < line_end && is_blank(buffer.char_at(end)) {
            end += 1;
        }
        let mut start = cursor;
        while start > line_start && is_blank(buffer.char_at(start - 1)) {
            start -= 1;
        }
        if start == line_start {
            start = cursor;
        }
        self.buffer.erase(start, end);
    }

    fn basic_enter(&mut self) {
        self.trim_blanks_around_cursor();
        let buffer = &self.buffer;
        let cursor = buffer.cursor();
        let line = buffer.line_of(cursor);
        let mut tabs = buffer.line_indent(line);
        if cursor == buffer.line_end(line) && line + 1 < buffer.line_count() {
            let next = buffer.line_indent(line + 1);
            if next.len() > tabs.len() {
                tabs = next;
            }
        }
        self.buffer.insert_at_cursor(&format!("\n{tabs}"));
    }

    fn bracket_enter(&mut self) {
        self.trim_blanks_around_cursor();
        match self.plan_bracket_enter() {
            EnterEdit::Insert { text, cursor_back } => {
                self.buffer.insert_at_cursor(&text);
                let cursor = self.buffer.cursor();
                self.buffer.place_cursor(cursor.saturating_sub(cursor_back));
            }
            EnterEdit::Dedent {
                erase: (start, end),
                text,
            } => {
                self.buffer.erase(start, end);
                self.buffer.insert_at_cursor(&text);
            }
        }
    }

    fn plan_bracket_enter(&self) -> EnterEdit {
        let buffer = &self.buffer;
        let ctx = &self.context;
        let unit = self.indent.text();
        let width = self.indent.width();

        let cursor = buffer.cursor_iter();
        let statement = find_enclosing_statement_start(cursor, self.indent.ch(), ctx);
        let mut tabs = buffer.line_indent(statement.line());

        if cursor.prev_char() == '{' && !cursor.is_start() {
            let brace = buffer.iter_at_offset(cursor.offset() - 1);
            let has_close = find_matching_close_brace(brace, ctx)
                .is_some_and(|close| buffer.line_indent(close.line()).len() == tabs.len());
            if cursor.char() == '}' {
                tracing::debug!("enter: split braces");
                return EnterEdit::Insert {
                    text: format!("\n{tabs}{unit}\n{tabs}"),
                    cursor_back: tabs.len() + 1,
                };
            }
            if !has_close {
                let closer = if self.language.closes_records_with_semicolon() && self.opens_record(statement) {
                    "};"
                } else {
                    "}"
                };
                tracing::debug!(closer, "enter: close block");
                return EnterEdit::Insert {
                    text: format!("\n{tabs}{unit}\n{tabs}{closer}"),
                    cursor_back: tabs.len() + 1 + closer.len(),
                };
            }
            return EnterEdit::Insert {
                text: format!("\n{tabs}{unit}"),
                cursor_back: 0,
            };
        }

        if let Some(symbol) = find_open_expression_symbol(cursor, statement, ctx) {
            let line = symbol.line();
            let column = symbol.offset() - buffer.line_indent_end(line);
            tabs = buffer.line_indent(line);
            tabs.extend(std::iter::repeat_n(' ', column + 1));
            tracing::debug!(column = tabs.len(), "enter: align to open symbol");
            return EnterEdit::newline(&tabs);
        }

        let line = cursor.line();
        let line_before = buffer.slice(buffer.line_start(line), cursor.offset());
        if LinePattern::classify(&line_before).is_headless() {
            tracing::debug!("enter: headless statement");
            return EnterEdit::newline(&format!("{tabs}{unit}"));
        }

        match cursor.prev_char() {
            ';' if line > 0 && tabs.len() >= width => {
                let prev = buffer.line_text(line - 1);
                if LinePattern::classify(&prev).is_headless() {
                    tracing::debug!("enter: end of headless body");
                    return EnterEdit::newline(leading_indent(&prev));
                }
            }
            ':' => {
                let colon = buffer.iter_at_offset(cursor.offset() - 1);
                if let Some(mut open) = find_matching_open_brace(colon, ctx) {
                    if !open.ends_line() {
                        open.forward_char();
                    }
                    let block = find_enclosing_statement_start(open, self.indent.ch(), ctx);
                    let block_tabs = buffer.line_indent(block.line()).len();
                    if tabs.len() != block_tabs + width {
                        return EnterEdit::newline(&format!("{tabs}{unit}"));
                    }
                    let line_start = buffer.line_start(line);
                    if all_blank(&buffer.slice(line_start, line_start + width)) {
                        tracing::debug!("enter: dedent label");
                        return EnterEdit::Dedent {
                            erase: (line_start, line_start + width),
                            text: format!("\n{tabs}"),
                        };
                    }
                }
            }
            _ => {}
        }
        EnterEdit::newline(&tabs)
    }

    /// Whether the statement starting at `statement` declares a class or struct, looking at
    /// the previous statement when the brace sits alone on its line.
    fn opens_record(&self, statement: TextIter<'_>) -> bool {
        let mut token = identifier_at(statement);
        if token.is_empty() {
            let mut iter = statement;
            while !iter.starts_line() && iter.backward_char() {}
            if iter.backward_char() {
                let previous = find_enclosing_statement_start(iter, self.indent.ch(), &self.context);
                token = identifier_at(previous);
            }
        }
        token == "class" || token == "struct"
    }

    fn close_brace(&mut self) {
        let buffer = &self.buffer;
        let cursor = buffer.cursor();
        let line_start = buffer.line_start(buffer.line_of(cursor));
        let before = buffer.slice(line_start, cursor);
        if before.chars().count() >= self.indent.width() && self.indent.is_made_of(&before) {
            self.buffer.erase(line_start, line_start + self.indent.width());
        }
        self.buffer.insert_at_cursor("}");
    }

    /// `{` typed as the first character under a headless statement: line it up with the head.
    fn open_brace(&mut self) -> bool {
        let buffer = &self.buffer;
        let width = self.indent.width();
        let cursor = buffer.cursor();
        let line = buffer.line_of(cursor);
        let tabs = buffer.line_indent(line);
        if line == 0 || tabs.len() < width || cursor != buffer.line_indent_end(line) {
            return false;
        }
        let prev = buffer.line_text(line - 1);
        if !LinePattern::classify(&prev).is_headless() || tabs.len() - width != leading_indent(&prev).len() {
            return false;
        }
        self.buffer.erase(cursor - width, cursor);
        self.buffer.insert_at_cursor("{");
        true
    }

    fn indent_lines(&mut self) {
        let unit = self.indent.text();
        let has_selection = self.buffer.has_selection();
        if !self.config.tab_indents_line && !has_selection {
            self.buffer.insert_at_cursor(&unit);
            return;
        }

        let buffer = &self.buffer;
        let cursor = buffer.cursor_iter();
        if !has_selection && cursor.starts_line() && cursor.ends_line() {
            let mut prev = cursor;
            while prev.starts_line() && prev.backward_char() {}
            let mut next = cursor;
            while next.starts_line() && next.forward_char() {}
            let prev_tabs = buffer.line_indent(prev.line());
            let next_tabs = buffer.line_indent(next.line());
            let tabs = if prev_tabs.len() < next_tabs.len() {
                prev_tabs
            } else {
                next_tabs
            };
            if tabs.len() >= self.indent.width() {
                self.buffer.insert_at_cursor(&tabs);
                return;
            }
        }

        for line in self.selected_lines() {
            let line_start = self.buffer.line_start(line);
            self.buffer.insert(line_start, &unit);
        }
    }

    fn unindent_lines(&mut self) {
        let mut steps = self.indent.width();
        let lines = self.selected_lines();
        let mut edited = Vec::with_capacity(lines.len());
        for line in lines {
            let line_start = self.buffer.line_start(line);
            if line_start == self.buffer.line_end(line) {
                continue;
            }
            let indent = self.buffer.line_indent_end(line) - line_start;
            if indent == 0 {
                return;
            }
            steps = steps.min(indent);
            edited.push(line);
        }
        for line in edited {
            let line_start = self.buffer.line_start(line);
            self.buffer.erase(line_start, line_start + steps);
        }
    }

    /// Lines touched by the selection (or the cursor line). A selection ending exactly at a
    /// line start leaves that line out.
    fn selected_lines(&self) -> Vec<usize> {
        let buffer = &self.buffer;
        let (start, end) = buffer.selection_bounds();
        let has_selection = start != end;
        (buffer.line_of(start)..=buffer.line_of(end))
            .filter(|&line| !has_selection || buffer.line_start(line) != end)
            .collect()
    }

    fn smart_backspace(&mut self) -> KeyOutcome {
        let cursor = self.buffer.cursor();
        let line_start = self.buffer.line_start(self.buffer.line_of(cursor));
        if cursor == line_start || !all_blank(&self.buffer.slice(line_start, cursor)) {
            return KeyOutcome::PassThrough;
        }
        self.buffer.erase(line_start, cursor);
        KeyOutcome::Handled
    }

    fn smart_delete(&mut self) -> KeyOutcome {
        let buffer = &self.buffer;
        let cursor = buffer.cursor();
        let line = buffer.line_of(cursor);
        let line_end = buffer.line_end(line);
        let len = buffer.len_chars();
        if !all_blank(&buffer.slice(cursor, line_end)) || line_end + 1 >= len {
            return KeyOutcome::PassThrough;
        }
        let mut target = line_end + 1;
        if cursor != buffer.line_start(line) {
            while target < len && is_blank(buffer.char_at(target)) {
                target += 1;
            }
        }
        self.buffer.erase(cursor, target);
        KeyOutcome::Handled
    }

    fn smart_home(&mut self, extend: bool) {
        let cursor = self.buffer.cursor();
        let line = self.buffer.line_of(cursor);
        let line_start = self.buffer.line_start(line);
        let first = self.buffer.line_indent_end(line);
        let target = if cursor > first || cursor == line_start {
            first
        } else {
            line_start
        };
        self.move_cursor(target, extend);
    }

    fn smart_end(&mut self, extend: bool) {
        let cursor = self.buffer.cursor();
        let line = self.buffer.line_of(cursor);
        let line_text = self.buffer.line_text(line);
        let content_end = self.buffer.line_start(line) + line_text.trim_end_matches([' ', '\t']).chars().count();
        let target = if cursor == content_end {
            self.buffer.line_end(line)
        } else {
            content_end
        };
        self.move_cursor(target, extend);
    }

    fn move_cursor(&mut self, target: usize, extend: bool) {
        if extend {
            self.buffer.move_insert_mark(target);
        } else {
            self.buffer.place_cursor(target);
        }
    }

    fn move_paragraph(&mut self, down: bool, extend: bool) {
        let bound = self.buffer.selection_bound();
        let target = if down {
            self.next_paragraph_start()
        } else {
            self.previous_paragraph_start()
        };
        if extend {
            self.buffer.select_range(target, bound);
        } else {
            self.buffer.place_cursor(target);
        }
    }

    /// Start of the first blank line that follows some text, from the cursor line on.
    fn next_paragraph_start(&self) -> usize {
        let buffer = &self.buffer;
        let mut iter = buffer.iter_at_line(buffer.cursor_position().line);
        let mut blank_line = false;
        let mut text_found = false;
        while !iter.is_end() {
            if iter.starts_line() {
                blank_line = true;
            }
            let blank = iter.ends_line() || is_blank(iter.char());
            if !blank {
                blank_line = false;
                text_found = true;
            }
            if blank_line && text_found && iter.ends_line() {
                break;
            }
            iter.forward_char();
        }
        buffer.line_start(iter.line())
    }

    /// Start of the paragraph above the cursor line.
    fn previous_paragraph_start(&self) -> usize {
        let buffer = &self.buffer;
        let mut iter = buffer.iter_at_line(buffer.cursor_position().line);
        if !iter.backward_char() {
            return 0;
        }
        let mut blank_line = false;
        let mut text_found = false;
        loop {
            if iter.ends_line() {
                blank_line = true;
            }
            let blank = iter.ends_line() || is_blank(iter.char());
            if !blank {
                blank_line = false;
                text_found = true;
            }
            if blank_line && text_found && iter.starts_line() {
                break;
            }
            if !iter.backward_char() {
                break;
            }
        }
        if blank_line {
            (buffer.line_end(iter.line()) + 1).min(buffer.len_chars())
        } else {
            iter.offset()
        }
    }

    fn apply_default_key(&mut self, key: Key, mods: Modifiers) {
        let extend = mods.contains(Modifiers::SHIFT);
        let cursor = self.buffer.cursor();
        match key {
            Key::Char(ch) if !mods.intersects(Modifiers::CONTROL | Modifiers::META) => {
                self.buffer.delete_selection();
                let mut encoded = [0; 4];
                self.buffer.insert_at_cursor(ch.encode_utf8(&mut encoded));
            }
            Key::Enter => {
                self.buffer.delete_selection();
                self.buffer.insert_at_cursor("\n");
            }
            Key::Tab | Key::BackTab => {}
            Key::Backspace => {
                if !self.buffer.delete_selection() && cursor > 0 {
                    self.buffer.erase(cursor - 1, cursor);
                }
            }
            Key::Delete => {
                if !self.buffer.delete_selection() {
                    self.buffer.erase(cursor, cursor + 1);
                }
            }
            Key::Left => self.move_cursor(cursor.saturating_sub(1), extend),
            Key::Right => self.move_cursor(cursor + 1, extend),
            Key::Up | Key::Down => {
                let position = self.buffer.cursor_position();
                let line = if key == Key::Up {
                    position.line.saturating_sub(1)
                } else {
                    (position.line + 1).min(self.buffer.line_count().saturating_sub(1))
                };
                let target = self.buffer.offset_of(Position::new(line, position.column));
                self.move_cursor(target, extend);
            }
            Key::Home => self.move_cursor(0, extend),
            Key::End => {
                let len = self.buffer.len_chars();
                self.move_cursor(len, extend);
            }
            Key::Char(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SourceConfig;
    use crate::indent::IndentUnit;
    use crate::keys::{Key, KeyOutcome, Modifiers};
    use crate::session::SourceSession;
    use sourceview_lang::LanguageConfig;

    fn session(language: &str, text: &str, cursor: usize) -> SourceSession {
        let config = SourceConfig {
            auto_tab_char_and_size: false,
            default_tab_size: 4,
            ..SourceConfig::default()
        };
        let mut session = SourceSession::new(text, LanguageConfig::from_id(Some(language)), config);
        session.buffer_mut().place_cursor(cursor);
        session
    }

    #[test]
    fn test_trim_keeps_indentation_only_prefix() {
        let mut s = session("cpp", "    foo  bar", 7);
        s.press_key(Key::Enter, Modifiers::empty());
        assert_eq!(s.text(), "    foo\n    bar");

        let mut s = session("text", "      x", 2);
        assert_eq!(s.handle_key(Key::Enter, Modifiers::empty()), KeyOutcome::Handled);
        assert_eq!(s.text(), "  \n  x");
    }

    #[test]
    fn test_enter_at_line_start_passes_through() {
        let mut s = session("cpp", "a\nb", 2);
        assert_eq!(s.handle_key(Key::Enter, Modifiers::empty()), KeyOutcome::PassThrough);
    }

    #[test]
    fn test_basic_enter_borrows_deeper_next_line() {
        let mut s = session("text", "a\n    b", 1);
        s.press_key(Key::Enter, Modifiers::empty());
        assert_eq!(s.text(), "a\n    \n    b");
    }

    #[test]
    fn test_tab_without_line_indent() {
        let config = SourceConfig {
            auto_tab_char_and_size: false,
            tab_indents_line: false,
            default_tab_size: 4,
            ..SourceConfig::default()
        };
        let mut s = SourceSession::new("ab", LanguageConfig::plain_text(), config);
        s.buffer_mut().place_cursor(1);
        s.press_key(Key::Tab, Modifiers::empty());
        assert_eq!(s.text(), "a    b");
    }

    #[test]
    fn test_tab_on_empty_line_copies_shallower_neighbour() {
        let mut s = session("text", "        a\n\n    b", 10);
        s.press_key(Key::Tab, Modifiers::empty());
        assert_eq!(s.text(), "        a\n    \n    b");
        assert_eq!(s.indent_unit(), IndentUnit::spaces(4));
    }

    #[test]
    fn test_default_keys() {
        let mut s = session("text", "ab\ncd", 1);
        s.press_key(Key::Char('x'), Modifiers::empty());
        s.press_key(Key::Down, Modifiers::empty());
        s.press_key(Key::Left, Modifiers::SHIFT);
        assert_eq!(s.buffer().selection_bounds(), (5, 6));
        s.press_key(Key::Backspace, Modifiers::empty());
        assert_eq!(s.text(), "axb\nc");
        assert_eq!(s.buffer().cursor(), 5);
    }
}
