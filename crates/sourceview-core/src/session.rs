//! The editing session: one open buffer with its language, indent unit and configuration.
//!
//! [`SourceSession`] owns every piece of mutable per-file state. Keystrokes go through
//! [`SourceSession::handle_key`] (see the `handlers` module); the remaining editing operations
//! (paste, comment toggling, reindent, search/replace, cleanup) live here. Every operation that
//! performs more than one edit runs inside a single undo group.

use crate::buffer::TextBuffer;
use crate::cleanup::cleanup_whitespace;
use crate::comment::{CommentToggle, toggle_line_comments};
use crate::config::SourceConfig;
use crate::context::{ContextClassifier, ContextSpans, SyntaxContext};
use crate::debounce::Debounce;
use crate::error::{Result, SourceError};
use crate::indent::IndentUnit;
use crate::iter::Position;
use crate::line_ending::{LineEnding, normalize_newlines};
use crate::paste::{PasteMode, paste};
use crate::reindent::reindent_buffer;
use crate::scanner::{find_matching_close_brace, find_matching_open_brace, identifier_bounds};
use crate::search::{SearchMatch, SearchOptions, SearchQuery};
use crate::tab_style::infer_tab_style;
use sourceview_lang::{LanguageConfig, guess_language_id};
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// A brace and its partner, as reported by the idle bracket matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    /// Offset of the brace at (or just before) the cursor.
    pub bracket: usize,
    /// Offset of its partner.
    pub partner: usize,
}

/// An open file being edited.
pub struct SourceSession {
    pub(crate) buffer: TextBuffer,
    pub(crate) language: LanguageConfig,
    pub(crate) indent: IndentUnit,
    pub(crate) config: SourceConfig,
    line_ending: LineEnding,
    classifier: Option<Box<dyn ContextClassifier>>,
    pub(crate) context: ContextSpans,
    context_revision: Option<u64>,
    search: Option<SearchQuery>,
    idle: Debounce,
    idle_state: Option<(usize, u64)>,
}

impl SourceSession {
    /// Open `text` as a `language` buffer.
    ///
    /// When [`SourceConfig::auto_tab_char_and_size`] is set, the indent unit is inferred from
    /// the text and the configured default is kept only if inference fails.
    pub fn new(text: &str, language: LanguageConfig, config: SourceConfig) -> Self {
        let line_ending = LineEnding::detect_in_text(text);
        let buffer = TextBuffer::new(&normalize_newlines(text));

        let mut indent = config.default_indent_unit();
        if config.auto_tab_char_and_size
            && let Some(inferred) = infer_tab_style(&buffer, &language).to_indent_unit()
        {
            indent = inferred;
        }
        tracing::debug!(language = ?language.id(), %indent, "opened session");

        let idle = Debounce::new(config.idle_delay());
        Self {
            buffer,
            language,
            indent,
            config,
            line_ending,
            classifier: None,
            context: ContextSpans::new(),
            context_revision: None,
            search: None,
            idle,
            idle_state: None,
        }
    }

    /// Read `path` and guess its language from the file name.
    pub fn open(path: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let language = LanguageConfig::from_id(guess_language_id(path));
        Ok(Self::new(&text, language, config))
    }

    /// Attach the comment/string classifier used to skip literals and comments.
    pub fn with_classifier(mut self, classifier: impl ContextClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self.context_revision = None;
        self
    }

    /// The buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Mutable access to the buffer, for host-driven edits.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Whole buffer text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// The language this session was opened with.
    pub fn language(&self) -> &LanguageConfig {
        &self.language
    }

    /// The configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// The current indent unit.
    pub fn indent_unit(&self) -> IndentUnit {
        self.indent
    }

    /// Replace the indent unit.
    pub fn set_indent_unit(&mut self, unit: IndentUnit) {
        self.indent = unit;
    }

    /// The line ending detected on open.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Comment/string spans for the current buffer revision.
    pub fn context(&mut self) -> &ContextSpans {
        self.sync_context();
        &self.context
    }

    /// Re-classify the buffer if it changed since the last classification.
    pub(crate) fn sync_context(&mut self) {
        let Some(classifier) = &self.classifier else {
            return;
        };
        let revision = self.buffer.revision();
        if self.context_revision == Some(revision) {
            return;
        }
        self.context = classifier.classify(&self.buffer.text());
        self.context_revision = Some(revision);
        tracing::trace!(revision, spans = self.context.len(), "classified buffer");
    }

    /// Run `f` inside one undo group. The group is closed on every return path of `f`.
    pub(crate) fn grouped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.buffer.begin_user_action();
        let result = f(self);
        self.buffer.end_user_action();
        result
    }

    /// Paste `text` at the cursor, re-indenting it when pasted onto an empty indented line.
    pub fn paste(&mut self, text: &str) -> PasteMode {
        let unit = self.indent;
        self.grouped(|session| paste(&mut session.buffer, text, unit))
    }

    /// Toggle line comments on the selected lines using the language's comment prefix.
    pub fn toggle_comments(&mut self) -> CommentToggle {
        let Some(prefix) = self.language.line_comment().map(str::to_string) else {
            return CommentToggle::Unchanged;
        };
        self.grouped(|session| toggle_line_comments(&mut session.buffer, &prefix))
    }

    /// Recompute every line's indentation from brace depth. Returns the number of changed
    /// lines; buffers of non-brace languages are left alone.
    pub fn reindent_buffer(&mut self) -> usize {
        if !self.language.is_bracket_language() {
            return 0;
        }
        self.sync_context();
        let unit = self.indent;
        self.grouped(|session| reindent_buffer(&mut session.buffer, &session.context, unit))
    }

    /// Re-run indent inference on the current text. Returns the new unit if inference succeeded.
    pub fn reapply_tab_style(&mut self) -> Option<IndentUnit> {
        let unit = infer_tab_style(&self.buffer, &self.language).to_indent_unit()?;
        self.indent = unit;
        Some(unit)
    }

    /// Strip trailing whitespace and ensure a final newline.
    pub fn cleanup_whitespace(&mut self) -> usize {
        self.grouped(|session| cleanup_whitespace(&mut session.buffer))
    }

    /// The text to write to disk: whitespace cleaned if configured, in the original line ending.
    pub fn prepare_for_save(&mut self) -> String {
        if self.config.cleanup_whitespace_characters {
            self.cleanup_whitespace();
        }
        self.line_ending.apply_to_text(&self.buffer.text())
    }

    /// Extend the selection to the identifiers touching its ends.
    pub fn select_word_at_cursor(&mut self) {
        let (start, end) = self.buffer.selection_bounds();
        let word_start = identifier_bounds(self.buffer.iter_at_offset(start)).0;
        let word_end = identifier_bounds(self.buffer.iter_at_offset(end)).1;
        self.buffer.select_range(word_end, word_start);
    }

    /// Place the cursor at `line`/`offset`, clamping both to the buffer.
    pub fn place_cursor_at_line_offset(&mut self, line: usize, offset: usize) {
        let line = line.min(self.buffer.line_count().saturating_sub(1));
        let target = self.buffer.offset_of(Position::new(line, offset));
        self.buffer.place_cursor(target);
    }

    /// Place the cursor at `position`; the column is clamped, the line must exist.
    pub fn place_cursor_at(&mut self, position: Position) -> Result<()> {
        let line_count = self.buffer.line_count();
        if position.line >= line_count {
            return Err(SourceError::LineOutOfRange {
                line: position.line,
                line_count,
            });
        }
        self.place_cursor_at_line_offset(position.line, position.column);
        Ok(())
    }

    /// Set the active search. Returns the number of occurrences; an empty `text` clears it.
    pub fn search_highlight(&mut self, text: &str, case_sensitive: bool, regex: bool) -> Result<usize> {
        if text.is_empty() {
            self.search = None;
            return Ok(0);
        }
        let query = SearchQuery::new(
            text,
            SearchOptions {
                case_sensitive,
                regex,
            },
        )?;
        let count = query.find_all(&self.buffer.text()).len();
        tracing::debug!(text, count, "search highlight");
        self.search = Some(query);
        Ok(count)
    }

    /// The active search, if any.
    pub fn search(&self) -> Option<&SearchQuery> {
        self.search.as_ref()
    }

    /// Select the next occurrence after the selection, wrapping around.
    pub fn search_forward(&mut self) -> Option<SearchMatch> {
        let (_, end) = self.buffer.selection_bounds();
        let found = self.search.as_ref()?.find_forward(&self.buffer.text(), end);
        self.select_match(found)
    }

    /// Select the previous occurrence before the selection, wrapping around.
    pub fn search_backward(&mut self) -> Option<SearchMatch> {
        let (start, _) = self.buffer.selection_bounds();
        let found = self.search.as_ref()?.find_backward(&self.buffer.text(), start);
        self.select_match(found)
    }

    /// Replace the next occurrence (the selected one included) and select the replacement.
    pub fn replace_forward(&mut self, replacement: &str) -> Option<SearchMatch> {
        let (start, _) = self.buffer.selection_bounds();
        let text = self.buffer.text();
        let query = self.search.as_ref()?;
        let found = query.find_forward(&text, start);
        let expanded = found.map(|m| (m, query.expand_replacement(&text, m, replacement)));
        self.replace_match(expanded)
    }

    /// Replace the previous occurrence (the selected one included) and select the replacement.
    pub fn replace_backward(&mut self, replacement: &str) -> Option<SearchMatch> {
        let (_, end) = self.buffer.selection_bounds();
        let text = self.buffer.text();
        let query = self.search.as_ref()?;
        let found = query.find_backward(&text, end);
        let expanded = found.map(|m| (m, query.expand_replacement(&text, m, replacement)));
        self.replace_match(expanded)
    }

    /// Replace every occurrence. Returns the number of replacements.
    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let Some(query) = self.search.as_ref() else {
            return 0;
        };
        let (replaced, count) = query.replace_all(&self.buffer.text(), replacement);
        if count == 0 {
            return 0;
        }
        let cursor = self.buffer.cursor();
        self.grouped(|session| {
            let len = session.buffer.len_chars();
            session.buffer.erase(0, len);
            session.buffer.insert(0, &replaced);
            session.buffer.place_cursor(cursor);
        });
        tracing::debug!(count, "replaced all");
        count
    }

    fn select_match(&mut self, found: Option<SearchMatch>) -> Option<SearchMatch> {
        match found {
            Some(m) => {
                self.buffer.select_range(m.end, m.start);
                Some(m)
            }
            None => {
                tracing::debug!("search: no occurrence");
                None
            }
        }
    }

    fn replace_match(&mut self, found: Option<(SearchMatch, String)>) -> Option<SearchMatch> {
        let Some((m, replacement)) = found else {
            tracing::debug!("replace: no occurrence");
            return None;
        };
        let end = m.start + replacement.chars().count();
        self.grouped(|session| {
            session.buffer.erase(m.start, m.end);
            session.buffer.insert(m.start, &replacement);
            session.buffer.select_range(end, m.start);
        });
        Some(SearchMatch { start: m.start, end })
    }

    /// Drive the idle bracket matcher.
    ///
    /// Call this from the host's event loop. Once the cursor and text have been left alone for
    /// [`SourceConfig::idle_delay_ms`], it reports the brace partnering the one at or before the
    /// cursor, once.
    pub fn poll_idle(&mut self, now: Instant) -> Option<BracketPair> {
        let state = (self.buffer.cursor(), self.buffer.revision());
        if self.idle_state != Some(state) {
            self.idle_state = Some(state);
            self.idle.schedule(now);
            return None;
        }
        if !self.idle.fire_if_due(now) {
            return None;
        }
        self.matching_bracket()
    }

    /// The brace partnering the one at the cursor, or else the one just before it.
    pub fn matching_bracket(&mut self) -> Option<BracketPair> {
        self.sync_context();
        let ctx: &dyn SyntaxContext = &self.context;
        let cursor = self.buffer.cursor();
        let candidates = [Some(cursor), cursor.checked_sub(1)];
        candidates.into_iter().flatten().find_map(|offset| {
            if ctx.is_comment_or_string(offset) {
                return None;
            }
            let iter = self.buffer.iter_at_offset(offset);
            let partner = match iter.char() {
                '{' => find_matching_close_brace(iter, ctx)?,
                '}' => find_matching_open_brace(iter, ctx)?,
                _ => return None,
            };
            Some(BracketPair {
                bracket: offset,
                partner: partner.offset(),
            })
        })
    }
}

impl fmt::Debug for SourceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSession")
            .field("language", &self.language.id())
            .field("indent", &self.indent)
            .field("chars", &self.buffer.len_chars())
            .field("cursor", &self.buffer.cursor_position())
            .field("has_classifier", &self.classifier.is_some())
            .finish()
    }
}
