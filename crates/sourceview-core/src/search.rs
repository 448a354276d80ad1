//! Text search helpers.
//!
//! A [`SearchQuery`] is compiled once from the search text and options and then run against
//! the buffer text. All public inputs/outputs are **character offsets** (not byte offsets).
//! Forward and backward lookups wrap around the buffer ends.

use crate::error::{Result, SourceError};
use regex::{NoExpand, Regex, RegexBuilder};

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            regex: false,
        }
    }
}

/// A match expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug)]
struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

/// A compiled search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    text: String,
    options: SearchOptions,
    regex: Regex,
}

impl SearchQuery {
    /// Compile `text` with `options`. Plain searches are escaped before compiling.
    pub fn new(text: &str, options: SearchOptions) -> Result<Self> {
        if text.is_empty() {
            return Err(SourceError::EmptySearch);
        }
        let pattern = if options.regex {
            text.to_string()
        } else {
            regex::escape(text)
        };
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|source| SourceError::InvalidSearchPattern { pattern, source })?;
        Ok(Self {
            text: text.to_string(),
            options,
            regex,
        })
    }

    /// The search text as entered.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The options this query was compiled with.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// All non-empty matches in `haystack`.
    pub fn find_all(&self, haystack: &str) -> Vec<SearchMatch> {
        let index = CharIndex::new(haystack);
        self.regex
            .find_iter(haystack)
            .map(|m| SearchMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            })
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// First match starting at or after `from`, wrapping to the first match of the buffer.
    pub fn find_forward(&self, haystack: &str, from: usize) -> Option<SearchMatch> {
        let matches = self.find_all(haystack);
        matches
            .iter()
            .find(|m| m.start >= from)
            .or_else(|| matches.first())
            .copied()
    }

    /// Last match ending at or before `from`, wrapping to the last match of the buffer.
    pub fn find_backward(&self, haystack: &str, from: usize) -> Option<SearchMatch> {
        let matches = self.find_all(haystack);
        matches
            .iter()
            .rev()
            .find(|m| m.end <= from)
            .or_else(|| matches.last())
            .copied()
    }

    /// The text that replaces `found`: capture references like `$1` are expanded for regex
    /// searches, plain searches use `replacement` literally.
    pub fn expand_replacement(
        &self,
        haystack: &str,
        found: SearchMatch,
        replacement: &str,
    ) -> String {
        if !self.options.regex {
            return replacement.to_string();
        }
        let index = CharIndex::new(haystack);
        let start = index.char_to_byte(found.start);
        let mut expanded = String::new();
        if let Some(caps) = self.regex.captures_at(haystack, start) {
            caps.expand(replacement, &mut expanded);
        }
        expanded
    }

    /// Replace every match in `haystack`. Returns the new text and the number of replacements.
    pub fn replace_all(&self, haystack: &str, replacement: &str) -> (String, usize) {
        let count = self.find_all(haystack).len();
        if count == 0 {
            return (haystack.to_string(), 0);
        }
        let replaced = if self.options.regex {
            self.regex.replace_all(haystack, replacement)
        } else {
            self.regex.replace_all(haystack, NoExpand(replacement))
        };
        (replaced.into_owned(), count)
    }
}
