//! `sourceview-highlight-simple` - Regex-based comment/string classification for `sourceview-core`.
//!
//! The indentation scanners in `sourceview-core` need to know which characters sit inside
//! comments and string literals. This crate provides a lightweight [`ContextClassifier`] built
//! from a handful of regular expressions, good enough for C-like and script languages when no
//! real highlighter is available.

use regex::Regex;
use sourceview_core::{ContextClassifier, ContextKind, ContextSpans};
use sourceview_lang::LanguageConfig;

/// A single classification rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: String,
    kind: ContextKind,
}

impl RegexRule {
    /// Validate `pattern` and pair it with the span kind it produces.
    pub fn new(pattern: &str, kind: ContextKind) -> Result<Self, regex::Error> {
        Regex::new(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            kind,
        })
    }

    /// Span kind produced by this rule.
    pub fn kind(&self) -> ContextKind {
        self.kind
    }
}

/// Classifies comments and strings with one combined regex.
///
/// Rules are tried leftmost-first, so a quote inside a comment never opens a string and a
/// comment marker inside a string never opens a comment.
#[derive(Debug, Clone)]
pub struct RegexContextClassifier {
    regex: Option<Regex>,
    /// `(capture group, kind)` for each rule.
    groups: Vec<(usize, ContextKind)>,
}

impl RegexContextClassifier {
    /// Combine `rules`, earlier rules winning at the same position.
    pub fn new(rules: &[RegexRule]) -> Result<Self, regex::Error> {
        if rules.is_empty() {
            return Ok(Self {
                regex: None,
                groups: Vec::new(),
            });
        }

        let mut alternatives = Vec::with_capacity(rules.len());
        let mut groups = Vec::with_capacity(rules.len());
        let mut next_group = 1;
        for rule in rules {
            let inner_groups = Regex::new(&rule.pattern)?.captures_len() - 1;
            groups.push((next_group, rule.kind));
            alternatives.push(format!("({})", rule.pattern));
            next_group += 1 + inner_groups;
        }
        Ok(Self {
            regex: Some(Regex::new(&alternatives.join("|"))?),
            groups,
        })
    }

    /// Default rules for `language`: its line comment, `/* */` block comments for brace
    /// languages and double-quoted strings. Plain text gets no rules.
    pub fn for_language(language: &LanguageConfig) -> Result<Self, regex::Error> {
        let mut rules = Vec::new();
        let comment = language.comment();
        if comment.has_block()
            && let (Some(start), Some(end)) = (&comment.block_start, &comment.block_end)
        {
            let pattern = format!(
                r"(?s:{}.*?(?:{}|\z))",
                regex::escape(start),
                regex::escape(end)
            );
            rules.push(RegexRule::new(&pattern, ContextKind::Comment)?);
        }
        if let Some(prefix) = language.line_comment() {
            let pattern = format!(r"{}[^\n]*", regex::escape(prefix));
            rules.push(RegexRule::new(&pattern, ContextKind::Comment)?);
        }
        if language.id().is_some() {
            // Unterminated strings end at the line end.
            rules.push(RegexRule::new(r#""(?:\\.|[^"\\\n])*"?"#, ContextKind::String)?);
        }
        Self::new(&rules)
    }

    fn kind_of(&self, caps: &regex::Captures<'_>) -> Option<ContextKind> {
        self.groups
            .iter()
            .find(|(group, _)| caps.get(*group).is_some())
            .map(|(_, kind)| *kind)
    }
}

impl ContextClassifier for RegexContextClassifier {
    fn classify(&self, text: &str) -> ContextSpans {
        let Some(regex) = &self.regex else {
            return ContextSpans::new();
        };

        let mut ranges = Vec::new();
        let mut chars = CharCounter::default();
        for caps in regex.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let Some(kind) = self.kind_of(&caps) else {
                continue;
            };
            let start = chars.advance_to(text, m.start());
            let end = chars.advance_to(text, m.end());
            ranges.push((start..end, kind));
        }
        ContextSpans::from_ranges(ranges)
    }
}

/// Incremental byte-to-char offset conversion for increasing byte positions.
#[derive(Debug, Default)]
struct CharCounter {
    byte: usize,
    chars: usize,
}

impl CharCounter {
    fn advance_to(&mut self, text: &str, byte: usize) -> usize {
        self.chars += text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}
