//! Comment/string context classification.
//!
//! The scanners skip every character that a syntax highlighter places inside a comment or a
//! string literal. This module defines the seam to that highlighter:
//!
//! - [`SyntaxContext`] answers "is this offset inside a comment or string?"
//! - [`ContextClassifier`] produces a [`ContextSpans`] table from the buffer text; hosts plug in
//!   their own highlighter (see `sourceview-highlight-simple` for a regex-based one)

use std::ops::Range;

/// Answers whether a character offset lies inside a comment or a string literal.
pub trait SyntaxContext {
    /// Returns `true` if the character at `offset` belongs to a comment or string.
    fn is_comment_or_string(&self, offset: usize) -> bool;
}

/// A context with no comments or strings at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl SyntaxContext for NoContext {
    fn is_comment_or_string(&self, _offset: usize) -> bool {
        false
    }
}

/// What kind of span a [`ContextSpans`] entry covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Line or block comment (delimiters included).
    Comment,
    /// String literal (quotes included).
    String,
}

/// Sorted, non-overlapping comment/string ranges in character offsets (half-open).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSpans {
    spans: Vec<(Range<usize>, ContextKind)>,
}

impl ContextSpans {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from arbitrary ranges. Empty ranges are dropped; overlapping ranges are
    /// merged into the earlier one.
    pub fn from_ranges(ranges: impl IntoIterator<Item = (Range<usize>, ContextKind)>) -> Self {
        let mut ranges: Vec<(Range<usize>, ContextKind)> = ranges
            .into_iter()
            .filter(|(range, _)| range.start < range.end)
            .collect();
        ranges.sort_by_key(|(range, _)| range.start);

        let mut spans: Vec<(Range<usize>, ContextKind)> = Vec::with_capacity(ranges.len());
        for (range, kind) in ranges {
            if let Some((last, _)) = spans.last_mut()
                && range.start < last.end
            {
                last.end = last.end.max(range.end);
                continue;
            }
            spans.push((range, kind));
        }
        Self { spans }
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The span kind covering `offset`, if any.
    pub fn kind_at(&self, offset: usize) -> Option<ContextKind> {
        let idx = self
            .spans
            .partition_point(|(range, _)| range.end <= offset);
        let (range, kind) = self.spans.get(idx)?;
        range.contains(&offset).then_some(*kind)
    }

    /// Iterate over the spans in order.
    pub fn iter(&self) -> impl Iterator<Item = &(Range<usize>, ContextKind)> {
        self.spans.iter()
    }
}

impl SyntaxContext for ContextSpans {
    fn is_comment_or_string(&self, offset: usize) -> bool {
        self.kind_at(offset).is_some()
    }
}

/// Produces comment/string spans for a whole buffer text.
pub trait ContextClassifier {
    /// Classify `text` (LF-normalized) into comment/string spans (char offsets).
    fn classify(&self, text: &str) -> ContextSpans;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let spans = ContextSpans::from_ranges([
            (10..15, ContextKind::String),
            (2..5, ContextKind::Comment),
            (7..7, ContextKind::Comment),
        ]);
        assert_eq!(spans.len(), 2);
        assert!(!spans.is_comment_or_string(1));
        assert_eq!(spans.kind_at(2), Some(ContextKind::Comment));
        assert_eq!(spans.kind_at(4), Some(ContextKind::Comment));
        assert!(!spans.is_comment_or_string(5));
        assert!(!spans.is_comment_or_string(7));
        assert_eq!(spans.kind_at(14), Some(ContextKind::String));
        assert!(!spans.is_comment_or_string(15));
    }

    #[test]
    fn test_overlaps_merge() {
        let spans =
            ContextSpans::from_ranges([(0..4, ContextKind::Comment), (2..8, ContextKind::String)]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans.kind_at(7), Some(ContextKind::Comment));
    }
}
