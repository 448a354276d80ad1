//! The indent unit of a session.

use crate::error::{Result, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One nesting level of whitespace: `width` copies of a space or a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndentUnit {
    ch: char,
    width: usize,
}

impl IndentUnit {
    /// Validate and build a unit. `ch` must be `' '` or `'\t'` and `width` at least 1.
    pub fn new(ch: char, width: usize) -> Result<Self> {
        if !matches!(ch, ' ' | '\t') || width == 0 {
            return Err(SourceError::InvalidIndentUnit { ch, width });
        }
        Ok(Self { ch, width })
    }

    /// `width` spaces (at least one).
    pub fn spaces(width: usize) -> Self {
        Self {
            ch: ' ',
            width: width.max(1),
        }
    }

    /// A single tab.
    pub fn tab() -> Self {
        Self { ch: '\t', width: 1 }
    }

    /// The repeated character.
    pub fn ch(&self) -> char {
        self.ch
    }

    /// Number of characters in one unit.
    pub fn width(&self) -> usize {
        self.width
    }

    /// One unit as text.
    pub fn text(&self) -> String {
        self.repeat(1)
    }

    /// `levels` units as text.
    pub fn repeat(&self, levels: usize) -> String {
        std::iter::repeat_n(self.ch, self.width * levels).collect()
    }

    /// Returns `true` if `text` consists only of this unit's character.
    pub fn is_made_of(&self, text: &str) -> bool {
        text.chars().all(|ch| ch == self.ch)
    }
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self::spaces(2)
    }
}

impl fmt::Display for IndentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.ch == '\t' { "tab" } else { "space" };
        write!(f, "{} x <{}>", self.width, name)
    }
}
