//! Error type shared by the fallible session and configuration operations.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by the fallible session and configuration operations.
pub enum SourceError {
    #[error("invalid indent unit: {width} x {ch:?}")]
    /// An indent unit must be one or more spaces, or one or more tabs.
    InvalidIndentUnit {
        /// The rejected character.
        ch: char,
        /// The rejected width.
        width: usize,
    },

    #[error("line {line} is out of range (buffer has {line_count} lines)")]
    /// A line index past the last line was requested.
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Lines in the buffer.
        line_count: usize,
    },

    #[error("search pattern is empty")]
    /// Searching for an empty pattern.
    EmptySearch,

    #[error("regex compile error for pattern '{pattern}': {source}")]
    /// A search pattern failed to compile.
    InvalidSearchPattern {
        /// The pattern as compiled (escaped when literal search was requested).
        pattern: String,
        /// The compiler error.
        source: regex::Error,
    },

    #[error("config parse error: {0}")]
    /// Configuration JSON could not be parsed.
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SourceError>;
