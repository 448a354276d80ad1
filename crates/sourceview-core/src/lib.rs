#![warn(missing_docs)]
//! Sourceview Core - Headless Source-Editing Behaviour
//!
//! # Overview
//!
//! `sourceview-core` implements the keystroke-level behaviour of a source-code editing pane on
//! top of a plain text buffer: bracket-aware auto-indentation, indent-unit inference, smart
//! paste, line-comment toggling, smart Home/End/Backspace/Delete, paragraph movement,
//! search/replace and whitespace cleanup. It does not render anything; a host feeds it
//! key presses and draws the resulting [`TextBuffer`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SourceSession (key dispatch, operations)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Heuristics (indent, paste, comment, ...)   │  ← Editing rules
//! ├─────────────────────────────────────────────┤
//! │  Scanner + SyntaxContext                    │  ← Bracket nesting
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer / TextIter (Rope-based)         │  ← Text, marks, undo
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use sourceview_core::{Key, LanguageConfig, Modifiers, SourceConfig, SourceSession};
//!
//! let mut session = SourceSession::new(
//!     "if (x) {",
//!     LanguageConfig::from_id(Some("cpp")),
//!     SourceConfig::default(),
//! );
//! session.buffer_mut().place_cursor(8);
//! session.press_key(Key::Enter, Modifiers::empty());
//!
//! assert_eq!(session.text(), "if (x) {\n  \n}");
//!
//! // The whole Enter press is a single undo step.
//! session.buffer_mut().undo();
//! assert_eq!(session.text(), "if (x) {");
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] / [`iter`] - text buffer, marks, grouped undo and character cursors
//! - [`scanner`] - backward/forward bracket scans that skip comments and strings
//! - [`tab_style`] - indent-unit inference
//! - [`session`] - per-file state and the editing operations
//! - [`handlers`] - key dispatch

pub mod buffer;
pub mod cleanup;
pub mod comment;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod handlers;
pub mod history;
pub mod indent;
pub mod iter;
pub mod keys;
pub mod line_ending;
pub mod paste;
pub mod pattern;
pub mod reindent;
pub mod scanner;
pub mod search;
pub mod session;
pub mod tab_style;

pub use buffer::TextBuffer;
pub use comment::CommentToggle;
pub use config::{CONFIG_ENV_VAR, SourceConfig};
pub use context::{ContextClassifier, ContextKind, ContextSpans, NoContext, SyntaxContext};
pub use debounce::Debounce;
pub use error::{Result, SourceError};
pub use history::{HistoryStore, InputEntry, SharedHistory};
pub use indent::IndentUnit;
pub use iter::{Position, TextIter};
pub use keys::{Key, KeyOutcome, Modifiers};
pub use line_ending::LineEnding;
pub use paste::PasteMode;
pub use pattern::LinePattern;
pub use search::{SearchMatch, SearchOptions, SearchQuery};
pub use session::{BracketPair, SourceSession};
pub use tab_style::TabStyle;

pub use sourceview_lang::{CommentConfig, LanguageClass, LanguageConfig, guess_language_id};
