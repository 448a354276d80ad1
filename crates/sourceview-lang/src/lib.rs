#![warn(missing_docs)]
//! `sourceview-lang` - static language table for `sourceview-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on any parsing or
//! highlighting system. It maps a syntax-highlighting language id (`"cpp"`, `"python"`, ...)
//! to the small amount of information the indentation engine needs:
//!
//! - whether the language uses `{}` block structure ([`LanguageClass::Bracket`])
//! - the line comment prefix used by comment toggling ([`CommentConfig`])
//! - a couple of per-language quirks (C-family `};` after `class`/`struct`, the markup
//!   exception for tab-style inference)

use std::path::Path;

/// Comment tokens/config for a given language.
///
/// The editing session uses this to implement comment toggling in a UI-agnostic way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Coarse classification that selects the indentation rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageClass {
    /// C-like languages whose blocks are delimited by `{` / `}`.
    Bracket,
    /// Everything else: indentation is copied from neighbouring lines.
    Other,
}

const BRACKET_LANGUAGES: &[&str] = &[
    "chdr", "cpphdr", "c", "cpp", "objc", "java", "js", "ts", "proto", "c-sharp", "html", "cuda",
    "php", "rust", "swift", "go", "scala", "opencl",
];

const HASH_COMMENT_LANGUAGES: &[&str] = &[
    "cmake", "makefile", "python", "python3", "sh", "perl", "ruby", "r", "asm", "automake",
];

const PERCENT_COMMENT_LANGUAGES: &[&str] = &["latex", "matlab", "octave", "bibtex"];

const C_FAMILY_LANGUAGES: &[&str] = &["chdr", "cpphdr", "c", "cpp"];

/// Bracket languages whose tab style is inferred with the plain (non-brace) scan.
const MARKUP_LANGUAGES: &[&str] = &["html"];

/// Everything the editing session needs to know about a file's language.
///
/// Built once from the language id and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    id: Option<String>,
    class: LanguageClass,
    comment: CommentConfig,
}

impl LanguageConfig {
    /// Resolve a language id through the static table.
    ///
    /// Unknown ids (and `None`) produce [`LanguageClass::Other`] without a comment prefix.
    pub fn from_id(id: Option<&str>) -> Self {
        let Some(id) = id else {
            return Self::plain_text();
        };

        let class = if BRACKET_LANGUAGES.contains(&id) {
            LanguageClass::Bracket
        } else {
            LanguageClass::Other
        };

        let comment = match class {
            LanguageClass::Bracket => CommentConfig::line_and_block("//", "/*", "*/"),
            LanguageClass::Other => match line_comment_prefix(id) {
                Some(prefix) => CommentConfig::line(prefix),
                None => CommentConfig::default(),
            },
        };

        Self {
            id: Some(id.to_string()),
            class,
            comment,
        }
    }

    /// A language-less buffer (plain text).
    pub fn plain_text() -> Self {
        Self {
            id: None,
            class: LanguageClass::Other,
            comment: CommentConfig::default(),
        }
    }

    /// The language id this config was built from.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The indentation rule set.
    pub fn class(&self) -> LanguageClass {
        self.class
    }

    /// Returns `true` for `{}` block languages.
    pub fn is_bracket_language(&self) -> bool {
        self.class == LanguageClass::Bracket
    }

    /// Comment tokens for this language.
    pub fn comment(&self) -> &CommentConfig {
        &self.comment
    }

    /// The line comment prefix, if the language has one.
    pub fn line_comment(&self) -> Option<&str> {
        if self.comment.has_line() {
            self.comment.line.as_deref()
        } else {
            None
        }
    }

    /// C and C++ sources close `class`/`struct` bodies with `};`.
    pub fn closes_records_with_semicolon(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| C_FAMILY_LANGUAGES.contains(&id))
    }

    /// Whether tab-style inference should use the brace-depth scan.
    pub fn infers_tabs_from_braces(&self) -> bool {
        self.is_bracket_language()
            && !self
                .id
                .as_deref()
                .is_some_and(|id| MARKUP_LANGUAGES.contains(&id))
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::plain_text()
    }
}

fn line_comment_prefix(id: &str) -> Option<&'static str> {
    if HASH_COMMENT_LANGUAGES.contains(&id) {
        Some("#")
    } else if PERCENT_COMMENT_LANGUAGES.contains(&id) {
        Some("%")
    } else {
        match id {
            "fortran" => Some("!"),
            "pascal" => Some("//"),
            "lua" => Some("--"),
            _ => None,
        }
    }
}

/// Guess a language id from a file path (extension or well-known file name).
pub fn guess_language_id(path: &Path) -> Option<&'static str> {
    let file_name = path.file_name()?.to_str()?;
    match file_name {
        "CMakeLists.txt" => return Some("cmake"),
        "Makefile" | "makefile" | "GNUmakefile" => return Some("makefile"),
        "Makefile.am" => return Some("automake"),
        _ => {}
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let id = match ext.as_str() {
        "h" => "chdr",
        "hpp" | "hh" | "hxx" => "cpphdr",
        "c" => "c",
        "cc" | "cpp" | "cxx" | "c++" => "cpp",
        "m" => "objc",
        "java" => "java",
        "js" | "mjs" | "cjs" => "js",
        "ts" => "ts",
        "proto" => "proto",
        "cs" => "c-sharp",
        "html" | "htm" => "html",
        "cu" | "cuh" => "cuda",
        "php" => "php",
        "rs" => "rust",
        "swift" => "swift",
        "go" => "go",
        "scala" => "scala",
        "cl" => "opencl",
        "cmake" => "cmake",
        "py" => "python",
        "sh" | "bash" => "sh",
        "pl" | "pm" => "perl",
        "rb" => "ruby",
        "r" => "r",
        "s" | "asm" => "asm",
        "tex" => "latex",
        "bib" => "bibtex",
        "f" | "f90" | "f95" | "for" => "fortran",
        "pas" | "pp" => "pascal",
        "lua" => "lua",
        _ => return None,
    };
    Some(id)
}
