//! Line-shape classification used by the indentation heuristics.
//!
//! These are small prefix/keyword matchers over a line's content once its leading spaces and
//! tabs are stripped:
//!
//! - [`LinePattern::OpensBlock`]: the line ends with `{` (trailing spaces ignored)
//! - [`LinePattern::HeadlessIf`]: `if`, `for`, `while` or `else if`, then `(`, with no trailing
//!   `;` or `}`
//! - [`LinePattern::HeadlessElse`]: a bare `else`

/// Classification of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    /// `... {`
    OpensBlock,
    /// A conditional or loop head without braces.
    HeadlessIf,
    /// A bare `else`.
    HeadlessElse,
    /// Anything else.
    Other,
}

const HEADLESS_KEYWORDS: [&str; 4] = ["else if", "if", "for", "while"];

impl LinePattern {
    /// Classify `line` (without its terminator). `OpensBlock` wins over the headless forms.
    pub fn classify(line: &str) -> Self {
        if opens_block(line) {
            Self::OpensBlock
        } else if is_headless_if(line) {
            Self::HeadlessIf
        } else if is_headless_else(line) {
            Self::HeadlessElse
        } else {
            Self::Other
        }
    }

    /// `HeadlessIf` or `HeadlessElse`.
    pub fn is_headless(self) -> bool {
        matches!(self, Self::HeadlessIf | Self::HeadlessElse)
    }
}

/// The leading run of spaces and tabs of `line`.
pub fn leading_indent(line: &str) -> &str {
    let content = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - content.len()]
}

fn opens_block(line: &str) -> bool {
    line.trim_end_matches(' ').ends_with('{')
}

fn is_headless_if(line: &str) -> bool {
    let content = &line[leading_indent(line).len()..];
    HEADLESS_KEYWORDS.iter().any(|keyword| {
        let Some(rest) = content.strip_prefix(keyword) else {
            return false;
        };
        let Some(args) = rest.trim_start_matches(' ').strip_prefix('(') else {
            return false;
        };
        let args = args.trim_end_matches(' ');
        !args.is_empty() && !args.ends_with([';', '}'])
    })
}

fn is_headless_else(line: &str) -> bool {
    line[leading_indent(line).len()..].trim_end_matches(' ') == "else"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_block() {
        assert_eq!(LinePattern::classify("if (x) {"), LinePattern::OpensBlock);
        assert_eq!(LinePattern::classify("  struct A {  "), LinePattern::OpensBlock);
        assert_eq!(LinePattern::classify("{"), LinePattern::OpensBlock);
        assert_eq!(LinePattern::classify("a { b"), LinePattern::Other);
    }

    #[test]
    fn test_only_trailing_spaces_are_ignored() {
        assert_eq!(LinePattern::classify("{\t"), LinePattern::Other);
        assert_eq!(LinePattern::classify("if (x) {\t"), LinePattern::HeadlessIf);
        assert_eq!(LinePattern::classify("if (x);\t"), LinePattern::HeadlessIf);
        assert_eq!(LinePattern::classify("if (x);  "), LinePattern::Other);
    }

    #[test]
    fn test_headless_if() {
        for line in [
            "if (x)",
            "    if(x > 0)",
            "\telse if (y)",
            "for (int i = 0; i < n; ++i)",
            "while (running)",
            "if (a &&",
        ] {
            assert_eq!(LinePattern::classify(line), LinePattern::HeadlessIf, "{line:?}");
        }
    }

    #[test]
    fn test_headless_if_rejections() {
        for line in [
            "if (x) return;",
            "if (x) { y(); }",
            "if (",
            "iffy(x)",
            "foreach (x)",
            "x = if (y)",
            "if x",
        ] {
            assert_ne!(LinePattern::classify(line), LinePattern::HeadlessIf, "{line:?}");
        }
    }

    #[test]
    fn test_headless_else() {
        assert_eq!(LinePattern::classify("  else"), LinePattern::HeadlessElse);
        assert_eq!(LinePattern::classify("else  "), LinePattern::HeadlessElse);
        assert_eq!(LinePattern::classify("else {"), LinePattern::OpensBlock);
        assert_eq!(LinePattern::classify("elsewhere"), LinePattern::Other);
        assert!(LinePattern::HeadlessElse.is_headless());
        assert!(!LinePattern::OpensBlock.is_headless());
    }

    #[test]
    fn test_leading_indent() {
        assert_eq!(leading_indent(" \t x "), " \t ");
        assert_eq!(leading_indent("x"), "");
        assert_eq!(leading_indent("   "), "   ");
    }
}
