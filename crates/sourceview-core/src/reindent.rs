//! Whole-buffer reindentation for brace languages.
//!
//! Each line's leading whitespace is recomputed from the `{}` depth at its start. A line that
//! begins with `}` sits one level out, and the body line of a headless `if`/`for`/`while`/`else`
//! sits one level in. Lines that continue an open `(`/`[`, continue a multi-line comment or
//! string, or are preprocessor directives keep their indentation.

use crate::buffer::TextBuffer;
use crate::context::SyntaxContext;
use crate::indent::IndentUnit;
use crate::pattern::LinePattern;
use crate::scanner::quote_toggles;

#[derive(Debug, Default)]
struct Nesting {
    braces: i64,
    parens: i64,
    headless: i64,
}

impl Nesting {
    fn level_for(&self, first: char) -> i64 {
        match first {
            '}' => self.braces - 1,
            '{' => self.braces,
            _ => self.braces + self.headless,
        }
    }
}

/// Compute `(line, new indentation)` for every line whose indentation would change.
pub fn plan_reindent(
    buffer: &TextBuffer,
    ctx: &dyn SyntaxContext,
    unit: IndentUnit,
) -> Vec<(usize, String)> {
    let mut plan = Vec::new();
    let mut nesting = Nesting::default();

    for line in 0..buffer.line_count() {
        let start = buffer.line_start(line);
        let end = buffer.line_end(line);
        let indent_end = buffer.line_indent_end(line);
        let blank = indent_end == end;
        let continues_context = start > 0 && ctx.is_comment_or_string(start - 1);
        let first = buffer.char_at(indent_end);

        if !blank && !continues_context && nesting.parens <= 0 && first != '#' {
            let level = nesting.level_for(first).max(0) as usize;
            let target = unit.repeat(level);
            if buffer.slice(start, indent_end) != target {
                plan.push((line, target));
            }
        }

        let mut in_single_quote = false;
        for offset in indent_end..end {
            if ctx.is_comment_or_string(offset) {
                continue;
            }
            let iter = buffer.iter_at_offset(offset);
            match iter.char() {
                '\'' => {
                    if quote_toggles(&iter) {
                        in_single_quote = !in_single_quote;
                    }
                }
                _ if in_single_quote => {}
                '{' => nesting.braces += 1,
                '}' => nesting.braces -= 1,
                '(' | '[' => nesting.parens += 1,
                ')' | ']' => nesting.parens -= 1,
                _ => {}
            }
        }

        if !blank && !continues_context && !ctx.is_comment_or_string(indent_end) {
            if LinePattern::classify(&buffer.line_text(line)).is_headless() {
                nesting.headless += 1;
            } else {
                nesting.headless = 0;
            }
        }
    }
    plan
}

/// Reindent the whole buffer. Returns the number of changed lines.
///
/// The caller is expected to group the edits into one undo step.
#[tracing::instrument(level = "debug", skip_all, fields(lines = buffer.line_count()))]
pub fn reindent_buffer(buffer: &mut TextBuffer, ctx: &dyn SyntaxContext, unit: IndentUnit) -> usize {
    let plan = plan_reindent(buffer, ctx, unit);
    for (line, indent) in plan.iter().rev() {
        let start = buffer.line_start(*line);
        let indent_end = buffer.line_indent_end(*line);
        buffer.erase(start, indent_end);
        buffer.insert(start, indent);
    }
    tracing::debug!(changed = plan.len(), "reindented buffer");
    plan.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextKind, ContextSpans, NoContext};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reindent_blocks_and_headless() {
        let mut buffer = TextBuffer::new(
            "int f() {\nif (x)\ny();\nelse {\nz();\n}\n  return 0;\n}\n",
        );
        let changed = reindent_buffer(&mut buffer, &NoContext, IndentUnit::spaces(4));
        assert_eq!(changed, 6);
        assert_eq!(
            buffer.text(),
            "int f() {\n    if (x)\n        y();\n    else {\n        z();\n    }\n    return 0;\n}\n"
        );
    }

    #[test]
    fn test_nested_headless() {
        let mut buffer = TextBuffer::new("if (a)\nif (b)\nc();\nd();");
        reindent_buffer(&mut buffer, &NoContext, IndentUnit::tab());
        assert_eq!(buffer.text(), "if (a)\n\tif (b)\n\t\tc();\nd();");
    }

    #[test]
    fn test_open_parens_and_comments_are_kept() {
        let text = "f(a,\n      b);\n/* one\n      two */\n#define X\n";
        let mut buffer = TextBuffer::new(text);
        let open = text.find("/*").unwrap_or(0);
        let close = text.find("*/").unwrap_or(0) + 2;
        let spans = ContextSpans::from_ranges([(open..close, ContextKind::Comment)]);
        assert_eq!(reindent_buffer(&mut buffer, &spans, IndentUnit::spaces(2)), 0);
        assert_eq!(buffer.text(), text);
    }

    #[test]
    fn test_braces_in_quotes_ignored() {
        let mut buffer = TextBuffer::new("{\nc = '{';\n    d();\n}");
        reindent_buffer(&mut buffer, &NoContext, IndentUnit::spaces(2));
        assert_eq!(buffer.text(), "{\n  c = '{';\n  d();\n}");
    }
}
