//! Line comment toggling.
//!
//! Every non-blank line covered by the selection is considered. If all of them already start
//! with the comment prefix (after their indentation), the prefix and one optional space are
//! removed; otherwise `prefix + " "` is inserted at the smallest indentation of those lines, so
//! the comment markers line up.

use crate::buffer::TextBuffer;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentToggle {
    /// The given number of lines were commented.
    Commented(usize),
    /// The given number of lines were uncommented.
    Uncommented(usize),
    /// Only blank lines were covered.
    Unchanged,
}

#[derive(Debug)]
struct LineScan {
    line: usize,
    indentation: usize,
    commented: bool,
    extra_space: bool,
}

fn scan_line(buffer: &TextBuffer, line: usize, prefix: &[char]) -> Option<LineScan> {
    let mut offset = buffer.line_start(line);
    let end = buffer.line_end(line);
    let mut indentation = 0;
    while offset < end && matches!(buffer.char_at(offset), ' ' | '\t') {
        indentation += 1;
        offset += 1;
    }
    if offset == end {
        return None;
    }

    let mut commented = false;
    let mut extra_space = false;
    for (idx, &expected) in prefix.iter().enumerate() {
        if offset >= end || buffer.char_at(offset) != expected {
            break;
        }
        offset += 1;
        if idx + 1 == prefix.len() {
            commented = true;
            extra_space = offset < end && buffer.char_at(offset) == ' ';
        }
    }

    Some(LineScan {
        line,
        indentation,
        commented,
        extra_space,
    })
}

/// Toggle `prefix` line comments on the lines covered by the selection (or the cursor line).
///
/// A selection that ends at the very start of a line does not include that line. The caller
/// is expected to group the edits into one undo step.
pub fn toggle_line_comments(buffer: &mut TextBuffer, prefix: &str) -> CommentToggle {
    let prefix_chars: Vec<char> = prefix.chars().collect();
    if prefix_chars.is_empty() {
        return CommentToggle::Unchanged;
    }

    let (start, end) = buffer.selection_bounds();
    let first_line = buffer.line_of(start);
    let mut last_line = buffer.line_of(end);
    if first_line != last_line && buffer.iter_at_offset(end).starts_line() {
        last_line -= 1;
    }

    let lines: Vec<LineScan> = (first_line..=last_line)
        .filter_map(|line| scan_line(buffer, line, &prefix_chars))
        .collect();
    let Some(min_indentation) = lines.iter().map(|scan| scan.indentation).min() else {
        return CommentToggle::Unchanged;
    };
    let all_commented = lines.iter().all(|scan| scan.commented);
    let all_extra_space = lines.iter().all(|scan| scan.extra_space);

    let with_space = format!("{prefix} ");
    for scan in &lines {
        let mut at = buffer.line_start(scan.line) + min_indentation;
        if all_commented {
            while matches!(buffer.char_at(at), ' ' | '\t') {
                at += 1;
            }
            let len = prefix_chars.len() + usize::from(all_extra_space);
            buffer.erase(at, at + len);
        } else {
            buffer.insert(at, &with_space);
        }
    }

    tracing::debug!(
        lines = lines.len(),
        commented = !all_commented,
        "toggled line comments"
    );
    if all_commented {
        CommentToggle::Uncommented(lines.len())
    } else {
        CommentToggle::Commented(lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_all(buffer: &mut TextBuffer) {
        let len = buffer.len_chars();
        buffer.select_range(len, 0);
    }

    #[test]
    fn test_comment_aligns_to_min_indent() {
        let mut buffer = TextBuffer::new("    a();\n\n  b();\n");
        select_all(&mut buffer);
        assert_eq!(toggle_line_comments(&mut buffer, "//"), CommentToggle::Commented(2));
        assert_eq!(buffer.text(), "  //   a();\n\n  // b();\n");
    }

    #[test]
    fn test_uncomment_keeps_indentation() {
        let mut buffer = TextBuffer::new("  // a();\n  // b();");
        select_all(&mut buffer);
        assert_eq!(toggle_line_comments(&mut buffer, "//"), CommentToggle::Uncommented(2));
        assert_eq!(buffer.text(), "  a();\n  b();");
    }

    #[test]
    fn test_space_removed_only_when_every_line_has_it() {
        let mut buffer = TextBuffer::new("// a\n//b");
        select_all(&mut buffer);
        toggle_line_comments(&mut buffer, "//");
        assert_eq!(buffer.text(), " a\nb");
    }

    #[test]
    fn test_selection_ending_at_line_start_excludes_line() {
        let mut buffer = TextBuffer::new("a\nb\n");
        buffer.select_range(2, 0);
        toggle_line_comments(&mut buffer, "#");
        assert_eq!(buffer.text(), "# a\nb\n");
    }

    #[test]
    fn test_blank_lines_only() {
        let mut buffer = TextBuffer::new("   \n");
        assert_eq!(toggle_line_comments(&mut buffer, "//"), CommentToggle::Unchanged);
        assert_eq!(buffer.text(), "   \n");
    }

    #[test]
    fn test_partial_prefix_is_not_commented() {
        let mut buffer = TextBuffer::new("-x");
        assert_eq!(toggle_line_comments(&mut buffer, "--"), CommentToggle::Commented(1));
        assert_eq!(buffer.text(), "-- -x");
    }
}
