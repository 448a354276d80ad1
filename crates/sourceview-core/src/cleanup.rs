//! Trailing whitespace removal.

use crate::buffer::TextBuffer;

/// Strip trailing spaces and tabs from every line and make sure a non-empty buffer ends with a
/// newline. Returns the number of lines that lost trailing whitespace.
#[tracing::instrument(level = "debug", skip_all, fields(lines = buffer.line_count()))]
pub fn cleanup_whitespace(buffer: &mut TextBuffer) -> usize {
    let mut cleaned = 0;
    for line in 0..buffer.line_count() {
        let text = buffer.line_text(line);
        let kept = text.trim_end_matches([' ', '\t']).chars().count();
        let len = text.chars().count();
        if kept == len {
            continue;
        }
        let start = buffer.line_start(line);
        buffer.erase(start + kept, start + len);
        cleaned += 1;
    }

    if !buffer.end_iter().starts_line() {
        let end = buffer.len_chars();
        buffer.insert(end, "\n");
    }
    tracing::debug!(cleaned, "whitespace cleaned");
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup() {
        let mut buffer = TextBuffer::new("a  \n\t\nb\t ");
        assert_eq!(cleanup_whitespace(&mut buffer), 3);
        assert_eq!(buffer.text(), "a\n\nb\n");
    }

    #[test]
    fn test_cleanup_keeps_empty_buffer() {
        let mut buffer = TextBuffer::new("");
        assert_eq!(cleanup_whitespace(&mut buffer), 0);
        assert_eq!(buffer.text(), "");
    }
}
