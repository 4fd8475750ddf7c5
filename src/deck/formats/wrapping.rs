//! Line wrapping for modified records
//!
//! A line longer than the limit is broken at the last space that keeps the
//! head within the limit. The tail goes on a continuation line indented by
//! [`CONTINUATION_INDENT`]. Comment lines and `$` comments are never broken.

use tracing::warn;

use crate::deck::lexing::records::is_comment_line;

/// Five columns of indentation continue the previous line
pub const CONTINUATION_INDENT: &str = "     ";

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the space to break `line` at, if any
fn break_point(line: &str, limit: usize) -> Option<usize> {
    let comment = line.find('$').unwrap_or(line.len());
    line.char_indices()
        .take_while(|(offset, _)| *offset < comment)
        .enumerate()
        .filter(|(column, (_, c))| *c == ' ' && *column <= limit)
        .map(|(_, (offset, _))| offset)
        .filter(|offset| !line[..*offset].trim().is_empty())
        .last()
}

/// Split `line` into lines of at most `limit` columns where possible
pub fn wrap_line(line: &str, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = line.to_string();
    while width(&current) > limit && !is_comment_line(&current) {
        let Some(offset) = break_point(&current, limit) else {
            warn!(limit, line = %current, "line cannot be wrapped within the limit");
            break;
        };
        let tail = current[offset..].trim_start();
        if tail.is_empty() {
            break;
        }
        let next = format!("{}{}", CONTINUATION_INDENT, tail);
        lines.push(current[..offset].trim_end().to_string());
        if width(&next) >= width(&current) {
            current = next;
            break;
        }
        current = next;
    }
    lines.push(current);
    lines
}
