//! Text patching.
//!
//! Applies a resolved edit list to a line buffer. Edits arrive in descending
//! document order, so a splice never shifts the rows or columns of an edit
//! that is still waiting to be applied.

use crate::types::{Edit, Position};

/// Apply non-overlapping `edits`, sorted by descending position, to `text`.
///
/// Single-line edits replace a character range inside one line; multi-line
/// edits rebuild `prefix + content + suffix` and splice the result over the
/// spanned rows. Positions past the end of a line or past the last line are
/// clamped to the end of that line or of the text.
///
/// The input is never mutated; a new string is returned.
#[must_use]
pub fn apply_edits(text: &str, edits: &[Edit]) -> String {
    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    for edit in edits {
        apply_one(&mut lines, edit);
    }
    lines.join("\n")
}

fn apply_one(lines: &mut Vec<String>, edit: &Edit) {
    if !edit.is_well_formed() {
        return;
    }
    let (start_row, start_byte) = locate(lines, edit.start);
    let (end_row, end_byte) = locate(lines, edit.end);

    if edit.is_single_line() {
        let line = &mut lines[start_row];
        let end_byte = end_byte.max(start_byte);
        line.replace_range(start_byte..end_byte, &edit.content);
        return;
    }

    let joined = format!(
        "{}{}{}",
        &lines[start_row][..start_byte],
        edit.content,
        &lines[end_row][end_byte..]
    );
    let replacement = joined.split('\n').map(str::to_owned);
    lines.splice(start_row..=end_row, replacement);
}

/// Resolve a position to `(row, byte offset)` inside the current buffer.
fn locate(lines: &[String], position: Position) -> (usize, usize) {
    let last = lines.len().saturating_sub(1);
    if position.row > last {
        return (last, lines.get(last).map_or(0, String::len));
    }
    let line = &lines[position.row];
    (position.row, byte_offset(line, position.column))
}

fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}
