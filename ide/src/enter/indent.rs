//! Indentation guessing for inserted text.
//!
//! This is a placement heuristic, not a formatter: it reads the leading whitespace of
//! the line an element starts on and never reflows existing code.

/// Leading whitespace of the line containing `offset`, adjusted by whole indent
/// levels. `level_offset = -1` drops one level (chained `else if` continuation).
pub(crate) fn guess_indent(source: &str, offset: u32, level_offset: i32, unit: usize) -> String {
    let line_start = source[..offset as usize]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut indent: String = source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    if level_offset < 0 {
        let drop = (unit * level_offset.unsigned_abs() as usize).min(indent.len());
        indent.truncate(indent.len() - drop);
    } else {
        for _ in 0..(unit * level_offset as usize) {
            indent.push(' ');
        }
    }
    indent
}

/// One logical indent level.
pub(crate) fn indent_unit(unit: usize) -> String {
    " ".repeat(unit)
}
