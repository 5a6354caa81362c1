use analyzer::TextEdit;

/// Applies byte-offset edits and returns the updated text.
///
/// Edits must not overlap. They are applied in descending offset order so earlier
/// offsets stay valid throughout. The repair engine only produces insertions (empty
/// ranges) and re-locates from the original cursor offset afterwards, so no cursor
/// rebasing happens here.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.range.start, e.range.end));

    let mut updated = source.to_string();
    for edit in sorted.iter().rev() {
        let start = edit.range.start as usize;
        let end = edit.range.end as usize;

        let mut next =
            String::with_capacity(updated.len() - (end - start) + edit.new_text.len());
        next.push_str(&updated[..start]);
        next.push_str(&edit.new_text);
        next.push_str(&updated[end..]);
        updated = next;
    }
    updated
}
