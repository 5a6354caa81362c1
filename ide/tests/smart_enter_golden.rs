//! Whole-run smart-enter corpus: each `*.frag` file holds a fragment with a `$0`
//! caret; the golden `.out` holds the repaired document with the caret re-inserted.

use std::path::Path;

use ide::smart_enter;

mod common;

#[test]
fn smart_enter_golden() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/smart_enter");
    common::golden::run_golden_dir("smart_enter_golden", &dir, "out", |source| {
        let cursor = source.find("$0").expect("fragment has no $0 marker");
        let mut input = source.to_string();
        input.replace_range(cursor..cursor + 2, "");

        let outcome = smart_enter(&input, cursor);
        let mut rendered = outcome.source;
        rendered.insert_str(outcome.cursor as usize, "$0");
        rendered
    });
}
