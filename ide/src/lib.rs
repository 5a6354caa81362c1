//! Editor-side services over the fragment analyzer: smart-enter statement repair and
//! qualified-name completion.
//!
//! Both entry points are synchronous and value-oriented — they take the current
//! document text plus a byte cursor and return data (updated text + caret, or a
//! candidate list). Nothing here retains a syntax tree across edits: every call
//! re-derives what it needs, and the repair loop re-parses after each insertion.
//!
//! Coordinates are UTF-8 byte offsets with half-open ranges `[start, end)`, matching
//! `analyzer`.

mod completion;
mod enter;
mod text_edit;

mod tests;

pub use analyzer::TextEdit;
pub use completion::{
    BUILT_IN_TYPES, BUILT_IN_VALUES, CompletionItem, CompletionKind, Constructor, Exposing,
    ImportDecl, ModuleInfo, ProjectContext, complete,
};
pub use enter::{
    BranchSource, EnterConfig, EnterOutcome, NoBranchInfo, smart_enter, smart_enter_with,
};
pub use text_edit::apply_edits;
