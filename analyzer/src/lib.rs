//! Core fragment analyzer.
//!
//! Pipeline: lex → tolerant parse → arena syntax tree.
//! All spans are UTF-8 byte offsets into the original source, using `[start, end)`.
//!
//! The parser is deterministic and never fails: malformed fragments come back as a
//! best-effort tree with `Error` nodes and partially-built constructs. Editing layers
//! (the `ide` crate) re-derive the tree after every document change; a tree must never
//! be read across an edit.

use crate::parser::Parser;

mod diagnostics;
mod lexer;
mod parser;
mod source_map;
mod span;
mod tests;
mod text_edit;
mod tree;

pub use parser::ParseOutput;

/// Lexes and parses `text` into a syntax tree plus diagnostics.
pub fn analyze_syntax(text: &str) -> ParseOutput {
    let lex_output = lexer::lex(text);
    let parser = Parser::new(text, lex_output.tokens);
    let mut output = parser.parse();
    output.diagnostics.extend(lex_output.diagnostics);
    output
}

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, format_diagnostics};
pub use lexer::{LexOutput, Lit, LitKind, Symbol, Token, TokenIdx, TokenKind, lex};
pub use source_map::SourceMap;
pub use span::{Span, Spanned};
pub use text_edit::TextEdit;
pub use tree::{NodeId, NodeKind, SyntaxTree, TreeBuilder};
