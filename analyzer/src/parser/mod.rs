//! Tolerant parser for program fragments.
//!
//! Inputs: the lexed token vector, which includes trivia and an explicit EOF token.
//! Spans are UTF-8 byte offsets into the original source, with half-open semantics `[start, end)`.
//! The parser skips trivia for `cur()`/`bump()` but consults newlines and token columns for
//! layout decisions (where a `case` branch or `let` declaration ends).
//!
//! Responsibility: build the arena [`SyntaxTree`](crate::tree::SyntaxTree) plus parse
//! diagnostics. The parser never fails: malformed input produces `Error` nodes and
//! partially-built constructs (a `case` without branches, a `let` without `in`), which is
//! exactly the shape downstream repair works on.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::lexer::{Token, TokenKind};
use crate::source_map::SourceMap;
use crate::span::Span;
use crate::tree::{NodeId, SyntaxTree, TreeBuilder};

mod grammar;

#[derive(Debug)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
    diagnostics: Diagnostics,
    source_map: SourceMap<'a>,
    /// Set when an if-expression refuses an incomplete `else if` link; the enclosing
    /// atom run then keeps the `else` and the partial link as siblings.
    pending_chain_split: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        let builder = TreeBuilder::new(tokens.len());
        Parser {
            source,
            tokens,
            pos: 0,
            builder,
            diagnostics: Diagnostics::default(),
            source_map: SourceMap::new(source),
            pending_chain_split: false,
        }
    }

    pub(crate) fn next_nontrivia_idx(&self, from: usize) -> usize {
        let mut idx = from;
        while idx < self.tokens.len() && self.tokens[idx].is_trivia() {
            idx += 1;
        }
        idx.min(self.tokens.len() - 1)
    }

    fn cur_idx(&self) -> usize {
        self.next_nontrivia_idx(self.pos)
    }

    pub(crate) fn cur(&self) -> Token {
        self.tokens[self.cur_idx()].clone()
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.cur().kind, TokenKind::Eof)
    }

    fn bump(&mut self) -> (usize, Token) {
        let idx = self.cur_idx();
        let tok = self.tokens[idx].clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos = idx + 1;
        }
        (idx, tok)
    }

    /// Consumes the current token and returns it as a detached leaf node.
    fn bump_leaf_detached(&mut self) -> NodeId {
        let (idx, tok) = self.bump();
        self.builder.leaf(idx as u32, tok.span)
    }

    /// Consumes the current token and attaches it as a leaf of `parent`.
    fn bump_leaf(&mut self, parent: NodeId) -> NodeId {
        let leaf = self.bump_leaf_detached();
        self.builder.attach(parent, leaf);
        leaf
    }

    /// True when the current token is the first non-trivia token on its line.
    pub(crate) fn cur_starts_line(&self) -> bool {
        let idx = self.cur_idx();
        if idx == 0 {
            return true;
        }
        self.tokens[..idx]
            .iter()
            .rev()
            .take_while(|t| t.is_trivia())
            .any(|t| matches!(t.kind, TokenKind::Newline))
            || self.tokens[..idx].iter().all(|t| t.is_trivia())
    }

    /// Column (0-based) of the current token.
    pub(crate) fn cur_col(&self) -> u32 {
        let start = self.cur().span.start;
        start - self.source_map.line_start(start)
    }

    /// True when the current token sits at a line start at or left of `min_col`
    /// (i.e. outside the layout block that `min_col` anchors).
    pub(crate) fn layout_break(&self, min_col: u32) -> bool {
        self.cur_starts_line() && self.cur_col() <= min_col
    }

    /// Scans the rest of the current line (raw tokens, stopping at a newline) for `pred`.
    pub(crate) fn line_has(&self, pred: impl Fn(&TokenKind) -> bool) -> bool {
        let mut idx = self.cur_idx();
        while idx < self.tokens.len() {
            let tok = &self.tokens[idx];
            match &tok.kind {
                TokenKind::Newline | TokenKind::Eof => return false,
                kind if pred(kind) => return true,
                _ => {}
            }
            idx += 1;
        }
        false
    }

    pub fn parse(mut self) -> ParseOutput {
        let root = self.parse_source_file();
        let tree = self.builder.build(root);
        ParseOutput {
            tree,
            tokens: self.tokens,
            diagnostics: self.diagnostics.diags,
        }
    }

    pub(crate) fn emit_error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.emit_error(span, message);
    }
}
