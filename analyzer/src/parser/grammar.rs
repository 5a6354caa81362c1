//! Grammar productions.
//!
//! Layout rules, in the spirit of the language being edited: a construct introduced at
//! column `c` extends over following lines while their first token sits at a column
//! greater than `c`. `case` branches align at one column; `let` declarations likewise.
//!
//! Tolerance contract:
//! - a `case` with no branches, a branch with no `->`, a `let` with no `in`, an `if`
//!   with missing `then`/`else` all produce their construct node with the pieces that
//!   do exist as children;
//! - an identifier line with no `=` does NOT parse as a value declaration — its tokens
//!   attach as bare leaves to the enclosing node (file or `let`), mirroring how the
//!   edited language's own parser treats a declaration that has no body marker yet;
//! - stray tokens collect under an `Error` node.

use tracing::trace;

use crate::lexer::TokenKind;
use crate::span::Span;
use crate::tree::{NodeId, NodeKind};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_source_file(&mut self) -> NodeId {
        let root = self.builder.node(NodeKind::SourceFile);

        while !self.at_eof() {
            self.parse_top_item(root);
        }

        self.builder
            .set_span(root, Span::new(0, self.source.len() as u32));
        root
    }

    fn parse_top_item(&mut self, root: NodeId) {
        match self.cur().kind {
            TokenKind::Case | TokenKind::Let | TokenKind::If => {
                let min_col = self.cur_col();
                if let Some(expr) = self.parse_expr(min_col) {
                    self.builder.attach(root, expr);
                }
            }
            TokenKind::LowerIdent(_)
            | TokenKind::UpperIdent(_)
            | TokenKind::OpenBrace
            | TokenKind::OpenParen => {
                if self.line_has(|k| matches!(k, TokenKind::Eq)) {
                    let decl = self.parse_value_decl();
                    self.builder.attach(root, decl);
                } else if self.annotation_ahead() {
                    let ann = self.parse_type_annotation();
                    self.builder.attach(root, ann);
                } else {
                    // No `=` yet: not a declaration. Leave the tokens as bare leaves so
                    // the line still reads as "a declaration in progress".
                    self.parse_flat_line(root);
                }
            }
            TokenKind::Literal(_) | TokenKind::OpenBracket | TokenKind::Backslash => {
                let min_col = self.cur_col();
                if let Some(expr) = self.parse_expr(min_col) {
                    self.builder.attach(root, expr);
                } else {
                    self.parse_flat_line(root);
                }
            }
            _ => {
                // Stray structural token at file scope.
                let tok = self.cur();
                trace!(
                    kind = ?tok.kind,
                    offset = tok.span.start,
                    "stray token at file scope"
                );
                self.emit_error(tok.span, format!("unexpected token {:?}", tok.kind));
                let err = self.builder.node(NodeKind::Error);
                self.bump_leaf(err);
                self.builder.finish(err, tok.span.start);
                self.builder.attach(root, err);
            }
        }
    }

    /// Attaches the rest of the current line as bare leaves of `parent`.
    fn parse_flat_line(&mut self, parent: NodeId) {
        loop {
            self.bump_leaf(parent);
            if self.at_eof() || self.cur_starts_line() {
                break;
            }
        }
    }

    /// True when the line looks like `name : ...`.
    fn annotation_ahead(&self) -> bool {
        if !matches!(self.cur().kind, TokenKind::LowerIdent(_)) {
            return false;
        }
        let after = self.next_nontrivia_idx(self.cur_idx() + 1);
        matches!(self.tokens[after].kind, TokenKind::Colon)
    }

    /// Only called with an identifier-or-pattern-led line that contains an `=`.
    fn parse_value_decl(&mut self) -> NodeId {
        let decl = self.builder.node(NodeKind::ValueDeclaration);
        let decl_col = self.cur_col();
        let start = self.cur().span.start;

        // Head: name and argument patterns up to `=`, all on one line.
        loop {
            self.bump_leaf(decl);
            if self.at_eof()
                || self.cur_starts_line()
                || matches!(self.cur().kind, TokenKind::Eq)
            {
                break;
            }
        }

        if matches!(self.cur().kind, TokenKind::Eq) {
            self.bump_leaf(decl);
            if !self.layout_break(decl_col)
                && let Some(body) = self.parse_expr(decl_col)
            {
                self.builder.attach(decl, body);
            }
        }

        self.builder.finish(decl, start);
        decl
    }

    fn parse_type_annotation(&mut self) -> NodeId {
        let ann = self.builder.node(NodeKind::TypeAnnotation);
        let ann_col = self.cur_col();
        let start = self.cur().span.start;

        self.bump_leaf(ann); // name
        self.bump_leaf(ann); // `:`

        while !self.at_eof() && !self.layout_break(ann_col) {
            match self.cur().kind {
                TokenKind::LowerIdent(_) | TokenKind::UpperIdent(_) => {
                    let reference = self.parse_qualified_ref();
                    self.builder.attach(ann, reference);
                }
                TokenKind::OpenParen => {
                    let group = self.parse_group(TokenKind::CloseParen, ann_col);
                    self.builder.attach(ann, group);
                }
                TokenKind::OpenBrace => {
                    let group = self.parse_group(TokenKind::CloseBrace, ann_col);
                    self.builder.attach(ann, group);
                }
                TokenKind::Arrow | TokenKind::Comma => {
                    self.bump_leaf(ann);
                }
                _ => break,
            }
        }

        self.builder.finish(ann, start);
        ann
    }

    pub(super) fn parse_expr(&mut self, min_col: u32) -> Option<NodeId> {
        self.parse_apply(min_col)
    }

    /// Parses an undelimited run of atoms and operators. Returns the single item
    /// unwrapped, or an `Apply` node wrapping several.
    ///
    /// The layout gate only applies from the second item on: the first token of an
    /// expression is taken where it stands.
    fn parse_apply(&mut self, min_col: u32) -> Option<NodeId> {
        let mut items: Vec<NodeId> = Vec::new();

        loop {
            if self.at_eof() || (!items.is_empty() && self.layout_break(min_col)) {
                break;
            }
            match self.cur().kind {
                TokenKind::Of
                | TokenKind::Then
                | TokenKind::In
                | TokenKind::Eq
                | TokenKind::Arrow
                | TokenKind::Comma
                | TokenKind::CloseParen
                | TokenKind::CloseBrace
                | TokenKind::CloseBracket => break,
                TokenKind::Else => {
                    // An `else if` that was refused by the preceding if-expression
                    // (missing its `then`) stays a sibling of it, like the edited
                    // language's parser leaves a chain that is missing a piece.
                    let split = self.pending_chain_split
                        && items.last().is_some_and(|&last| {
                            self.builder.kind_of(last) == NodeKind::IfElseExpr
                        });
                    if !split {
                        break;
                    }
                    self.pending_chain_split = false;
                    items.push(self.bump_leaf_detached());
                }
                TokenKind::Case => items.push(self.parse_case(min_col)),
                TokenKind::Let => items.push(self.parse_let(min_col)),
                TokenKind::If => items.push(self.parse_if(min_col)),
                TokenKind::OpenParen => {
                    items.push(self.parse_group(TokenKind::CloseParen, min_col))
                }
                TokenKind::OpenBrace => {
                    items.push(self.parse_group(TokenKind::CloseBrace, min_col))
                }
                TokenKind::OpenBracket => {
                    items.push(self.parse_group(TokenKind::CloseBracket, min_col))
                }
                TokenKind::LowerIdent(_) | TokenKind::UpperIdent(_) => {
                    items.push(self.parse_qualified_ref())
                }
                _ => items.push(self.bump_leaf_detached()),
            }
        }

        match items.len() {
            0 => None,
            1 => Some(items[0]),
            _ => {
                let at = self.cur().span.start;
                let apply = self.builder.node(NodeKind::Apply);
                for item in items {
                    self.builder.attach(apply, item);
                }
                self.builder.finish(apply, at);
                Some(apply)
            }
        }
    }

    /// `Module.Sub.value` or a single identifier. A trailing dot is kept inside the
    /// reference (`Json.` while the next segment is still being typed).
    fn parse_qualified_ref(&mut self) -> NodeId {
        let reference = self.builder.node(NodeKind::QualifiedRef);
        let start = self.cur().span.start;
        let mut last_end = self.cur().span.end;
        self.bump_leaf(reference);

        loop {
            let dot = self.cur();
            if !matches!(dot.kind, TokenKind::Dot) || dot.span.start != last_end {
                break;
            }
            last_end = dot.span.end;
            self.bump_leaf(reference);

            let seg = self.cur();
            if !matches!(seg.kind, TokenKind::LowerIdent(_) | TokenKind::UpperIdent(_))
                || seg.span.start != last_end
            {
                break;
            }
            last_end = seg.span.end;
            self.bump_leaf(reference);
        }

        self.builder.finish(reference, start);
        reference
    }

    /// A bracketed group (parens, record braces, list brackets), parsed as an `Apply`
    /// with the delimiters as leaves. An unclosed group ends at the layout break.
    fn parse_group(&mut self, close: TokenKind, min_col: u32) -> NodeId {
        let group = self.builder.node(NodeKind::Apply);
        let start = self.cur().span.start;
        self.bump_leaf(group); // opening delimiter

        loop {
            if self.at_eof() || self.layout_break(min_col) {
                break;
            }
            if self.cur().kind == close {
                self.bump_leaf(group);
                break;
            }
            if matches!(self.cur().kind, TokenKind::Comma | TokenKind::Eq) {
                self.bump_leaf(group);
                continue;
            }
            match self.parse_expr(min_col) {
                Some(item) => self.builder.attach(group, item),
                None => {
                    self.bump_leaf(group);
                }
            }
        }

        self.builder.finish(group, start);
        group
    }

    fn parse_case(&mut self, min_col: u32) -> NodeId {
        let case = self.builder.node(NodeKind::CaseExpr);
        let case_col = self.cur_col();
        let start = self.cur().span.start;
        self.bump_leaf(case); // `case`

        if let Some(scrutinee) = self.parse_apply(case_col.max(min_col)) {
            self.builder.attach(case, scrutinee);
        }

        if matches!(self.cur().kind, TokenKind::Of) {
            self.bump_leaf(case);
        } else {
            let span = self.cur().span;
            self.emit_error(span, "expected `of`");
        }

        loop {
            if self.at_eof() || self.layout_break(case_col) {
                break;
            }
            if matches!(
                self.cur().kind,
                TokenKind::Of
                    | TokenKind::In
                    | TokenKind::Then
                    | TokenKind::Else
                    | TokenKind::CloseParen
                    | TokenKind::CloseBrace
                    | TokenKind::CloseBracket
                    | TokenKind::Comma
            ) {
                break;
            }
            let branch = self.parse_case_branch();
            self.builder.attach(case, branch);
        }

        self.builder.finish(case, start);
        case
    }

    fn parse_case_branch(&mut self) -> NodeId {
        let branch = self.builder.node(NodeKind::CaseBranch);
        let branch_col = self.cur_col();
        let start = self.cur().span.start;

        let pattern = self.builder.node(NodeKind::Pattern);
        let mut first = true;
        loop {
            if self.at_eof() || (!first && self.layout_break(branch_col)) {
                break;
            }
            match self.cur().kind {
                TokenKind::Arrow
                | TokenKind::Of
                | TokenKind::In
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::CloseParen
                | TokenKind::CloseBrace
                | TokenKind::CloseBracket
                | TokenKind::Comma => break,
                TokenKind::LowerIdent(_) | TokenKind::UpperIdent(_) => {
                    let reference = self.parse_qualified_ref();
                    self.builder.attach(pattern, reference);
                }
                TokenKind::OpenParen => {
                    let group = self.parse_group(TokenKind::CloseParen, branch_col);
                    self.builder.attach(pattern, group);
                }
                TokenKind::OpenBrace => {
                    let group = self.parse_group(TokenKind::CloseBrace, branch_col);
                    self.builder.attach(pattern, group);
                }
                _ => {
                    self.bump_leaf(pattern);
                }
            }
            first = false;
        }
        self.builder.finish(pattern, start);
        self.builder.attach(branch, pattern);

        if matches!(self.cur().kind, TokenKind::Arrow) {
            self.bump_leaf(branch);
            if !self.layout_break(branch_col)
                && let Some(body) = self.parse_expr(branch_col)
            {
                self.builder.attach(branch, body);
            }
        }

        self.builder.finish(branch, start);
        branch
    }

    fn parse_let(&mut self, min_col: u32) -> NodeId {
        let let_expr = self.builder.node(NodeKind::LetInExpr);
        let let_col = self.cur_col().max(min_col);
        let start = self.cur().span.start;
        self.bump_leaf(let_expr); // `let`

        loop {
            if self.at_eof() {
                break;
            }
            if matches!(self.cur().kind, TokenKind::In) {
                self.bump_leaf(let_expr);
                if !self.layout_break(let_col)
                    && let Some(body) = self.parse_expr(let_col)
                {
                    self.builder.attach(let_expr, body);
                }
                break;
            }
            if self.layout_break(let_col) {
                trace!(offset = self.cur().span.start, "let block ended without `in`");
                break;
            }
            if self.line_has(|k| matches!(k, TokenKind::Eq)) {
                let decl = self.parse_value_decl();
                self.builder.attach(let_expr, decl);
            } else if self.annotation_ahead() {
                let ann = self.parse_type_annotation();
                self.builder.attach(let_expr, ann);
            } else {
                // Declaration in progress (`let` + a name with no `=` yet): bare leaves,
                // directly under the let-expression.
                loop {
                    self.bump_leaf(let_expr);
                    if self.at_eof()
                        || self.cur_starts_line()
                        || matches!(self.cur().kind, TokenKind::In)
                    {
                        break;
                    }
                }
            }
        }

        self.builder.finish(let_expr, start);
        let_expr
    }

    fn parse_if(&mut self, min_col: u32) -> NodeId {
        let if_expr = self.builder.node(NodeKind::IfElseExpr);
        let if_col = self.cur_col().max(min_col);
        let start = self.cur().span.start;
        self.bump_leaf(if_expr); // `if`

        loop {
            if !self.layout_break(if_col)
                && let Some(cond) = self.parse_apply(if_col)
            {
                self.builder.attach(if_expr, cond);
            }
            if self.at_eof() || !matches!(self.cur().kind, TokenKind::Then) {
                break;
            }
            self.bump_leaf(if_expr); // `then`
            if !self.layout_break(if_col)
                && let Some(branch) = self.parse_expr(if_col)
            {
                self.builder.attach(if_expr, branch);
            }
            if self.at_eof() || !matches!(self.cur().kind, TokenKind::Else) {
                break;
            }
            if !self.else_if_is_complete(if_col) {
                // An `else if` missing its `then` does not join this group; the locator
                // must find the partial chain link as its own expression.
                self.pending_chain_split = true;
                break;
            }
            self.bump_leaf(if_expr); // `else`
            if matches!(self.cur().kind, TokenKind::If) {
                self.bump_leaf(if_expr); // chained `else if`, flattened
                continue;
            }
            if !self.layout_break(if_col)
                && let Some(body) = self.parse_expr(if_col)
            {
                self.builder.attach(if_expr, body);
            }
            break;
        }

        self.builder.finish(if_expr, start);
        if_expr
    }

    /// Lookahead from an `else`: when it starts an `else if`, does that link have its
    /// `then` before the layout block closes?
    fn else_if_is_complete(&self, min_col: u32) -> bool {
        let else_idx = self.cur_idx();
        let if_idx = self.next_nontrivia_idx(else_idx + 1);
        if !matches!(self.tokens[if_idx].kind, TokenKind::If) {
            // A plain `else <expr>` always folds into the group.
            return true;
        }

        let mut idx = if_idx + 1;
        let mut pending_newline = false;
        while idx < self.tokens.len() {
            let tok = &self.tokens[idx];
            match &tok.kind {
                TokenKind::Newline => pending_newline = true,
                kind if kind.is_trivia() => {}
                TokenKind::Eof => return false,
                TokenKind::Then => return true,
                TokenKind::Else | TokenKind::Eq => return false,
                _ => {
                    if pending_newline {
                        let col = tok.span.start - self.source_map.line_start(tok.span.start);
                        if col <= min_col {
                            return false;
                        }
                        pending_newline = false;
                    }
                }
            }
            idx += 1;
        }
        false
    }
}
