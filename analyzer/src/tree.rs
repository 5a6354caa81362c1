//! Arena-allocated syntax tree for parsed (possibly malformed) fragments.
//!
//! Nodes live in one `Vec`; a [`NodeId`] is an index into it. Parents are stored as
//! back-indices, so the tree owns its children and nothing owns the tree but the
//! [`SyntaxTree`] itself. Trees are immutable snapshots: after any document edit the
//! fragment must be re-parsed and the old tree discarded.
//!
//! Every non-trivia token of the fragment appears as a [`NodeKind::Token`] leaf carrying
//! its index into the token vector, so structural queries ("does this branch have an
//! arrow", "where is the `in` keyword") go through the leaf back to the token.

use crate::lexer::{Token, TokenIdx, TokenKind};
use crate::span::Span;

pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    SourceFile,
    ValueDeclaration,
    TypeAnnotation,
    CaseExpr,
    CaseBranch,
    Pattern,
    LetInExpr,
    IfElseExpr,
    /// A dotted reference: `Module.Sub.value`, or a single identifier.
    QualifiedRef,
    /// An undelimited run of atoms/operators, or a bracketed group.
    Apply,
    Error,
    /// A single non-trivia token leaf.
    Token,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    token: Option<TokenIdx>,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    leaf_of_token: Vec<Option<NodeId>>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id as usize].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id as usize].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id as usize].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id as usize].children
    }

    /// The token index behind a [`NodeKind::Token`] leaf.
    pub fn token_idx(&self, id: NodeId) -> Option<TokenIdx> {
        self.nodes[id as usize].token
    }

    /// The token kind behind a leaf, if `id` is a leaf.
    pub fn token_kind<'t>(&self, tokens: &'t [Token], id: NodeId) -> Option<&'t TokenKind> {
        self.token_idx(id).map(|idx| &tokens[idx as usize].kind)
    }

    /// The leaf node built for token `idx`, if any (trivia tokens have none).
    pub fn leaf_for_token(&self, idx: TokenIdx) -> Option<NodeId> {
        self.leaf_of_token.get(idx as usize).copied().flatten()
    }

    /// True when the node sits directly under the file root.
    pub fn is_top_level(&self, id: NodeId) -> bool {
        self.parent(id) == Some(self.root)
    }

    /// Walks `parent` links starting from (and excluding) `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.parent(id);
        std::iter::from_fn(move || {
            let next = cur?;
            cur = self.parent(next);
            Some(next)
        })
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Child nodes of the given structural kind, in document order.
    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.kind(c) == kind)
            .collect()
    }

    /// Child token leaves whose token kind satisfies `pred`, in document order.
    pub fn token_children<'t>(
        &self,
        tokens: &'t [Token],
        id: NodeId,
        pred: impl Fn(&TokenKind) -> bool,
    ) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.token_kind(tokens, c).is_some_and(&pred))
            .collect()
    }

    /// First child token leaf matching `pred`.
    pub fn find_token_child(
        &self,
        tokens: &[Token],
        id: NodeId,
        pred: impl Fn(&TokenKind) -> bool,
    ) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.token_kind(tokens, c).is_some_and(&pred))
    }

    /// Renders the tree as an indented kind/span listing (stable; used by tests).
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        self.dump_node(self.root, source, 0, &mut out);
        out
    }

    fn dump_node(&self, id: NodeId, source: &str, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let span = self.span(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        if self.kind(id) == NodeKind::Token {
            let text = &source[span.start as usize..span.end as usize];
            let _ = writeln!(out, "Token@{}..{} {:?}", span.start, span.end, text);
        } else {
            let _ = writeln!(out, "{:?}@{}..{}", self.kind(id), span.start, span.end);
            for &child in self.children(id) {
                self.dump_node(child, source, depth + 1, out);
            }
        }
    }
}

/// Builder used by the parser. Nodes are created detached, get children attached in
/// document order, and receive their spans when the construct is finished.
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    leaf_of_token: Vec<Option<NodeId>>,
}

impl TreeBuilder {
    pub fn new(token_count: usize) -> TreeBuilder {
        TreeBuilder {
            nodes: Vec::new(),
            leaf_of_token: vec![None; token_count],
        }
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(NodeData {
            kind,
            span: Span::empty_at(0),
            parent: None,
            children: Vec::new(),
            token: None,
        });
        id
    }

    pub fn leaf(&mut self, token_idx: TokenIdx, span: Span) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(NodeData {
            kind: NodeKind::Token,
            span,
            parent: None,
            children: Vec::new(),
            token: Some(token_idx),
        });
        self.leaf_of_token[token_idx as usize] = Some(id);
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child as usize].parent.is_none());
        self.nodes[child as usize].parent = Some(parent);
        self.nodes[parent as usize].children.push(child);
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id as usize].span = span;
    }

    pub fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id as usize].span
    }

    pub fn kind_of(&self, id: NodeId) -> NodeKind {
        self.nodes[id as usize].kind
    }

    /// Sets the node's span to the union of its children's spans.
    ///
    /// Nodes without children keep an empty span at `fallback`.
    pub fn finish(&mut self, id: NodeId, fallback: u32) {
        let children = &self.nodes[id as usize].children;
        let span = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => self.nodes[first as usize]
                .span
                .to(self.nodes[last as usize].span),
            _ => Span::empty_at(fallback),
        };
        self.nodes[id as usize].span = span;
    }

    pub fn build(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
            leaf_of_token: self.leaf_of_token,
        }
    }
}
