//! Statement locator: from a caret offset to the nearest completable construct.

use analyzer::{NodeId, NodeKind, ParseOutput, Token, TokenKind};

use super::CandidateKind;

/// Kinds the repair engine knows how to complete.
const COMPLETABLE: [NodeKind; 5] = [
    NodeKind::CaseBranch,
    NodeKind::CaseExpr,
    NodeKind::LetInExpr,
    NodeKind::IfElseExpr,
    NodeKind::ValueDeclaration,
];

/// Finds the candidate statement for the caret at `cursor`.
///
/// The leaf is the non-trivia token containing the cursor, or the nearest non-trivia
/// token before it when the cursor sits in whitespace (an end-of-line caret belongs
/// to the code it just finished typing). A cursor with nothing but whitespace before
/// it has no statement.
///
/// `prefer` biases relocation after a repair pass: an ancestor of the previous
/// candidate's kind wins over the generic first match, so a repaired construct is
/// found again rather than a sub-construct the repair just completed.
pub(crate) fn locate(
    parsed: &ParseOutput,
    cursor: u32,
    prefer: Option<CandidateKind>,
) -> Option<NodeId> {
    let tree = &parsed.tree;
    let leaf_token = leaf_token_at(&parsed.tokens, cursor)?;
    let leaf = tree.leaf_for_token(leaf_token as u32)?;

    // Identifiers (and closing braces/parens) don't parse as value declarations until
    // an `=` is present, so the declaration-in-progress case is the leaf itself.
    if is_decl_leaf_without_eq(parsed, leaf) {
        return Some(leaf);
    }

    if let Some(CandidateKind::Node(kind)) = prefer
        && let Some(hit) = tree.ancestors(leaf).find(|&a| tree.kind(a) == kind)
    {
        return Some(hit);
    }

    let first = tree
        .ancestors(leaf)
        .find(|&a| COMPLETABLE.contains(&tree.kind(a)))?;

    // A declaration that already has `=` and a body is complete; when it sits in a
    // `let` that still lacks its `in`, the unterminated `let` is the construct the
    // caret is really completing.
    if tree.kind(first) == NodeKind::ValueDeclaration
        && decl_has_body(parsed, first)
        && let Some(parent) = tree.parent(first)
        && tree.kind(parent) == NodeKind::LetInExpr
        && tree
            .find_token_child(&parsed.tokens, parent, |k| matches!(k, TokenKind::In))
            .is_none()
    {
        return Some(parent);
    }

    Some(first)
}

/// The non-trivia token the caret rests on: containing the cursor, else the nearest
/// one before it (skipping whitespace backwards).
fn leaf_token_at(tokens: &[Token], cursor: u32) -> Option<usize> {
    if let Some(idx) = tokens.iter().position(|t| {
        !t.is_trivia() && !matches!(t.kind, TokenKind::Eof) && t.span.contains(cursor)
    }) {
        return Some(idx);
    }

    let mut prev = None;
    for (idx, tok) in tokens.iter().enumerate() {
        if tok.is_trivia() || matches!(tok.kind, TokenKind::Eof) {
            continue;
        }
        if tok.span.end <= cursor {
            prev = Some(idx);
        } else {
            break;
        }
    }
    prev
}

/// The "declaration without `=`" shape: an identifier / `}` / `)` leaf left directly
/// under the file or a `let`. The parser only leaves such tokens bare when their line
/// has no `=` yet, so the parent check carries the missing-equals condition.
pub(crate) fn is_decl_leaf_without_eq(parsed: &ParseOutput, node: NodeId) -> bool {
    let tree = &parsed.tree;
    if tree.kind(node) != NodeKind::Token {
        return false;
    }
    let decl_ish = matches!(
        tree.token_kind(&parsed.tokens, node),
        Some(TokenKind::LowerIdent(_) | TokenKind::CloseBrace | TokenKind::CloseParen)
    );
    if !decl_ish {
        return false;
    }
    match tree.parent(node).map(|p| tree.kind(p)) {
        Some(NodeKind::SourceFile | NodeKind::LetInExpr) => true,
        _ => false,
    }
}

/// True when the declaration has its `=` and at least one child after it.
fn decl_has_body(parsed: &ParseOutput, decl: NodeId) -> bool {
    let tree = &parsed.tree;
    let Some(eq) = tree.find_token_child(&parsed.tokens, decl, |k| matches!(k, TokenKind::Eq))
    else {
        return false;
    };
    let children = tree.children(decl);
    let eq_pos = children.iter().position(|&c| c == eq).unwrap_or(0);
    children.len() > eq_pos + 1
}
