//! Caret placement after a converged repair.
//!
//! Every arm computes `anchor end + indent length + (newline + one indent unit)`,
//! clamped to the document length. The indent length is the width of the whitespace
//! run between the indented element and the token before it, 0 at top level.

use analyzer::{NodeId, NodeKind, ParseOutput, Token, TokenKind};

/// Caret offset for a repaired `candidate`, or `None` when no arm matches and the
/// caller should fall back to a plain newline.
pub(crate) fn place(parsed: &ParseOutput, candidate: NodeId, unit: usize) -> Option<u32> {
    let tree = &parsed.tree;
    let tokens = &parsed.tokens;
    let step = (unit + 1) as u32; // "\n" plus one indent unit

    match tree.kind(candidate) {
        NodeKind::CaseExpr => {
            let branches = tree.children_of_kind(candidate, NodeKind::CaseBranch);
            let &first = branches.first()?;
            Some(tree.span(first).end + indent_len(parsed, first) + step)
        }
        NodeKind::LetInExpr => {
            let in_leaf =
                tree.find_token_child(tokens, candidate, |k| matches!(k, TokenKind::In))?;
            let decls = tree.children_of_kind(candidate, NodeKind::ValueDeclaration);
            let anchor = if decls.is_empty() {
                tree.find_token_child(tokens, candidate, |k| matches!(k, TokenKind::Let))?
            } else {
                in_leaf
            };
            let indent = match tree.next_sibling(in_leaf) {
                Some(indented) => indent_len(parsed, indented),
                None => 0,
            };
            Some(tree.span(anchor).end + indent + step)
        }
        NodeKind::CaseBranch => {
            let arrow =
                tree.find_token_child(tokens, candidate, |k| matches!(k, TokenKind::Arrow))?;
            Some(tree.span(arrow).end + indent_len(parsed, candidate) + step)
        }
        NodeKind::IfElseExpr => {
            let thens = tree.token_children(tokens, candidate, |k| matches!(k, TokenKind::Then));
            let elses = tree.token_children(tokens, candidate, |k| matches!(k, TokenKind::Else));
            let (&last_then, &last_else) = (thens.last()?, elses.last()?);

            let exprs = tree
                .children(candidate)
                .iter()
                .filter(|&&c| {
                    !tree
                        .token_kind(tokens, c)
                        .is_some_and(|k| k.is_keyword())
                })
                .count();
            let anchor = if exprs > thens.len() { last_else } else { last_then };
            Some(tree.span(anchor).end + indent_len(parsed, last_else) + step)
        }
        NodeKind::ValueDeclaration => {
            let eq = tree.find_token_child(tokens, candidate, |k| matches!(k, TokenKind::Eq))?;
            Some(tree.span(eq).end + indent_len(parsed, candidate) + step)
        }
        _ => None,
    }
}

/// Length of the whitespace run between the element and whatever precedes it
/// (0 for top-level elements).
fn indent_len(parsed: &ParseOutput, node: NodeId) -> u32 {
    let tree = &parsed.tree;
    if tree.is_top_level(node) {
        return 0;
    }
    let start = tree.span(node).start;
    let prev_end = prev_nontrivia_end(&parsed.tokens, start).unwrap_or(0);
    start.saturating_sub(prev_end)
}

fn prev_nontrivia_end(tokens: &[Token], offset: u32) -> Option<u32> {
    let mut prev = None;
    for tok in tokens {
        if tok.is_trivia() || matches!(tok.kind, TokenKind::Eof) {
            continue;
        }
        if tok.span.end <= offset {
            prev = Some(tok.span.end);
        } else {
            break;
        }
    }
    prev
}
