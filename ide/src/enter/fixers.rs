//! The repair rules. Each fixer is a pure function: it inspects one candidate node
//! against the pre-pass tree and either produces a single text insertion or nothing.
//!
//! Idempotence is load-bearing: a fixer's precondition must fail on the tree its own
//! edit produces, otherwise the fixpoint loop cannot terminate. Each rule therefore
//! keys on exactly the token it inserts (`->`, `in`, `else`, `=`).

use analyzer::{NodeId, NodeKind, SyntaxTree, TextEdit, Token, TokenKind};

use super::EnterConfig;
use super::indent::{guess_indent, indent_unit};
use super::locator::is_decl_leaf_without_eq;

/// Everything a fixer may look at.
pub(crate) struct FixContext<'a> {
    pub(crate) parsed: &'a analyzer::ParseOutput,
    pub(crate) source: &'a str,
    pub(crate) config: &'a EnterConfig,
    pub(crate) branches: &'a dyn BranchSource,
}

impl<'a> FixContext<'a> {
    fn tree(&self) -> &'a SyntaxTree {
        &self.parsed.tree
    }

    fn tokens(&self) -> &'a [Token] {
        &self.parsed.tokens
    }

    fn text(&self, node: NodeId) -> &'a str {
        let span = self.tree().span(node);
        &self.source[span.start as usize..span.end as usize]
    }
}

/// Variant information for an uncovered-branch synthesis, provided by the caller
/// (scope and type knowledge live outside the repair engine).
pub trait BranchSource {
    /// Pattern texts for the scrutinee's variants not yet covered by any branch.
    fn missing_branches(&self, scrutinee: &str) -> Vec<String>;
}

/// Default source: no variant knowledge, so no branches are synthesized.
pub struct NoBranchInfo;

impl BranchSource for NoBranchInfo {
    fn missing_branches(&self, _scrutinee: &str) -> Vec<String> {
        Vec::new()
    }
}

pub(crate) type Fixer = fn(&FixContext<'_>, NodeId) -> Option<TextEdit>;

/// The declared order. At most one precondition holds per node kind, so this composes
/// as a dispatch; the driver still tolerates multiple insertions in one pass.
pub(crate) const FIXERS: [Fixer; 5] = [
    case_branch_fixer,
    case_expression_fixer,
    let_in_fixer,
    if_else_fixer,
    function_body_fixer,
];

pub(crate) fn run_fixers(ctx: &FixContext<'_>, candidate: NodeId) -> Vec<TextEdit> {
    FIXERS.iter().filter_map(|fixer| fixer(ctx, candidate)).collect()
}

/// A case branch whose `->` is missing: complete it after the pattern.
fn case_branch_fixer(ctx: &FixContext<'_>, node: NodeId) -> Option<TextEdit> {
    let tree = ctx.tree();
    if tree.kind(node) != NodeKind::CaseBranch {
        return None;
    }
    if tree
        .find_token_child(ctx.tokens(), node, |k| matches!(k, TokenKind::Arrow))
        .is_some()
    {
        return None;
    }

    let pattern = *tree
        .children_of_kind(node, NodeKind::Pattern)
        .first()?;
    let indent = guess_indent(ctx.source, tree.span(node).start, 0, ctx.config.indent_unit);
    let unit = indent_unit(ctx.config.indent_unit);

    Some(TextEdit::insert(
        tree.span(pattern).end,
        format!(" ->\n{indent}{unit}"),
    ))
}

/// A case expression with no branches at all: synthesize one per uncovered variant.
fn case_expression_fixer(ctx: &FixContext<'_>, node: NodeId) -> Option<TextEdit> {
    let tree = ctx.tree();
    if tree.kind(node) != NodeKind::CaseExpr {
        return None;
    }
    if !tree.children_of_kind(node, NodeKind::CaseBranch).is_empty() {
        return None;
    }
    let of_leaf = tree.find_token_child(ctx.tokens(), node, |k| matches!(k, TokenKind::Of))?;
    let scrutinee = tree
        .children(node)
        .iter()
        .copied()
        .find(|&c| tree.kind(c) != NodeKind::Token)?;

    let patterns = ctx.branches.missing_branches(ctx.text(scrutinee));
    if patterns.is_empty() {
        return None;
    }

    let indent = guess_indent(ctx.source, tree.span(node).start, 0, ctx.config.indent_unit);
    let unit = indent_unit(ctx.config.indent_unit);
    let text: String = patterns
        .iter()
        .map(|pat| format!("\n{indent}{unit}{pat} ->\n{indent}{unit}{unit}"))
        .collect();

    Some(TextEdit::insert(tree.span(of_leaf).end, text))
}

/// A let block that never reached its `in`.
fn let_in_fixer(ctx: &FixContext<'_>, node: NodeId) -> Option<TextEdit> {
    let tree = ctx.tree();
    if tree.kind(node) != NodeKind::LetInExpr {
        return None;
    }
    if tree
        .find_token_child(ctx.tokens(), node, |k| matches!(k, TokenKind::In))
        .is_some()
    {
        return None;
    }

    let indent = guess_indent(ctx.source, tree.span(node).start, 0, ctx.config.indent_unit);
    let unit = indent_unit(ctx.config.indent_unit);
    let decls = tree.children_of_kind(node, NodeKind::ValueDeclaration);

    let (anchor_end, empty_line) = match decls.last() {
        Some(&decl) => (tree.span(decl).end, String::new()),
        None => {
            let let_leaf =
                tree.find_token_child(ctx.tokens(), node, |k| matches!(k, TokenKind::Let))?;
            (tree.span(let_leaf).end, format!("\n{indent}{unit}"))
        }
    };

    Some(TextEdit::insert(
        anchor_end,
        format!("{empty_line}\n{indent}in\n{indent}{unit}"),
    ))
}

/// An if-expression missing its final `else` (or bare of both keywords).
///
/// The branch-counting rules here are deliberately the empirically-tuned ones: they
/// cover the enumerated editing patterns, not the general chain-repair problem.
fn if_else_fixer(ctx: &FixContext<'_>, node: NodeId) -> Option<TextEdit> {
    let tree = ctx.tree();
    if tree.kind(node) != NodeKind::IfElseExpr {
        return None;
    }

    let thens = tree.token_children(ctx.tokens(), node, |k| matches!(k, TokenKind::Then));
    let elses = tree.token_children(ctx.tokens(), node, |k| matches!(k, TokenKind::Else));
    if elses.len() > thens.len() || (!elses.is_empty() && elses.len() == thens.len()) {
        return None;
    }

    let exprs: Vec<NodeId> = tree
        .children(node)
        .iter()
        .copied()
        .filter(|&c| !is_keyword_leaf(ctx, c))
        .collect();
    let &expr = exprs.last()?;
    let expr_span = tree.span(expr);

    // A chained `if` that didn't fold into the group sits right after an `else`
    // keyword; its line is already one level deeper than the insertion should be.
    let level_offset = match prev_nontrivia_kind(ctx.tokens(), tree.span(node).start) {
        Some(TokenKind::Else) => -1,
        _ => 0,
    };
    let indent = guess_indent(
        ctx.source,
        tree.span(node).start,
        level_offset,
        ctx.config.indent_unit,
    );
    let unit = indent_unit(ctx.config.indent_unit);

    let expr_prev = prev_nontrivia_kind(ctx.tokens(), expr_span.start);
    // Only siblings count: a token past the candidate belongs to other code.
    let expr_next =
        next_nontrivia_after(ctx.tokens(), expr_span.end, tree.span(node).end);

    let (then_string, end_offset) = match (expr_prev, expr_next) {
        // `then` keyword present, cursor on the predicate or the `then` itself.
        (Some(TokenKind::Then), Some(next)) if exprs.len() % 2 == 1 => {
            (format!("\n{indent}{unit}"), next.span.end)
        }
        (_, Some(next)) if matches!(next.kind, TokenKind::Then) => {
            (format!("\n{indent}{unit}"), next.span.end)
        }
        // `then` keyword not present yet.
        (Some(TokenKind::If), _) => (format!(" then\n{indent}{unit}"), expr_span.end),
        // Cursor on the branch body.
        _ => (String::new(), expr_span.end),
    };

    Some(TextEdit::insert(
        end_offset,
        format!("{then_string}\n{indent}else\n{indent}{unit}"),
    ))
}

/// The declaration-in-progress leaf: give it its `=` and an indented body line.
fn function_body_fixer(ctx: &FixContext<'_>, node: NodeId) -> Option<TextEdit> {
    if !is_decl_leaf_without_eq(ctx.parsed, node) {
        return None;
    }
    let tree = ctx.tree();
    let indent = guess_indent(ctx.source, tree.span(node).start, 0, ctx.config.indent_unit);
    let unit = indent_unit(ctx.config.indent_unit);

    Some(TextEdit::insert(
        tree.span(node).end,
        format!(" =\n{indent}{unit}"),
    ))
}

fn is_keyword_leaf(ctx: &FixContext<'_>, node: NodeId) -> bool {
    ctx.tree()
        .token_kind(ctx.tokens(), node)
        .is_some_and(|k| k.is_keyword())
}

/// Kind of the nearest non-trivia token ending at or before `offset`.
fn prev_nontrivia_kind(tokens: &[Token], offset: u32) -> Option<TokenKind> {
    let mut prev = None;
    for tok in tokens {
        if tok.is_trivia() || matches!(tok.kind, TokenKind::Eof) {
            continue;
        }
        if tok.span.end <= offset {
            prev = Some(tok.kind.clone());
        } else {
            break;
        }
    }
    prev
}

/// The nearest non-trivia token starting at or after `offset`, ending by `limit`.
fn next_nontrivia_after(tokens: &[Token], offset: u32, limit: u32) -> Option<&Token> {
    tokens.iter().find(|t| {
        !t.is_trivia()
            && !matches!(t.kind, TokenKind::Eof)
            && t.span.start >= offset
            && t.span.end <= limit
    })
}
