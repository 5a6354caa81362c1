//! Qualified-name completion.
//!
//! Triggered per completion keystroke, independent of the repair engine. The engine
//! expands a dotted qualifier prefix into candidate module segments and, once the
//! qualifier resolves to one or more scopes, exposed values/constructors/types
//! filtered by the grammatical position of the identifier.
//!
//! Candidate order is host-relevance (insertion) order; duplicates across scopes are
//! allowed to surface. The host's prefix matcher is folded in as a plain prefix
//! filter on the typed partial segment.

use analyzer::{NodeId, NodeKind, ParseOutput, Token, TokenKind, analyze_syntax};
use serde::Serialize;
use tracing::trace;

mod qualifier;
mod scope;

pub use scope::{
    BUILT_IN_TYPES, BUILT_IN_VALUES, Constructor, Exposing, ImportDecl, ModuleInfo,
    ProjectContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Module,
    Alias,
    Value,
    Constructor,
    Type,
}

/// One completion candidate for an editor UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Grammatical position of the identifier being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionKind {
    /// A value expression.
    Value,
    /// A constructor pattern (case branch, destructuring).
    Pattern,
    /// A type reference (annotation).
    Type,
}

/// Computes completion candidates at a byte cursor.
pub fn complete(source: &str, cursor: usize, ctx: &ProjectContext) -> Vec<CompletionItem> {
    let cursor = u32::try_from(cursor.min(source.len())).unwrap_or(u32::MAX);
    let parsed = analyze_syntax(source);

    let Some(site) = RefSite::detect(&parsed, source, cursor) else {
        return Vec::new();
    };

    // A qualifier typed right after a number is noise (`1.` looks like a dotted
    // path); suggest nothing at all there.
    if site.position == PositionKind::Value && site.after_number {
        trace!(cursor, "suppressing completion after a numeric literal");
        return Vec::new();
    }

    let mut items = Vec::new();
    qualifier::suggest_qualifiers(&site.qualifier, ctx, &mut items);

    match site.position {
        PositionKind::Value => {
            if site.qualifier.is_empty() {
                for name in scope::visible_values_at(&parsed, site.leaf) {
                    items.push(CompletionItem::new(name, CompletionKind::Value));
                }
                for ctor in ctx.visible_constructors() {
                    items.push(CompletionItem::new(&ctor.name, CompletionKind::Constructor));
                }
                for name in BUILT_IN_VALUES {
                    items.push(CompletionItem::new(*name, CompletionKind::Value));
                }
            } else {
                for module in ctx.import_scopes(&site.qualifier) {
                    for name in &module.values {
                        items.push(
                            CompletionItem::new(name, CompletionKind::Value)
                                .with_detail(&module.name),
                        );
                    }
                    for ctor in &module.constructors {
                        items.push(
                            CompletionItem::new(&ctor.name, CompletionKind::Constructor)
                                .with_detail(&module.name),
                        );
                    }
                }
            }
        }
        PositionKind::Pattern => {
            if site.qualifier.is_empty() {
                for ctor in ctx.visible_constructors() {
                    if ctor.union_variant {
                        items.push(CompletionItem::new(&ctor.name, CompletionKind::Constructor));
                    }
                }
            } else {
                for module in ctx.import_scopes(&site.qualifier) {
                    for ctor in &module.constructors {
                        if ctor.union_variant {
                            items.push(
                                CompletionItem::new(&ctor.name, CompletionKind::Constructor)
                                    .with_detail(&module.name),
                            );
                        }
                    }
                }
            }
        }
        PositionKind::Type => {
            if site.qualifier.is_empty() {
                for name in ctx.visible_types() {
                    items.push(CompletionItem::new(name, CompletionKind::Type));
                }
                for name in BUILT_IN_TYPES {
                    items.push(CompletionItem::new(*name, CompletionKind::Type));
                }
            } else {
                for module in ctx.import_scopes(&site.qualifier) {
                    for name in &module.types {
                        items.push(
                            CompletionItem::new(name, CompletionKind::Type)
                                .with_detail(&module.name),
                        );
                    }
                }
            }
        }
    }

    // The host's prefix matcher: keep candidates extending the typed segment.
    if !site.partial.is_empty() {
        items.retain(|item| item.label.starts_with(&site.partial));
    }
    items
}

/// The qualifiable-identifier site under the cursor.
struct RefSite {
    /// Dotted path typed before the last dot (may be empty).
    qualifier: String,
    /// Typed text after the last dot, used as the host's prefix filter.
    partial: String,
    position: PositionKind,
    /// Tree leaf anchoring the site (for lexical scope).
    leaf: NodeId,
    /// True when the site directly extends a numeric literal.
    after_number: bool,
}

impl RefSite {
    /// Token-connectivity detection: the cursor must touch an identifier or dot, and
    /// the site is the adjacent ident/dot run leading up to it.
    fn detect(parsed: &ParseOutput, source: &str, cursor: u32) -> Option<RefSite> {
        let tokens = &parsed.tokens;
        let anchor = anchor_token(tokens, cursor)?;

        // Expand backwards over the adjacent ident/dot run.
        let mut first = anchor;
        while first > 0 {
            let prev = &tokens[first - 1];
            if !is_ref_token(&prev.kind) || prev.span.end != tokens[first].span.start {
                break;
            }
            first -= 1;
        }

        let run_start = tokens[first].span.start;
        let typed = &source[run_start as usize..cursor as usize];
        let (qualifier, partial) = match typed.rfind('.') {
            Some(dot) => (typed[..dot].to_string(), typed[dot + 1..].to_string()),
            None => (String::new(), typed.to_string()),
        };

        let leaf = parsed.tree.leaf_for_token(anchor as u32)?;
        let position = position_of(parsed, leaf);

        let after_number = prev_adjacent_number(tokens, first);

        Some(RefSite {
            qualifier,
            partial,
            position,
            leaf,
            after_number,
        })
    }
}

/// The identifier/dot token the cursor rests on: containing it, or ending exactly at
/// it.
fn anchor_token(tokens: &[Token], cursor: u32) -> Option<usize> {
    if let Some(idx) = tokens
        .iter()
        .position(|t| is_ref_token(&t.kind) && t.span.contains(cursor) && t.span.start < cursor)
    {
        return Some(idx);
    }
    tokens
        .iter()
        .position(|t| is_ref_token(&t.kind) && t.span.end == cursor)
}

fn is_ref_token(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LowerIdent(_) | TokenKind::UpperIdent(_) | TokenKind::Dot
    )
}

fn position_of(parsed: &ParseOutput, leaf: NodeId) -> PositionKind {
    let tree = &parsed.tree;
    for ancestor in tree.ancestors(leaf) {
        match tree.kind(ancestor) {
            NodeKind::Pattern => return PositionKind::Pattern,
            NodeKind::TypeAnnotation => return PositionKind::Type,
            _ => {}
        }
    }
    PositionKind::Value
}

/// True when the token right before the run is a numeric literal with no gap.
fn prev_adjacent_number(tokens: &[Token], first: usize) -> bool {
    if first == 0 {
        return false;
    }
    let prev = &tokens[first - 1];
    let adjacent = prev.span.end == tokens[first].span.start;
    adjacent
        && matches!(
            &prev.kind,
            TokenKind::Literal(lit) if lit.kind == analyzer::LitKind::Number
        )
}
