//! Smart-enter statement repair.
//!
//! One invocation runs a small fixpoint loop over the document:
//!
//! 1. *Locating* — find the nearest completable construct at the caret;
//! 2. *Fixing* — run every fixer against it, applying any insertions;
//! 3. re-derive the tree and repeat until a pass changes nothing (*Converged*),
//!    then place the caret for the repaired construct;
//! 4. if the candidate shifts shape between passes or the pass cap is exceeded
//!    (*Aborted*), every insertion is discarded and the result is exactly a plain
//!    newline press on the original text.
//!
//! The document is a value here, not a shared buffer: the caller keeps its own copy
//! until it adopts the returned text, which is what makes the abort path trivially
//! atomic.

use analyzer::{NodeId, NodeKind, TokenKind, analyze_syntax, lex};
use tracing::{debug, trace};

pub(crate) mod fixers;
pub(crate) mod indent;
pub(crate) mod locator;
pub(crate) mod placement;

pub use fixers::{BranchSource, NoBranchInfo};

use crate::text_edit::apply_edits;
use fixers::FixContext;
use indent::indent_unit;

/// Knobs for the repair loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterConfig {
    /// Modified passes allowed before the loop gives up and reverts.
    pub max_fix_passes: usize,
    /// Spaces per logical indent level.
    pub indent_unit: usize,
}

impl Default for EnterConfig {
    fn default() -> Self {
        Self {
            max_fix_passes: 2,
            indent_unit: 4,
        }
    }
}

/// Result of a smart-enter press: the full updated text and the new caret offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterOutcome {
    pub source: String,
    pub cursor: u32,
    /// True when a repair was committed (false for the plain-newline paths).
    pub repaired: bool,
}

/// Smart enter with no variant knowledge and default configuration.
pub fn smart_enter(source: &str, cursor: usize) -> EnterOutcome {
    smart_enter_with(source, cursor, &NoBranchInfo, EnterConfig::default())
}

/// Smart enter with a caller-provided branch synthesizer.
pub fn smart_enter_with(
    source: &str,
    cursor: usize,
    branches: &dyn BranchSource,
    config: EnterConfig,
) -> EnterOutcome {
    let cursor = u32::try_from(cursor.min(source.len())).unwrap_or(u32::MAX);
    EnterSession {
        original: source,
        doc: source.to_string(),
        cursor,
        config,
        branches,
    }
    .run()
}

/// Shape of a located candidate, compared across passes to detect non-convergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateKind {
    /// The declaration-in-progress leaf (identifier / `}` / `)` with no `=` yet).
    DeclLeaf,
    Node(NodeKind),
}

impl CandidateKind {
    fn of(tree: &analyzer::SyntaxTree, node: NodeId) -> CandidateKind {
        match tree.kind(node) {
            NodeKind::Token => CandidateKind::DeclLeaf,
            kind => CandidateKind::Node(kind),
        }
    }

    /// Structural sameness across passes. The one sanctioned promotion: the decl
    /// leaf becomes a `ValueDeclaration` once its `=` has been inserted.
    fn accepts(self, next: CandidateKind) -> bool {
        self == next
            || (self == CandidateKind::DeclLeaf
                && next == CandidateKind::Node(NodeKind::ValueDeclaration))
    }
}

struct EnterSession<'a> {
    original: &'a str,
    doc: String,
    cursor: u32,
    config: EnterConfig,
    branches: &'a dyn BranchSource,
}

impl<'a> EnterSession<'a> {
    fn run(mut self) -> EnterOutcome {
        let mut passes = 0usize;
        let mut prev_kind: Option<CandidateKind> = None;

        loop {
            // Locating. Every pass re-derives the tree: insertions invalidate it.
            let parsed = analyze_syntax(&self.doc);
            let Some(candidate) = locator::locate(&parsed, self.cursor, prev_kind) else {
                if prev_kind.is_some() {
                    debug!(passes, "candidate vanished between passes; reverting");
                    return self.abort();
                }
                trace!("no completable statement at caret");
                return self.plain_newline(false);
            };

            let kind = CandidateKind::of(&parsed.tree, candidate);
            if let Some(prev) = prev_kind
                && !prev.accepts(kind)
            {
                debug!(?prev, ?kind, "candidate changed shape; reverting");
                return self.abort();
            }

            // Fixing. Each fixer reads the pre-pass tree; insertions apply together.
            let ctx = FixContext {
                parsed: &parsed,
                source: &self.doc,
                config: &self.config,
                branches: self.branches,
            };
            let edits = fixers::run_fixers(&ctx, candidate);

            if edits.is_empty() {
                // Converged.
                let modified = passes > 0;
                trace!(passes, modified, "fixpoint converged");
                if modified
                    && let Some(caret) = placement::place(&parsed, candidate, self.config.indent_unit)
                {
                    let caret = caret.min(self.doc.len() as u32);
                    return EnterOutcome {
                        source: self.doc,
                        cursor: caret,
                        repaired: true,
                    };
                }
                return self.plain_newline(modified);
            }

            passes += 1;
            if passes > self.config.max_fix_passes {
                debug!(passes, "pass cap exceeded; reverting");
                return self.abort();
            }
            trace!(passes, edits = edits.len(), "applying repair insertions");
            self.doc = apply_edits(&self.doc, &edits);
            prev_kind = Some(kind);
        }
    }

    /// Aborted: discard all insertions and behave like a plain newline press.
    fn abort(mut self) -> EnterOutcome {
        self.doc = self.original.to_string();
        self.plain_newline(false)
    }

    /// Baseline behavior: newline plus auto-indent at the caret.
    ///
    /// The indent is the current line's leading whitespace, one level deeper when the
    /// token before the caret opens a layout block.
    fn plain_newline(self, repaired: bool) -> EnterOutcome {
        let cursor = self.cursor as usize;
        let line_start = self.doc[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let mut indent: String = self.doc[line_start..cursor]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        if opens_layout_block(&self.doc, self.cursor) {
            indent.push_str(&indent_unit(self.config.indent_unit));
        }

        let mut source = String::with_capacity(self.doc.len() + 1 + indent.len());
        source.push_str(&self.doc[..cursor]);
        source.push('\n');
        source.push_str(&indent);
        source.push_str(&self.doc[cursor..]);

        let caret = (cursor + 1 + indent.len()) as u32;
        EnterOutcome {
            source,
            cursor: caret,
            repaired,
        }
    }
}

/// Does the last token before the caret introduce an indented block?
fn opens_layout_block(text: &str, cursor: u32) -> bool {
    let tokens = lex(text).tokens;
    let mut prev = None;
    for tok in &tokens {
        if tok.is_trivia() || matches!(tok.kind, TokenKind::Eof) {
            continue;
        }
        if tok.span.end <= cursor {
            prev = Some(&tok.kind);
        } else {
            break;
        }
    }
    matches!(
        prev,
        Some(
            TokenKind::Of
                | TokenKind::Let
                | TokenKind::In
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::Eq
                | TokenKind::Arrow
        )
    )
}
