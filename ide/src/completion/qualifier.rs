//! Dotted-qualifier expansion.

use super::scope::ProjectContext;
use super::{CompletionItem, CompletionKind};

/// Suggests the next path segment for every project module reachable from
/// `qualifier`, regardless of import status, plus alias names when no qualifier has
/// been typed yet (aliases never contain dots).
///
/// With modules `Json.Decode` and `Json.Encode`: an empty qualifier yields `Json`
/// (twice — duplicates are the host's problem), and qualifier `Json` yields `Decode`
/// and `Encode`. A module whose name extends the qualifier without a dot boundary
/// (`JsonExtra` for `Json`) contributes its whole first segment.
pub(crate) fn suggest_qualifiers(
    qualifier: &str,
    ctx: &ProjectContext,
    out: &mut Vec<CompletionItem>,
) {
    let dotted = format!("{qualifier}.");
    for module in &ctx.modules {
        if !module.name.starts_with(qualifier) || module.name == qualifier {
            continue;
        }
        let rest = module.name.strip_prefix(&dotted).unwrap_or(&module.name);
        let segment = rest.split('.').next().unwrap_or(rest);
        out.push(CompletionItem::new(segment, CompletionKind::Module));
    }

    if qualifier.is_empty() {
        for alias in ctx.alias_decls() {
            out.push(CompletionItem::new(alias, CompletionKind::Alias));
        }
    }
}
