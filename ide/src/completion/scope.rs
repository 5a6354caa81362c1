//! The visibility contexts completion draws from.
//!
//! The host project owns the real indexes; callers hand completion a plain-data
//! [`ProjectContext`] snapshot of them. Lexical (expression) scope is the exception:
//! it is derived from the fragment tree itself.

use analyzer::{NodeId, NodeKind, ParseOutput, TokenKind};

/// Language built-ins visible everywhere without an import.
pub const BUILT_IN_VALUES: &[&str] = &["True", "False"];
pub const BUILT_IN_TYPES: &[&str] = &["Int", "Float", "String", "Char", "Bool", "List"];

/// A constructor exposed by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    /// True for union-type variants (the only constructors valid in patterns).
    pub union_variant: bool,
}

/// One module of the project index: name plus its exposed declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleInfo {
    pub name: String,
    pub values: Vec<String>,
    pub types: Vec<String>,
    pub constructors: Vec<Constructor>,
}

/// What an import makes visible unqualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exposing {
    Nothing,
    All,
    Named(Vec<String>),
}

/// An import declaration of the current file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub module: String,
    pub alias: Option<String>,
    pub exposing: Exposing,
}

/// Snapshot of everything the suggestion engine may consult: the project-wide module
/// index (independent of import status), the file's imports, and the file's own
/// type/constructor declarations.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    pub modules: Vec<ModuleInfo>,
    pub imports: Vec<ImportDecl>,
    pub local_types: Vec<String>,
    pub local_constructors: Vec<Constructor>,
}

impl ProjectContext {
    fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Alias names declared by the file's imports (aliases never contain dots).
    pub fn alias_decls(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().filter_map(|i| i.alias.as_deref())
    }

    /// Module-scope constructors: declared in the file, plus re-exported through
    /// exposing imports.
    pub fn visible_constructors(&self) -> Vec<&Constructor> {
        let mut out: Vec<&Constructor> = self.local_constructors.iter().collect();
        for import in &self.imports {
            let Some(module) = self.module(&import.module) else {
                continue;
            };
            match &import.exposing {
                Exposing::Nothing => {}
                Exposing::All => out.extend(module.constructors.iter()),
                Exposing::Named(names) => out.extend(
                    module
                        .constructors
                        .iter()
                        .filter(|c| names.iter().any(|n| n == &c.name)),
                ),
            }
        }
        out
    }

    /// Module-scope types: declared in the file, plus re-exported through imports.
    pub fn visible_types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.local_types.iter().map(String::as_str).collect();
        for import in &self.imports {
            let Some(module) = self.module(&import.module) else {
                continue;
            };
            match &import.exposing {
                Exposing::Nothing => {}
                Exposing::All => out.extend(module.types.iter().map(String::as_str)),
                Exposing::Named(names) => out.extend(
                    module
                        .types
                        .iter()
                        .filter(|t| names.iter().any(|n| n == *t))
                        .map(String::as_str),
                ),
            }
        }
        out
    }

    /// Resolves a qualifier to import scopes: imports whose alias or module name
    /// matches, plus the project module of that exact name whether imported or not.
    /// A prefix may resolve to several scopes; all of them contribute.
    pub fn import_scopes(&self, qualifier: &str) -> Vec<&ModuleInfo> {
        let mut out: Vec<&ModuleInfo> = Vec::new();
        for import in &self.imports {
            let hit = import.alias.as_deref() == Some(qualifier) || import.module == qualifier;
            if hit
                && let Some(module) = self.module(&import.module)
                && !out.iter().any(|m| m.name == module.name)
            {
                out.push(module);
            }
        }
        if let Some(module) = self.module(qualifier)
            && !out.iter().any(|m| m.name == module.name)
        {
            out.push(module);
        }
        out
    }
}

/// Lexical bindings visible at `leaf`: enclosing let declarations, enclosing function
/// parameters, enclosing case-branch pattern names, and top-level declarations.
pub(crate) fn visible_values_at(parsed: &ParseOutput, leaf: NodeId) -> Vec<String> {
    let tree = &parsed.tree;
    let mut out = Vec::new();

    for ancestor in tree.ancestors(leaf) {
        match tree.kind(ancestor) {
            NodeKind::LetInExpr => {
                for decl in tree.children_of_kind(ancestor, NodeKind::ValueDeclaration) {
                    if let Some(name) = decl_name(parsed, decl) {
                        out.push(name);
                    }
                }
            }
            NodeKind::ValueDeclaration => {
                out.extend(decl_params(parsed, ancestor));
            }
            NodeKind::CaseBranch => {
                for pattern in tree.children_of_kind(ancestor, NodeKind::Pattern) {
                    collect_pattern_bindings(parsed, pattern, &mut out);
                }
            }
            _ => {}
        }
    }

    for decl in tree.children_of_kind(tree.root(), NodeKind::ValueDeclaration) {
        if let Some(name) = decl_name(parsed, decl) {
            out.push(name);
        }
    }

    out
}

/// The declared name: first lower-case identifier of the head.
fn decl_name(parsed: &ParseOutput, decl: NodeId) -> Option<String> {
    let tree = &parsed.tree;
    let leaf = tree.find_token_child(&parsed.tokens, decl, |k| {
        matches!(k, TokenKind::LowerIdent(_))
    })?;
    match tree.token_kind(&parsed.tokens, leaf) {
        Some(TokenKind::LowerIdent(sym)) => Some(sym.text.clone()),
        _ => None,
    }
}

/// Parameter names: lower-case identifier leaves of the head after the name and
/// before the `=`.
fn decl_params(parsed: &ParseOutput, decl: NodeId) -> Vec<String> {
    let tree = &parsed.tree;
    let mut names = Vec::new();
    let mut seen_name = false;
    for &child in tree.children(decl) {
        match tree.token_kind(&parsed.tokens, child) {
            Some(TokenKind::Eq) => break,
            Some(TokenKind::LowerIdent(sym)) => {
                if seen_name {
                    names.push(sym.text.clone());
                }
                seen_name = true;
            }
            _ => {}
        }
    }
    names
}

/// Lower-case identifiers bound by a pattern (`Just value`, `( a, b )`).
fn collect_pattern_bindings(parsed: &ParseOutput, node: NodeId, out: &mut Vec<String>) {
    let tree = &parsed.tree;
    if let Some(TokenKind::LowerIdent(sym)) = tree.token_kind(&parsed.tokens, node) {
        out.push(sym.text.clone());
    }
    for &child in tree.children(node) {
        collect_pattern_bindings(parsed, child, out);
    }
}
