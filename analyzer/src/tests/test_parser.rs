use insta::assert_snapshot;

use crate::analyze_syntax;
use crate::tests::common::trim_indent;
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use crate::lexer::TokenKind;

fn find(tree: &SyntaxTree, kind: NodeKind) -> Option<NodeId> {
    fn walk(tree: &SyntaxTree, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        if tree.kind(id) == kind {
            return Some(id);
        }
        tree.children(id)
            .iter()
            .find_map(|&c| walk(tree, c, kind))
    }
    walk(tree, tree.root(), kind)
}

#[test]
fn case_without_branches_parses_as_empty_case() {
    let source = "case x of";
    let out = analyze_syntax(source);
    assert_snapshot!(out.tree.dump(source), @r#"
    SourceFile@0..9
      CaseExpr@0..9
        Token@0..4 "case"
        QualifiedRef@5..6
          Token@5..6 "x"
        Token@7..9 "of"
    "#);
}

#[test]
fn let_without_in_keeps_its_declarations() {
    let source = "let\n    a = 1";
    let out = analyze_syntax(source);
    assert_snapshot!(out.tree.dump(source), @r#"
    SourceFile@0..13
      LetInExpr@0..13
        Token@0..3 "let"
        ValueDeclaration@8..13
          Token@8..9 "a"
          Token@10..11 "="
          Token@12..13 "1"
    "#);
}

#[test]
fn if_without_else_keeps_then_branch() {
    let source = "if x then 1";
    let out = analyze_syntax(source);
    assert_snapshot!(out.tree.dump(source), @r#"
    SourceFile@0..11
      IfElseExpr@0..11
        Token@0..2 "if"
        QualifiedRef@3..4
          Token@3..4 "x"
        Token@5..9 "then"
        Token@10..11 "1"
    "#);
}

#[test]
fn declaration_with_body_nests_the_case() {
    let source = trim_indent(
        r#"
        describe color =
            case color of
                Red ->
                    1"#,
    );
    let out = analyze_syntax(&source);
    let tree = &out.tree;

    let decl = find(tree, NodeKind::ValueDeclaration).unwrap();
    assert!(tree.is_top_level(decl));

    let case = find(tree, NodeKind::CaseExpr).unwrap();
    assert_eq!(tree.parent(case), Some(decl));

    let branches = tree.children_of_kind(case, NodeKind::CaseBranch);
    assert_eq!(branches.len(), 1);
    let arrow = tree.find_token_child(&out.tokens, branches[0], |k| {
        matches!(k, TokenKind::Arrow)
    });
    assert!(arrow.is_some());
}

#[test]
fn branch_without_arrow_still_forms_a_branch() {
    let source = "case x of\n    Red";
    let out = analyze_syntax(source);
    let tree = &out.tree;

    let branch = find(tree, NodeKind::CaseBranch).unwrap();
    let arrow = tree.find_token_child(&out.tokens, branch, |k| matches!(k, TokenKind::Arrow));
    assert!(arrow.is_none());
    assert!(find(tree, NodeKind::Pattern).is_some());
}

#[test]
fn identifier_line_without_eq_stays_bare_leaves() {
    // Not a value declaration until the `=` exists.
    let source = "greet name";
    let out = analyze_syntax(source);
    let tree = &out.tree;

    assert!(find(tree, NodeKind::ValueDeclaration).is_none());
    let root_children = tree.children(tree.root());
    assert_eq!(root_children.len(), 2);
    assert!(root_children.iter().all(|&c| tree.kind(c) == NodeKind::Token));
}

#[test]
fn type_annotation_line_parses_with_type_refs() {
    let source = "decode : Json.Decode.Value -> Maybe Int";
    let out = analyze_syntax(source);
    let tree = &out.tree;

    let ann = find(tree, NodeKind::TypeAnnotation).unwrap();
    assert!(tree.is_top_level(ann));
    let refs = tree.children_of_kind(ann, NodeKind::QualifiedRef);
    assert_eq!(refs.len(), 3); // Json.Decode.Value, Maybe, Int
}

#[test]
fn complete_else_if_chain_is_flattened() {
    let source = "if a then 1 else if b then 2 else 3";
    let out = analyze_syntax(source);
    let tree = &out.tree;

    let if_expr = find(tree, NodeKind::IfElseExpr).unwrap();
    assert!(tree.is_top_level(if_expr));
    let thens = tree.token_children(&out.tokens, if_expr, |k| matches!(k, TokenKind::Then));
    let elses = tree.token_children(&out.tokens, if_expr, |k| matches!(k, TokenKind::Else));
    assert_eq!(thens.len(), 2);
    assert_eq!(elses.len(), 2);
}

#[test]
fn incomplete_else_if_splits_off_a_partial_chain_link() {
    // The trailing `else if b` has no `then` yet, so it does not fold into the group:
    // the partial link must be locatable as its own if-expression.
    let source = "if a then 1 else if b";
    let out = analyze_syntax(source);
    let tree = &out.tree;

    let apply = find(tree, NodeKind::Apply).unwrap();
    let if_exprs = tree.children_of_kind(apply, NodeKind::IfElseExpr);
    assert_eq!(if_exprs.len(), 2);

    let else_leaf =
        tree.find_token_child(&out.tokens, apply, |k| matches!(k, TokenKind::Else));
    assert!(else_leaf.is_some());

    // The partial link has neither `then` nor `else` inside it.
    let partial = if_exprs[1];
    assert!(
        tree.token_children(&out.tokens, partial, |k| matches!(
            k,
            TokenKind::Then | TokenKind::Else
        ))
        .is_empty()
    );
}

#[test]
fn missing_of_is_reported_but_still_parses() {
    let source = "case x";
    let out = analyze_syntax(source);

    assert!(find(&out.tree, NodeKind::CaseExpr).is_some());
    assert_snapshot!(crate::format_diagnostics(source, out.diagnostics), @r"
    error: expected `of`
      --> <input>:1:7 [6..6]
    ");
}

#[test]
fn malformed_input_never_fails() {
    for source in [")", "= 1", "case", "let", "if", "-> x", "case x of\n)"] {
        let out = analyze_syntax(source);
        assert_eq!(out.tree.kind(out.tree.root()), NodeKind::SourceFile);
    }
}
