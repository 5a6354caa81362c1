use crate::analyze_syntax;
use crate::lexer::TokenKind;
use crate::tree::NodeKind;

#[test]
fn child_spans_are_ordered_and_contained() {
    fn check(tree: &crate::SyntaxTree, id: crate::NodeId) {
        let span = tree.span(id);
        let mut prev_end = span.start;
        for &child in tree.children(id) {
            let child_span = tree.span(child);
            assert!(child_span.start >= prev_end, "children out of order");
            assert!(child_span.end <= span.end, "child escapes parent range");
            prev_end = child_span.end;
            check(tree, child);
        }
    }

    let out = analyze_syntax("describe color =\n    case color of\n        Red ->\n            1");
    check(&out.tree, out.tree.root());
}

#[test]
fn parent_is_a_back_index() {
    let out = analyze_syntax("let\n    a = 1");
    let tree = &out.tree;

    let let_expr = tree.children(tree.root())[0];
    assert_eq!(tree.kind(let_expr), NodeKind::LetInExpr);
    let decl = tree.children_of_kind(let_expr, NodeKind::ValueDeclaration)[0];
    assert_eq!(tree.parent(decl), Some(let_expr));
    assert_eq!(tree.parent(let_expr), Some(tree.root()));
    assert_eq!(tree.parent(tree.root()), None);
}

#[test]
fn ancestors_walk_stops_at_root() {
    let out = analyze_syntax("let\n    a = 1");
    let tree = &out.tree;

    // Leaf for the `1` literal.
    let lit_idx = out
        .tokens
        .iter()
        .position(|t| matches!(&t.kind, TokenKind::Literal(_)))
        .unwrap();
    let leaf = tree.leaf_for_token(lit_idx as u32).unwrap();

    let kinds: Vec<NodeKind> = tree.ancestors(leaf).map(|id| tree.kind(id)).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::ValueDeclaration,
            NodeKind::LetInExpr,
            NodeKind::SourceFile,
        ]
    );
}

#[test]
fn trivia_tokens_have_no_leaves() {
    let out = analyze_syntax("a = 1\nb = 2");
    let newline_idx = out
        .tokens
        .iter()
        .position(|t| matches!(t.kind, TokenKind::Newline))
        .unwrap();
    assert!(out.tree.leaf_for_token(newline_idx as u32).is_none());
}

#[test]
fn sibling_navigation() {
    let out = analyze_syntax("if x then 1");
    let tree = &out.tree;

    let if_expr = tree.children(tree.root())[0];
    let then_leaf = tree
        .find_token_child(&out.tokens, if_expr, |k| matches!(k, TokenKind::Then))
        .unwrap();
    let prev = tree.prev_sibling(then_leaf).unwrap();
    assert_eq!(tree.kind(prev), NodeKind::QualifiedRef);
    let next = tree.next_sibling(then_leaf).unwrap();
    assert_eq!(tree.kind(next), NodeKind::Token);
    assert!(tree.next_sibling(next).is_none());
}

#[test]
fn top_level_flag_tracks_the_file_root() {
    let out = analyze_syntax("top = let\n        a = 1\n    in\n        a");
    let tree = &out.tree;

    let decl = tree.children(tree.root())[0];
    assert!(tree.is_top_level(decl));
    let let_expr = tree.children_of_kind(decl, NodeKind::LetInExpr)[0];
    assert!(!tree.is_top_level(let_expr));
}
