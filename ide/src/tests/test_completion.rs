use std::collections::HashSet;

use crate::completion::{
    CompletionItem, CompletionKind, Constructor, Exposing, ImportDecl, ModuleInfo,
    ProjectContext, complete,
};
use crate::tests::dsl::{at_cursor, trim_indent};

fn module(name: &str) -> ModuleInfo {
    ModuleInfo {
        name: name.to_string(),
        ..ModuleInfo::default()
    }
}

fn json_project() -> ProjectContext {
    ProjectContext {
        modules: vec![
            module("Json.Decode"),
            module("Json.Encode"),
            module("Html"),
        ],
        ..ProjectContext::default()
    }
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn label_set(items: &[CompletionItem]) -> HashSet<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn complete_at(text_with_marker: &str, ctx: &ProjectContext) -> Vec<CompletionItem> {
    let (source, cursor) = at_cursor(text_with_marker);
    complete(&source, cursor, ctx)
}

#[test]
fn partial_first_segment_suggests_the_module_root() {
    let items = complete_at("Jso$0", &json_project());
    assert_eq!(label_set(&items), HashSet::from(["Json"]));
    assert!(items.iter().all(|i| i.kind == CompletionKind::Module));
}

#[test]
fn qualifier_with_dot_suggests_the_next_segments() {
    let items = complete_at("Json.$0", &json_project());
    assert_eq!(labels(&items), vec!["Decode", "Encode"]);
}

#[test]
fn duplicate_segments_are_not_deduplicated() {
    // Both Json.* modules contribute a `Json` segment; the host ranks/merges.
    let items = complete_at("Js$0", &json_project());
    assert_eq!(labels(&items), vec!["Json", "Json"]);
}

#[test]
fn unresolvable_qualifier_suggests_nothing() {
    let items = complete_at("Xml.$0", &json_project());
    assert!(items.is_empty());
}

#[test]
fn empty_qualifier_also_offers_import_aliases() {
    let mut ctx = json_project();
    ctx.imports.push(ImportDecl {
        module: "Json.Decode".to_string(),
        alias: Some("D".to_string()),
        exposing: Exposing::Nothing,
    });

    let items = complete_at("x = D$0", &ctx);
    assert!(
        items
            .iter()
            .any(|i| i.label == "D" && i.kind == CompletionKind::Alias)
    );
}

#[test]
fn aliased_qualifier_resolves_to_the_imported_module() {
    let mut ctx = json_project();
    ctx.modules[0].values = vec!["decodeString".to_string(), "map".to_string()];
    ctx.imports.push(ImportDecl {
        module: "Json.Decode".to_string(),
        alias: Some("D".to_string()),
        exposing: Exposing::Nothing,
    });

    let items = complete_at("x = D.ma$0", &ctx);
    assert_eq!(labels(&items), vec!["map"]);
    assert_eq!(items[0].kind, CompletionKind::Value);
    assert_eq!(items[0].detail.as_deref(), Some("Json.Decode"));
}

#[test]
fn unimported_project_module_still_resolves_by_full_name() {
    let mut ctx = json_project();
    ctx.modules[1].values = vec!["encode".to_string()];

    // No import of Json.Encode anywhere; the project index alone resolves it.
    let items = complete_at("x = Json.Encode.enc$0", &ctx);
    assert_eq!(labels(&items), vec!["encode"]);
}

#[test]
fn value_position_unions_locals_constructors_and_builtins() {
    let mut ctx = json_project();
    ctx.local_constructors.push(Constructor {
        name: "Thing".to_string(),
        union_variant: true,
    });

    let source = trim_indent(
        r#"
        top flag =
            let
                throttle = 1
            in
                t$0"#,
    );
    let items = complete_at(&source, &ctx);
    let found = label_set(&items);

    assert!(found.contains("throttle"), "let binding missing: {found:?}");
    assert!(found.contains("top"), "top-level declaration missing");
    // `Thing`, `True` etc. don't extend the typed prefix `t`.
    assert!(!found.contains("Thing"));
    assert!(!found.contains("True"));
}

#[test]
fn builtin_values_complete_in_value_position() {
    let items = complete_at("x = Tr$0", &json_project());
    assert!(labels(&items).contains(&"True"));
}

#[test]
fn pattern_position_offers_union_variants_only() {
    let mut ctx = json_project();
    ctx.local_constructors.push(Constructor {
        name: "JumpTo".to_string(),
        union_variant: true,
    });
    ctx.local_constructors.push(Constructor {
        name: "Job".to_string(),
        union_variant: false,
    });

    let items = complete_at("case msg of\n    J$0", &ctx);
    let found = label_set(&items);
    assert!(found.contains("JumpTo"));
    assert!(!found.contains("Job"), "record constructor in pattern");
}

#[test]
fn qualified_pattern_position_filters_exposed_constructors() {
    let mut ctx = json_project();
    ctx.modules.push(ModuleInfo {
        name: "Status".to_string(),
        values: vec!["fromCode".to_string()],
        types: vec!["Status".to_string()],
        constructors: vec![
            Constructor {
                name: "Loading".to_string(),
                union_variant: true,
            },
            Constructor {
                name: "Loaded".to_string(),
                union_variant: false,
            },
        ],
    });

    let items = complete_at("case s of\n    Status.L$0", &ctx);
    assert_eq!(labels(&items), vec!["Loading"]);
}

#[test]
fn type_position_offers_visible_and_builtin_types() {
    let mut ctx = json_project();
    ctx.local_types.push("Model".to_string());

    let items = complete_at("view : M$0", &ctx);
    let found = label_set(&items);
    assert!(found.contains("Model"));
    assert!(!found.contains("Int"), "builtin not extending the prefix");

    let builtin = complete_at("view : In$0", &ctx);
    assert!(label_set(&builtin).contains("Int"));
}

#[test]
fn exposing_import_makes_constructors_visible_unqualified() {
    let mut ctx = json_project();
    ctx.modules.push(ModuleInfo {
        name: "Maybe".to_string(),
        values: Vec::new(),
        types: vec!["Maybe".to_string()],
        constructors: vec![
            Constructor {
                name: "Just".to_string(),
                union_variant: true,
            },
            Constructor {
                name: "Nothing".to_string(),
                union_variant: true,
            },
        ],
    });
    ctx.imports.push(ImportDecl {
        module: "Maybe".to_string(),
        alias: None,
        exposing: Exposing::All,
    });

    let items = complete_at("x = Ju$0", &ctx);
    assert!(
        items
            .iter()
            .any(|i| i.label == "Just" && i.kind == CompletionKind::Constructor)
    );
}

#[test]
fn numeric_adjacency_suppresses_all_suggestions() {
    // `1.` reads as a dotted path start; suggesting modules there is noise.
    let items = complete_at("x = 1.J$0", &json_project());
    assert!(items.is_empty());

    // With whitespace in between, it is an ordinary value position again.
    let spaced = complete_at("x = 1 + Js$0", &json_project());
    assert!(!spaced.is_empty());
}

#[test]
fn cursor_outside_any_identifier_suggests_nothing() {
    let items = complete_at("x = $0", &json_project());
    assert!(items.is_empty());
}
