//! Name resolution across files: determinism, shadowing, ambiguity and
//! incremental re-resolution.

use std::sync::Arc;

use elm_analysis::binder::{Origin, ResolvedFile};
use elm_analysis::{CancellationToken, Workspace};
use elm_diagnostic::{DiagnosticData, ErrorCode};
use elm_ir::{FileUri, Namespace, Position};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const HELPERS: &str = "module Helpers exposing (one, two, Shape(..))\n\none = 1\n\ntwo = 2\n\ntype Shape = Circle | Square\n";
const OTHER: &str = "module Other exposing (one, three)\n\none = 1.5\n\nthree = 3\n";

fn uri(module: &str) -> FileUri {
    FileUri::new(format!("file:///{module}.elm"))
}

fn resolved(ws: &Workspace, module: &str) -> Arc<ResolvedFile> {
    ws.resolved(&uri(module))
        .unwrap_or_else(|| panic!("{module} not resolved"))
}

fn origin_module(file: &ResolvedFile, namespace: Namespace, name: &str) -> Option<String> {
    file.scope
        .lookup(namespace, name)
        .map(|entry| entry.definition.module.clone())
}

#[test]
fn imported_names_point_at_their_module() {
    let app = "module App exposing (foo)\n\nfoo = 1\n";
    let test = "module Test exposing (bar)\n\nimport App exposing (foo)\n\nbar = foo\n";
    let ws = Workspace::new();
    ws.update(&uri("App"), app);
    ws.update(&uri("Test"), test);
    let file = resolved(&ws, "Test");
    assert_eq!(origin_module(&file, Namespace::Value, "foo"), Some("App".to_string()));
    assert_eq!(file.diagnostics, vec![]);
}

#[test]
fn renaming_across_files_leaves_unrelated_caches_alone() {
    let app = "module App exposing (foo)\n\nfoo = 1\n";
    let test = "module Test exposing (bar)\n\nimport App exposing (foo)\n\nbar = foo\n";
    let unrelated = "module Unrelated exposing (z)\n\nz = 0\n";
    let ws = Workspace::new();
    ws.update(&uri("App"), app);
    ws.update(&uri("Test"), test);
    ws.update(&uri("Unrelated"), unrelated);

    let unrelated_before = resolved(&ws, "Unrelated");
    let unrelated_revision = ws.revision(&uri("Unrelated"));
    assert_eq!(
        origin_module(&resolved(&ws, "Test"), Namespace::Value, "foo"),
        Some("App".to_string())
    );

    let edit = ws
        .rename(&uri("App"), Position::new(2, 0), "renamed", &CancellationToken::new())
        .unwrap_or_else(|err| panic!("rename failed: {err}"));
    let mut touched: Vec<&FileUri> = edit.files().collect();
    touched.sort();
    assert_eq!(touched, vec![&uri("App"), &uri("Test")]);
    for target in edit.files() {
        let file = ws.file(target).unwrap_or_else(|| panic!("no {target}"));
        ws.update(target, &edit.apply_to(target, &file.text));
    }

    let test_after = resolved(&ws, "Test");
    assert_eq!(origin_module(&test_after, Namespace::Value, "renamed"), Some("App".to_string()));
    assert_eq!(origin_module(&test_after, Namespace::Value, "foo"), None);
    assert_eq!(test_after.diagnostics, vec![]);

    assert_eq!(ws.revision(&uri("Unrelated")), unrelated_revision);
    assert!(Arc::ptr_eq(&unrelated_before, &resolved(&ws, "Unrelated")));
}

#[test]
fn local_declarations_shadow_imports() {
    let main = "module Main exposing (one)\n\nimport Helpers exposing (..)\n\none = 10\n\nx = two\n";
    let ws = Workspace::new();
    ws.update(&uri("Helpers"), HELPERS);
    ws.update(&uri("Main"), main);
    let file = resolved(&ws, "Main");
    let entry = file.scope.lookup(Namespace::Value, "one");
    assert_eq!(entry.map(|e| e.origin.clone()), Some(Origin::Local));
    assert_eq!(origin_module(&file, Namespace::Value, "two"), Some("Helpers".to_string()));
}

#[test]
fn explicit_imports_shadow_default_ones() {
    let maybe = "module MyMaybe exposing (Maybe(..))\n\ntype Maybe a = Just a | Nothing\n";
    let main = "module Main exposing (x)\n\nimport MyMaybe exposing (Maybe(..))\n\nx = Just 1\n";
    let ws = Workspace::new();
    ws.update(&uri("MyMaybe"), maybe);
    ws.update(&uri("Main"), main);
    let file = resolved(&ws, "Main");
    assert_eq!(
        origin_module(&file, Namespace::Constructor, "Just"),
        Some("MyMaybe".to_string())
    );
    assert_eq!(file.diagnostics, vec![]);
}

#[test]
fn first_import_wins_an_ambiguity() {
    let main = "module Main exposing (x)\n\nimport Other exposing (one)\nimport Helpers exposing (one)\n\nx = one\n";
    let ws = Workspace::new();
    ws.update(&uri("Helpers"), HELPERS);
    ws.update(&uri("Other"), OTHER);
    ws.update(&uri("Main"), main);
    let file = resolved(&ws, "Main");
    assert_eq!(origin_module(&file, Namespace::Value, "one"), Some("Other".to_string()));

    let ambiguous: Vec<_> = file
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::E2003)
        .collect();
    assert_eq!(ambiguous.len(), 1);
    assert!(matches!(
        &ambiguous[0].data,
        DiagnosticData::AmbiguousName { candidates, .. }
            if candidates == &vec!["Other".to_string(), "Helpers".to_string()]
    ));
    // The use is typed from the winner.
    assert_eq!(
        ws.decl_type(&uri("Main"), "x").map(|t| t.to_string()),
        Some("Float".to_string())
    );
}

#[test]
fn aliases_replace_the_module_name() {
    let main = "module Main exposing (x, y)\n\nimport Helpers as H\n\nx = H.one\n\ny = Helpers.two\n";
    let ws = Workspace::new();
    ws.update(&uri("Helpers"), HELPERS);
    ws.update(&uri("Main"), main);
    let file = resolved(&ws, "Main");
    let unknown: Vec<_> = file
        .diagnostics
        .iter()
        .filter_map(|d| match &d.data {
            DiagnosticData::UnknownName { name, qualifier, .. } => {
                Some((qualifier.clone(), name.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(unknown, vec![(Some("Helpers".to_string()), "two".to_string())]);
}

#[test]
fn a_new_module_resolves_a_previously_missing_import() {
    let main = "module Main exposing (x)\n\nimport Later\n\nx = Later.value\n";
    let ws = Workspace::new();
    ws.update(&uri("Main"), main);
    let codes: Vec<ErrorCode> = resolved(&ws, "Main").diagnostics.iter().map(|d| d.code).collect();
    assert!(codes.contains(&ErrorCode::E2001), "{codes:?}");

    ws.update(&uri("Later"), "module Later exposing (value)\n\nvalue = 1\n");
    assert_eq!(resolved(&ws, "Main").diagnostics, vec![]);
}

fn arb_main() -> impl Strategy<Value = String> {
    let imports = prop::sample::subsequence(
        vec![
            "import Helpers",
            "import Helpers exposing (one)",
            "import Other as O exposing (three)",
            "import Helpers as H exposing (Shape(..))",
        ],
        0..=2,
    );
    let uses = prop::collection::vec(
        prop::sample::select(vec![
            "one",
            "three",
            "Helpers.two",
            "O.one",
            "H.Circle",
            "Square",
            "List.map",
            "Just 1",
            "local",
        ]),
        1..6,
    );
    (imports, uses).prop_map(|(imports, uses)| {
        let mut source = String::from("module Main exposing (..)\n\n");
        for import in imports {
            source.push_str(import);
            source.push('\n');
        }
        source.push_str("\nlocal = 0\n");
        for (i, body) in uses.iter().enumerate() {
            source.push_str(&format!("\nv{i} = {body}\n"));
        }
        source
    })
}

fn fresh_workspace(main: &str) -> Workspace {
    let ws = Workspace::new();
    ws.update(&uri("Helpers"), HELPERS);
    ws.update(&uri("Other"), OTHER);
    ws.update(&uri("Main"), main);
    ws
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn resolution_is_idempotent(main in arb_main()) {
        let ws = fresh_workspace(&main);
        let first = resolved(&ws, "Main");

        // Same text, new revision: recomputed from scratch.
        ws.update(&uri("Main"), &main);
        let second = resolved(&ws, "Main");
        prop_assert!(!Arc::ptr_eq(&first, &second));

        let other = fresh_workspace(&main);
        let third = resolved(&other, "Main");

        for again in [&second, &third] {
            prop_assert_eq!(&first.scope, &again.scope);
            prop_assert_eq!(&first.references, &again.references);
            prop_assert_eq!(&first.diagnostics, &again.diagnostics);
        }
    }
}
