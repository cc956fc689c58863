use elm_diagnostic::{
    CodeAction, CodeActionKind, Diagnostic, DiagnosticData, ErrorCode, FixId, LintFix,
};
use elm_ir::{FileUri, Span};
use pretty_assertions::assert_eq;

use super::FixRegistry;
use crate::{CancellationToken, Workspace};

const HELPERS: &str = "\
module Helpers exposing (one, two)

one = 1

two = 2

three = 3
";

fn uri(module: &str) -> FileUri {
    FileUri::new(format!("file:///{module}.elm"))
}

fn workspace(files: &[&str]) -> Workspace {
    let ws = Workspace::new();
    for source in files {
        let module = elm_parse::parse(source).module_name().to_string();
        ws.update(&uri(&module), source);
    }
    ws
}

fn offset(source: &str, needle: &str) -> u32 {
    u32::try_from(source.find(needle).unwrap_or_else(|| panic!("{needle} not in source")))
        .unwrap_or(0)
}

fn span_of(source: &str, needle: &str) -> Span {
    let start = offset(source, needle);
    Span::new(start, start + u32::try_from(needle.len()).unwrap_or(0))
}

fn actions(ws: &Workspace, module: &str, range: Span, fix: FixId) -> Vec<CodeAction> {
    let uri = uri(module);
    let diagnostics = ws.diagnose(&uri);
    ws.code_actions_for(&uri, range, &diagnostics)
        .into_iter()
        .filter(|a| a.fix_id == Some(fix))
        .collect()
}

fn only(mut actions: Vec<CodeAction>) -> CodeAction {
    assert_eq!(actions.len(), 1, "{actions:#?}");
    actions.remove(0)
}

fn apply(ws: &Workspace, action: &CodeAction, module: &str) -> String {
    let uri = uri(module);
    let file = ws.file(&uri).unwrap_or_else(|| panic!("no file {uri}"));
    action.edit.apply_to(&uri, &file.text)
}

#[test]
fn every_fix_has_a_provider() {
    let registry = FixRegistry::with_defaults();
    for &id in FixId::ALL {
        let provider = registry.provider(id).unwrap_or_else(|| panic!("no provider for {id}"));
        assert_eq!(provider.id(), id);
    }
    for &code in ErrorCode::ALL {
        let ids: Vec<FixId> = registry.for_code(code).map(|p| p.id()).collect();
        assert_eq!(ids, code.fix_ids().to_vec());
    }
    let refactors: Vec<FixId> = registry.refactors().map(|p| p.id()).collect();
    assert_eq!(
        refactors,
        vec![
            FixId::ExposeName,
            FixId::ExtractFunction,
            FixId::ExtractLocalFunction,
            FixId::ExtractTypeAlias,
        ]
    );
}

#[test]
fn expose_appends_to_the_exposing_list() {
    let source = "module Test exposing (hello)\n\nhello = 1\n\nworld = 2\n";
    let ws = workspace(&[source]);
    let action = only(actions(
        &ws,
        "Test",
        Span::point(offset(source, "world =")),
        FixId::ExposeName,
    ));
    assert_eq!(action.title, "Expose `world`");
    assert_eq!(
        apply(&ws, &action, "Test"),
        "module Test exposing (hello, world)\n\nhello = 1\n\nworld = 2\n"
    );
}

#[test]
fn expose_removes_an_exposed_name() {
    let source = "module Test exposing (hello, world)\n\nhello = 1\n\nworld = 2\n";
    let ws = workspace(&[source]);
    let action = only(actions(
        &ws,
        "Test",
        Span::point(offset(source, "hello =")),
        FixId::ExposeName,
    ));
    assert_eq!(action.title, "Stop exposing `hello`");
    assert_eq!(
        apply(&ws, &action, "Test"),
        "module Test exposing (world)\n\nhello = 1\n\nworld = 2\n"
    );
}

#[test]
fn expose_is_not_offered_for_exposing_all_or_the_last_item() {
    let all = "module Test exposing (..)\n\nhello = 1\n";
    let ws = workspace(&[all]);
    assert!(actions(&ws, "Test", Span::point(offset(all, "hello =")), FixId::ExposeName).is_empty());

    let single = "module Test exposing (hello)\n\nhello = 1\n";
    let ws = workspace(&[single]);
    assert!(
        actions(&ws, "Test", Span::point(offset(single, "hello =")), FixId::ExposeName).is_empty()
    );
}

#[test]
fn expose_from_module_edits_the_other_file() {
    let main = "module Main exposing (x)\n\nimport Helpers exposing (three)\n\nx = three\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "three)"), FixId::ExposeFromModule));
    assert_eq!(action.edit.edits_for(&uri("Main")), &[]);
    let helpers = apply(&ws, &action, "Helpers");
    assert!(
        helpers.starts_with("module Helpers exposing (one, two, three)\n"),
        "{helpers}"
    );
}

#[test]
fn missing_case_branch_is_appended() {
    let source = "\
module Main exposing (toText)

type Color = Red | Green

toText : Color -> String
toText color =
    case color of
        Red ->
            \"red\"
";
    let ws = workspace(&[source]);
    let diagnostics = ws.semantic_diagnostics(&uri("Main"));
    let missing: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.code == ErrorCode::E3003).collect();
    assert_eq!(missing.len(), 1, "{diagnostics:#?}");
    assert_eq!(
        missing[0].data,
        DiagnosticData::MissingCaseBranches {
            missing: vec!["Green".to_string()]
        }
    );

    let action = only(actions(&ws, "Main", missing[0].span, FixId::AddMissingCaseBranches));
    assert_eq!(action.edit.edits_for(&uri("Main")).len(), 1);
    assert_eq!(
        apply(&ws, &action, "Main"),
        "\
module Main exposing (toText)

type Color = Red | Green

toText : Color -> String
toText color =
    case color of
        Red ->
            \"red\"

        Green ->
            Debug.todo \"branch 'Green' not implemented\"
"
    );
}

#[test]
fn missing_branches_use_the_qualifier_the_file_imports_with() {
    let color = "module Color exposing (Color(..))\n\ntype Color = Red | Green\n";
    let source = "\
module Main exposing (toText)

import Color

toText : Color.Color -> String
toText color =
    case color of
        Color.Red ->
            \"red\"
";
    let ws = workspace(&[color, source]);
    let diagnostics = ws.semantic_diagnostics(&uri("Main"));
    let missing: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.code == ErrorCode::E3003).collect();
    assert_eq!(missing.len(), 1, "{diagnostics:#?}");
    assert_eq!(
        missing[0].data,
        DiagnosticData::MissingCaseBranches {
            missing: vec!["Color.Green".to_string()]
        }
    );

    let action = only(actions(&ws, "Main", missing[0].span, FixId::AddMissingCaseBranches));
    let fixed = apply(&ws, &action, "Main");
    assert!(fixed.contains("\n        Color.Green ->\n"), "{fixed}");
    ws.update(&uri("Main"), &fixed);
    assert_eq!(ws.semantic_diagnostics(&uri("Main")), vec![]);

    let aliased = source
        .replace("Color.", "C.")
        .replace("import Color\n", "import Color as C\n");
    ws.update(&uri("Main"), &aliased);
    let payloads: Vec<DiagnosticData> = ws
        .semantic_diagnostics(&uri("Main"))
        .into_iter()
        .map(|d| d.data)
        .collect();
    assert_eq!(
        payloads,
        vec![DiagnosticData::MissingCaseBranches {
            missing: vec!["C.Green".to_string()]
        }]
    );
}

#[test]
fn missing_variant_is_added_with_inferred_payload() {
    let source = "\
module Main exposing (shape)

type Shape = Circle Float

shape : Shape
shape =
    Square 2.0
";
    let ws = workspace(&[source]);
    let action = only(actions(&ws, "Main", span_of(source, "Square"), FixId::AddMissingVariant));
    assert_eq!(action.title, "Add `Square Float` to `Shape`");
    assert!(apply(&ws, &action, "Main").contains("type Shape = Circle Float\n    | Square Float\n"));
}

#[test]
fn add_import_for_an_unqualified_name() {
    let main = "module Main exposing (x)\n\nx = one\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "one"), FixId::AddImport));
    assert_eq!(action.title, "Import `one` from `Helpers`");
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers exposing (one)\n\nx = one\n"
    );
}

#[test]
fn add_import_for_a_qualified_name() {
    let main = "module Main exposing (x)\n\nx = Helpers.one\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "Helpers.one"), FixId::AddImport));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers\n\nx = Helpers.one\n"
    );
}

#[test]
fn add_import_extends_an_existing_exposing_list() {
    let main = "module Main exposing (x)\n\nimport Helpers exposing (two)\n\nx = one + two\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "one"), FixId::AddImport));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers exposing (two, one)\n\nx = one + two\n"
    );
}

#[test]
fn add_import_opens_an_opaque_type_already_imported() {
    let palette = "module Palette exposing (Color(..), dark)\n\ntype Color = Red | Green\n\ndark = Red\n";
    let ws = workspace(&[palette]);
    let cases = [
        (
            "import Palette exposing (Color, dark)",
            "import Palette exposing (Color(..), dark)",
        ),
        (
            "import Palette exposing (dark, Color)",
            "import Palette exposing (dark, Color(..))",
        ),
    ];
    for (import, expected) in cases {
        let main = format!("module Main exposing (x, y)\n\n{import}\n\nx = Red\n\ny = dark\n");
        ws.update(&uri("Main"), &main);
        let action = only(actions(&ws, "Main", span_of(&main, "Red"), FixId::AddImport));
        let fixed = apply(&ws, &action, "Main");
        assert_eq!(fixed, main.replace(import, expected));
        ws.update(&uri("Main"), &fixed);
        assert_eq!(ws.semantic_diagnostics(&uri("Main")), vec![]);
    }
}

#[test]
fn add_all_missing_imports_groups_by_module() {
    let main = "module Main exposing (x)\n\nx = one + two\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "one"), FixId::AddAllMissingImports));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers exposing (one, two)\n\nx = one + two\n"
    );
}

#[test]
fn unused_import_line_is_deleted() {
    let main = "module Main exposing (x)\n\nimport Helpers\n\nx = 1\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(
        &ws,
        "Main",
        span_of(main, "import Helpers"),
        FixId::RemoveUnusedImport,
    ));
    assert_eq!(apply(&ws, &action, "Main"), "module Main exposing (x)\n\n\nx = 1\n");
}

#[test]
fn unused_imported_name_is_removed_with_its_comma() {
    let main = "module Main exposing (x)\n\nimport Helpers exposing (one, two)\n\nx = one\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "two"), FixId::RemoveUnusedImportedName));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers exposing (one)\n\nx = one\n"
    );
}

#[test]
fn removing_the_last_imported_name_drops_the_clause() {
    let main = "module Main exposing (x)\n\nimport Helpers exposing (two)\n\nx = Helpers.one\n";
    let ws = workspace(&[HELPERS, main]);
    let action = only(actions(&ws, "Main", span_of(main, "two"), FixId::RemoveUnusedImportedName));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nimport Helpers\n\nx = Helpers.one\n"
    );
}

#[test]
fn missing_annotation_is_inserted() {
    let main = "module Main exposing (x)\n\nx = String.length \"abc\"\n";
    let ws = workspace(&[main]);
    let action = only(actions(&ws, "Main", span_of(main, "x ="), FixId::AddTypeAnnotation));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "module Main exposing (x)\n\nx : Int\nx = String.length \"abc\"\n"
    );
}

#[test]
fn external_fixes_are_relayed() {
    let main = "module Main exposing (x)\n\nx = Debug.log \"x\" 1\n";
    let ws = workspace(&[main]);
    let span = span_of(main, "Debug.log \"x\" 1");
    ws.set_external_diagnostics(
        &uri("Main"),
        vec![Diagnostic::warning(ErrorCode::L0001)
            .with_label(span, "remove Debug.log")
            .with_data(DiagnosticData::ExternalLint {
                rule: "NoDebug.Log".to_string(),
                fixes: vec![LintFix {
                    span,
                    replacement: "1".to_string(),
                }],
            })],
    );
    let action = only(actions(&ws, "Main", span, FixId::ApplyExternalFix));
    assert_eq!(apply(&ws, &action, "Main"), "module Main exposing (x)\n\nx = 1\n");

    // A new revision drops them.
    ws.update(&uri("Main"), main);
    assert!(actions(&ws, "Main", span, FixId::ApplyExternalFix).is_empty());
}

#[test]
fn extract_function_infers_the_signature() {
    let source = "\
module Main exposing (area)

area : Float -> Float
area r =
    3.14 * r * r
";
    let ws = workspace(&[source]);
    let action = only(actions(&ws, "Main", span_of(source, "3.14 * r * r"), FixId::ExtractFunction));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "\
module Main exposing (area)

area : Float -> Float
area r =
    newFunction r


newFunction : Float -> Float
newFunction r =
    3.14 * r * r
"
    );
}

#[test]
fn extract_local_function_keeps_parameters_in_scope() {
    let source = "\
module Main exposing (area)

area : Float -> Float
area r =
    3.14 * r * r
";
    let ws = workspace(&[source]);
    let action = only(actions(
        &ws,
        "Main",
        span_of(source, "3.14 * r * r"),
        FixId::ExtractLocalFunction,
    ));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "\
module Main exposing (area)

area : Float -> Float
area r =
    let
        newFunction : Float
        newFunction =
            3.14 * r * r
    in
    newFunction
"
    );
}

#[test]
fn extract_type_alias_names_a_record_type() {
    let source = "\
module Main exposing (origin)

origin : { x : Float, y : Float }
origin =
    { x = 0, y = 0 }
";
    let ws = workspace(&[source]);
    let action = only(actions(
        &ws,
        "Main",
        span_of(source, "{ x : Float, y : Float }"),
        FixId::ExtractTypeAlias,
    ));
    assert_eq!(
        apply(&ws, &action, "Main"),
        "\
module Main exposing (origin)

type alias NewType =
    { x : Float, y : Float }


origin : NewType
origin =
    { x = 0, y = 0 }
"
    );
}

#[test]
fn fix_all_merges_every_unused_import() {
    let other = "module Other exposing (z)\n\nz = 0\n";
    let main = "module Main exposing (x)\n\nimport Helpers\nimport Other\n\nx = 1\n";
    let ws = workspace(&[HELPERS, other, main]);
    let action = ws
        .fix_all(&uri("Main"), FixId::RemoveUnusedImport)
        .unwrap_or_else(|| panic!("no fix-all action"));
    assert_eq!(action.kind, CodeActionKind::SourceFixAll);
    assert_eq!(action.diagnostics, vec![ErrorCode::W1001]);
    assert_eq!(apply(&ws, &action, "Main"), "module Main exposing (x)\n\n\nx = 1\n");
}

#[test]
fn fix_all_in_workspace_covers_every_file() {
    let other = "module Other exposing (z)\n\nz = 0\n";
    let main = "module Main exposing (x)\n\nimport Helpers\nimport Other\n\nx = 1\n";
    let test = "module Test exposing (t)\n\nimport Helpers\n\nt = 2\n";
    let ws = workspace(&[HELPERS, other, main, test]);

    let action = ws
        .fix_all_in_workspace(FixId::RemoveUnusedImport, &CancellationToken::new())
        .unwrap_or_else(|err| panic!("{err}"))
        .unwrap_or_else(|| panic!("no fix-all action"));
    let mut files: Vec<&FileUri> = action.edit.files().collect();
    files.sort();
    assert_eq!(files, vec![&uri("Main"), &uri("Test")]);
    assert_eq!(apply(&ws, &action, "Main"), "module Main exposing (x)\n\n\nx = 1\n");
    assert_eq!(apply(&ws, &action, "Test"), "module Test exposing (t)\n\n\nt = 2\n");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let cancelled = ws.fix_all_in_workspace(FixId::RemoveUnusedImport, &cancel);
    assert!(cancelled.is_err_and(|err| err.is_cancelled()));
}

#[test]
fn library_files_have_no_actions() {
    let ws = Workspace::new();
    let basics = crate::prelude::uri_for("Basics");
    assert!(ws.code_actions_for(&basics, Span::point(0), &[]).is_empty());
}
