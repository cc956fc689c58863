use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::FileUri;
use pretty_assertions::assert_eq;

use crate::Workspace;

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

fn main_with(body: &str) -> Workspace {
    workspace(&[&format!("module Main exposing (..)\n\n{body}")])
}

fn type_of(ws: &Workspace, name: &str) -> String {
    ws.decl_type(&uri("Main"), name)
        .unwrap_or_else(|| panic!("no type for {name}"))
        .to_string()
}

fn errors(ws: &Workspace) -> Vec<Diagnostic> {
    ws.semantic_diagnostics(&uri("Main"))
}

fn codes(ws: &Workspace) -> Vec<ErrorCode> {
    errors(ws).iter().map(|d| d.code).collect()
}

#[test]
fn literals() {
    let ws = main_with("i = 1\n\nf = 1.5\n\ns = \"hi\"\n\nc = 'x'\n\nu = ()\n");
    assert_eq!(type_of(&ws, "i"), "number");
    assert_eq!(type_of(&ws, "f"), "Float");
    assert_eq!(type_of(&ws, "s"), "String");
    assert_eq!(type_of(&ws, "c"), "Char");
    assert_eq!(type_of(&ws, "u"), "()");
    assert_eq!(codes(&ws), vec![]);
}

#[test]
fn operators_keep_number_constraints() {
    let ws = main_with("add a b = a + b\n\nhalf x = x / 2\n");
    assert_eq!(type_of(&ws, "add"), "number -> number -> number");
    assert_eq!(type_of(&ws, "half"), "Float -> Float");
}

#[test]
fn let_bindings_are_generalized() {
    let ws = main_with("pair =\n    let\n        id x = x\n    in\n    ( id 1.5, id \"s\" )\n");
    assert_eq!(type_of(&ws, "pair"), "( Float, String )");
    assert_eq!(codes(&ws), vec![]);
}

#[test]
fn field_access_opens_the_record() {
    let ws = main_with("getName r = r.name\n\nalice = getName { name = \"Alice\", age = 3 }\n");
    assert_eq!(type_of(&ws, "getName"), "{ b | name : a } -> a");
    assert_eq!(type_of(&ws, "alice"), "String");
    assert_eq!(codes(&ws), vec![]);
}

#[test]
fn missing_field_is_reported() {
    let ws = main_with("p = { x = 1.5 }\n\ny = p.z\n");
    let diagnostics = errors(&ws);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:#?}");
    assert_eq!(diagnostics[0].code, ErrorCode::E3004);
    assert!(matches!(
        &diagnostics[0].data,
        DiagnosticData::RecordFieldMissing { field, .. } if field == "z"
    ));
}

#[test]
fn record_update_needs_an_existing_field() {
    let ok = main_with("p = { x = 1.5 }\n\nq = { p | x = 2.0 }\n");
    assert_eq!(codes(&ok), vec![]);
    assert_eq!(type_of(&ok, "q"), "{ x : Float }");

    let bad = main_with("p = { x = 1.5 }\n\nq = { p | y = 2.0 }\n");
    assert_eq!(codes(&bad), vec![ErrorCode::E3004]);
}

#[test]
fn annotation_mismatch() {
    let ws = main_with("x : Int\nx = \"s\"\n");
    let diagnostics = errors(&ws);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:#?}");
    assert_eq!(
        diagnostics[0].data,
        DiagnosticData::TypeMismatch {
            expected: "Int".to_string(),
            found: "String".to_string(),
        }
    );
    // The annotation stays the declared type.
    assert_eq!(type_of(&ws, "x"), "Int");
}

#[test]
fn rigid_variables_do_not_unify_with_concrete_types() {
    let ws = main_with("f : a -> a\nf x = 1.5\n");
    assert_eq!(codes(&ws), vec![ErrorCode::E3001]);
}

#[test]
fn self_application_is_an_infinite_type() {
    let ws = main_with("f x = x x\n");
    assert_eq!(codes(&ws), vec![ErrorCode::E3002]);
}

#[test]
fn recursive_functions() {
    let ws = main_with(
        "len xs =\n    case xs of\n        [] ->\n            0\n\n        _ :: rest ->\n            1 + len rest\n",
    );
    assert_eq!(type_of(&ws, "len"), "List a -> number");
    assert_eq!(codes(&ws), vec![]);
}

#[test]
fn mutual_recursion_completes() {
    let ws = main_with(
        "isEven n =\n    if n == 0 then\n        True\n\n    else\n        isOdd (n - 1)\n\n\
         isOdd n =\n    if n == 0 then\n        False\n\n    else\n        isEven (n - 1)\n",
    );
    assert_eq!(codes(&ws), vec![]);
    assert!(type_of(&ws, "isEven").ends_with("-> Bool"));
    assert!(type_of(&ws, "isOdd").ends_with("-> Bool"));
}

#[test]
fn missing_case_branches_are_named() {
    let ws = main_with("f m =\n    case m of\n        Just x ->\n            x\n");
    let diagnostics = errors(&ws);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:#?}");
    assert_eq!(
        diagnostics[0].data,
        DiagnosticData::MissingCaseBranches {
            missing: vec!["Nothing".to_string()]
        }
    );
}

#[test]
fn wildcard_covers_everything() {
    let ws = main_with("f n =\n    case n of\n        1 ->\n            \"one\"\n\n        _ ->\n            \"many\"\n");
    assert_eq!(codes(&ws), vec![]);
    assert_eq!(type_of(&ws, "f"), "number -> String");
}

#[test]
fn types_flow_across_modules() {
    let helpers = "module Helpers exposing (scale)\n\nscale : Float -> Float\nscale x = x * 2\n";
    let main = "module Main exposing (..)\n\nimport Helpers\n\ny = Helpers.scale 3\n";
    let ws = workspace(&[helpers, main]);
    assert_eq!(type_of(&ws, "y"), "Float");
    assert_eq!(codes(&ws), vec![]);
}

#[test]
fn unresolved_names_do_not_cascade() {
    let ws = main_with("x = missing + 1\n");
    assert_eq!(codes(&ws), vec![ErrorCode::E2004]);
}

#[test]
fn expression_types_are_recorded() {
    let source = "module Main exposing (..)\n\nx = String.length \"abc\"\n";
    let ws = workspace(&[source]);
    let inferred = ws.inferred(&uri("Main"), "x").unwrap_or_else(|| panic!("not inferred"));
    let start = u32::try_from(source.find("\"abc\"").unwrap_or(0)).unwrap_or(0);
    let literal = elm_ir::Span::new(start, start + 5);
    assert_eq!(
        inferred.expr_types.get(&literal).map(ToString::to_string),
        Some("String".to_string())
    );
    assert_eq!(inferred.ty.to_string(), "Int");
    assert!(!inferred.annotated);
}
