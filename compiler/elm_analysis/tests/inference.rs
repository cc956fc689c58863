//! Inference through the workspace: annotations, records, operators and
//! the extract-function round trip.

use elm_analysis::Workspace;
use elm_diagnostic::{ErrorCode, FixId};
use elm_ir::{FileUri, Span};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn uri(module: &str) -> FileUri {
    FileUri::new(format!("file:///{module}.elm"))
}

fn main_workspace(source: &str) -> Workspace {
    let ws = Workspace::new();
    ws.update(&uri("Main"), source);
    ws
}

fn semantic_codes(ws: &Workspace) -> Vec<ErrorCode> {
    ws.semantic_diagnostics(&uri("Main"))
        .iter()
        .map(|d| d.code)
        .collect()
}

fn span_of(source: &str, needle: &str) -> Span {
    let start = source.find(needle).unwrap_or_else(|| panic!("{needle} not in source"));
    let start = u32::try_from(start).unwrap_or(0);
    Span::new(start, start + u32::try_from(needle.len()).unwrap_or(0))
}

/// Bodies with the annotations they agree with.
const BODIES: &[(&str, &[&str])] = &[
    ("1", &["Int", "Float"]),
    ("1.5", &["Float"]),
    ("\"s\"", &["String"]),
    ("[ 1, 2 ]", &["List Int"]),
    ("Just 3", &["Maybe Int"]),
    ("\\x -> x", &["a -> a"]),
    ("identity", &["a -> a"]),
    ("String.length", &["String -> Int"]),
];

const ANNOTATIONS: &[&str] = &[
    "Int",
    "Float",
    "String",
    "List Int",
    "Maybe Int",
    "a -> a",
    "String -> Int",
];

proptest! {
    #[test]
    fn mismatch_is_reported_iff_the_annotation_disagrees(
        body in 0..BODIES.len(),
        annotation in 0..ANNOTATIONS.len(),
    ) {
        let (expr, agrees_with) = BODIES[body];
        let annotation = ANNOTATIONS[annotation];
        let source = format!("module Main exposing (value)\n\nvalue : {annotation}\nvalue =\n    {expr}\n");
        let ws = main_workspace(&source);
        let mismatch = semantic_codes(&ws).contains(&ErrorCode::E3001);
        prop_assert_eq!(mismatch, !agrees_with.contains(&annotation), "{}", source);
        prop_assert_eq!(
            ws.decl_type(&uri("Main"), "value").map(|t| t.to_string()),
            Some(annotation.to_string())
        );
    }
}

#[test]
fn record_update_requires_the_field_or_an_open_row() {
    let cases = [
        ("p = { x = 1.5 }\n\nq = { p | x = 2.0 }\n", true),
        ("p = { x = 1.5 }\n\nq = { p | y = 2.0 }\n", false),
        ("setY r = { r | y = 1.5 }\n", true),
        ("move r = { r | x = r.x + 1 }\n", true),
        ("p : { x : Float }\np = { x = 1.5 }\n\nq = { p | x = \"s\" }\n", false),
    ];
    for (decls, ok) in cases {
        let ws = main_workspace(&format!("module Main exposing (..)\n\n{decls}"));
        let codes = semantic_codes(&ws);
        assert_eq!(codes.is_empty(), ok, "{decls}: {codes:?}");
    }
}

#[test]
fn open_rows_accept_bigger_records() {
    let source = "\
module Main exposing (..)

setY r = { r | y = 1.5 }

point = setY { x = 1, y = 2.0, z = \"z\" }
";
    let ws = main_workspace(source);
    assert_eq!(semantic_codes(&ws), vec![]);
    assert_eq!(
        ws.decl_type(&uri("Main"), "point").map(|t| t.to_string()),
        Some("{ x : number, y : Float, z : String }".to_string())
    );
}

#[test]
fn unknown_operators_are_reported_once_and_inference_goes_on() {
    let source = "\
module Main exposing (..)

x = 1 <+> 2

y = \"a\" ++ \"b\" <+> String.length \"c\" + 1
";
    let ws = main_workspace(source);
    assert_eq!(semantic_codes(&ws), vec![ErrorCode::E2005, ErrorCode::E2005]);

    let y = ws
        .inferred(&uri("Main"), "y")
        .unwrap_or_else(|| panic!("y not inferred"));
    let typed = |needle: &str| {
        y.expr_types
            .get(&span_of(source, needle))
            .map(ToString::to_string)
    };
    assert_eq!(typed("\"a\" ++ \"b\""), Some("String".to_string()));
    assert_eq!(typed("String.length \"c\" + 1"), Some("Int".to_string()));
}

#[test]
fn unknown_operator_sections_are_reported_like_infix_uses() {
    let source = "module Main exposing (..)\n\nf = (+++)\n\ng a b = a +++ b\n";
    let ws = main_workspace(source);
    let found: Vec<(ErrorCode, Span)> = ws
        .semantic_diagnostics(&uri("Main"))
        .iter()
        .map(|d| (d.code, d.span))
        .collect();
    let section = span_of(source, "+++)");
    let infix = span_of(source, "+++ b");
    assert_eq!(
        found,
        vec![
            (ErrorCode::E2005, Span::new(section.start, section.start + 3)),
            (ErrorCode::E2005, Span::new(infix.start, infix.start + 3)),
        ]
    );
}

#[test]
fn chained_comparisons_need_parentheses() {
    let source = "module Main exposing (..)\n\nsame a b c = a == b == c\n\nok a b c = (a == b) == c\n";
    let ws = main_workspace(source);
    assert_eq!(semantic_codes(&ws), vec![ErrorCode::E2009]);
}

#[test]
fn extracted_functions_keep_the_expression_type() {
    let cases = [
        (
            "\
module Main exposing (area)

area : Float -> Float -> Float
area w h =
    sqrt (w * h)
",
            "w * h",
            "newFunction w h",
            "Float -> Float -> Float",
        ),
        (
            "\
module Main exposing (total)

total : { price : Float, qty : Int } -> Float
total item =
    item.price * toFloat item.qty
",
            "toFloat item.qty",
            "newFunction item",
            "{ price : Float, qty : Int } -> Float",
        ),
    ];
    for (source, selection, call, signature) in cases {
        let ws = main_workspace(source);
        let decl = if source.contains("area") { "area" } else { "total" };
        let before = ws
            .inferred(&uri("Main"), decl)
            .and_then(|d| d.expr_types.get(&span_of(source, selection)).cloned())
            .unwrap_or_else(|| panic!("{selection} not typed"));

        let action = ws
            .code_actions_for(&uri("Main"), span_of(source, selection), &[])
            .into_iter()
            .find(|a| a.fix_id == Some(FixId::ExtractFunction))
            .unwrap_or_else(|| panic!("no extract action for {selection}"));
        let after = action.edit.apply_to(&uri("Main"), source);
        ws.update(&uri("Main"), &after);

        assert_eq!(semantic_codes(&ws), vec![], "{after}");
        assert_eq!(
            ws.decl_type(&uri("Main"), "newFunction").map(|t| t.to_string()),
            Some(signature.to_string())
        );
        let at_call = ws
            .inferred(&uri("Main"), decl)
            .and_then(|d| d.expr_types.get(&span_of(&after, call)).cloned());
        assert_eq!(at_call, Some(before), "{after}");
    }
}
