//! Property-based tests for the parser.
//!
//! The parser must accept any input without panicking, and every span it
//! produces must lie inside the source.

use elm_ir::ast::{Decl, Expr};
use elm_parse::parse;
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    }
}

/// Fragments that look like Elm, so random inputs reach deep into the
/// grammar instead of failing at the first token.
fn arb_fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("module Main exposing (..)\n"),
        Just("import List exposing (map)\n"),
        Just("x"),
        Just("Just"),
        Just("List.map"),
        Just(".field"),
        Just(" = "),
        Just(" -> "),
        Just(" + "),
        Just(" |> "),
        Just(" :: "),
        Just("("),
        Just(")"),
        Just("["),
        Just("]"),
        Just("{ r | "),
        Just("}"),
        Just(", "),
        Just("case x of\n"),
        Just("let\n"),
        Just(" in "),
        Just("if "),
        Just(" then "),
        Just(" else "),
        Just("\\a -> "),
        Just("type Msg = A | B Int\n"),
        Just("type alias R = { a : Int }\n"),
        Just("f : Int -> Int\n"),
        Just("\n"),
        Just("\n    "),
        Just("\n        "),
        Just("42"),
        Just("\"str\""),
        Just("'c'"),
        Just("{-"),
        Just("-}"),
        Just("-- note\n"),
        Just("`"),
    ]
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..60).prop_map(|parts| parts.concat())
}

fn check_expr(expr: &Expr, len: u32) {
    assert!(expr.span.start <= expr.span.end, "inverted span {:?}", expr.span);
    assert!(expr.span.end <= len, "span {:?} beyond {len}", expr.span);
    expr.for_each_child(&mut |child| check_expr(child, len));
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn parse_never_panics(source in "\\PC{0,200}") {
        let _ = parse(&source);
    }

    #[test]
    fn spans_stay_inside_source(source in arb_source()) {
        let module = parse(&source);
        let len = u32::try_from(source.len()).unwrap_or(u32::MAX);
        for error in &module.errors {
            prop_assert!(error.span.end <= len, "error span {:?} beyond {}", error.span, len);
        }
        for decl in &module.decls {
            let span = decl.full_span();
            prop_assert!(span.start <= span.end);
            prop_assert!(span.end <= len);
            if let Decl::Value(value) = decl {
                check_expr(&value.body, len);
            }
        }
    }

    #[test]
    fn reparse_is_deterministic(source in arb_source()) {
        prop_assert_eq!(parse(&source), parse(&source));
    }
}
