use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode, Severity};
use elm_ir::{FileUri, Span};
use pretty_assertions::assert_eq;

use crate::config::{AnalysisConfig, SuggestionConfig};
use crate::{prelude, Workspace};

const HELPERS: &str = "module Helpers exposing (one, two)\n\none = 1\n\ntwo = 2\n";

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

fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn tiers_come_in_order() {
    let main = "module Main exposing (x, y)\n\nimport Helpers\n\nx = missing\n\ny = (1\n";
    let ws = workspace(&[HELPERS, main]);
    let all = codes(&ws.diagnose(&uri("Main")));

    let syntactic = codes(&ws.syntactic_diagnostics(&uri("Main")));
    assert!(!syntactic.is_empty());
    assert!(syntactic.iter().all(|c| c.as_str().starts_with("E1")), "{syntactic:?}");
    assert_eq!(&all[..syntactic.len()], syntactic.as_slice());

    let unknown = all.iter().position(|&c| c == ErrorCode::E2004);
    let unused = all.iter().position(|&c| c == ErrorCode::W1001);
    assert!(unknown.is_some() && unused.is_some(), "{all:?}");
    assert!(unknown < unused);
}

#[test]
fn each_tier_is_sorted_by_position() {
    let main = "module Main exposing (..)\n\na = first\n\nb = second\n\nc = third\n";
    let ws = workspace(&[main]);
    let semantic = ws.semantic_diagnostics(&uri("Main"));
    assert_eq!(codes(&semantic), vec![ErrorCode::E2004; 3]);
    let starts: Vec<u32> = semantic.iter().map(|d| d.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn library_files_have_no_diagnostics() {
    let ws = Workspace::new();
    for (module, _) in prelude::MODULES {
        assert_eq!(ws.diagnose(&prelude::uri_for(module)), vec![], "{module}");
    }
}

#[test]
fn unknown_files_have_no_diagnostics() {
    let ws = Workspace::new();
    assert_eq!(ws.diagnose(&uri("Nowhere")), vec![]);
}

#[test]
fn unused_top_level_declarations() {
    let main = "\
module Main exposing (exposed)

exposed = helper

helper = 1

unused = 2

loop n = loop n

main = unused
";
    let ws = workspace(&[main]);
    let unused: Vec<String> = ws
        .suggestion_diagnostics(&uri("Main"))
        .into_iter()
        .filter_map(|d| match d.data {
            DiagnosticData::UnusedTopLevel { name } => Some(name),
            _ => None,
        })
        .collect();
    // `main` is an entry point; `loop` only refers to itself.
    assert_eq!(unused, vec!["loop".to_string()]);
}

#[test]
fn missing_annotation_is_a_hint_with_the_inferred_type() {
    let main = "module Main exposing (double)\n\ndouble x = x * 2.0\n";
    let ws = workspace(&[main]);
    let hints: Vec<Diagnostic> = ws
        .suggestion_diagnostics(&uri("Main"))
        .into_iter()
        .filter(|d| d.code == ErrorCode::W1004)
        .collect();
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].severity, Severity::Hint);
    assert_eq!(
        hints[0].data,
        DiagnosticData::MissingTypeAnnotation {
            name: "double".to_string(),
            inferred: "Float -> Float".to_string(),
        }
    );
}

#[test]
fn unused_imports_and_imported_names() {
    let main = "\
module Main exposing (x)

import Helpers exposing (one, two)
import Other

x : Int
x = one
";
    let other = "module Other exposing (z)\n\nz : Int\nz = 0\n";
    let ws = workspace(&[HELPERS, other, main]);
    let found: Vec<DiagnosticData> = ws
        .suggestion_diagnostics(&uri("Main"))
        .into_iter()
        .map(|d| d.data)
        .collect();
    assert_eq!(
        found,
        vec![
            DiagnosticData::UnusedImportedName {
                module: "Helpers".to_string(),
                name: "two".to_string(),
            },
            DiagnosticData::UnusedImport {
                module: "Other".to_string(),
            },
        ]
    );
}

#[test]
fn suggestion_rules_follow_the_configuration() {
    let main = "module Main exposing (x)\n\nimport Helpers\n\nx = 1\n";
    let ws = workspace(&[HELPERS, main]);
    assert!(codes(&ws.suggestion_diagnostics(&uri("Main"))).contains(&ErrorCode::W1001));

    ws.set_config(AnalysisConfig {
        suggestions: SuggestionConfig {
            unused_imports: false,
            missing_type_annotation: false,
            ..SuggestionConfig::default()
        },
        ..AnalysisConfig::default()
    });
    assert_eq!(ws.suggestion_diagnostics(&uri("Main")), vec![]);
}

#[test]
fn duplicate_modules_are_reported_in_each_file() {
    let source = "module Shared exposing (x)\n\nx : Int\nx = 1\n";
    let ws = Workspace::new();
    ws.update(&uri("Shared"), source);
    ws.update(&uri("Copy"), source);
    for file in ["Shared", "Copy"] {
        assert!(
            codes(&ws.semantic_diagnostics(&uri(file))).contains(&ErrorCode::E2006),
            "{file}"
        );
    }
    ws.remove(&uri("Copy"));
    assert_eq!(ws.semantic_diagnostics(&uri("Shared")), vec![]);
}

fn external(span: Span, code: ErrorCode) -> Diagnostic {
    Diagnostic::warning(code)
        .with_message("from a linter")
        .with_label(span, "here")
        .with_data(DiagnosticData::ExternalLint {
            rule: "NoUnused.Imports".to_string(),
            fixes: Vec::new(),
        })
}

#[test]
fn external_diagnostics_join_the_suggestion_tier() {
    let main = "module Main exposing (x)\n\nx : Int\nx = 1\n";
    let ws = workspace(&[main]);
    ws.set_external_diagnostics(&uri("Main"), vec![external(Span::new(28, 33), ErrorCode::L0001)]);
    assert_eq!(codes(&ws.diagnose(&uri("Main"))), vec![ErrorCode::L0001]);

    ws.update(&uri("Main"), &format!("{main}\n"));
    assert_eq!(ws.diagnose(&uri("Main")), vec![]);
}

#[test]
fn repeated_findings_are_kept_once_unless_configured() {
    let main = "module Main exposing (x)\n\nimport Helpers\n\nx : Int\nx = 1\n";
    let ws = workspace(&[HELPERS, main]);
    let own = ws.suggestion_diagnostics(&uri("Main"));
    assert_eq!(codes(&own), vec![ErrorCode::W1001]);
    ws.set_external_diagnostics(&uri("Main"), vec![external(own[0].span, ErrorCode::W1001)]);
    assert_eq!(codes(&ws.diagnose(&uri("Main"))), vec![ErrorCode::W1001]);

    ws.set_config(AnalysisConfig {
        deduplicate_diagnostics: false,
        ..AnalysisConfig::default()
    });
    assert_eq!(
        codes(&ws.diagnose(&uri("Main"))),
        vec![ErrorCode::W1001, ErrorCode::W1001]
    );
}
