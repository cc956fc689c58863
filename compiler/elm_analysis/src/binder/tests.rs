use std::sync::Arc;

use elm_diagnostic::{DiagnosticData, ErrorCode};
use elm_ir::{FileUri, Namespace};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

use super::*;
use crate::prelude;

struct Modules {
    interfaces: FxHashMap<String, Arc<ModuleInterface>>,
}

impl Modules {
    fn new(sources: &[&str]) -> Self {
        let mut interfaces = FxHashMap::default();
        for (name, source) in prelude::MODULES {
            let tree = elm_parse::parse(source);
            let uri = prelude::uri_for(name);
            interfaces.insert(
                name.to_string(),
                Arc::new(ModuleInterface::build(&uri, &tree, true)),
            );
        }
        for source in sources {
            let tree = elm_parse::parse(source);
            let name = tree.module_name().to_string();
            let uri = FileUri::new(format!("file:///{name}.elm"));
            interfaces.insert(name, Arc::new(ModuleInterface::build(&uri, &tree, false)));
        }
        Modules { interfaces }
    }

    fn resolve(&self, source: &str) -> ResolvedFile {
        let tree = elm_parse::parse(source);
        let uri = FileUri::new("file:///Main.elm");
        let own = Arc::new(ModuleInterface::build(&uri, &tree, false));
        let lookup = |name: &str| self.interfaces.get(name).cloned();
        resolve::resolve_file(&uri, &tree, own, &lookup, false)
    }
}

fn offset(source: &str, needle: &str) -> u32 {
    u32::try_from(source.find(needle).unwrap_or_else(|| panic!("{needle} not in source")))
        .unwrap_or(0)
}

fn codes(file: &ResolvedFile) -> Vec<ErrorCode> {
    let mut codes: Vec<_> = file.diagnostics.iter().map(|d| d.code).collect();
    codes.sort();
    codes
}

#[test]
fn exposing_all_exports_everything() {
    let tree = elm_parse::parse("module A exposing (..)\n\ntype Color = Red | Green\n\nx = 1\n");
    let interface = ModuleInterface::build(&FileUri::new("file:///A.elm"), &tree, false);
    assert!(interface.exposed(Namespace::Constructor, "Red").is_some());
    assert!(interface.exposed(Namespace::Value, "x").is_some());
    assert_eq!(
        interface.variants("Color").map(<[String]>::to_vec),
        Some(vec!["Red".to_string(), "Green".to_string()])
    );
}

#[test]
fn opaque_types_hide_variants_but_not_record_constructors() {
    let source = "\
module A exposing (Color, User)

type Color = Red | Green

type alias User = { name : String }
";
    let tree = elm_parse::parse(source);
    let interface = ModuleInterface::build(&FileUri::new("file:///A.elm"), &tree, false);
    assert!(interface.exposed(Namespace::Type, "Color").is_some());
    assert!(interface.exposed(Namespace::Constructor, "Red").is_none());
    assert!(interface.exposed(Namespace::Constructor, "User").is_some());
    assert!(interface.diagnostics.is_empty());
}

#[test]
fn undefined_exposed_names_and_duplicates_are_reported() {
    let source = "module A exposing (missing)\n\nx = 1\n\nx = 2\n";
    let tree = elm_parse::parse(source);
    let interface = ModuleInterface::build(&FileUri::new("file:///A.elm"), &tree, false);
    let codes: Vec<_> = interface.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2008, ErrorCode::E2007]);
}

#[test]
fn locals_shadow_imports() {
    let modules = Modules::new(&[]);
    let source = "module Main exposing (..)\n\nimport List exposing (map)\n\nmap = 1\n\nmain = map\n";
    let file = modules.resolve(source);
    let use_site = file
        .reference_at(offset(source, "map\n") + 1)
        .and_then(Reference::definition)
        .map(|d| d.module.clone());
    assert_eq!(use_site, Some("Main".to_string()));
}

#[test]
fn first_import_wins_and_ambiguity_is_reported() {
    let modules = Modules::new(&[
        "module A exposing (helper)\n\nhelper = 1\n",
        "module B exposing (helper)\n\nhelper = 2\n",
    ]);
    let source = "\
module Main exposing (main)

import A exposing (helper)
import B exposing (helper)

main = helper
";
    let file = modules.resolve(source);
    let reference = file
        .reference_at(offset(source, "helper\n") + 1)
        .filter(|r| r.role == RefRole::Use);
    assert_eq!(
        reference.and_then(Reference::definition).map(|d| d.module.as_str()),
        Some("A")
    );
    assert_eq!(reference.and_then(|r| r.import), Some(0));
    let ambiguity = file
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::E2003)
        .map(|d| d.data.clone());
    assert_eq!(
        ambiguity,
        Some(DiagnosticData::AmbiguousName {
            name: "helper".to_string(),
            namespace: Namespace::Value,
            candidates: vec!["A".to_string(), "B".to_string()],
        })
    );
}

#[test]
fn alias_replaces_the_module_qualifier() {
    let modules = Modules::new(&["module Dict.Extra exposing (go)\n\ngo = 1\n"]);
    let source = "\
module Main exposing (..)

import Dict.Extra as DE

a = DE.go

b = Dict.Extra.go
";
    let file = modules.resolve(source);
    let a = file.reference_at(offset(source, "DE.go") + 3);
    assert!(matches!(a.map(|r| &r.target), Some(Target::TopLevel(_))));
    let unknown: Vec<_> = file
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::E2004)
        .map(|d| d.span)
        .collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].start, offset(source, "Dict.Extra.go"));
}

#[test]
fn explicit_alias_hides_the_implicit_qualifier() {
    let modules = Modules::new(&[]);
    let source = "module Main exposing (..)\n\nimport List as L\n\na = L.map\n\nb = List.map\n";
    let file = modules.resolve(source);
    assert_eq!(codes(&file), vec![ErrorCode::E2004]);
}

#[test]
fn last_segment_qualifies_an_unaliased_import() {
    let modules = Modules::new(&["module Html.Attributes exposing (cls)\n\ncls = 1\n"]);
    let source = "\
module Main exposing (..)

import Html.Attributes

a = Attributes.cls

b = Html.Attributes.cls
";
    let file = modules.resolve(source);
    assert_eq!(codes(&file), vec![]);
    let a = file.reference_at(offset(source, "Attributes.cls") + 11);
    assert!(matches!(a.map(|r| &r.target), Some(Target::TopLevel(_))));
}

#[test]
fn resolution_errors() {
    let modules = Modules::new(&["module A exposing (shown)\n\nshown = 1\n\nhidden = 2\n"]);
    let source = "\
module Main exposing (..)

import Missing
import A exposing (hidden)

main = nowhere + A.hidden
";
    let file = modules.resolve(source);
    assert_eq!(
        codes(&file),
        vec![ErrorCode::E2001, ErrorCode::E2002, ErrorCode::E2002, ErrorCode::E2004]
    );
}

#[test]
fn local_bindings_resolve_to_their_binding_site() {
    let modules = Modules::new(&[]);
    let source = "\
module Main exposing (..)

f x =
    let
        y = x
    in
    case y of
        z ->
            z
";
    let file = modules.resolve(source);
    assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
    let last_z = offset(source, "z\n") + 1;
    let z_binding = offset(source, "z ->");
    assert_eq!(
        file.reference_at(last_z).map(|r| r.target.clone()),
        Some(Target::Local {
            span: elm_ir::Span::new(z_binding, z_binding + 1)
        })
    );
}

#[test]
fn operators_resolve_through_the_implicit_imports() {
    let modules = Modules::new(&[]);
    let source = "module Main exposing (..)\n\nmain = 1 + 2 :: []\n";
    let file = modules.resolve(source);
    let plus = file
        .reference_at(offset(source, "+"))
        .and_then(Reference::definition)
        .map(|d| (d.module.clone(), d.namespace));
    assert_eq!(plus, Some(("Basics".to_string(), Namespace::Operator)));
    let cons = file
        .reference_at(offset(source, "::"))
        .and_then(Reference::definition)
        .map(|d| d.module.clone());
    assert_eq!(cons, Some("List".to_string()));
}

#[test]
fn scope_construction_is_idempotent() {
    let modules = Modules::new(&["module A exposing (..)\n\nhelper = 1\n"]);
    let source = "module Main exposing (..)\n\nimport A exposing (..)\n\nmain = helper\n";
    let first = modules.resolve(source);
    let second = modules.resolve(source);
    assert_eq!(first.scope, second.scope);
    assert_eq!(first.references, second.references);
}
