//! The workspace as request handlers see it: hosts, navigation, rename,
//! cancellation and concurrent access.

use std::path::PathBuf;

use elm_analysis::{
    AnalysisError, CancellationToken, DiskHost, FileChange, FileSystemHost, HostError,
    InMemoryHost, Location, Workspace,
};
use elm_diagnostic::{Diagnostic, ErrorCode};
use elm_ir::{FileUri, Position, Span};
use pretty_assertions::assert_eq;

const HELPERS: &str = "module Helpers exposing (one, two)\n\none = 1\n\ntwo = 2\n";
const MAIN: &str = "module Main exposing (x)\n\nimport Helpers exposing (one)\n\nx = one + Helpers.two\n";

fn uri(module: &str) -> FileUri {
    FileUri::new(format!("file:///{module}.elm"))
}

fn workspace() -> Workspace {
    elm_analysis::init_tracing();
    let ws = Workspace::new();
    ws.update(&uri("Helpers"), HELPERS);
    ws.update(&uri("Main"), MAIN);
    ws
}

fn span_of(source: &str, needle: &str) -> Span {
    let start = source.find(needle).unwrap_or_else(|| panic!("{needle} not in source"));
    let start = u32::try_from(start).unwrap_or(0);
    Span::new(start, start + u32::try_from(needle.len()).unwrap_or(0))
}

/// The first `len` bytes of `needle`'s first occurrence.
fn name_at(source: &str, needle: &str, len: u32) -> Span {
    let span = span_of(source, needle);
    Span::new(span.start, span.start + len)
}

fn position_of(ws: &Workspace, module: &str, source: &str, needle: &str) -> Position {
    let file = ws.file(&uri(module)).unwrap_or_else(|| panic!("no {module}"));
    file.position(span_of(source, needle).start)
}

fn spans(locations: &[Location]) -> Vec<(FileUri, Span)> {
    locations.iter().map(|l| (l.uri.clone(), l.span)).collect()
}

#[test]
fn workspace_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Workspace>();
    assert_send_sync::<CancellationToken>();
}

#[test]
fn definition_of_an_imported_value() {
    let ws = workspace();
    let at = position_of(&ws, "Main", MAIN, "one +");
    let found = ws.definitions_for(&uri("Main"), at);
    assert_eq!(spans(&found), vec![(uri("Helpers"), name_at(HELPERS, "one = 1", 3))]);
    assert_eq!(found[0].start, Position::new(2, 0));
}

#[test]
fn definition_of_a_qualified_value() {
    let ws = workspace();
    let at = position_of(&ws, "Main", MAIN, "two\n");
    let found = ws.definitions_for(&uri("Main"), at);
    assert_eq!(spans(&found), vec![(uri("Helpers"), name_at(HELPERS, "two = 2", 3))]);
}

#[test]
fn definition_of_an_import_is_the_module_header() {
    let ws = workspace();
    let at = position_of(&ws, "Main", MAIN, "Helpers exposing");
    let found = ws.definitions_for(&uri("Main"), at);
    assert_eq!(spans(&found), vec![(uri("Helpers"), Span::new(7, 14))]);
}

#[test]
fn definition_of_a_local() {
    let source = "module Main exposing (f)\n\nf a =\n    a + 1\n";
    let ws = Workspace::new();
    ws.update(&uri("Main"), source);
    let at = position_of(&ws, "Main", source, "a + 1");
    let found = ws.definitions_for(&uri("Main"), at);
    assert_eq!(spans(&found), vec![(uri("Main"), name_at(source, "a =", 1))]);
}

#[test]
fn references_with_and_without_the_declaration() {
    let ws = workspace();
    let at = position_of(&ws, "Helpers", HELPERS, "one = 1");

    let uses = ws.references_for(&uri("Helpers"), at, false);
    assert_eq!(spans(&uses), vec![(uri("Main"), name_at(MAIN, "one +", 3))]);

    let all = ws.references_for(&uri("Helpers"), at, true);
    assert_eq!(
        spans(&all),
        vec![
            (uri("Helpers"), name_at(HELPERS, "one,", 3)),
            (uri("Helpers"), name_at(HELPERS, "one = 1", 3)),
            (uri("Main"), name_at(MAIN, "one)", 3)),
            (uri("Main"), name_at(MAIN, "one +", 3)),
        ]
    );
}

#[test]
fn rename_a_top_level_value_everywhere() {
    let ws = workspace();
    let at = position_of(&ws, "Main", MAIN, "one +");
    let edit = ws
        .rename(&uri("Main"), at, "uno", &CancellationToken::new())
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(
        edit.apply_to(&uri("Helpers"), HELPERS),
        "module Helpers exposing (uno, two)\n\nuno = 1\n\ntwo = 2\n"
    );
    assert_eq!(
        edit.apply_to(&uri("Main"), MAIN),
        "module Main exposing (x)\n\nimport Helpers exposing (uno)\n\nx = uno + Helpers.two\n"
    );
}

#[test]
fn rename_a_local() {
    let source = "module Main exposing (f)\n\nf a =\n    a + a\n";
    let ws = Workspace::new();
    ws.update(&uri("Main"), source);
    let at = position_of(&ws, "Main", source, "a =");
    let edit = ws
        .rename(&uri("Main"), at, "count", &CancellationToken::new())
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(
        edit.apply_to(&uri("Main"), source),
        "module Main exposing (f)\n\nf count =\n    count + count\n"
    );
}

#[test]
fn rename_refusals() {
    let source = "module Main exposing (x)\n\nx = List.map identity []\n";
    let ws = Workspace::new();
    ws.update(&uri("Main"), source);
    let cancel = CancellationToken::new();

    let library = ws.rename(&uri("Main"), position_of(&ws, "Main", source, "map"), "each", &cancel);
    assert!(matches!(library, Err(AnalysisError::LibraryDefinition { ref name }) if name == "map"));

    let at_x = position_of(&ws, "Main", source, "x =");
    for bad in ["X", "let", "", "two words"] {
        let result = ws.rename(&uri("Main"), at_x, bad, &cancel);
        assert!(matches!(result, Err(AnalysisError::InvalidName { .. })), "{bad}");
    }

    let nothing = ws.rename(&uri("Main"), Position::new(1, 0), "y", &cancel);
    assert!(matches!(nothing, Err(AnalysisError::NothingToRename)));

    let unknown = ws.rename(&uri("Nowhere"), Position::new(0, 0), "y", &cancel);
    assert!(matches!(unknown, Err(AnalysisError::UnknownFile(_))));
}

#[test]
fn cancelled_requests_stop() {
    let ws = workspace();
    let cancel = CancellationToken::new();
    let all = ws
        .workspace_diagnostics(&cancel)
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(all.keys().cloned().collect::<Vec<_>>(), vec![uri("Helpers"), uri("Main")]);

    cancel.cancel();
    let result = ws.workspace_diagnostics(&cancel);
    assert!(result.is_err_and(|err| err.is_cancelled()));

    let at = position_of(&ws, "Main", MAIN, "one +");
    let renamed = ws.rename(&uri("Main"), at, "uno", &cancel);
    assert!(matches!(renamed, Err(AnalysisError::Cancelled)));

    // Cancellation leaves the workspace usable.
    let fresh = CancellationToken::new();
    assert!(ws.workspace_diagnostics(&fresh).is_ok());
}

#[test]
fn hosts_feed_the_forest() {
    let host = InMemoryHost::with_files([
        ("file:///Helpers.elm", HELPERS),
        ("file:///Main.elm", MAIN),
    ]);
    let ws = Workspace::new();
    assert_eq!(ws.load(&host).ok(), Some(2));
    assert_eq!(ws.files().len(), 2);
    let first = ws.revision(&uri("Main"));

    host.set(uri("Main"), "module Main exposing (x)\n\nx = 1\n");
    ws.apply_changes(&host, &[FileChange::Changed(uri("Main"))])
        .unwrap_or_else(|err| panic!("{err}"));
    assert!(ws.revision(&uri("Main")) > first);
    assert_eq!(
        ws.file(&uri("Main")).map(|f| f.text.to_string()),
        Some("module Main exposing (x)\n\nx = 1\n".to_string())
    );

    host.remove(&uri("Helpers"));
    ws.apply_changes(&host, &[FileChange::Deleted(uri("Helpers"))])
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(ws.files().len(), 1);

    let missing = ws.apply_changes(&host, &[FileChange::Created(uri("Ghost"))]);
    assert!(matches!(
        missing,
        Err(AnalysisError::Host(HostError::NotFound(ref u))) if u == &uri("Ghost")
    ));
}

#[test]
fn disk_host_lists_elm_sources() {
    let root: PathBuf = std::env::temp_dir().join(format!("elm-analysis-disk-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    let write = |rel: &str, text: &str| {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|err| panic!("{err}"));
        }
        std::fs::write(path, text).unwrap_or_else(|err| panic!("{err}"));
    };
    write("src/Main.elm", MAIN);
    write("src/Data/Helpers.elm", HELPERS);
    write("src/notes.txt", "not elm");
    write("elm-stuff/Cached.elm", "module Cached exposing (..)\n");

    let host = DiskHost::new(&root);
    let files = host.list_workspace_files().unwrap_or_else(|err| panic!("{err}"));
    let names: Vec<String> = files
        .iter()
        .map(|f| f.as_str().rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Helpers.elm".to_string(), "Main.elm".to_string()]);

    let ws = Workspace::new();
    assert_eq!(ws.load(&host).ok(), Some(2));
    let main = files
        .iter()
        .find(|f| f.as_str().ends_with("Main.elm"))
        .unwrap_or_else(|| panic!("no Main"));
    assert_eq!(ws.semantic_diagnostics(main), vec![]);

    let gone = host.read_file(&DiskHost::uri_for(&root.join("src/Gone.elm")));
    assert!(matches!(gone, Err(HostError::NotFound(_))));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn concurrent_reads_see_whole_revisions() {
    let with_one = MAIN;
    let with_missing = "module Main exposing (x)\n\nimport Helpers exposing (one)\n\nx = missing + Helpers.two\n";
    let expected = |text: &str| -> Vec<Diagnostic> {
        let ws = Workspace::new();
        ws.update(&uri("Helpers"), HELPERS);
        ws.update(&uri("Main"), text);
        ws.diagnose(&uri("Main"))
    };
    let outcomes = [expected(with_one), expected(with_missing)];
    assert!(outcomes[1].iter().any(|d| d.code == ErrorCode::E2004));

    let ws = workspace();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let seen = ws.diagnose(&uri("Main"));
                    assert!(outcomes.contains(&seen), "{seen:#?}");
                    let _ = ws.definitions_for(&uri("Main"), Position::new(4, 4));
                }
            });
        }
        scope.spawn(|| {
            for round in 0..50 {
                let text = if round % 2 == 0 { with_missing } else { with_one };
                ws.update(&uri("Main"), text);
            }
        });
    });

    // The last write was `with_one`.
    assert_eq!(ws.diagnose(&uri("Main")), outcomes[0]);
}
