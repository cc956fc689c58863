//! Syntax forest: one parsed tree per file, with revisions.
//!
//! Every update takes a fresh revision from one monotonic counter, so a
//! cached fact can tell whether any file it read has changed since. A
//! second counter, the structure revision, moves whenever the set of files
//! or the module-name map changes; facts that looked a module up by name
//! depend on it.
//!
//! Readers never hold the lock while they compute. They take a
//! [`Snapshot`], an immutable view shared through an `Arc`, and work
//! against it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use elm_ir::ast::ParsedModule;
use elm_ir::{FileUri, LineIndex, Position, Span};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::cache::Stamp;

/// Turns text into a tree. Must never reject text.
pub trait SyntaxParser: Send + Sync {
    fn parse(&self, text: &str) -> ParsedModule;
}

impl SyntaxParser for elm_parse::ElmParser {
    fn parse(&self, text: &str) -> ParsedModule {
        elm_parse::ElmParser::parse(self, text)
    }
}

/// A point in the workspace's edit history.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One parsed file.
#[derive(Debug)]
pub struct SourceFile {
    pub uri: FileUri,
    pub text: Arc<str>,
    pub tree: Arc<ParsedModule>,
    pub revision: Revision,
    pub line_index: LineIndex,
    /// Library modules shipped with the core: never diagnosed or edited.
    pub is_virtual: bool,
}

impl SourceFile {
    pub fn module_name(&self) -> &str {
        self.tree.module_name()
    }

    pub fn position(&self, offset: u32) -> Position {
        self.line_index.position(&self.text, offset)
    }

    pub fn offset(&self, position: Position) -> u32 {
        self.line_index.offset(&self.text, position)
    }

    pub fn slice(&self, span: Span) -> &str {
        span.slice(&self.text)
    }

    /// Text length as a `u32` offset.
    pub fn len(&self) -> u32 {
        u32::try_from(self.text.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Immutable view of the forest.
#[derive(Debug, Default, Clone)]
pub struct ForestState {
    files: FxHashMap<FileUri, Arc<SourceFile>>,
    /// Module name → defining file. With duplicates, the smallest URI wins.
    modules: FxHashMap<String, FileUri>,
    structure: Revision,
}

pub type Snapshot = Arc<ForestState>;

impl ForestState {
    pub fn get(&self, uri: &FileUri) -> Option<&Arc<SourceFile>> {
        self.files.get(uri)
    }

    /// Every file, in no particular order.
    pub fn files(&self) -> impl Iterator<Item = &Arc<SourceFile>> {
        self.files.values()
    }

    /// Files the user owns, sorted by URI.
    pub fn workspace_files(&self) -> Vec<Arc<SourceFile>> {
        let mut files: Vec<_> = self.files.values().filter(|f| !f.is_virtual).cloned().collect();
        files.sort_by(|a, b| a.uri.cmp(&b.uri));
        files
    }

    pub fn module_file(&self, module: &str) -> Option<&Arc<SourceFile>> {
        self.modules.get(module).and_then(|uri| self.files.get(uri))
    }

    /// Every file declaring `module`, sorted by URI.
    pub fn files_declaring(&self, module: &str) -> Vec<&Arc<SourceFile>> {
        let mut found: Vec<_> = self
            .files
            .values()
            .filter(|f| f.module_name() == module)
            .collect();
        found.sort_by(|a, b| a.uri.cmp(&b.uri));
        found
    }

    pub fn structure_revision(&self) -> Revision {
        self.structure
    }

    pub fn revision(&self, uri: &FileUri) -> Option<Revision> {
        self.files.get(uri).map(|f| f.revision)
    }

    fn rebuild_modules(&mut self) {
        let mut modules: FxHashMap<String, FileUri> = FxHashMap::default();
        for file in self.files.values() {
            let name = file.module_name();
            match modules.get(name) {
                Some(existing) if *existing <= file.uri => {}
                _ => {
                    modules.insert(name.to_string(), file.uri.clone());
                }
            }
        }
        self.modules = modules;
    }
}

/// The forest: parsed trees for all workspace and library files.
pub struct Forest {
    state: RwLock<Snapshot>,
    counter: AtomicU64,
    parser: Arc<dyn SyntaxParser>,
}

impl Forest {
    pub fn new(parser: Arc<dyn SyntaxParser>) -> Self {
        Forest {
            state: RwLock::new(Arc::new(ForestState::default())),
            counter: AtomicU64::new(0),
            parser,
        }
    }

    fn next_revision(&self) -> Revision {
        Revision(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The current state. Cheap: one `Arc` clone.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.state.read())
    }

    pub fn get(&self, uri: &FileUri) -> Option<Arc<SourceFile>> {
        self.state.read().get(uri).cloned()
    }

    pub fn files(&self) -> Vec<Arc<SourceFile>> {
        self.state.read().files().cloned().collect()
    }

    pub fn module_file(&self, module: &str) -> Option<Arc<SourceFile>> {
        self.state.read().module_file(module).cloned()
    }

    /// Replace a file's text. Parsing happens outside the lock; the new
    /// revision is visible to every reader as soon as this returns.
    pub fn update(&self, uri: &FileUri, text: &str) -> Arc<SourceFile> {
        self.insert(uri, text, uri.is_virtual())
    }

    pub(crate) fn insert(&self, uri: &FileUri, text: &str, is_virtual: bool) -> Arc<SourceFile> {
        let tree = Arc::new(self.parser.parse(text));
        let mut state = self.state.write();
        let file = Arc::new(SourceFile {
            uri: uri.clone(),
            text: Arc::from(text),
            line_index: LineIndex::new(text),
            tree,
            revision: self.next_revision(),
            is_virtual,
        });
        let next = Arc::make_mut(&mut state);
        let old = next.files.insert(uri.clone(), Arc::clone(&file));
        let renamed = old.map_or(true, |old| old.module_name() != file.module_name());
        if renamed {
            next.rebuild_modules();
            next.structure = self.next_revision();
        }
        tracing::debug!(uri = %uri, revision = ?file.revision, structural = renamed, "file updated");
        file
    }

    /// Drop a file. Returns whether it was present.
    pub fn remove(&self, uri: &FileUri) -> bool {
        let mut state = self.state.write();
        if !state.files.contains_key(uri) {
            return false;
        }
        let next = Arc::make_mut(&mut state);
        next.files.remove(uri);
        next.rebuild_modules();
        next.structure = self.next_revision();
        tracing::debug!(uri = %uri, "file removed");
        true
    }

    /// Whether a fact stamped with `stamp` may still be published.
    pub fn is_current(&self, stamp: &Stamp) -> bool {
        stamp.is_valid(&self.state.read())
    }
}
