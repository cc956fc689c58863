//! One consistent view of the workspace for the duration of a request.
//!
//! A session reads a single forest snapshot. Facts come from the shared
//! caches when their stamps hold for that snapshot; otherwise they are
//! computed here and published only if the forest has not moved on in the
//! meantime.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use elm_ir::ast::Decl;
use elm_ir::FileUri;
use elm_types::Ty;
use rustc_hash::{FxHashMap, FxHashSet};

use super::Workspace;
use crate::binder::{resolve_file, Definition, ModuleInterface, ResolvedFile};
use crate::cache::{FactCache, Stamp};
use crate::forest::{Snapshot, SourceFile};
use crate::infer::annotation::annotation_type;
use crate::infer::{infer_decl, InferredDecl, TypeOracle};
use crate::prelude;

type DeclKey = (FileUri, String);

pub(crate) struct Session<'w> {
    ws: &'w Workspace,
    pub(crate) state: Snapshot,
    /// Declarations whose inference is on the stack.
    in_progress: RefCell<FxHashSet<DeclKey>>,
    /// Every declaration inferred in this session, published or not.
    inferred: RefCell<FxHashMap<DeclKey, Arc<InferredDecl>>>,
    closures: RefCell<FxHashMap<FileUri, Arc<Vec<FileUri>>>>,
    /// Bumped whenever a cycle forces a monomorphic fallback.
    fallbacks: Cell<u32>,
}

impl<'w> Session<'w> {
    pub(crate) fn new(ws: &'w Workspace) -> Self {
        Session {
            ws,
            state: ws.forest.snapshot(),
            in_progress: RefCell::default(),
            inferred: RefCell::default(),
            closures: RefCell::default(),
            fallbacks: Cell::new(0),
        }
    }

    pub(crate) fn workspace(&self) -> &'w Workspace {
        self.ws
    }

    pub(crate) fn file(&self, uri: &FileUri) -> Option<Arc<SourceFile>> {
        self.state.get(uri).cloned()
    }

    /// Store `value` unless the forest changed under the computation.
    fn publish<K, T>(&self, cache: &FactCache<K, T>, key: K, stamp: Stamp, value: &Arc<T>)
    where
        K: Eq + std::hash::Hash + Clone + std::fmt::Debug,
    {
        if self.ws.forest.is_current(&stamp) {
            cache.insert(key, stamp, Arc::clone(value));
        } else {
            tracing::debug!(key = ?key, "forest moved during computation; not publishing");
        }
    }

    pub(crate) fn interface(&self, uri: &FileUri) -> Option<Arc<ModuleInterface>> {
        if let Some(hit) = self.ws.interfaces.get(uri, &self.state) {
            return Some(hit);
        }
        let file = self.file(uri)?;
        tracing::debug!(uri = %uri, "building module interface");
        let interface = Arc::new(ModuleInterface::build(uri, &file.tree, file.is_virtual));
        self.publish(
            &self.ws.interfaces,
            uri.clone(),
            Stamp::file(uri, file.revision),
            &interface,
        );
        Some(interface)
    }

    pub(crate) fn module_interface(&self, module: &str) -> Option<Arc<ModuleInterface>> {
        let uri = self.state.module_file(module)?.uri.clone();
        self.interface(&uri)
    }

    pub(crate) fn resolved(&self, uri: &FileUri) -> Option<Arc<ResolvedFile>> {
        if let Some(hit) = self.ws.resolved.get(uri, &self.state) {
            return Some(hit);
        }
        let file = self.file(uri)?;
        let own = self.interface(uri)?;
        let consulted = RefCell::new(vec![uri.clone()]);
        let lookup = |module: &str| {
            let target = self.state.module_file(module)?;
            consulted.borrow_mut().push(target.uri.clone());
            self.interface(&target.uri)
        };
        let module = file.module_name();
        let duplicate = !file.is_virtual
            && self
                .state
                .files_declaring(module)
                .iter()
                .filter(|f| !f.is_virtual)
                .count()
                > 1;
        let resolved = Arc::new(resolve_file(uri, &file.tree, own, &lookup, duplicate));
        let stamp = Stamp::of(&self.state, consulted.into_inner());
        self.publish(&self.ws.resolved, uri.clone(), stamp, &resolved);
        Some(resolved)
    }

    /// `uri` and every file reachable from it through imports, library
    /// modules included.
    pub(crate) fn import_closure(&self, uri: &FileUri) -> Arc<Vec<FileUri>> {
        if let Some(hit) = self.closures.borrow().get(uri) {
            return Arc::clone(hit);
        }
        let mut seen: FxHashSet<FileUri> = FxHashSet::default();
        let mut stack = vec![uri.clone()];
        while let Some(next) = stack.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            let Some(file) = self.file(&next) else {
                continue;
            };
            let own = file.module_name().to_string();
            let mut modules: Vec<String> = file
                .tree
                .imports
                .iter()
                .map(|import| import.module.name.clone())
                .collect();
            modules.extend(
                prelude::default_imports_for(&own).map(|import| import.module.name.clone()),
            );
            for module in &modules {
                if let Some(target) = self.state.module_file(module) {
                    stack.push(target.uri.clone());
                }
            }
        }
        let mut closure: Vec<FileUri> = seen.into_iter().collect();
        closure.sort();
        let closure = Arc::new(closure);
        self.closures
            .borrow_mut()
            .insert(uri.clone(), Arc::clone(&closure));
        closure
    }

    /// Inference result for a top-level value. `None` when the declaration
    /// does not exist, or is already being inferred further up the stack.
    pub(crate) fn inferred(&self, uri: &FileUri, name: &str) -> Option<Arc<InferredDecl>> {
        let key = (uri.clone(), name.to_string());
        if let Some(hit) = self.inferred.borrow().get(&key) {
            return Some(Arc::clone(hit));
        }
        if let Some(hit) = self.ws.decls.get(&key, &self.state) {
            return Some(hit);
        }
        let source = self.file(uri)?;
        let decl = source.tree.value_decl(name)?;
        let resolved = self.resolved(uri)?;

        if !self.in_progress.borrow_mut().insert(key.clone()) {
            self.fallbacks.set(self.fallbacks.get() + 1);
            tracing::debug!(uri = %uri, decl = name, "inference cycle");
            return None;
        }
        let fallbacks_before = self.fallbacks.get();
        tracing::debug!(uri = %uri, decl = name, "inferring declaration");
        let result = Arc::new(infer_decl(self, &resolved, &source, decl));
        self.in_progress.borrow_mut().remove(&key);

        // Results that saw a cycle fallback depend on where the cycle was
        // entered; they are kept for this session only.
        if self.fallbacks.get() == fallbacks_before {
            let stamp = Stamp::of(&self.state, self.import_closure(uri).iter().cloned());
            self.publish(&self.ws.decls, key.clone(), stamp, &result);
        }
        self.inferred.borrow_mut().insert(key, Arc::clone(&result));
        Some(result)
    }

    /// Type of a top-level value: its annotation if it has one.
    pub(crate) fn decl_type(&self, uri: &FileUri, name: &str) -> Option<Ty> {
        let source = self.file(uri)?;
        let decl = source.tree.value_decl(name)?;
        match &decl.annotation {
            Some(annotation) => {
                let resolved = self.resolved(uri)?;
                Some(annotation_type(self, &resolved, &annotation.ty))
            }
            None => self.inferred(uri, name).map(|d| d.ty.clone()),
        }
    }

    /// Every top-level value of a file with its type, in source order.
    pub(crate) fn file_types(&self, uri: &FileUri) -> Vec<(String, Ty)> {
        let Some(source) = self.file(uri) else {
            return Vec::new();
        };
        source
            .tree
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Value(value) => Some(value.name.name.clone()),
                _ => None,
            })
            .filter_map(|name| {
                let ty = self.decl_type(uri, &name)?;
                Some((name, ty))
            })
            .collect()
    }
}

impl TypeOracle for Session<'_> {
    fn source(&self, uri: &FileUri) -> Option<Arc<SourceFile>> {
        self.file(uri)
    }

    fn resolved(&self, uri: &FileUri) -> Option<Arc<ResolvedFile>> {
        Session::resolved(self, uri)
    }

    fn module_uri(&self, module: &str) -> Option<FileUri> {
        self.state.module_file(module).map(|f| f.uri.clone())
    }

    fn value_type(&self, def: &Definition) -> Option<Ty> {
        self.decl_type(&def.uri, &def.name)
    }
}
