//! Revision-stamped fact caches.
//!
//! A fact is stored together with the revisions of every file it read and,
//! when it looked modules up by name, the structure revision. An entry is
//! valid for a forest state exactly when all of those still match; nothing
//! is ever invalidated eagerly.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use elm_ir::FileUri;

use crate::forest::{ForestState, Revision};

/// What a fact depended on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stamp {
    pub structure: Option<Revision>,
    pub deps: Vec<(FileUri, Revision)>,
}

impl Stamp {
    /// Depends on one file only.
    pub fn file(uri: &FileUri, revision: Revision) -> Self {
        Stamp {
            structure: None,
            deps: vec![(uri.clone(), revision)],
        }
    }

    /// Depends on `uris` as they are in `state`, and on its structure.
    pub fn of(state: &ForestState, uris: impl IntoIterator<Item = FileUri>) -> Self {
        let mut deps: Vec<(FileUri, Revision)> = uris
            .into_iter()
            .filter_map(|uri| state.revision(&uri).map(|rev| (uri, rev)))
            .collect();
        deps.sort();
        deps.dedup();
        Stamp {
            structure: Some(state.structure_revision()),
            deps,
        }
    }

    pub fn is_valid(&self, state: &ForestState) -> bool {
        self.structure
            .map_or(true, |rev| rev == state.structure_revision())
            && self
                .deps
                .iter()
                .all(|(uri, rev)| state.revision(uri) == Some(*rev))
    }
}

struct Entry<T> {
    stamp: Stamp,
    value: Arc<T>,
}

/// One kind of fact, keyed per file (or per file and declaration).
pub struct FactCache<K, T> {
    name: &'static str,
    entries: DashMap<K, Entry<T>>,
}

impl<K: Eq + Hash + Clone + std::fmt::Debug, T> FactCache<K, T> {
    pub fn new(name: &'static str) -> Self {
        FactCache {
            name,
            entries: DashMap::new(),
        }
    }

    /// The cached value, if it is valid for `state`.
    pub fn get(&self, key: &K, state: &ForestState) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        if entry.stamp.is_valid(state) {
            Some(Arc::clone(&entry.value))
        } else {
            tracing::trace!(cache = self.name, key = ?key, "stale entry");
            None
        }
    }

    /// Store a whole value. Callers check that `stamp` is still current
    /// before publishing.
    pub fn insert(&self, key: K, stamp: Stamp, value: Arc<T>) {
        self.entries.insert(key, Entry { stamp, value });
    }

    /// Drop every entry whose stamp mentions `uri`.
    pub fn forget(&self, uri: &FileUri) {
        self.entries
            .retain(|_, entry| !entry.stamp.deps.iter().any(|(dep, _)| dep == uri));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
