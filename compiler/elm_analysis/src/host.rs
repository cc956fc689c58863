//! File-system host: the only source of text the workspace reads.
//!
//! The host layers open editor buffers over disk content; the workspace
//! neither knows nor cares which one a text came from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use elm_ir::FileUri;
use parking_lot::RwLock;

use crate::HostError;

pub trait FileSystemHost: Send + Sync {
    fn read_file(&self, uri: &FileUri) -> Result<String, HostError>;

    /// Every `.elm` file of the workspace.
    fn list_workspace_files(&self) -> Result<Vec<FileUri>, HostError>;
}

/// A change event reported by the host's watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileChange {
    Created(FileUri),
    Changed(FileUri),
    Deleted(FileUri),
}

impl FileChange {
    pub fn uri(&self) -> &FileUri {
        match self {
            FileChange::Created(uri) | FileChange::Changed(uri) | FileChange::Deleted(uri) => uri,
        }
    }
}

/// Host backed by a map, for tests and for editors that push every buffer.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    files: RwLock<BTreeMap<FileUri, String>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let host = Self::new();
        for (uri, text) in files {
            host.set(FileUri::new(uri), text);
        }
        host
    }

    pub fn set(&self, uri: FileUri, text: impl Into<String>) {
        self.files.write().insert(uri, text.into());
    }

    pub fn remove(&self, uri: &FileUri) -> bool {
        self.files.write().remove(uri).is_some()
    }
}

impl FileSystemHost for InMemoryHost {
    fn read_file(&self, uri: &FileUri) -> Result<String, HostError> {
        self.files
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| HostError::NotFound(uri.clone()))
    }

    fn list_workspace_files(&self) -> Result<Vec<FileUri>, HostError> {
        Ok(self.files.read().keys().cloned().collect())
    }
}

/// Host reading `.elm` files under a root directory.
#[derive(Clone, Debug)]
pub struct DiskHost {
    root: PathBuf,
}

impl DiskHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskHost { root: root.into() }
    }

    pub fn uri_for(path: &Path) -> FileUri {
        FileUri::new(format!("file://{}", path.display()))
    }

    fn path_for(uri: &FileUri) -> PathBuf {
        PathBuf::from(uri.as_str().strip_prefix("file://").unwrap_or(uri.as_str()))
    }

    fn walk(dir: &Path, out: &mut Vec<FileUri>) -> Result<(), HostError> {
        let io_error = |source| HostError::Io {
            uri: Self::uri_for(dir),
            source,
        };
        let mut entries = std::fs::read_dir(dir)
            .map_err(io_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)?;
        entries.sort_by_key(std::fs::DirEntry::path);
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            // Build output and package caches are not sources.
            if name.to_string_lossy().starts_with('.') || name == "elm-stuff" {
                continue;
            }
            if path.is_dir() {
                Self::walk(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "elm") {
                out.push(Self::uri_for(&path));
            }
        }
        Ok(())
    }
}

impl FileSystemHost for DiskHost {
    fn read_file(&self, uri: &FileUri) -> Result<String, HostError> {
        let path = Self::path_for(uri);
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => HostError::NotFound(uri.clone()),
            _ => HostError::Io {
                uri: uri.clone(),
                source,
            },
        })
    }

    fn list_workspace_files(&self) -> Result<Vec<FileUri>, HostError> {
        let mut out = Vec::new();
        Self::walk(&self.root, &mut out)?;
        Ok(out)
    }
}
