//! Errors returned by workspace operations.
//!
//! Semantic problems in user code are diagnostics, never errors. These are
//! the failures of the operations themselves: a host that cannot read a
//! file, a cancelled request, a rename the target does not allow.

use elm_ir::FileUri;
use thiserror::Error;

/// Failure reported by a [`FileSystemHost`](crate::FileSystemHost).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("file not found: {0}")]
    NotFound(FileUri),
    #[error("cannot read {uri}: {source}")]
    Io {
        uri: FileUri,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request cancelled")]
    Cancelled,
    #[error("unknown file: {0}")]
    UnknownFile(FileUri),
    #[error("nothing to rename at this position")]
    NothingToRename,
    #[error("`{name}` is defined in a library module and cannot be renamed")]
    LibraryDefinition { name: String },
    #[error("`{new_name}` is not a valid {expected} name")]
    InvalidName {
        new_name: String,
        expected: &'static str,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Host(#[from] HostError),
}

impl AnalysisError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled)
    }
}
