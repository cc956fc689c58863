//! Language intelligence for Elm.
//!
//! The analysis core behind an editor integration: a forest of parsed
//! files, name binding, Hindley-Milner inference with extensible records,
//! tiered diagnostics, code actions and cross-file navigation. Everything
//! is reached through [`Workspace`], which is shared between request
//! handlers and answers every query from one consistent snapshot.
//!
//! # Architecture
//!
//! ```text
//! Forest (trees) → Binder (interfaces, scopes, references)
//!                → Inference (per declaration)
//!                → Diagnostics / Code actions / Queries
//! ```
//!
//! Derived facts are cached per file and stamped with the revisions of
//! every file they were computed from.

pub mod binder;
pub mod cache;
pub mod cancel;
pub mod code_actions;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod forest;
pub mod host;
pub mod infer;
pub mod prelude;
pub mod query;
pub mod workspace;

pub use cancel::CancellationToken;
pub use code_actions::{FixContext, FixProvider, FixRegistry};
pub use config::{AnalysisConfig, SuggestionConfig};
pub use error::{AnalysisError, HostError};
pub use forest::{Revision, Snapshot, SourceFile, SyntaxParser};
pub use host::{DiskHost, FileChange, FileSystemHost, InMemoryHost};
pub use infer::InferredDecl;
pub use query::Location;
pub use workspace::Workspace;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for debug output.
///
/// Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=elm_analysis=debug`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
