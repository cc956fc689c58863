//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::AnalysisError;

/// Shared flag a caller sets to stop a long-running request.
///
/// Workspace-wide operations check it between files and return
/// [`AnalysisError::Cancelled`]; nothing is published to the caches for
/// the file being worked on when the check fails.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> Result<(), AnalysisError> {
        if self.is_cancelled() {
            tracing::debug!("request cancelled");
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}
