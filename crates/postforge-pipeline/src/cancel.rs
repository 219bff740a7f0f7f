//! Cooperative run cancellation.
//!
//! A [`CancelFlag`] is shared between the transport (which trips it when the
//! originating session is torn down) and the orchestrator (which checks it at
//! every stage boundary). An in-flight external call is never aborted
//! mid-flight; the run stops before the next stage begins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
