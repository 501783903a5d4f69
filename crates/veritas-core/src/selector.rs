//! Backend selector: the one piece of cross-call memory in the store.
//!
//! Starts optimistic. Only configuration failures (missing database,
//! missing collection, service not available) close the remote path;
//! connectivity failures leave it open so the next call tries again.

use std::sync::atomic::{AtomicBool, Ordering};

use veritas_state::RemoteError;

use crate::obs;

/// Gate deciding whether operations try the remote store first.
///
/// Loads and stores are relaxed: two concurrent calls may both take the
/// remote path right after a disabling failure, costing one extra attempt.
#[derive(Debug)]
pub struct BackendSelector {
    remote_available: AtomicBool,
}

impl Default for BackendSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendSelector {
    pub fn new() -> Self {
        Self {
            remote_available: AtomicBool::new(true),
        }
    }

    pub fn is_remote_available(&self) -> bool {
        self.remote_available.load(Ordering::Relaxed)
    }

    pub fn mark_unavailable(&self) {
        self.remote_available.store(false, Ordering::Relaxed);
    }

    pub fn mark_available(&self) {
        self.remote_available.store(true, Ordering::Relaxed);
    }

    /// Record a remote failure. Returns `true` if it closed the remote path.
    pub fn classify_failure(&self, err: &RemoteError) -> bool {
        if err.kind.is_configuration() {
            self.mark_unavailable();
            obs::emit_remote_disabled(err);
            true
        } else {
            false
        }
    }
}
