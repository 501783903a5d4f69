//! Structured observability hooks for backend routing.
//!
//! Events are emitted through `tracing`; field names are stable so log
//! pipelines can filter on `event`.

use tracing::{debug, info, warn};
use veritas_state::RemoteError;

/// Emit event: a remote call failed and the operation is served locally.
pub fn emit_remote_fallback(op: &str, kind: &str, err: &RemoteError) {
    warn!(
        event = "remote.fallback",
        op = %op,
        record = %kind,
        error_kind = %err.kind,
        error = %err.message,
        "remote store failed, serving from local storage"
    );
}

/// Emit event: a configuration failure closed the remote path.
pub fn emit_remote_disabled(err: &RemoteError) {
    warn!(
        event = "remote.disabled",
        error_kind = %err.kind,
        error = %err.message,
        "remote store disabled until reconnect"
    );
}

/// Emit event: the remote path was closed, so the call went straight to local.
pub fn emit_remote_skipped(op: &str, kind: &str, offline: bool) {
    debug!(event = "remote.skipped", op = %op, record = %kind, offline = offline);
}

/// Emit event: result of a reconnect probe.
pub fn emit_probe_result(success: bool, message: Option<&str>) {
    if success {
        info!(event = "remote.probe", success = true, message = message.unwrap_or(""));
    } else {
        warn!(event = "remote.probe", success = false, message = message.unwrap_or(""));
    }
}

/// Emit event: the default administrator was written.
pub fn emit_admin_seeded(username: &str, local_only: bool) {
    info!(event = "bootstrap.admin_seeded", username = %username, local_only = local_only);
}

/// Emit event: a backup replay finished.
pub fn emit_backup_imported(accounts: usize, skipped_accounts: usize, configs: usize, results: usize) {
    info!(
        event = "backup.imported",
        accounts = accounts,
        skipped_accounts = skipped_accounts,
        configs = configs,
        results = results,
    );
}
