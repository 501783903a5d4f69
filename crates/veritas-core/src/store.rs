//! Record store: routes every operation to the remote store or the local
//! fallback.
//!
//! ## Routing
//!
//! ```text
//! call ──► remote path open? ──no──► local ──► Served { Local, fallback }
//!                 │yes
//!                 ▼
//!          one remote call ──ok──► Served { Remote }
//!                 │err
//!                 ▼
//!          classify (may close path) ──► local ──► Served { Local, RemoteFailed }
//! ```
//!
//! A successful remote write is not mirrored locally.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use veritas_state::{
    Document, LocalStore, RemoteError, RemoteErrorKind, RemoteResult, RemoteStore,
    USERS_COLLECTION,
};

use crate::domain::{DocumentKey, Record};
use crate::error::Result;
use crate::obs;
use crate::selector::BackendSelector;

/// Message returned by a probe that could not reach the server but kept
/// the remote path open.
pub const CACHED_MODE_MESSAGE: &str = "operating in cached/offline mode";

/// Which backend served an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Remote,
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Remote => "remote",
            Backend::Local => "local",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation was served locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// No remote client could be constructed.
    Offline,
    /// An earlier configuration failure closed the remote path.
    RemoteDisabled,
    /// The remote call for this operation failed.
    RemoteFailed(RemoteError),
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fallback::Offline => f.write_str("remote client unavailable"),
            Fallback::RemoteDisabled => f.write_str("remote store disabled"),
            Fallback::RemoteFailed(err) => write!(f, "{}", err),
        }
    }
}

/// The outcome of an operation together with the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub value: T,
    pub backend: Backend,
    /// Set whenever `backend` is `Local`.
    pub fallback: Option<Fallback>,
}

impl<T> Served<T> {
    pub(crate) fn remote(value: T) -> Self {
        Self {
            value,
            backend: Backend::Remote,
            fallback: None,
        }
    }

    pub(crate) fn local(value: T, fallback: Fallback) -> Self {
        Self {
            value,
            backend: Backend::Local,
            fallback: Some(fallback),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.backend == Backend::Remote
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            value: f(self.value),
            backend: self.backend,
            fallback: self.fallback,
        }
    }
}

/// Result of [`RecordStore::probe_reconnect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ProbeOutcome {
    fn connected() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    fn cached() -> Self {
        Self {
            success: true,
            message: Some(CACHED_MODE_MESSAGE.to_string()),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Persists records to the remote store, falling back to local storage.
///
/// Cheap to clone; clones share the selector and both backends.
#[derive(Clone)]
pub struct RecordStore {
    remote: Option<Arc<dyn RemoteStore>>,
    local: Arc<dyn LocalStore>,
    selector: Arc<BackendSelector>,
}

impl RecordStore {
    /// Create a store with a fresh, optimistic selector.
    ///
    /// `remote` is `None` when the remote client could not be constructed.
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, local: Arc<dyn LocalStore>) -> Self {
        Self::with_selector(remote, local, Arc::new(BackendSelector::new()))
    }

    pub fn with_selector(
        remote: Option<Arc<dyn RemoteStore>>,
        local: Arc<dyn LocalStore>,
        selector: Arc<BackendSelector>,
    ) -> Self {
        Self {
            remote,
            local,
            selector,
        }
    }

    pub fn selector(&self) -> &Arc<BackendSelector> {
        &self.selector
    }

    /// True only when no remote client exists at all.
    pub fn is_offline(&self) -> bool {
        self.remote.is_none()
    }

    /// Whether the next operation would try the remote store first.
    pub fn remote_path_open(&self) -> bool {
        !self.is_offline() && self.selector.is_remote_available()
    }

    pub(crate) fn remote(&self) -> Option<&Arc<dyn RemoteStore>> {
        self.remote.as_ref()
    }

    /// Run one remote call if the remote path is open.
    ///
    /// On failure the error is classified before the fallback is returned.
    pub(crate) async fn attempt_remote<T, F, Fut>(
        &self,
        op: &'static str,
        kind: &'static str,
        call: F,
    ) -> std::result::Result<T, Fallback>
    where
        F: FnOnce(Arc<dyn RemoteStore>) -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let Some(remote) = self.remote.clone() else {
            obs::emit_remote_skipped(op, kind, true);
            return Err(Fallback::Offline);
        };
        if !self.selector.is_remote_available() {
            obs::emit_remote_skipped(op, kind, false);
            return Err(Fallback::RemoteDisabled);
        }

        match call(remote).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.selector.classify_failure(&err);
                obs::emit_remote_fallback(op, kind, &err);
                Err(Fallback::RemoteFailed(err))
            }
        }
    }

    /// Read the local copy of a collection. A missing key is an empty list.
    pub(crate) fn load_local<R: Record>(&self) -> Result<Vec<R>> {
        match self.local.get(R::LOCAL_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn store_local<R: Record>(&self, records: &[R]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.local.set(R::LOCAL_KEY, &raw)?;
        Ok(())
    }

    /// Read every record of kind `R`. Never fails.
    pub async fn list<R: Record>(&self) -> Served<Vec<R>> {
        let attempt = self
            .attempt_remote("list", R::KIND, |remote| async move {
                remote.list(R::COLLECTION).await
            })
            .await;

        match attempt {
            Ok(docs) => Served::remote(decode_documents(docs)),
            Err(fallback) => {
                let records = self.load_local::<R>().unwrap_or_else(|e| {
                    warn!(record = R::KIND, error = %e, "unreadable local collection, treating as empty");
                    Vec::new()
                });
                Served::local(records, fallback)
            }
        }
    }

    /// Persist one record of kind `R`.
    ///
    /// Remote writes use the record's document key; the local fallback
    /// applies the kind's merge policy.
    pub async fn save<R: Record>(&self, record: R) -> Result<Served<()>> {
        let data = serde_json::to_value(&record)?;
        let key = record.document_key();

        let attempt = self
            .attempt_remote("save", R::KIND, move |remote| async move {
                match key {
                    DocumentKey::Fixed(id) => remote.set(R::COLLECTION, &id, data).await,
                    DocumentKey::Generated => remote.add(R::COLLECTION, data).await.map(|_| ()),
                }
            })
            .await;

        match attempt {
            Ok(()) => Ok(Served::remote(())),
            Err(fallback) => {
                let mut local = self.load_local::<R>()?;
                record.merge_into(&mut local);
                self.store_local(&local)?;
                debug!(record = R::KIND, count = local.len(), "saved to local storage");
                Ok(Served::local((), fallback))
            }
        }
    }

    /// Re-enable the remote path and check that the server answers.
    ///
    /// Only a missing database closes the path again; any other failure is
    /// reported as cached mode with the path left open. Never fails.
    pub async fn probe_reconnect(&self) -> ProbeOutcome {
        let Some(remote) = self.remote.clone() else {
            let outcome = ProbeOutcome::failed("remote client failed to initialize");
            obs::emit_probe_result(outcome.success, outcome.message.as_deref());
            return outcome;
        };

        self.selector.mark_available();
        let outcome = match remote.list(USERS_COLLECTION).await {
            Ok(_) => ProbeOutcome::connected(),
            Err(err) if err.kind == RemoteErrorKind::DoesNotExist => {
                self.selector.mark_unavailable();
                ProbeOutcome::failed(format!(
                    "remote database not found (missing or misnamed database): {}",
                    err.message
                ))
            }
            Err(err) => {
                debug!(error = %err, "probe failed without a configuration error");
                ProbeOutcome::cached()
            }
        };

        obs::emit_probe_result(outcome.success, outcome.message.as_deref());
        outcome
    }
}

fn decode_documents<R: Record>(docs: Vec<Document>) -> Vec<R> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value::<R>(doc.data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(record = R::KIND, id = %doc.id, error = %e, "skipping undecodable remote document");
                None
            }
        })
        .collect()
}
