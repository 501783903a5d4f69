//! Runtime settings and store construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use veritas_state::{FsLocalStore, RemoteStore, RemoteTarget, SurrealRemoteStore};

use crate::error::Result;
use crate::store::RecordStore;

/// Environment variable naming the local data directory
pub const DATA_DIR_ENV: &str = "VERITAS_DATA_DIR";

/// Default local data directory
pub const DATA_DIR_DEFAULT: &str = ".veritas";

/// Where records live.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory for the local fallback store
    pub data_dir: PathBuf,
    /// Remote store to try first
    pub remote: RemoteTarget,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, remote: RemoteTarget) -> Self {
        Self {
            data_dir: data_dir.into(),
            remote,
        }
    }

    /// Read settings from the environment.
    ///
    /// Reads VERITAS_DATA_DIR (default ".veritas") and the SurrealDB
    /// variables understood by [`RemoteTarget::from_env`].
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DATA_DIR_DEFAULT.to_string());
        Self::new(data_dir, RemoteTarget::from_env())
    }

    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Drop the remote target; every operation goes to local storage.
    pub fn local_only(mut self) -> Self {
        self.remote = RemoteTarget::Disabled;
        self
    }
}

/// Build a record store from settings.
///
/// The local store must open. A remote client that fails to connect leaves
/// the store offline rather than failing.
pub async fn open_store(settings: &Settings) -> Result<RecordStore> {
    let local = FsLocalStore::new(&settings.data_dir)?;
    info!(data_dir = %settings.data_dir.display(), "local store ready");

    let remote: Option<Arc<dyn RemoteStore>> = if settings.remote.is_disabled() {
        info!("no remote store configured");
        None
    } else {
        match SurrealRemoteStore::connect(&settings.remote).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "remote store could not be constructed, running offline");
                None
            }
        }
    };

    Ok(RecordStore::new(remote, Arc::new(local)))
}
