//! Startup: warm the remote client and make sure an administrator exists.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use veritas_state::USERS_COLLECTION;

use crate::domain::{Account, DEFAULT_ADMIN_USERNAME};
use crate::error::Result;
use crate::obs;
use crate::store::RecordStore;

/// Handle on a started store.
///
/// With a remote client the administrator check runs in the background;
/// [`Bootstrap::wait`] joins it.
#[derive(Debug)]
pub struct Bootstrap {
    local_only: bool,
    seeded_locally: bool,
    admin_check: Option<JoinHandle<Result<bool>>>,
}

impl Bootstrap {
    /// Whether the store started without a remote client.
    pub fn is_local_only(&self) -> bool {
        self.local_only
    }

    /// Wait for the administrator check. Returns whether the default
    /// administrator was created.
    pub async fn wait(self) -> Result<bool> {
        match self.admin_check {
            None => Ok(self.seeded_locally),
            Some(handle) => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "administrator check task did not complete");
                    Ok(false)
                }
            },
        }
    }
}

impl RecordStore {
    /// Prepare the store for use.
    ///
    /// Without a remote client the remote path is closed and the default
    /// administrator is seeded into local storage if missing. Otherwise a
    /// warm-up read is fired and forgotten, the remote path is opened and
    /// the administrator check is spawned.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bootstrap(&self) -> Result<Bootstrap> {
        if self.is_offline() {
            warn!("remote client unavailable, running on local storage only");
            self.selector().mark_unavailable();
            let seeded_locally = self.seed_local_admin()?;
            return Ok(Bootstrap {
                local_only: true,
                seeded_locally,
                admin_check: None,
            });
        }

        if let Some(remote) = self.remote().cloned() {
            tokio::spawn(async move {
                if let Err(e) = remote.list(USERS_COLLECTION).await {
                    debug!(error = %e, "remote warm-up read failed");
                }
            });
        }

        self.selector().mark_available();

        let store = self.clone();
        let admin_check = tokio::spawn(async move { store.ensure_admin_exists().await });

        Ok(Bootstrap {
            local_only: false,
            seeded_locally: false,
            admin_check: Some(admin_check),
        })
    }

    /// Create the default administrator through the normal save path when
    /// there are no accounts at all.
    pub async fn ensure_admin_exists(&self) -> Result<bool> {
        let accounts = self.list_accounts().await;
        if !accounts.value.is_empty() {
            return Ok(false);
        }

        let served = self.save_account(Account::default_admin()).await?;
        obs::emit_admin_seeded(DEFAULT_ADMIN_USERNAME, !served.is_remote());
        info!(backend = %served.backend, "default administrator created");
        Ok(true)
    }

    fn seed_local_admin(&self) -> Result<bool> {
        let mut local = self.load_local::<Account>()?;
        if local.iter().any(|a| a.username == DEFAULT_ADMIN_USERNAME) {
            return Ok(false);
        }

        local.push(Account::default_admin());
        self.store_local(&local)?;
        obs::emit_admin_seeded(DEFAULT_ADMIN_USERNAME, true);
        Ok(true)
    }
}
