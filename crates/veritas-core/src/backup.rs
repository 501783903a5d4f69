//! Whole-database export and best-effort replay.
//!
//! The envelope is a JSON object with `users`, `configs`, `results`,
//! `timestamp` (RFC 3339) and `source`. Import only looks at the three
//! record sections; anything else is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::domain::{Account, StudentResult, TeacherConfig};
use crate::error::Result;
use crate::obs;
use crate::store::RecordStore;

/// Backend that was authoritative when a backup was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupSource {
    RemoteStore,
    LocalStorage,
}

/// A full export of every record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub users: Vec<Account>,
    pub configs: Vec<TeacherConfig>,
    pub results: Vec<StudentResult>,
    pub timestamp: DateTime<Utc>,
    pub source: BackupSource,
}

/// Loosely-typed backup as read from disk; absent sections are skipped.
#[derive(Debug, Default, Deserialize)]
pub struct RawBackup {
    #[serde(default)]
    pub users: Option<Vec<Value>>,
    #[serde(default)]
    pub configs: Option<Vec<Value>>,
    #[serde(default)]
    pub results: Option<Vec<Value>>,
}

/// Counts from a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub accounts: usize,
    pub skipped_accounts: usize,
    pub configs: usize,
    pub results: usize,
}

impl RecordStore {
    /// Snapshot every record kind from whichever backend serves it.
    pub async fn export_all(&self) -> BackupEnvelope {
        let users = self.list_accounts().await.into_value();
        let configs = self.list_teacher_configs().await.into_value();
        let results = self.list_student_results().await.into_value();

        let source = if self.remote_path_open() {
            BackupSource::RemoteStore
        } else {
            BackupSource::LocalStorage
        };

        BackupEnvelope {
            users,
            configs,
            results,
            timestamp: Utc::now(),
            source,
        }
    }

    /// [`export_all`](Self::export_all) rendered as pretty-printed JSON.
    pub async fn export_json(&self) -> Result<String> {
        let envelope = self.export_all().await;
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Replay a backup file. Returns `false` on malformed input or when a
    /// config or result cannot be saved.
    pub async fn import_json(&self, json: &str) -> bool {
        let backup: RawBackup = match serde_json::from_str(json) {
            Ok(backup) => backup,
            Err(e) => {
                error!(error = %e, "invalid backup file");
                return false;
            }
        };

        match self.replay(backup).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "backup import aborted");
                false
            }
        }
    }

    /// Save every record in `backup`, one `save` per record.
    ///
    /// A bad account is logged and skipped; a bad config or result aborts
    /// the replay. Records saved before an abort stay saved.
    pub async fn replay(&self, backup: RawBackup) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for raw in backup.users.unwrap_or_default() {
            let saved = match serde_json::from_value::<Account>(raw) {
                Ok(account) => self.save_account(account).await.map(|_| ()),
                Err(e) => Err(e.into()),
            };
            match saved {
                Ok(()) => report.accounts += 1,
                Err(e) => {
                    warn!(error = %e, "skipping account from backup");
                    report.skipped_accounts += 1;
                }
            }
        }

        for raw in backup.configs.unwrap_or_default() {
            let config: TeacherConfig = serde_json::from_value(raw)?;
            self.save_teacher_config(config).await?;
            report.configs += 1;
        }

        for raw in backup.results.unwrap_or_default() {
            let result: StudentResult = serde_json::from_value(raw)?;
            self.save_student_result(result).await?;
            report.results += 1;
        }

        obs::emit_backup_imported(
            report.accounts,
            report.skipped_accounts,
            report.configs,
            report.results,
        );
        Ok(report)
    }
}
