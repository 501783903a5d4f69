//! Veritas Core Library
//!
//! Persists accounts, teacher quiz configs and student results. Every
//! operation tries the remote document store first and falls back to local
//! storage; the [`Served`] wrapper tells callers which backend answered.
//!
//! ```ignore
//! let store = veritas_core::open_store(&Settings::from_env()).await?;
//! store.bootstrap()?.wait().await?;
//! let accounts = store.list_accounts().await;
//! println!("{} accounts from {}", accounts.value.len(), accounts.backend);
//! ```

mod accounts;
mod assessments;
pub mod backup;
pub mod bootstrap;
pub mod domain;
pub mod error;
pub mod obs;
pub mod selector;
pub mod settings;
pub mod store;
pub mod telemetry;

pub use backup::{BackupEnvelope, BackupSource, ImportReport, RawBackup};
pub use bootstrap::Bootstrap;
pub use domain::{
    config_document_id, Account, Question, Record, Role, StudentResult, TeacherConfig,
};
pub use error::{DomainError, Result, StoreError};
pub use selector::BackendSelector;
pub use settings::{open_store, Settings};
pub use store::{Backend, Fallback, ProbeOutcome, RecordStore, Served, CACHED_MODE_MESSAGE};
pub use telemetry::init_tracing;
