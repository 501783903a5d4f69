//! Record kinds persisted by the record store.
//!
//! Each kind says where it lives in both backends and how a new record
//! folds into the local copy of its collection.

pub mod account;
pub mod student_result;
pub mod teacher_config;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use account::{
    Account, Role, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
pub use student_result::StudentResult;
pub use teacher_config::{config_document_id, Question, TeacherConfig};

/// Local storage key for accounts
pub const USERS_KEY: &str = "veritas_users";

/// Local storage key for teacher configs
pub const CONFIGS_KEY: &str = "veritas_configs";

/// Local storage key for student results
pub const RESULTS_KEY: &str = "veritas_results";

/// How a record is addressed in its remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKey {
    /// Caller-derived id; writes overwrite the previous document.
    Fixed(String),
    /// Store-generated id; writes always append.
    Generated,
}

/// A record kind the store can persist.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human-readable kind, used in logs.
    const KIND: &'static str;
    /// Remote collection name.
    const COLLECTION: &'static str;
    /// Local storage key holding the JSON array of records.
    const LOCAL_KEY: &'static str;

    /// Remote document key for this record.
    fn document_key(&self) -> DocumentKey;

    /// Fold `self` into the local copy of the collection.
    fn merge_into(self, local: &mut Vec<Self>);
}
