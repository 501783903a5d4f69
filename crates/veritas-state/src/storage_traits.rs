//! Storage trait definitions for Veritas
//!
//! These traits define the two backends a record can live in:
//! - `RemoteStore`: hosted document store, organised in named collections
//! - `LocalStore`: on-device key-value slots holding string blobs
//!
//! In-memory fakes are provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LocalError, RemoteError};

/// Result type for remote-store operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Result type for local-store operations
pub type LocalResult<T> = std::result::Result<T, LocalError>;

/// Remote collection holding accounts, keyed by username
pub const USERS_COLLECTION: &str = "users";

/// Remote collection holding teacher configs, keyed by a derived id
pub const CONFIGS_COLLECTION: &str = "configs";

/// Remote collection holding student results, keyed by generated ids
pub const RESULTS_COLLECTION: &str = "results";

/// Every collection the remote store is expected to carry.
pub const COLLECTIONS: [&str; 3] = [USERS_COLLECTION, CONFIGS_COLLECTION, RESULTS_COLLECTION];

// ---------------------------------------------------------------------------
// RemoteStore
// ---------------------------------------------------------------------------

/// A document read back from a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier within its collection
    pub id: String,
    /// Document body
    pub data: Value,
}

/// Hosted document store.
///
/// Guarantees:
/// - `set(c, id, data)` overwrites any document with the same id.
/// - `add(c, data)` never overwrites; it returns a fresh id.
/// - `update(c, id, fields)` merges top-level fields into an existing
///   document and fails with `NotFound` when there is none.
/// - `delete(c, id)` is a no-op for missing documents.
/// - Listing order is store-defined.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read every document in a collection.
    async fn list(&self, collection: &str) -> RemoteResult<Vec<Document>>;

    /// Write a document under a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, data: Value) -> RemoteResult<()>;

    /// Append a document under a store-generated id.
    async fn add(&self, collection: &str, data: Value) -> RemoteResult<String>;

    /// Merge fields into an existing document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> RemoteResult<()>;

    /// Remove a document.
    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()>;
}

// ---------------------------------------------------------------------------
// LocalStore
// ---------------------------------------------------------------------------

/// On-device key-value storage for string blobs.
///
/// Calls are synchronous; a missing key reads as `None`.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> LocalResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> LocalResult<()>;

    /// Remove `key`. No-op if absent.
    fn remove(&self, key: &str) -> LocalResult<()>;
}
