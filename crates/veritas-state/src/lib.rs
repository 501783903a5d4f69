//! Veritas-State: storage adapters for Veritas records
//!
//! This crate provides the two places a record can be persisted and nothing
//! else: it has no opinion on which one to use for a given call.
//!
//! ## Key Components
//!
//! - `RemoteStore`: hosted document store, collections of JSON documents
//! - `SurrealRemoteStore`: SurrealDB implementation (memory, file or cloud)
//! - `LocalStore`: on-device key-value slots holding JSON strings
//! - `FsLocalStore`: one file per slot under a data directory
//! - `fakes`: in-memory implementations with fault injection for tests

mod error;
pub mod fakes;
mod fs_local;
pub mod storage_traits;
mod surreal_remote;

pub use error::{LocalError, RemoteError, RemoteErrorKind, StateError};
pub use fs_local::FsLocalStore;
pub use storage_traits::{
    Document, LocalResult, LocalStore, RemoteResult, RemoteStore, COLLECTIONS,
    CONFIGS_COLLECTION, RESULTS_COLLECTION, USERS_COLLECTION,
};
pub use surreal_remote::{
    Credentials, RemoteTarget, SignIn, SurrealRemoteStore, DEFAULT_DATABASE, DEFAULT_NAMESPACE,
};

/// Result type for connection setup
pub type Result<T> = std::result::Result<T, StateError>;
