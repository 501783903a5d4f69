//! Error taxonomy for the record store.
//!
//! Remote-store failures never appear here: they are absorbed by the
//! record store and turned into a local fallback.

use veritas_state::{LocalError, StateError};

/// Business-rule violations, always surfaced to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("cannot remove the last director account")]
    LastDirector,
}

/// Errors produced by record-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("local storage error: {0}")]
    Local(#[from] LocalError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote store setup failed: {0}")]
    Remote(#[from] StateError),
}

impl StoreError {
    /// The domain error carried by this error, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for record-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_display_through_store_error() {
        let err = StoreError::from(DomainError::LastDirector);
        assert_eq!(err.to_string(), "cannot remove the last director account");
        assert_eq!(err.as_domain(), Some(&DomainError::LastDirector));
    }

    #[test]
    fn local_errors_are_not_domain_errors() {
        let err = StoreError::from(LocalError::InvalidKey("a/b".into()));
        assert!(err.as_domain().is_none());
    }
}
