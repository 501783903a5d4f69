//! Error types for veritas-state

use std::fmt;

use thiserror::Error;

/// Coarse classification of a remote-store failure.
///
/// Adapters translate vendor errors into one of these kinds at the boundary,
/// so callers never inspect message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// Document or collection not found
    NotFound,
    /// Database, namespace or table is absent on the server
    DoesNotExist,
    /// The storage service itself is not available to this client
    ServiceUnavailable,
    /// Transport failure (connection refused, reset, DNS)
    Network,
    /// The request did not complete in time
    Timeout,
    /// Authentication or authorization failure
    PermissionDenied,
    /// Anything else
    Other,
}

impl RemoteErrorKind {
    /// Whether this kind points at a broken configuration rather than a
    /// transient connectivity problem.
    pub fn is_configuration(self) -> bool {
        matches!(
            self,
            RemoteErrorKind::NotFound
                | RemoteErrorKind::DoesNotExist
                | RemoteErrorKind::ServiceUnavailable
        )
    }

    /// Stable lowercase label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteErrorKind::NotFound => "not-found",
            RemoteErrorKind::DoesNotExist => "does-not-exist",
            RemoteErrorKind::ServiceUnavailable => "service-unavailable",
            RemoteErrorKind::Network => "network",
            RemoteErrorKind::Timeout => "timeout",
            RemoteErrorKind::PermissionDenied => "permission-denied",
            RemoteErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote-store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("remote store {kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Other, message)
    }
}

impl From<surrealdb::Error> for RemoteError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        RemoteError::new(classify_message(&message), message)
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::other(format!("document encoding failed: {}", err))
    }
}

/// Map a SurrealDB error message onto a [`RemoteErrorKind`].
///
/// Errors that travel over the WebSocket protocol arrive as plain strings,
/// so the message is the only thing available here.
pub(crate) fn classify_message(message: &str) -> RemoteErrorKind {
    let lower = message.to_ascii_lowercase();

    if lower.contains("does not exist") {
        RemoteErrorKind::DoesNotExist
    } else if lower.contains("not found") || lower.contains("not-found") {
        RemoteErrorKind::NotFound
    } else if lower.contains("service unavailable") {
        RemoteErrorKind::ServiceUnavailable
    } else if lower.contains("timed out") || lower.contains("timeout") {
        RemoteErrorKind::Timeout
    } else if lower.contains("not allowed")
        || lower.contains("permission")
        || lower.contains("authentication")
        || lower.contains("invalid auth")
    {
        RemoteErrorKind::PermissionDenied
    } else if lower.contains("connection")
        || lower.contains("websocket")
        || lower.contains("connect")
        || lower.contains("broken pipe")
    {
        RemoteErrorKind::Network
    } else {
        RemoteErrorKind::Other
    }
}

/// Errors from the on-device key-value store
#[derive(Error, Debug)]
pub enum LocalError {
    /// Filesystem error
    #[error("local storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be used as a storage slot name
    #[error("invalid local storage key: {0:?}")]
    InvalidKey(String),
}

/// Errors raised while constructing a remote client
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_is_does_not_exist() {
        let kind = classify_message("The database 'school' does not exist");
        assert_eq!(kind, RemoteErrorKind::DoesNotExist);
        assert!(kind.is_configuration());
    }

    #[test]
    fn missing_table_is_does_not_exist() {
        assert_eq!(
            classify_message("The table 'users' does not exist"),
            RemoteErrorKind::DoesNotExist
        );
    }

    #[test]
    fn timeouts_are_not_configuration_errors() {
        let kind = classify_message("There was an error processing a remote request: timed out");
        assert_eq!(kind, RemoteErrorKind::Timeout);
        assert!(!kind.is_configuration());
    }

    #[test]
    fn connection_refused_is_network() {
        let kind = classify_message("Connection refused (os error 111)");
        assert_eq!(kind, RemoteErrorKind::Network);
        assert!(!kind.is_configuration());
    }

    #[test]
    fn http_unavailable_closes_the_remote_path() {
        let kind = classify_message("HTTP error: 503 Service Unavailable");
        assert_eq!(kind, RemoteErrorKind::ServiceUnavailable);
        assert!(kind.is_configuration());
    }

    #[test]
    fn generic_not_available_wording_is_not_a_configuration_error() {
        let kind = classify_message("The query result is not available yet");
        assert_eq!(kind, RemoteErrorKind::Other);
        assert!(!kind.is_configuration());
    }

    #[test]
    fn unknown_messages_are_other() {
        assert_eq!(classify_message("parse error near FROM"), RemoteErrorKind::Other);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = RemoteError::new(RemoteErrorKind::Timeout, "deadline elapsed");
        assert_eq!(err.to_string(), "remote store timeout: deadline elapsed");
    }
}
