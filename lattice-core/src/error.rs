//! Error types for LATTICE operations

use crate::identity::ReferenceKey;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Boxed cause returned by projection functions.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Fetch adapter failures. "Not found" is never one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {uri} failed: {reason}")]
    Request { uri: String, reason: String },

    #[error("Request to {uri} failed with status {status}: {message}")]
    Status {
        uri: String,
        status: u16,
        message: String,
    },

    #[error("Malformed response from {uri}: {reason}")]
    Malformed { uri: String, reason: String },

    #[error("Could not decode {expected} from {uri}: {reason}")]
    Decode {
        uri: String,
        expected: &'static str,
        reason: String,
    },
}

impl TransportError {
    /// The URI the failed request targeted.
    pub fn uri(&self) -> &str {
        match self {
            TransportError::Request { uri, .. }
            | TransportError::Status { uri, .. }
            | TransportError::Malformed { uri, .. }
            | TransportError::Decode { uri, .. } => uri,
        }
    }
}

/// A projection function failed to turn a raw entity into a client entity.
#[derive(Debug, Clone, Error)]
#[error("Transform to {target}{} failed: {source}", element_suffix(.index))]
pub struct TransformError {
    /// Type the projection was producing.
    pub target: &'static str,
    /// Position of the failing element when projecting a collection.
    pub index: Option<usize>,
    /// The original failure.
    pub source: Arc<dyn StdError + Send + Sync + 'static>,
}

impl TransformError {
    pub fn new(target: &'static str, index: Option<usize>, cause: impl Into<BoxError>) -> Self {
        Self {
            target,
            index,
            source: Arc::from(cause.into()),
        }
    }
}

fn element_suffix(index: &Option<usize>) -> String {
    index
        .map(|i| format!(" (element {i})"))
        .unwrap_or_default()
}

/// Cache strategy errors. None of these are retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache operation '{operation}' is unsupported: caching is disabled")]
    Unsupported { operation: &'static str },

    #[error("Cached value under {key} is not a {expected}")]
    TypeMismatch {
        key: ReferenceKey,
        expected: &'static str,
    },

    #[error("Cache storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },
}

/// Master error type for all LATTICE errors.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Transform(#[from] TransformError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution did not complete within {deadline:?}")]
    Timeout { deadline: Duration },

    #[error("Execution context has been shut down")]
    ShutDown,

    #[error("Blocking wait requested from inside the async execution context")]
    BlockingInAsyncContext,

    #[error("Execution runtime error: {reason}")]
    Runtime { reason: String },

    #[error("Resolution task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Flat discriminant of [`ClientError`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Transform,
    Cache,
    Config,
    Timeout,
    ShutDown,
    Misuse,
    Runtime,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Transform(_) => ErrorKind::Transform,
            ClientError::Cache(_) => ErrorKind::Cache,
            ClientError::Config(_) => ErrorKind::Config,
            ClientError::Timeout { .. } => ErrorKind::Timeout,
            ClientError::ShutDown => ErrorKind::ShutDown,
            ClientError::BlockingInAsyncContext => ErrorKind::Misuse,
            ClientError::Runtime { .. } | ClientError::TaskFailed { .. } => ErrorKind::Runtime,
        }
    }
}

/// Result type alias for LATTICE operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("title must not be empty")]
    struct EmptyTitle;

    #[test]
    fn test_transport_error_display_status() {
        let err = TransportError::Status {
            uri: "http://cd/Pages(PublicationId=1,ItemId=2)".to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("Pages(PublicationId=1,ItemId=2)"));
        assert_eq!(err.uri(), "http://cd/Pages(PublicationId=1,ItemId=2)");
    }

    #[test]
    fn test_transform_error_keeps_cause() {
        let err = TransformError::new("Page", None, EmptyTitle);
        assert!(format!("{}", err).contains("title must not be empty"));
        let source = StdError::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("title must not be empty"));
    }

    #[test]
    fn test_transform_error_names_element() {
        let err = TransformError::new("Keyword", Some(1), "bad depth");
        let msg = format!("{}", err);
        assert!(msg.contains("Keyword"));
        assert!(msg.contains("element 1"));
        assert!(msg.contains("bad depth"));
    }

    #[test]
    fn test_cache_error_display_unsupported() {
        let err = CacheError::Unsupported { operation: "get" };
        let msg = format!("{}", err);
        assert!(msg.contains("'get'"));
        assert!(msg.contains("disabled"));
    }

    #[test]
    fn test_client_error_from_variants() {
        let transport = ClientError::from(TransportError::Malformed {
            uri: "u".to_string(),
            reason: "not json".to_string(),
        });
        assert_eq!(transport.kind(), ErrorKind::Transport);

        let transform = ClientError::from(TransformError::new("Page", None, "boom"));
        assert_eq!(transform.kind(), ErrorKind::Transform);

        let cache = ClientError::from(CacheError::LockPoisoned);
        assert_eq!(cache.kind(), ErrorKind::Cache);

        let config = ClientError::from(ConfigError::MissingRequired {
            field: "webservice_location".to_string(),
        });
        assert_eq!(config.kind(), ErrorKind::Config);

        let timeout = ClientError::Timeout {
            deadline: Duration::from_millis(50),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(ClientError::BlockingInAsyncContext.kind(), ErrorKind::Misuse);
    }
}
