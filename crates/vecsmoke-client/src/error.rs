//! Error types for vector store clients.
//!
//! Every failure falls into one of three kinds:
//! - connection: the service could not be reached or refused the credential
//! - request: the request was malformed or does not fit the collection
//! - remote: the service rejected a well-formed request or failed itself

use std::fmt;

use thiserror::Error;
use vecsmoke_types::ValidationError;

/// Errors that can occur when talking to a vector store.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Service unreachable, credential rejected or timed out
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Malformed request or dimensionality mismatch
    #[error("{0}")]
    Request(#[from] RequestError),

    /// Server-side failure, surfaced verbatim
    #[error("{0}")]
    Remote(#[from] RemoteError),
}

/// Error kind label used in reports and exit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Request,
    Remote,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "ConnectionError"),
            ErrorKind::Request => write!(f, "RequestError"),
            ErrorKind::Remote => write!(f, "RemoteError"),
        }
    }
}

/// Failures reaching the service.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Host unreachable or transport failure
    #[error("Connection failed: {0}")]
    Unreachable(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Credential missing or rejected
    #[error("Authentication rejected: {0}")]
    Unauthorized(String),

    /// Endpoint URL could not be used
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Handle used after close
    #[error("Connection already closed")]
    Closed,
}

/// Client-side or server-detected malformed requests.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Failed local validation; nothing was sent
    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),

    /// Existing collection has different vector parameters
    #[error("Collection '{collection}' exists with {actual}, requested {expected}")]
    SchemaMismatch {
        collection: String,
        expected: String,
        actual: String,
    },

    /// Server reported the request as malformed
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Server-side failures for well-formed requests.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Collection already exists
    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    /// Collection or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Connection(_) => ErrorKind::Connection,
            ClientError::Request(_) => ErrorKind::Request,
            ClientError::Remote(_) => ErrorKind::Remote,
        }
    }

    /// Whether this is the "collection already exists" condition.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ClientError::Remote(RemoteError::AlreadyExists(_)))
    }

    /// Whether this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Connection(ConnectionError::Timeout(_)))
    }
}

impl From<ValidationError> for ClientError {
    fn from(e: ValidationError) -> Self {
        ClientError::Request(RequestError::Invalid(e))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ConnectionError::Timeout(e.to_string()).into()
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string()).into()
        } else if e.is_builder() {
            ConnectionError::InvalidEndpoint(e.to_string()).into()
        } else {
            ConnectionError::Unreachable(e.to_string()).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        let conn: ClientError = ConnectionError::Closed.into();
        let req: ClientError = RequestError::Rejected("bad".to_string()).into();
        let remote: ClientError = RemoteError::NotFound("c".to_string()).into();

        assert_eq!(conn.kind(), ErrorKind::Connection);
        assert_eq!(req.kind(), ErrorKind::Request);
        assert_eq!(remote.kind(), ErrorKind::Remote);
        assert_eq!(conn.kind().to_string(), "ConnectionError");
    }

    #[test]
    fn test_validation_error_is_request_error() {
        let err: ClientError = ValidationError::EmptyBatch.into();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.to_string(), "Invalid request: point batch is empty");
    }

    #[test]
    fn test_already_exists_predicate() {
        let err: ClientError = RemoteError::AlreadyExists("smoke".to_string()).into();
        assert!(err.is_already_exists());

        let other: ClientError = RemoteError::Server {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(!other.is_already_exists());
    }

    #[test]
    fn test_timeout_predicate() {
        let err: ClientError = ConnectionError::Timeout("search".to_string()).into();
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
