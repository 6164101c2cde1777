//! Run error type.

use thiserror::Error;

use vecsmoke_client::ClientError;
use vecsmoke_types::SmokeError;

/// Errors that abort a smoke-test run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Missing host, unreadable sample file, invalid settings
    #[error("{0}")]
    Config(#[from] SmokeError),

    /// Connection, request or remote failure
    #[error("{0}")]
    Client(#[from] ClientError),
}

impl RunError {
    /// Kind label for user-facing reports.
    pub fn kind(&self) -> String {
        match self {
            RunError::Config(_) => "ConfigError".to_string(),
            RunError::Client(e) => e.kind().to_string(),
        }
    }

    /// The client error, when the failure came from the store.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            RunError::Client(e) => Some(e),
            RunError::Config(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecsmoke_client::{ConnectionError, RequestError};

    #[test]
    fn test_kind_labels() {
        let config: RunError = SmokeError::Config("host is not set".to_string()).into();
        assert_eq!(config.kind(), "ConfigError");
        assert!(config.client_error().is_none());

        let conn: RunError = ClientError::from(ConnectionError::Closed).into();
        assert_eq!(conn.kind(), "ConnectionError");

        let req: RunError = ClientError::from(RequestError::Rejected("bad".to_string())).into();
        assert_eq!(req.kind(), "RequestError");
        assert_eq!(req.to_string(), "Request rejected: bad");
    }
}
