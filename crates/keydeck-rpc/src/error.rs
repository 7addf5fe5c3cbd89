//! Error types for the keydeck-rpc crate.

use keydeck_core::{ConfigurationError, PublishError};
use tokio_tungstenite::tungstenite;

/// Launch arguments that could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Missing or malformed flags, and `--help`/`--version` requests.
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("Invalid -info JSON: {0}")]
    Info(#[source] serde_json::Error),
}

/// Failures that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },

    #[error("Failed to register plugin: {0}")]
    Register(#[from] PublishError),

    #[error("Invalid plugin setup: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Read error: {0}")]
    Read(#[source] Box<tungstenite::Error>),
}

pub type Result<T> = std::result::Result<T, ConnectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display_connect() {
        let err = ConnectionError::Connect {
            url: "ws://127.0.0.1:1".to_string(),
            source: Box::new(tungstenite::Error::ConnectionClosed),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to connect to ws://127.0.0.1:1"));
    }

    #[test]
    fn test_connection_error_from_publish() {
        let err: ConnectionError = PublishError::Closed.into();
        assert_eq!(err.to_string(), "Failed to register plugin: Connection closed");
    }

    #[test]
    fn test_connection_error_from_configuration() {
        let err: ConnectionError = ConfigurationError::DuplicateAction("a1".into()).into();
        assert_eq!(
            err.to_string(),
            "Invalid plugin setup: Duplicate action UUID: a1"
        );
    }

    #[test]
    fn test_config_error_display_info() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::Info(source);
        assert!(err.to_string().starts_with("Invalid -info JSON"));
    }
}
