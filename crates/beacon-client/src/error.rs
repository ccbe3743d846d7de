//! Client errors

use beacon_core::WireError;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection closed by beacon")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    Wire(#[from] WireError),
}
