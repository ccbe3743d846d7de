//! Bridge errors

use std::net::SocketAddr;

use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised by the telemetry bridge
///
/// Only [`BridgeError::Bind`] and [`BridgeError::Config`] are fatal. The
/// connection and send variants are logged and absorbed by the task that
/// hit them.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Could not acquire a listening or sending socket
    #[error("Failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// Client connection was reset, closed mid-request or otherwise failed
    #[error("Connection error: {0}")]
    Connection(#[source] std::io::Error),

    /// A broadcast datagram could not be sent
    #[error("Broadcast send to {target} failed: {source}")]
    Send {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bridge task panicked or was aborted
    #[error("Task failed: {0}")]
    Task(String),
}

impl BridgeError {
    pub(crate) fn bind(endpoint: impl ToString, source: std::io::Error) -> Self {
        Self::Bind {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    /// Whether the error must stop the bridge from starting
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bind { .. } | Self::Config(_))
    }
}
