//! Bridge configuration
//!
//! Supplied once at startup and immutable afterwards. Every field has a
//! default matching the reference deployment, so an empty TOML file is a
//! valid configuration.
//!
//! ```toml
//! [vehicle]
//! id = 7
//!
//! [request]
//! host = "127.0.0.1"
//! port = 65432
//!
//! [broadcast]
//! address = "127.255.255.255"
//! port = 65431
//! period_ms = 1000
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use beacon_core::UNASSIGNED_ID;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// Request/response (TCP) endpoint
    #[serde(default)]
    pub request: RequestConfig,

    /// Periodic broadcast (UDP) target
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> BridgeResult<Self> {
        toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Check the configuration before any socket is acquired
    pub fn validate(&self) -> BridgeResult<()> {
        if self.broadcast.period_ms == 0 {
            return Err(BridgeError::Config(
                "broadcast.period_ms must be greater than zero".to_string(),
            ));
        }
        self.request_endpoint()?;
        self.broadcast_target()?;
        Ok(())
    }

    /// Resolved TCP listen address
    pub fn request_endpoint(&self) -> BridgeResult<SocketAddr> {
        resolve(&self.request.host, self.request.port, "request.host")
    }

    /// Resolved UDP broadcast destination
    pub fn broadcast_target(&self) -> BridgeResult<SocketAddr> {
        resolve(&self.broadcast.address, self.broadcast.port, "broadcast.address")
    }

    pub fn broadcast_period(&self) -> Duration {
        Duration::from_millis(self.broadcast.period_ms)
    }
}

fn resolve(host: &str, port: u16, field: &str) -> BridgeResult<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| BridgeError::Config(format!("Invalid {} '{}': {}", field, host, e)))?
        .next()
        .ok_or_else(|| BridgeError::Config(format!("{} '{}' resolved to no address", field, host)))
}

// =============================================================================
// Sections
// =============================================================================

/// Vehicle identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Identity reported by `RBID` and in every broadcast
    #[serde(default = "default_vehicle_id")]
    pub id: u32,
}

fn default_vehicle_id() -> u32 {
    UNASSIGNED_ID
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            id: default_vehicle_id(),
        }
    }
}

/// Request/response listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port (0 picks an ephemeral port)
    #[serde(default = "default_request_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_request_port() -> u16 {
    65432
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_request_port(),
        }
    }
}

/// Periodic position broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Destination address (subnet broadcast or unicast)
    #[serde(default = "default_broadcast_address")]
    pub address: String,

    /// Destination UDP port
    #[serde(default = "default_broadcast_port")]
    pub port: u16,

    /// Period between datagrams in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_broadcast_address() -> String {
    "127.255.255.255".to_string()
}

fn default_broadcast_port() -> u16 {
    65431
}

fn default_period_ms() -> u64 {
    1000
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            address: default_broadcast_address(),
            port: default_broadcast_port(),
            period_ms: default_period_ms(),
        }
    }
}
