//! beacon-bridge - Telemetry bridge for the racecar beacon
//!
//! Serves the vehicle's live state to remote consumers over two channels:
//!
//! - a single-client TCP request/response link ([`RequestServer`])
//! - a fixed-rate UDP broadcast ([`BroadcastEmitter`])
//!
//! # Architecture
//!
//! ```text
//!  pose / range producers
//!          │ StateUpdater
//!          ▼
//!  ┌───────────────────┐
//!  │   VehicleState    │  RwLock<Snapshot>
//!  └───────────────────┘
//!      │ read      │ read
//!      ▼           ▼
//!  RequestServer  BroadcastEmitter
//!   (tokio task)   (tokio task)
//!      │ TCP        │ UDP
//! ```
//!
//! Both tasks are owned by [`BridgeRuntime`], which starts them, stops them
//! through cancellation tokens, and joins them on shutdown.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod runtime;
pub mod server;

pub use broadcast::{BroadcastEmitter, EmitterStats};
pub use config::{BridgeConfig, BroadcastConfig, RequestConfig, VehicleConfig};
pub use error::{BridgeError, BridgeResult};
pub use runtime::{BridgeRuntime, BridgeStats, StateUpdater};
pub use server::{RequestServer, ServerStats};

// Re-export for convenience
pub use beacon_core::{Pose, Snapshot, VehicleState};
