//! beacon-client - Consumer side of the racecar beacon
//!
//! - [`RemoteClient`] - queries identity, position and obstacle flag over TCP
//! - [`VehicleTracker`] - receives the periodic UDP position broadcast
//!
//! # Example
//!
//! ```ignore
//! use beacon_client::RemoteClient;
//!
//! let mut client = RemoteClient::connect("10.0.0.42:65432").await?;
//! let pose = client.position().await?;
//! println!("x={:.3} y={:.3} yaw={:.3}", pose.x, pose.y, pose.yaw);
//! client.close().await?;
//! ```

pub mod client;
pub mod error;
pub mod tracker;

pub use client::RemoteClient;
pub use error::{ClientError, ClientResult};
pub use tracker::VehicleTracker;

// Re-export for convenience
pub use beacon_core::{BroadcastRecord, Pose, Reply, Request};
