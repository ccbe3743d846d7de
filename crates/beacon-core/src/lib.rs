//! beacon-core - Vehicle state and wire format for the racecar beacon
//!
//! Shared building blocks used by both sides of the beacon link:
//!
//! - [`state`] - Thread-safe vehicle state snapshot (identity, pose, obstacle flag)
//! - [`wire`] - Fixed-size big-endian records for requests, replies and broadcasts
//! - [`pose`] - Helpers for pose producers (quaternion to yaw, yaw normalization)
//! - [`obstacle`] - Obstacle detection over laser range readings
//!
//! # Wire Format
//!
//! ```text
//! Request  (TCP, 4 bytes):   "RBID" | "RPOS" | "OBSF"
//! Reply    (TCP, 16 bytes):  payload (BE) + zero padding
//! Broadcast (UDP, 16 bytes): f32 x | f32 y | f32 yaw | u32 id
//! ```

pub mod error;
pub mod obstacle;
pub mod pose;
pub mod state;
pub mod wire;

pub use error::{WireError, WireResult};
pub use obstacle::{ObstacleDetector, DEFAULT_OBSTACLE_THRESHOLD_M};
pub use pose::{normalize_yaw, yaw_from_quaternion};
pub use state::{Pose, Snapshot, VehicleState, UNASSIGNED_ID};
pub use wire::{BroadcastRecord, Reply, Request, BROADCAST_LEN, REPLY_LEN, REQUEST_LEN};
