//! Shared vehicle state
//!
//! A single [`VehicleState`] is created at bridge startup and shared by
//! reference between the pose/range producers (writers), the request server
//! and the broadcast emitter (readers). All fields live behind one
//! reader-writer lock so a reader always sees the result of the last
//! completed write as a whole.

use parking_lot::RwLock;
use tracing::warn;

use crate::pose::normalize_yaw;

/// Identity reported until a real vehicle id is assigned
pub const UNASSIGNED_ID: u32 = 0xFFFF;

/// 2D pose with heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Heading in radians, in (-π, π]
    pub yaw: f32,
}

impl Pose {
    pub const fn new(x: f32, y: f32, yaw: f32) -> Self {
        Self { x, y, yaw }
    }
}

/// Consistent copy of the vehicle state at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub id: u32,
    pub position: Pose,
    pub obstacle_detected: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            id: UNASSIGNED_ID,
            position: Pose::default(),
            obstacle_detected: false,
        }
    }
}

/// Thread-safe holder for the latest vehicle state
#[derive(Debug, Default)]
pub struct VehicleState {
    inner: RwLock<Snapshot>,
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current state as one self-consistent snapshot
    pub fn read(&self) -> Snapshot {
        *self.inner.read()
    }

    pub fn set_identity(&self, id: u32) {
        self.inner.write().id = id;
    }

    /// Replace the whole pose in one write
    ///
    /// Yaw is normalized into (-π, π]. A pose with a non-finite component is
    /// dropped and the previous pose is kept.
    pub fn set_position(&self, x: f32, y: f32, yaw: f32) {
        if !(x.is_finite() && y.is_finite() && yaw.is_finite()) {
            warn!(x, y, yaw, "Ignoring non-finite pose update");
            return;
        }
        let pose = Pose::new(x, y, normalize_yaw(yaw));
        self.inner.write().position = pose;
    }

    pub fn set_obstacle(&self, detected: bool) {
        self.inner.write().obstacle_detected = detected;
    }
}
