//! Pose helpers for producers
//!
//! Odometry sources report orientation as a unit quaternion; the beacon
//! only carries planar heading.

use std::f32::consts::{PI, TAU};

/// Extract the yaw (rotation about Z) from a unit quaternion `(x, y, z, w)`
///
/// Result is in (-π, π].
pub fn yaw_from_quaternion(x: f32, y: f32, z: f32, w: f32) -> f32 {
    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    normalize_yaw(siny_cosp.atan2(cosy_cosp))
}

/// Wrap an angle in radians into (-π, π]
///
/// Angles already in range are returned unchanged.
pub fn normalize_yaw(yaw: f32) -> f32 {
    if yaw > -PI && yaw <= PI {
        return yaw;
    }
    let wrapped = yaw.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
