//! Simulated pose and range producer
//!
//! Stands in for odometry and laser scan sources when no vehicle is attached.
//! Poses are produced as quaternions and converted the same way a real
//! odometry callback would.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

use beacon_bridge::StateUpdater;
use beacon_core::{yaw_from_quaternion, ObstacleDetector};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::SimulationConfig;

/// One simulated sensor sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    /// Orientation quaternion `(x, y, z, w)`
    pub orientation: [f32; 4],
    /// Range to the obstacle in meters
    pub range_m: f32,
}

/// Position on the circle `elapsed` seconds into the run
pub fn sample_at(config: &SimulationConfig, elapsed: f32) -> Sample {
    let theta = TAU * elapsed / config.lap_secs.max(f32::EPSILON);
    let x = config.radius_m * theta.cos();
    let y = config.radius_m * theta.sin();

    // Counter-clockwise travel: heading is tangent to the circle
    let half = (theta + FRAC_PI_2) / 2.0;
    let orientation = [0.0, 0.0, half.sin(), half.cos()];

    let [ox, oy] = config.obstacle;
    let range_m = ((ox - x).powi(2) + (oy - y).powi(2)).sqrt();

    Sample {
        x,
        y,
        orientation,
        range_m,
    }
}

/// Feed simulated samples into the bridge until `cancel` fires
pub async fn run(config: SimulationConfig, updates: StateUpdater, cancel: CancellationToken) {
    let rate_hz = config.rate_hz.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(1) / rate_hz);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let detector = ObstacleDetector::default();
    let start = Instant::now();
    let mut last_obstacle = None;

    info!(
        rate_hz,
        radius_m = config.radius_m,
        lap_secs = config.lap_secs,
        "Simulated producer started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let sample = sample_at(&config, start.elapsed().as_secs_f32());
        let [qx, qy, qz, qw] = sample.orientation;
        updates.set_position(sample.x, sample.y, yaw_from_quaternion(qx, qy, qz, qw));

        let obstacle = detector.detect(&[sample.range_m]);
        updates.set_obstacle(obstacle);
        if last_obstacle != Some(obstacle) {
            debug!(obstacle, range_m = sample.range_m, "Obstacle state changed");
            last_obstacle = Some(obstacle);
        }
    }

    info!("Simulated producer stopped");
}
