//! Obstacle detection over laser range readings

/// Range below which a reading counts as an obstacle (meters)
pub const DEFAULT_OBSTACLE_THRESHOLD_M: f32 = 1.0;

/// Flags an obstacle when any valid range reading is closer than a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleDetector {
    threshold_m: f32,
}

impl Default for ObstacleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_OBSTACLE_THRESHOLD_M)
    }
}

impl ObstacleDetector {
    pub const fn new(threshold_m: f32) -> Self {
        Self { threshold_m }
    }

    pub const fn threshold(&self) -> f32 {
        self.threshold_m
    }

    /// Check one scan
    ///
    /// Non-finite and non-positive readings are treated as "no return" and
    /// never count as an obstacle.
    pub fn detect(&self, ranges: &[f32]) -> bool {
        ranges
            .iter()
            .any(|&r| r.is_finite() && r > 0.0 && r < self.threshold_m)
    }
}
