use crate::error::FlockError;
use crate::geometry::Rect;
use crate::quadtree::{DEFAULT_BUCKET_CAPACITY, DEFAULT_MAX_DEPTH};
use crate::steering::SteeringParams;

/// Tuning of a [`Flock`](crate::Flock).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FlockConfig {
    /// Region the index covers each step. Grown on the fly to cover boids that left it.
    pub world: Rect,
    pub bucket_capacity: usize,
    pub max_depth: u32,
    /// Seconds per step.
    pub time_step: f32,
    pub steering: SteeringParams,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            world: Rect::new(960.0, 540.0, 960.0, 540.0),
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            time_step: 1.0 / 60.0,
            steering: SteeringParams::default(),
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<(), FlockError> {
        let w = &self.world;
        if !(w.x.is_finite() && w.y.is_finite()) {
            return Err(FlockError::InvalidConfig(format!(
                "world center ({}, {}) is not finite",
                w.x, w.y
            )));
        }
        if !(w.width.is_finite() && w.height.is_finite() && w.width > 0.0 && w.height > 0.0) {
            return Err(FlockError::InvalidConfig(format!(
                "world half-extents must be positive, got {} x {}",
                w.width, w.height
            )));
        }
        if self.bucket_capacity == 0 {
            return Err(FlockError::InvalidConfig(
                "bucket_capacity must be at least 1".to_owned(),
            ));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(FlockError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        self.steering.validate()
    }
}
