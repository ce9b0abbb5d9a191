//! Error types for the index and the flock.

use crate::flock::BoidId;
use thiserror::Error;

/// Errors raised while building or shaping a [`Quadtree`](crate::Quadtree).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadtreeError {
    /// Quadrants are numbered 0 to 3.
    #[error("invalid quadrant {0}, must be 0, 1, 2 or 3")]
    InvalidQuadrant(u8),

    /// A node must be able to hold at least one point.
    #[error("bucket capacity must be at least 1, got {0}")]
    InvalidBucketCapacity(usize),

    /// Half-extents must be finite and non-negative.
    #[error("invalid region half-extents {width} x {height}")]
    InvalidRegion { width: f32, height: f32 },

    /// The point lies outside the root region, or is not finite.
    #[error("point ({x}, {y}) is outside the indexed region")]
    OutOfBounds { x: f32, y: f32 },
}

/// Errors raised by the flock driver and the steering calculator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error("boid not found: {0}")]
    UnknownBoid(BoidId),

    #[error("invalid flock config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Index(#[from] QuadtreeError),
}
