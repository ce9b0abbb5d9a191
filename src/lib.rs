//! Quadtree backed flocking.
//!
//! A point quadtree is rebuilt every simulation step from the agent positions and answers the
//! rectangle and circle queries the steering rules need, instead of scanning every pair of agents.
//!
//! # Contracts:
//! - Coordinates are finite `f32`s. Points outside the root region are rejected on insert.
//! - The index is read-only once built; it is discarded at the end of the step.
//!
pub mod config;
pub mod error;
pub mod flock;
pub mod geometry;
pub mod quadtree;
pub mod steering;

pub use config::FlockConfig;
pub use error::{FlockError, QuadtreeError};
pub use flock::{Boid, BoidId, Flock, StepStats};
pub use geometry::{Circle, Point, Rect, Shape};
pub use quadtree::{Quadrant, Quadtree};
pub use steering::{compute_steering, SteeringParams};

use std::ops::{Add, AddAssign, Deref, Div, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2(pub [f32; 2]);

impl AddAssign for Vec2 {
    fn add_assign(&mut self, v: Self) {
        self.0[0] += v.0[0];
        self.0[1] += v.0[1];
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, v: Self) {
        self.0[0] -= v.0[0];
        self.0[1] -= v.0[1];
    }
}

impl Deref for Vec2 {
    type Target = [f32; 2];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self([self.0[0] * rhs, self.0[1] * rhs])
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self([self.0[0] / rhs, self.0[1] / rhs])
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self([-self.0[0], -self.0[1]])
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Self(v)
    }
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2([0.0, 0.0]);

    pub fn new(x: f32, y: f32) -> Self {
        Self([x, y])
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }

    pub fn y(&self) -> f32 {
        self.0[1]
    }

    pub fn length_squared(&self) -> f32 {
        self[0] * self[0] + self[1] * self[1]
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self[0].is_finite() && self[1].is_finite()
    }
}
