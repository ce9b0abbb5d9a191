//! Boid arena and the per-step driver.
//!
//! Boids live in a `Vec` and are addressed by their slot, [`BoidId`]. The index stores those
//! handles, never the boids, so it can be dropped at the end of a step without touching them.
use crate::config::FlockConfig;
use crate::error::FlockError;
use crate::geometry::{Point, Rect};
use crate::quadtree::Quadtree;
use crate::steering::steer_with;
use crate::Vec2;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BoidId(pub u32);

impl BoidId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Boid {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStats {
    pub boids: usize,
    /// Boids that made it into the index, the rest had a non-finite position.
    pub indexed: usize,
    pub nodes: usize,
    pub depth: u32,
}

#[derive(Debug, Clone)]
pub struct Flock {
    config: FlockConfig,
    boids: Vec<Boid>,
}

impl Flock {
    pub fn new(config: FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;
        Ok(Self {
            config,
            boids: Vec::new(),
        })
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn spawn(&mut self, position: Vec2, velocity: Vec2) -> BoidId {
        let id = BoidId(self.boids.len() as u32);
        self.boids.push(Boid::new(position, velocity));
        id
    }

    pub fn get(&self, id: BoidId) -> Option<&Boid> {
        self.boids.get(id.index())
    }

    pub fn get_mut(&mut self, id: BoidId) -> Option<&mut Boid> {
        self.boids.get_mut(id.index())
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoidId, &Boid)> + '_ {
        self.boids
            .iter()
            .enumerate()
            .map(|(i, b)| (BoidId(i as u32), b))
    }

    /// The configured world, grown to cover every boid with a finite position.
    pub fn index_region(&self) -> Rect {
        let w = &self.config.world;
        let mut min = [w.xmin(), w.ymin()];
        let mut max = [w.xmax(), w.ymax()];
        for b in self.boids.iter().filter(|b| b.position.is_finite()) {
            min[0] = min[0].min(b.position[0]);
            min[1] = min[1].min(b.position[1]);
            max[0] = max[0].max(b.position[0]);
            max[1] = max[1].max(b.position[1]);
        }
        Rect::from_bounds(min[0], max[0], min[1], max[1])
    }

    /// Fresh index holding one point per boid, tagged with the boid's handle.
    pub fn build_index(&self) -> Result<Quadtree, FlockError> {
        let region = self.index_region();
        let mut index = Quadtree::from_bounds(
            region.xmin(),
            region.xmax(),
            region.ymin(),
            region.ymax(),
            self.config.bucket_capacity,
        )?
        .with_max_depth(self.config.max_depth);

        for (id, boid) in self.iter() {
            if !boid.position.is_finite() {
                warn!(
                    boid = %id,
                    position = ?boid.position,
                    "boid has a non-finite position, not indexed"
                );
                continue;
            }
            index.insert(Point::with_owner(boid.position[0], boid.position[1], id))?;
        }
        Ok(index)
    }

    /// Steering force of every boid, in arena order.
    pub fn compute_accelerations(&self, index: &Quadtree) -> Result<Vec<Vec2>, FlockError> {
        let mut scratch = Vec::new();
        (0..self.boids.len())
            .map(|i| {
                steer_with(
                    BoidId(i as u32),
                    &self.boids,
                    index,
                    &self.config.steering,
                    &mut scratch,
                )
            })
            .collect()
    }

    /// Advance the simulation by one time step.
    ///
    /// Positions move with the velocity from before the step, then the velocity picks up the
    /// new acceleration.
    pub fn step(&mut self) -> Result<StepStats, FlockError> {
        let index = self.build_index()?;
        let accelerations = self.compute_accelerations(&index)?;

        let dt = self.config.time_step;
        for (boid, acceleration) in self.boids.iter_mut().zip(accelerations) {
            boid.acceleration = acceleration;
            boid.position += boid.velocity * dt;
            boid.velocity += acceleration * dt;
        }

        let stats = StepStats {
            boids: self.boids.len(),
            indexed: index.len(),
            nodes: index.node_count(),
            depth: index.deepest(),
        };
        debug!(
            boids = stats.boids,
            indexed = stats.indexed,
            nodes = stats.nodes,
            depth = stats.depth,
            "flock step"
        );
        Ok(stats)
    }
}
