use crate::flock::BoidId;
use crate::quadtree::Quadtree;
use crate::Vec2;

/// A position in the index, optionally tagged with the boid that placed it there.
///
/// The tag is a plain arena handle, it never keeps the boid alive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub owner: Option<BoidId>,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, owner: None }
    }

    pub fn with_owner(x: f32, y: f32, owner: BoidId) -> Self {
        Self {
            x,
            y,
            owner: Some(owner),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Inclusive on every edge.
    pub fn in_bounds(&self, xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> bool {
        xmin <= self.x && self.x <= xmax && ymin <= self.y && self.y <= ymax
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis aligned rectangle given by its center and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning `[xmin, xmax] x [ymin, ymax]`.
    pub fn from_bounds(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> Self {
        let width = (xmax - xmin) / 2.0;
        let height = (ymax - ymin) / 2.0;
        Self::new(xmin + width, ymin + height, width, height)
    }

    pub fn xmin(&self) -> f32 {
        self.x - self.width
    }

    pub fn xmax(&self) -> f32 {
        self.x + self.width
    }

    pub fn ymin(&self) -> f32 {
        self.y - self.height
    }

    pub fn ymax(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.in_bounds(self.xmin(), self.xmax(), self.ymin(), self.ymax())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(center[0], center[1], radius)
    }

    /// Compares squared distances, no square root is taken.
    pub fn contains(&self, p: &Point) -> bool {
        let dx = p.x - self.x;
        let dy = p.y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// A query region the index can be searched with.
///
/// `overlaps` is the coarse test used to prune whole subtrees, `contains` the exact test applied
/// to every stored point that survives pruning. `overlaps` must never reject a node holding a
/// point that `contains` would accept.
pub trait Shape {
    fn contains(&self, p: &Point) -> bool;
    fn overlaps(&self, node: &Quadtree) -> bool;
}

impl Shape for Rect {
    fn contains(&self, p: &Point) -> bool {
        Rect::contains(self, p)
    }

    fn overlaps(&self, node: &Quadtree) -> bool {
        node.intersects_rect(self.xmin(), self.xmax(), self.ymin(), self.ymax())
    }
}

impl Shape for Circle {
    fn contains(&self, p: &Point) -> bool {
        Circle::contains(self, p)
    }

    fn overlaps(&self, node: &Quadtree) -> bool {
        node.intersects_circle(self)
    }
}
