//! Point quadtree rebuilt once per simulation step.
//!
//! Every node keeps up to `bucket_capacity` points of its own. When a full leaf receives another
//! point it splits into four children and the new point descends into the one quadrant that
//! contains it. Points already held by the node stay where they are; the tree is never
//! rebalanced, it is thrown away and rebuilt instead.
mod bucket;
mod query;

pub use bucket::INLINE_BUCKET_CAPACITY;
pub use query::Nodes;

use crate::error::QuadtreeError;
use crate::geometry::{Circle, Point, Rect};
use crate::Vec2;
use bucket::Bucket;
use std::convert::TryFrom;
use std::fmt;
use tracing::trace;

pub const DEFAULT_BUCKET_CAPACITY: usize = 4;
/// Past this depth a full node stops splitting and spills into its overflow list.
/// Half-extents at depth 24 are below the precision of an f32 world coordinate anyway.
pub const DEFAULT_MAX_DEPTH: u32 = 24;

type Children = Option<Box<[Quadtree; 4]>>;

/// One of the four equal sub-regions of a node.
///
/// The discriminants are the child slots: 0 = (+x, -y), 1 = (-x, -y), 2 = (-x, +y), 3 = (+x, +y).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Quadrant {
    PosXNegY = 0,
    NegXNegY = 1,
    NegXPosY = 2,
    PosXPosY = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::PosXNegY,
        Quadrant::NegXNegY,
        Quadrant::NegXPosY,
        Quadrant::PosXPosY,
    ];

    /// Quadrant of `point` relative to the center `(x, y)`.
    /// A coordinate equal to the center goes to the negative side.
    pub fn of(x: f32, y: f32, point: &Point) -> Self {
        match (point.x > x, point.y > y) {
            (true, true) => Quadrant::PosXPosY,
            (true, false) => Quadrant::PosXNegY,
            (false, true) => Quadrant::NegXPosY,
            (false, false) => Quadrant::NegXNegY,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_pos_x(self) -> bool {
        matches!(self, Quadrant::PosXNegY | Quadrant::PosXPosY)
    }

    pub fn is_pos_y(self) -> bool {
        matches!(self, Quadrant::NegXPosY | Quadrant::PosXPosY)
    }
}

/// Checked conversion from a raw child slot.
///
/// Inside the tree children are always addressed through `Quadrant` itself, so a slot outside
/// 0..=3 cannot reach [`Quadtree::child_region`] or the split; this is the only place an invalid
/// index can surface, as [`QuadtreeError::InvalidQuadrant`].
impl TryFrom<u8> for Quadrant {
    type Error = QuadtreeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Quadrant::ALL
            .get(n as usize)
            .copied()
            .ok_or(QuadtreeError::InvalidQuadrant(n))
    }
}

#[derive(Debug, Clone)]
pub struct Quadtree {
    // center and half-extents
    x: f32,
    y: f32,
    width: f32,
    height: f32,

    // bounds as an AABB
    // children take the parent's center as their exact inner corner, so siblings never leave a gap
    from: Vec2,
    to: Vec2,

    bucket_capacity: usize,
    depth: u32,
    max_depth: u32,

    children: Children,

    points: Bucket,
    // only ever filled at `max_depth`
    overflow: Vec<Point>,
}

impl Quadtree {
    /// Leaf covering `x ± width`, `y ± height` with the default bucket capacity.
    ///
    /// Panics if the half-extents are negative or not finite, see [`Quadtree::with_capacity`] for
    /// the fallible version.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        assert!(width.is_finite() && width >= 0.0, "invalid width {}", width);
        assert!(height.is_finite() && height >= 0.0, "invalid height {}", height);
        Self::leaf(
            x,
            y,
            width,
            height,
            Vec2::new(x - width, y - height),
            Vec2::new(x + width, y + height),
            DEFAULT_BUCKET_CAPACITY,
            0,
            DEFAULT_MAX_DEPTH,
        )
    }

    pub fn with_capacity(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        bucket_capacity: usize,
    ) -> Result<Self, QuadtreeError> {
        if bucket_capacity == 0 {
            return Err(QuadtreeError::InvalidBucketCapacity(bucket_capacity));
        }
        let valid = |e: f32| e.is_finite() && e >= 0.0;
        if !valid(width) || !valid(height) || !x.is_finite() || !y.is_finite() {
            return Err(QuadtreeError::InvalidRegion { width, height });
        }
        let mut tree = Self::new(x, y, width, height);
        tree.bucket_capacity = bucket_capacity;
        tree.points = Bucket::with_capacity(bucket_capacity);
        Ok(tree)
    }

    pub fn from_rect(rect: &Rect, bucket_capacity: usize) -> Result<Self, QuadtreeError> {
        Self::with_capacity(rect.x, rect.y, rect.width, rect.height, bucket_capacity)
    }

    /// Tree over `[xmin, xmax] x [ymin, ymax]`, keeping the given edges exactly.
    pub fn from_bounds(
        xmin: f32,
        xmax: f32,
        ymin: f32,
        ymax: f32,
        bucket_capacity: usize,
    ) -> Result<Self, QuadtreeError> {
        let region = Rect::from_bounds(xmin, xmax, ymin, ymax);
        let mut tree = Self::from_rect(&region, bucket_capacity)?;
        tree.from = Vec2::new(xmin, ymin);
        tree.to = Vec2::new(xmax, ymax);
        Ok(tree)
    }

    /// Cap the depth of the tree. Only meaningful before the first insertion.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[allow(clippy::too_many_arguments)]
    fn leaf(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        from: Vec2,
        to: Vec2,
        bucket_capacity: usize,
        depth: u32,
        max_depth: u32,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            from,
            to,
            bucket_capacity,
            depth,
            max_depth,
            children: None,
            points: Bucket::with_capacity(bucket_capacity),
            overflow: Vec::new(),
        }
    }

    /// Build a tree over the smallest region containing every point.
    pub fn from_points<It>(it: It, bucket_capacity: usize) -> Result<Self, QuadtreeError>
    where
        It: IntoIterator<Item = Point>,
    {
        let mut min = [f32::INFINITY, f32::INFINITY];
        let mut max = [f32::NEG_INFINITY, f32::NEG_INFINITY];
        let points = it
            .into_iter()
            .map(|p| {
                min[0] = min[0].min(p.x);
                min[1] = min[1].min(p.y);
                max[0] = max[0].max(p.x);
                max[1] = max[1].max(p.y);
                p
            })
            .collect::<Vec<_>>();
        if points.is_empty() {
            min = [0.0, 0.0];
            max = [0.0, 0.0];
        }
        // calculate the minimum bounding box to speed up queries by having a more balanced tree
        let mut tree = Self::from_bounds(min[0], max[0], min[1], max[1], bucket_capacity)?;
        tree.extend(points)?;
        Ok(tree)
    }

    /// Insert every point, stopping at the first one outside the region.
    pub fn extend<It>(&mut self, it: It) -> Result<(), QuadtreeError>
    where
        It: IntoIterator<Item = Point>,
    {
        for p in it {
            self.insert(p)?;
        }
        Ok(())
    }

    /// Insert a point, subdividing the receiving leaf if it is full.
    ///
    /// Unlike a plain point quadtree, which stores whatever it is handed at the root, points
    /// outside the root region or with non-finite coordinates are rejected with
    /// [`QuadtreeError::OutOfBounds`] and the tree is left untouched. Callers indexing moving
    /// objects should size the root to cover them, as [`Flock::build_index`] does.
    ///
    /// [`Flock::build_index`]: crate::Flock::build_index
    pub fn insert(&mut self, point: Point) -> Result<(), QuadtreeError> {
        if !self.contains(&point) {
            return Err(QuadtreeError::OutOfBounds {
                x: point.x,
                y: point.y,
            });
        }
        self.insert_unchecked(point);
        Ok(())
    }

    fn insert_unchecked(&mut self, point: Point) {
        if self.children.is_none() {
            if self.points.len() < self.bucket_capacity {
                self.points.push(point);
                return;
            }
            if self.depth >= self.max_depth {
                if self.overflow.is_empty() {
                    trace!(
                        depth = self.depth,
                        x = self.x,
                        y = self.y,
                        "quadtree depth cap reached, spilling into overflow"
                    );
                }
                self.overflow.push(point);
                return;
            }
            self.split();
        }

        let quadrant = Quadrant::of(self.x, self.y, &point);
        match self.children.as_deref_mut() {
            Some(children) => children[quadrant.index()].insert_unchecked(point),
            None => unreachable!("node was split above"),
        }
    }

    fn split(&mut self) {
        assert!(self.children.is_none());
        trace!(
            depth = self.depth,
            x = self.x,
            y = self.y,
            "subdividing quadtree node"
        );

        let [q0, q1, q2, q3] = Quadrant::ALL;
        self.children = Some(Box::new([
            self.child(q0),
            self.child(q1),
            self.child(q2),
            self.child(q3),
        ]));
    }

    fn child(&self, quadrant: Quadrant) -> Self {
        let rect = self.child_region(quadrant);
        let (from_x, to_x) = if quadrant.is_pos_x() {
            (self.x, self.to[0])
        } else {
            (self.from[0], self.x)
        };
        let (from_y, to_y) = if quadrant.is_pos_y() {
            (self.y, self.to[1])
        } else {
            (self.from[1], self.y)
        };
        Self::leaf(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            Vec2::new(from_x, from_y),
            Vec2::new(to_x, to_y),
            self.bucket_capacity,
            self.depth + 1,
            self.max_depth,
        )
    }

    /// Region of the child in `quadrant`: half the half-extents, center offset by that much.
    pub fn child_region(&self, quadrant: Quadrant) -> Rect {
        let width = self.width / 2.0;
        let height = self.height / 2.0;
        let x = if quadrant.is_pos_x() {
            self.x + width
        } else {
            self.x - width
        };
        let y = if quadrant.is_pos_y() {
            self.y + height
        } else {
            self.y - height
        };
        Rect::new(x, y, width, height)
    }

    /// Return whether the point is within the bounds of this node
    pub fn contains(&self, point: &Point) -> bool {
        point.in_bounds(self.from[0], self.to[0], self.from[1], self.to[1])
    }

    pub fn intersects_rect(&self, xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> bool {
        if self.to[0] < xmin || self.from[0] > xmax {
            return false;
        }
        if self.to[1] < ymin || self.from[1] > ymax {
            return false;
        }
        true
    }

    /// Distance from the circle's center to the closest point of the region, compared squared.
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        let closest_x = self.from[0].max(circle.x.min(self.to[0]));
        let closest_y = self.from[1].max(circle.y.min(self.to[1]));
        let dx = circle.x - closest_x;
        let dy = circle.y - closest_y;
        dx * dx + dy * dy <= circle.radius * circle.radius
    }

    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&[Quadtree; 4]> {
        self.children.as_deref()
    }

    pub fn child_at(&self, quadrant: Quadrant) -> Option<&Quadtree> {
        self.children().map(|c| &c[quadrant.index()])
    }

    /// Points held directly by this node, excluding descendants.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points accepted after the depth cap was reached.
    pub fn overflow(&self) -> &[Point] {
        &self.overflow
    }

    pub fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Every node of the subtree, this one included.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Number of points in the subtree.
    pub fn len(&self) -> usize {
        self.nodes()
            .map(|n| n.points.len() + n.overflow.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes()
            .all(|n| n.points.is_empty() && n.overflow.is_empty())
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Deepest level present in the subtree, relative to the root of the whole tree.
    pub fn deepest(&self) -> u32 {
        self.nodes().map(|n| n.depth).max().unwrap_or(self.depth)
    }

    fn fmt_padded(&self, f: &mut fmt::Formatter<'_>, padding: usize) -> fmt::Result {
        let pad = "\t".repeat(padding);
        writeln!(
            f,
            "{}bounding box: {} - {}, {} - {}",
            pad, self.from[0], self.to[0], self.from[1], self.to[1]
        )?;
        write!(f, "{}points:", pad)?;
        if self.points.is_empty() && self.overflow.is_empty() {
            writeln!(f, " None")?;
        } else {
            writeln!(f)?;
            for (i, p) in self.points.iter().chain(self.overflow.iter()).enumerate() {
                write!(f, "{}\tpoint{}: {{ x: {}, y: {}", pad, i, p.x, p.y)?;
                match p.owner {
                    Some(owner) => writeln!(f, ", owner: {} }}", owner)?,
                    None => writeln!(f, " }}")?,
                }
            }
        }
        if let Some(children) = self.children() {
            writeln!(f, "{}subtrees:", pad)?;
            for child in children.iter() {
                child.fmt_padded(f, padding + 2)?;
            }
        }
        Ok(())
    }
}

/// Human readable dump of the regions and points of the tree, for diagnostics only.
impl fmt::Display for Quadtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_padded(f, 0)
    }
}
