use super::Quadtree;
use crate::geometry::{Circle, Point, Rect, Shape};

impl Quadtree {
    /// Append every stored point inside `shape` to `out`.
    ///
    /// Walks the tree with an explicit stack, so heavily clustered (deep) trees cannot overflow
    /// the call stack. Subtrees whose region misses the shape are skipped entirely. The order of
    /// the results is unspecified.
    pub fn query<S>(&self, shape: &S, out: &mut Vec<Point>)
    where
        S: Shape + ?Sized,
    {
        let mut stack = Vec::with_capacity(16);
        stack.push(self);

        while let Some(node) = stack.pop() {
            if !shape.overlaps(node) {
                continue;
            }

            for p in node.points.iter().chain(node.overflow.iter()) {
                if shape.contains(p) {
                    out.push(*p);
                }
            }

            if let Some(children) = node.children() {
                stack.extend(children.iter());
            }
        }
    }

    pub fn query_rect(&self, rect: &Rect) -> Vec<Point> {
        let mut out = Vec::new();
        self.query(rect, &mut out);
        out
    }

    pub fn query_circle(&self, circle: &Circle) -> Vec<Point> {
        let mut out = Vec::new();
        self.query(circle, &mut out);
        out
    }

    pub fn query_rect_into(&self, rect: &Rect, out: &mut Vec<Point>) {
        self.query(rect, out)
    }

    pub fn query_circle_into(&self, circle: &Circle, out: &mut Vec<Point>) {
        self.query(circle, out)
    }
}

/// Depth first iterator over the nodes of a subtree.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    stack: Vec<&'a Quadtree>,
}

impl<'a> Nodes<'a> {
    pub(super) fn new(root: &'a Quadtree) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Quadtree;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter());
        }
        Some(node)
    }
}
