use crate::geometry::Point;
use arrayvec::ArrayVec;
use std::ops::Deref;

/// Bucket capacities up to this many points are stored inline in the node.
pub const INLINE_BUCKET_CAPACITY: usize = 16;

/// Points held directly by a node.
///
/// Small buckets live in the node itself. Larger capacities get a heap buffer reserved up front,
/// and an inline bucket that is pushed past its size moves to the heap.
#[derive(Debug, Clone)]
pub(super) enum Bucket {
    Inline(ArrayVec<[Point; INLINE_BUCKET_CAPACITY]>),
    Heap(Vec<Point>),
}

impl Bucket {
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity <= INLINE_BUCKET_CAPACITY {
            Bucket::Inline(ArrayVec::new())
        } else {
            Bucket::Heap(Vec::with_capacity(capacity))
        }
    }

    pub fn push(&mut self, point: Point) {
        if let Bucket::Inline(points) = self {
            if !points.is_full() {
                points.push(point);
                return;
            }
            let mut heap = Vec::with_capacity(INLINE_BUCKET_CAPACITY * 2);
            heap.extend(points.drain(..));
            *self = Bucket::Heap(heap);
        }
        if let Bucket::Heap(points) = self {
            points.push(point);
        }
    }
}

impl Deref for Bucket {
    type Target = [Point];

    fn deref(&self) -> &[Point] {
        match self {
            Bucket::Inline(points) => &points[..],
            Bucket::Heap(points) => &points[..],
        }
    }
}
