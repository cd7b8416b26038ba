//! Per-step registry of candidate collider pairs.

use std::collections::HashSet;

use crate::broadphase::SpatialIndex;
use crate::collider::ShapeId;

/// Canonical pair key (smaller id first).
#[inline]
pub fn pair_key(a: ShapeId, b: ShapeId) -> (ShapeId, ShapeId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Deduplicated set of unordered collider pairs, iterated in insertion order.
#[derive(Debug, Default, Clone)]
pub struct PairTracker {
    seen: HashSet<(ShapeId, ShapeId)>,
    pairs: Vec<(ShapeId, ShapeId)>,
}

impl PairTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair. Self-pairs and duplicates are ignored; returns whether
    /// the pair was new.
    pub fn add_pair(&mut self, a: ShapeId, b: ShapeId) -> bool {
        if a == b {
            return false;
        }
        let key = pair_key(a, b);
        if !self.seen.insert(key) {
            return false;
        }
        self.pairs.push(key);
        true
    }

    pub fn in_pairs(&self, a: ShapeId, b: ShapeId) -> bool {
        self.seen.contains(&pair_key(a, b))
    }

    /// Register a pair for every neighbor the index reports for `shape`.
    pub fn handle(&mut self, shape: ShapeId, index: &impl SpatialIndex) -> usize {
        index
            .query(shape)
            .into_iter()
            .filter(|&other| self.add_pair(shape, other))
            .count()
    }

    /// [`handle`](Self::handle) every shape that needs a broadphase refresh.
    pub fn handle_all(
        &mut self,
        shapes: impl IntoIterator<Item = ShapeId>,
        index: &impl SpatialIndex,
    ) -> usize {
        shapes
            .into_iter()
            .map(|shape| self.handle(shape, index))
            .sum()
    }

    /// Pairs in canonical order (lower id first).
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, ShapeId)> + '_ {
        self.pairs.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.pairs.clear();
    }
}
