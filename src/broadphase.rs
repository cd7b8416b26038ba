//! Broadphase: spatial index contract and a uniform-grid spatial hash.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::collider::{Aabb, ShapeId};

/// Colliders spanning more cells than this skip the grid and are tested
/// against every query instead (large terrain, ground boxes).
const MAX_CELLS_PER_SHAPE: i64 = 512;

/// Near-neighbor queries used to shortlist candidate pairs.
pub trait SpatialIndex {
    /// Colliders whose bounds are near `shape`. Never contains `shape` itself.
    fn query(&self, shape: ShapeId) -> Vec<ShapeId>;
}

/// Uniform grid hashing each collider's world AABB into cubic cells.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<ShapeId>>,
    bounds: Vec<Option<Aabb>>,
    oversized: Vec<ShapeId>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
            bounds: Vec::new(),
            oversized: Vec::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds.clear();
        self.oversized.clear();
    }

    /// Replace the whole index with a fresh set of bounds.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (ShapeId, Aabb)>) {
        self.clear();
        for (id, aabb) in entries {
            self.insert(id, aabb);
        }
    }

    pub fn insert(&mut self, id: ShapeId, aabb: Aabb) {
        if self.bounds.len() <= id.index() {
            self.bounds.resize(id.index() + 1, None);
        }
        self.bounds[id.index()] = Some(aabb);

        let (lo, hi) = self.cell_range(&aabb);
        let span = (hi - lo + IVec3::ONE).as_i64vec3();
        if span.x * span.y * span.z > MAX_CELLS_PER_SHAPE {
            self.oversized.push(id);
            return;
        }
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.cells.entry(IVec3::new(x, y, z)).or_default().push(id);
                }
            }
        }
    }

    #[inline]
    pub fn bounds(&self, id: ShapeId) -> Option<Aabb> {
        self.bounds.get(id.index()).copied().flatten()
    }

    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    fn cell_range(&self, aabb: &Aabb) -> (IVec3, IVec3) {
        (self.cell_of(aabb.min), self.cell_of(aabb.max))
    }
}

impl SpatialIndex for SpatialHash {
    fn query(&self, shape: ShapeId) -> Vec<ShapeId> {
        let Some(aabb) = self.bounds(shape) else {
            return Vec::new();
        };

        let mut candidates: Vec<ShapeId> = Vec::new();
        let (lo, hi) = self.cell_range(&aabb);
        let span = (hi - lo + IVec3::ONE).as_i64vec3();
        if span.x * span.y * span.z > MAX_CELLS_PER_SHAPE {
            // Oversized query: scan everything instead of walking the grid
            candidates.extend(
                (0..self.bounds.len() as u32)
                    .map(ShapeId)
                    .filter(|id| self.bounds(*id).is_some()),
            );
        } else {
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        if let Some(ids) = self.cells.get(&IVec3::new(x, y, z)) {
                            candidates.extend_from_slice(ids);
                        }
                    }
                }
            }
            candidates.extend_from_slice(&self.oversized);
        }

        candidates.sort_unstable();
        candidates.dedup();
        candidates.retain(|&other| {
            other != shape
                && self
                    .bounds(other)
                    .is_some_and(|other_aabb| other_aabb.overlaps(&aabb))
        });
        candidates
    }
}
