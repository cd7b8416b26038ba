//! Height field terrain with a top and bottom surface.
//!
//! Heights are stored per grid sample in row-major order (Z-major):
//! `index = x + z * (width_segments + 1)`.
//!
//! Three coordinate spaces are involved:
//! - world space,
//! - terrain local space (the owning collider's frame, grid corner at the origin),
//! - heightmap space: `x` and `z` in grid units (`local / scale`), `y` unchanged.

use glam::Vec3;

use crate::error::{ensure_positive, PhysicsError, PhysicsResult};
use crate::triangle::Triangle;

/// Which surface of the terrain slab to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightLayer {
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct Heightfield {
    width_segments: u32,
    depth_segments: u32,
    top: Vec<f32>,
    bottom: Vec<f32>,
    /// World units per grid cell along X and Z.
    scale: f32,
}

impl Heightfield {
    /// Build a height field from explicit top and bottom sample grids.
    pub fn new(
        width_segments: u32,
        depth_segments: u32,
        top: Vec<f32>,
        bottom: Vec<f32>,
        scale: f32,
    ) -> PhysicsResult<Self> {
        ensure_positive("width segments", width_segments as f32)?;
        ensure_positive("depth segments", depth_segments as f32)?;
        ensure_positive("terrain scale", scale)?;

        let expected = (width_segments as usize + 1) * (depth_segments as usize + 1);
        for map in [&top, &bottom] {
            if map.len() != expected {
                return Err(PhysicsError::HeightmapSize {
                    width: width_segments,
                    depth: depth_segments,
                    expected,
                    actual: map.len(),
                });
            }
            if let Some(&bad) = map.iter().find(|h| !h.is_finite()) {
                return Err(PhysicsError::InvalidDimension {
                    field: "height",
                    value: bad,
                });
            }
        }

        Ok(Self {
            width_segments,
            depth_segments,
            top,
            bottom,
            scale,
        })
    }

    /// Terrain whose top and bottom surfaces coincide, sampled from `height(x, z)`.
    pub fn from_fn(
        width_segments: u32,
        depth_segments: u32,
        scale: f32,
        height: impl Fn(u32, u32) -> f32,
    ) -> PhysicsResult<Self> {
        let mut samples =
            Vec::with_capacity((width_segments as usize + 1) * (depth_segments as usize + 1));
        for z in 0..=depth_segments {
            for x in 0..=width_segments {
                samples.push(height(x, z));
            }
        }
        Self::new(
            width_segments,
            depth_segments,
            samples.clone(),
            samples,
            scale,
        )
    }

    /// Flat terrain at a constant height.
    pub fn flat(
        width_segments: u32,
        depth_segments: u32,
        height: f32,
        scale: f32,
    ) -> PhysicsResult<Self> {
        Self::from_fn(width_segments, depth_segments, scale, |_, _| height)
    }

    #[inline]
    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    #[inline]
    pub fn depth_segments(&self) -> u32 {
        self.depth_segments
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn inverse_scale(&self) -> f32 {
        1.0 / self.scale
    }

    /// Terrain-local extents (min corner is the origin).
    pub fn local_extents(&self) -> (Vec3, Vec3) {
        let (lo, hi) = self
            .top
            .iter()
            .chain(self.bottom.iter())
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        (
            Vec3::new(0.0, lo, 0.0),
            Vec3::new(
                self.width_segments as f32 * self.scale,
                hi,
                self.depth_segments as f32 * self.scale,
            ),
        )
    }

    #[inline]
    pub fn local_to_heightmap(&self, local: Vec3) -> Vec3 {
        Vec3::new(local.x / self.scale, local.y, local.z / self.scale)
    }

    #[inline]
    pub fn heightmap_to_local(&self, heightmap: Vec3) -> Vec3 {
        Vec3::new(heightmap.x * self.scale, heightmap.y, heightmap.z * self.scale)
    }

    /// Whether a heightmap-space position lies strictly inside the grid.
    #[inline]
    pub fn contains(&self, heightmap: Vec3) -> bool {
        heightmap.x > 0.0
            && heightmap.x < self.width_segments as f32
            && heightmap.z > 0.0
            && heightmap.z < self.depth_segments as f32
    }

    /// Clamp a heightmap-space position onto the grid.
    pub fn clamp_to_grid(&self, heightmap: Vec3) -> Vec3 {
        Vec3::new(
            heightmap.x.clamp(0.0, self.width_segments as f32),
            heightmap.y,
            heightmap.z.clamp(0.0, self.depth_segments as f32),
        )
    }

    /// Height sample at grid coordinates (clamped to bounds).
    pub fn sample(&self, layer: HeightLayer, x: u32, z: u32) -> f32 {
        let x = x.min(self.width_segments);
        let z = z.min(self.depth_segments);
        let index = (x + z * (self.width_segments + 1)) as usize;
        match layer {
            HeightLayer::Top => self.top[index],
            HeightLayer::Bottom => self.bottom[index],
        }
    }

    /// The two heightmap-space triangles of cell `(cell_x, cell_z)`, if it exists.
    ///
    /// The cell is split along the `(x1, z0)`-`(x0, z1)` diagonal; both
    /// triangles are wound so their normals point +Y.
    pub fn cell_triangles(
        &self,
        layer: HeightLayer,
        cell_x: i64,
        cell_z: i64,
    ) -> Option<[Triangle; 2]> {
        if cell_x < 0
            || cell_z < 0
            || cell_x >= self.width_segments as i64
            || cell_z >= self.depth_segments as i64
        {
            return None;
        }
        let (x0, z0) = (cell_x as u32, cell_z as u32);
        let (x1, z1) = (x0 + 1, z0 + 1);
        let vertex = |x: u32, z: u32| Vec3::new(x as f32, self.sample(layer, x, z), z as f32);

        Some([
            Triangle::new(vertex(x0, z0), vertex(x0, z1), vertex(x1, z0)),
            Triangle::new(vertex(x1, z0), vertex(x0, z1), vertex(x1, z1)),
        ])
    }

    /// Heightmap-space triangle under a heightmap-space position.
    pub fn triangle_at(&self, layer: HeightLayer, heightmap: Vec3) -> Option<Triangle> {
        let cell_x = heightmap.x.floor();
        let cell_z = heightmap.z.floor();
        let [lower, upper] = self.cell_triangles(layer, cell_x as i64, cell_z as i64)?;
        if (heightmap.x - cell_x) + (heightmap.z - cell_z) <= 1.0 {
            Some(lower)
        } else {
            Some(upper)
        }
    }

    /// Interpolated surface height at a heightmap-space position.
    pub fn height_at(&self, layer: HeightLayer, heightmap: Vec3) -> Option<f32> {
        self.triangle_at(layer, heightmap)?
            .height_at(heightmap.x, heightmap.z)
    }
}
