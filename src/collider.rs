//! Collider shapes, their flags, and world-space pose helpers.

use bitflags::bitflags;
use glam::{Mat3, Quat, Vec3};

use crate::composite::BodyId;
use crate::error::{ensure_positive, PhysicsError, PhysicsResult};
use crate::heightfield::Heightfield;
use crate::material::Material;
use crate::rigid_body::RigidBody;
use crate::triangle::Triangle;

/// Index of a collider inside a [`CollisionWorld`](crate::world::CollisionWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u32);

impl ShapeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shape kind tag. The declaration order is the dispatch order: the
/// narrowphase always passes the lower kind first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Sphere,
    Terrain,
    Box,
    Point,
    Triangle,
}

/// Collider shape in the collider's local frame.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Terrain(Heightfield),
    Point,
    Triangle(Triangle),
}

impl Shape {
    /// Box from full width (X), height (Y) and depth (Z).
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Box {
            half_extents: Vec3::new(width, height, depth) * 0.5,
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Terrain(_) => ShapeKind::Terrain,
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Point => ShapeKind::Point,
            Shape::Triangle(_) => ShapeKind::Triangle,
        }
    }

    /// Reject dimensions the narrowphase cannot handle.
    pub fn validate(&self) -> PhysicsResult<()> {
        match self {
            Shape::Sphere { radius } => ensure_positive("radius", *radius).map(|_| ()),
            Shape::Box { half_extents } => {
                ensure_positive("box half extent x", half_extents.x)?;
                ensure_positive("box half extent y", half_extents.y)?;
                ensure_positive("box half extent z", half_extents.z)?;
                Ok(())
            }
            Shape::Triangle(t) => {
                if let Some(v) = [t.a, t.b, t.c].into_iter().find(|v| !v.is_finite()) {
                    return Err(PhysicsError::InvalidDimension {
                        field: "triangle vertex",
                        value: v.x + v.y + v.z,
                    });
                }
                Ok(())
            }
            // Validated when the heightfield was built.
            Shape::Terrain(_) | Shape::Point => Ok(()),
        }
    }
}

bitflags! {
    /// Per-collider behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShapeFlags: u8 {
        /// Never moved by contacts; pairs of two static colliders are skipped.
        const STATIC = 1 << 0;
        /// Contributes to the body's center of mass when it is recomputed.
        const CENTER_OF_MASS = 1 << 1;
    }
}

/// A shape attached to a composite body.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: Shape,
    /// Owning top-level body (the "max parent"). Non-owning back-reference.
    pub body: BodyId,
    /// Offset from the body's origin, in body space.
    pub offset: Vec3,
    /// Rotation relative to the body.
    pub rotation: Quat,
    pub flags: ShapeFlags,
    pub material: Material,
}

impl Collider {
    /// Collider centered on its body. The owner is assigned when attached.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            body: BodyId(0),
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            flags: ShapeFlags::empty(),
            material: Material::default(),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_flags(mut self, flags: ShapeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(ShapeFlags::STATIC)
    }
}

/// A collider seen together with its owning body's current state.
#[derive(Debug, Clone, Copy)]
pub struct ColliderView<'a> {
    pub id: ShapeId,
    pub collider: &'a Collider,
    pub body: &'a RigidBody,
}

impl<'a> ColliderView<'a> {
    #[inline]
    pub fn shape(&self) -> &'a Shape {
        &self.collider.shape
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.collider.kind()
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.local_to_world(self.collider.offset)
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.body.rotation * self.collider.rotation
    }

    #[inline]
    pub fn previous_position(&self) -> Vec3 {
        self.body.previous_local_to_world(self.collider.offset)
    }

    #[inline]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position() + self.rotation() * local
    }

    #[inline]
    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * (world - self.position())
    }

    /// Velocity of the owning body sampled at a world-space point.
    #[inline]
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.body.velocity_at_point(point)
    }

    /// World-space AABB for broadphase queries.
    ///
    /// Spheres cover their whole path since the previous pose so the swept
    /// sphere-box test gets to see boxes they passed through.
    pub fn world_aabb(&self) -> Aabb {
        let center = self.position();
        let rotation = Mat3::from_quat(self.rotation());
        match self.shape() {
            Shape::Sphere { radius } => {
                let previous = self.previous_position();
                Aabb {
                    min: center.min(previous) - Vec3::splat(*radius),
                    max: center.max(previous) + Vec3::splat(*radius),
                }
            }
            Shape::Box { half_extents } => aabb_from_extents(center, *half_extents, rotation),
            Shape::Terrain(heightfield) => {
                let (min, max) = heightfield.local_extents();
                let half = (max - min) * 0.5;
                let local_center = (min + max) * 0.5;
                aabb_from_extents(self.local_to_world(local_center), half, rotation)
            }
            Shape::Point => Aabb {
                min: center,
                max: center,
            },
            Shape::Triangle(t) => {
                let world = t.map(|v| self.local_to_world(v));
                Aabb {
                    min: world.a.min(world.b).min(world.c),
                    max: world.a.max(world.b).max(world.c),
                }
            }
        }
    }
}

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Test whether two AABBs overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Compute world-space AABB from half-extents and a rotation about `center`.
#[inline]
fn aabb_from_extents(center: Vec3, half_extents: Vec3, rotation: Mat3) -> Aabb {
    // For each world axis, compute the extent by projecting the local box axes
    let extent = rotation.x_axis.abs() * half_extents.x
        + rotation.y_axis.abs() * half_extents.y
        + rotation.z_axis.abs() * half_extents.z;

    Aabb {
        min: center - extent,
        max: center + extent,
    }
}
