//! Contact data structures for collision response.

use glam::{Mat3, Vec3};

use crate::collider::ShapeId;
use crate::composite::BodyId;
use crate::material::Material;
use crate::rigid_body::RigidBody;

/// A single contact point between two colliders.
///
/// The normal points from body2 toward body1, and `penetration` is always
/// `normal * depth`. Contacts live for one resolution cycle.
#[derive(Debug, Clone)]
pub struct Contact {
    /// Unit contact normal (from body2 to body1).
    pub normal: Vec3,
    /// Penetration vector (`normal * depth`).
    pub penetration: Vec3,
    /// Contact point in world space.
    pub point: Vec3,
    /// Relative velocity at the contact point (body1 minus body2).
    pub velocity: Vec3,
    pub shape1: ShapeId,
    pub shape2: ShapeId,
    /// Top-level composite of `shape1`.
    pub body1: BodyId,
    /// Top-level composite of `shape2`.
    pub body2: BodyId,
    /// Combined material of both colliders.
    pub material: Material,
    impulse: Vec3,
    solved: bool,
}

impl Contact {
    pub fn new(
        (shape1, body1): (ShapeId, BodyId),
        (shape2, body2): (ShapeId, BodyId),
        normal: Vec3,
        depth: f32,
        point: Vec3,
        velocity: Vec3,
        material: Material,
    ) -> Self {
        Self {
            normal,
            penetration: normal * depth,
            point,
            velocity,
            shape1,
            shape2,
            body1,
            body2,
            material,
            impulse: Vec3::ZERO,
            solved: false,
        }
    }

    /// Penetration depth (magnitude of the penetration vector).
    #[inline]
    pub fn depth(&self) -> f32 {
        self.penetration.length()
    }

    /// Replace the depth, keeping the normal.
    #[inline]
    pub fn set_depth(&mut self, depth: f32) {
        self.penetration = self.normal * depth;
    }

    /// Impulse to apply to body1 (body2 receives the opposite). Zero until solved.
    #[inline]
    pub fn impulse(&self) -> Vec3 {
        self.impulse
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Mark as solved with a fixed impulse.
    #[cfg(test)]
    pub(crate) fn presolved(mut self, impulse: Vec3) -> Self {
        self.impulse = impulse;
        self.solved = true;
        self
    }

    /// Compute the collision impulse. Solving an already solved contact is a no-op.
    ///
    /// The normal part is `-(1 + e) * v_n / (m1^-1 + m2^-1 + rotational terms)`,
    /// clamped to push only. Friction opposes the tangential velocity with
    /// `mu * j_n`, capped at the impulse that would stop tangential motion.
    pub fn solve(&mut self, body1: &SolverBody, body2: &SolverBody) {
        if self.solved {
            return;
        }

        let normal = self.normal;
        let impact_speed = self.velocity.dot(normal);
        let r1 = self.point - body1.position;
        let r2 = self.point - body2.position;

        let tangential = self.velocity - normal * impact_speed;
        let tangent = tangential.normalize_or_zero();

        let denominator = body1.inv_mass
            + body1.rotational_effect(r1, normal)
            + body2.inv_mass
            + body2.rotational_effect(r2, normal);
        let denominator_friction = body1.inv_mass
            + body1.rotational_effect(r1, tangent)
            + body2.inv_mass
            + body2.rotational_effect(r2, tangent);

        let normal_impulse = if denominator > 0.0 {
            (-(1.0 + self.material.restitution) * impact_speed / denominator).max(0.0)
        } else {
            0.0
        };

        let max_friction = if denominator_friction > 0.0 {
            tangential.length() / denominator_friction
        } else {
            0.0
        };
        let friction = (normal_impulse * self.material.friction)
            .min(max_friction)
            .max(0.0);

        self.impulse = normal * normal_impulse - tangent * friction;
        self.solved = true;
    }
}

/// Snapshot of the mass properties the contact solver needs from a body.
#[derive(Debug, Clone, Copy)]
pub struct SolverBody {
    pub position: Vec3,
    pub inv_mass: f32,
    /// World-space inverse inertia tensor.
    pub inv_inertia: Mat3,
}

impl SolverBody {
    pub fn from_body(rb: &RigidBody) -> Self {
        Self {
            position: rb.position,
            inv_mass: rb.inverse_mass(),
            inv_inertia: rb.inverse_inertia_world(),
        }
    }

    /// `dir . ((I^-1 (r x dir)) x r)`; zero when not finite (infinite mass).
    #[inline]
    fn rotational_effect(&self, r: Vec3, dir: Vec3) -> f32 {
        let effect = dir.dot((self.inv_inertia * r.cross(dir)).cross(r));
        if effect.is_finite() {
            effect
        } else {
            0.0
        }
    }
}
