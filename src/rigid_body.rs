//! Rigid body state consumed and mutated by the collision core.
//!
//! Bodies are integrated by the caller; the collision step only reads poses
//! and velocities and writes back impulses ([`RigidBody::apply_impulse`]) and
//! position corrections ([`RigidBody::translate`]).

use glam::{Mat3, Quat, Vec3};

use crate::composite::BodyId;
use crate::error::{PhysicsError, PhysicsResult};

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable. Infinite mass.
    Static,
    /// Moved by its own velocity only. Infinite mass.
    Kinematic,
}

/// Pose, velocity and mass properties of one top-level body.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub position: Vec3,
    pub rotation: Quat,
    /// Pose at the start of the last integration step, used by swept tests.
    pub previous_position: Vec3,
    pub previous_rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Linear damping factor (default: 0.01).
    pub linear_damping: f32,
    /// Angular damping factor (default: 0.01).
    pub angular_damping: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
    mass: f32,
    inv_mass: f32,
    /// Inverse inertia tensor in body space.
    inv_inertia: Mat3,
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass.
    pub fn new_dynamic(mass: f32) -> Self {
        // Default inertia tensor: identity * mass (unit sphere approximation)
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Self {
            body_type: RigidBodyType::Dynamic,
            mass,
            inv_mass,
            inv_inertia: Mat3::from_diagonal(Vec3::splat(inv_mass)),
            linear_damping: 0.01,
            angular_damping: 0.01,
            gravity_scale: 1.0,
            ..Self::immovable(RigidBodyType::Dynamic)
        }
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self::immovable(RigidBodyType::Static)
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self::immovable(RigidBodyType::Kinematic)
    }

    fn immovable(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            previous_position: Vec3::ZERO,
            previous_rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 0.0,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            inv_inertia: Mat3::ZERO,
        }
    }

    /// Place the body, resetting the previous pose so the first swept test is a no-op.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.previous_position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self.previous_rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, linear_velocity: Vec3) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    /// Replace the body-space inertia tensor. Ignored for immovable bodies.
    ///
    /// A singular tensor yields zero inverse inertia (no rotational response).
    pub fn with_inertia(mut self, inertia: Mat3) -> Self {
        if self.body_type == RigidBodyType::Dynamic {
            self.inv_inertia = if inertia.determinant().abs() > f32::EPSILON {
                inertia.inverse()
            } else {
                Mat3::ZERO
            };
        }
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic && self.inv_mass > 0.0
    }

    /// Inverse inertia tensor rotated into world space: `R * I^-1 * R^T`.
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let r = Mat3::from_quat(self.rotation);
        r * self.inv_inertia * r.transpose()
    }

    /// Velocity of the material point currently at `point`.
    #[inline]
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Apply an instantaneous impulse at a world-space point.
    pub fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        let r = point - self.position;
        self.angular_velocity += self.inverse_inertia_world() * r.cross(impulse);
    }

    /// Shift the body without touching its velocity (position correction).
    pub fn translate(&mut self, delta: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.position += delta;
    }

    #[inline]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    #[inline]
    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Where a body-space point was before the last integration step.
    #[inline]
    pub fn previous_local_to_world(&self, local: Vec3) -> Vec3 {
        self.previous_position + self.previous_rotation * local
    }

    /// Semi-implicit Euler step. Records the previous pose first.
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        self.previous_position = self.position;
        self.previous_rotation = self.rotation;

        match self.body_type {
            RigidBodyType::Static => return,
            RigidBodyType::Dynamic => {
                if self.inv_mass <= 0.0 {
                    return;
                }
                self.linear_velocity += gravity * self.gravity_scale * dt;
                self.linear_velocity *= (1.0 - self.linear_damping).max(0.0);
                self.angular_velocity *= (1.0 - self.angular_damping).max(0.0);
            }
            RigidBodyType::Kinematic => {}
        }

        self.position += self.linear_velocity * dt;

        // q' = q + 0.5 * dt * omega_quat * q
        let omega = self.angular_velocity;
        if omega.length_squared() > 1e-10 {
            let omega_quat = Quat::from_xyzw(omega.x, omega.y, omega.z, 0.0);
            let q_dot = omega_quat * self.rotation * 0.5;
            self.rotation = Quat::from_xyzw(
                self.rotation.x + q_dot.x * dt,
                self.rotation.y + q_dot.y * dt,
                self.rotation.z + q_dot.z * dt,
                self.rotation.w + q_dot.w * dt,
            )
            .normalize();
        }
    }

    /// Boundary check: the core's math does not guard against NaN/inf input.
    pub fn check_finite(&self, body: BodyId) -> PhysicsResult<()> {
        let fields = [
            ("position", self.position.is_finite()),
            ("previous position", self.previous_position.is_finite()),
            ("rotation", self.rotation.is_finite()),
            ("linear velocity", self.linear_velocity.is_finite()),
            ("angular velocity", self.angular_velocity.is_finite()),
        ];
        match fields.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(PhysicsError::NonFiniteState { body, field }),
            None => Ok(()),
        }
    }
}
