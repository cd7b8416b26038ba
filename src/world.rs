//! Collision world: owns the body arena and runs the detect/resolve cycle.
//!
//! # Pipeline
//!
//! [`CollisionWorld::step`] runs one cycle over the current body state:
//!
//! 1. Validate body state (non-finite poses are rejected)
//! 2. Rebuild the spatial hash from world AABBs
//! 3. Query neighbors of every non-static collider into the pair tracker
//! 4. Narrowphase each unique pair
//! 5. Aggregate: weighted impulses, then weighted position correction
//! 6. Clear pairs and contacts
//!
//! Integrating bodies is the caller's job; [`CollisionWorld::integrate`] is a
//! plain semi-implicit Euler pass for callers without their own integrator.

use glam::Vec3;

use crate::broadphase::SpatialHash;
use crate::collider::{Collider, ColliderView, Shape, ShapeFlags, ShapeId};
use crate::composite::{BodyId, Composite};
use crate::contact::Contact;
use crate::error::{PhysicsError, PhysicsResult};
use crate::narrowphase::detect_collision;
use crate::narrowphase::terrain::terrain_point;
use crate::pairs::PairTracker;
use crate::rigid_body::{RigidBody, RigidBodyType};
use crate::solver::ContactAggregator;

/// Configuration for the collision world.
#[derive(Debug, Clone)]
pub struct CollisionConfig {
    /// Gravity used by [`CollisionWorld::integrate`]. Default: (0, -9.81, 0).
    pub gravity: Vec3,
    /// Fraction of the step backed off from the swept sphere-box time of
    /// impact. Default: 0.001.
    pub toi_backoff: f32,
    /// Maximum triangle contacts kept per terrain pair. Default: 3.
    pub terrain_manifold_size: usize,
    /// Fraction of the sphere radius added to its terrain center probe.
    /// Default: 0.5.
    pub terrain_probe_bias: f32,
    /// Probe the eight corners of a box against terrain instead of its
    /// center. Default: false.
    pub terrain_box_corner_probes: bool,
    /// Spatial hash cell size in world units. Default: 4.0.
    pub spatial_cell_size: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            toi_backoff: 0.001,
            terrain_manifold_size: 3,
            terrain_probe_bias: 0.5,
            terrain_box_corner_probes: false,
            spatial_cell_size: 4.0,
        }
    }
}

/// What one [`CollisionWorld::step`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Unique collider pairs sent to the narrowphase.
    pub pairs: usize,
    /// Contacts produced by the narrowphase.
    pub contacts: usize,
    /// Composites that received an impulse and correction.
    pub bodies: usize,
}

pub struct CollisionWorld {
    config: CollisionConfig,
    bodies: Vec<Composite>,
    colliders: Vec<Collider>,
    index: SpatialHash,
    pairs: PairTracker,
    contacts: Vec<Contact>,
    aggregator: ContactAggregator,
}

fn view<'a>(colliders: &'a [Collider], bodies: &'a [Composite], id: ShapeId) -> ColliderView<'a> {
    let collider = &colliders[id.index()];
    ColliderView {
        id,
        collider,
        body: &bodies[collider.body.index()].body,
    }
}

impl CollisionWorld {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            index: SpatialHash::new(config.spatial_cell_size),
            config,
            bodies: Vec::new(),
            colliders: Vec::new(),
            pairs: PairTracker::new(),
            contacts: Vec::new(),
            aggregator: ContactAggregator::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Add a top-level body. Dynamic bodies need a finite positive mass.
    pub fn add_body(&mut self, body: RigidBody) -> PhysicsResult<BodyId> {
        let id = BodyId(self.bodies.len() as u32);
        let mass = body.mass();
        if body.body_type == RigidBodyType::Dynamic && !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        body.check_finite(id)?;
        self.bodies.push(Composite::new(body));
        Ok(id)
    }

    /// Attach a collider to a body. The collider's owner is overwritten.
    pub fn add_collider(&mut self, body: BodyId, mut collider: Collider) -> PhysicsResult<ShapeId> {
        let composite = self
            .bodies
            .get_mut(body.index())
            .ok_or(PhysicsError::UnknownBody(body))?;
        collider.shape.validate()?;
        if !(collider.offset.is_finite() && collider.rotation.is_finite()) {
            return Err(PhysicsError::InvalidDimension {
                field: "collider offset",
                value: collider.offset.length(),
            });
        }

        let id = ShapeId(self.colliders.len() as u32);
        collider.body = body;
        composite.attach(id);
        self.colliders.push(collider);
        Ok(id)
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.index()).map(|c| &c.body)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id.index()).map(|c| &mut c.body)
    }

    pub fn composite(&self, id: BodyId) -> Option<&Composite> {
        self.bodies.get(id.index())
    }

    pub fn composite_mut(&mut self, id: BodyId) -> Option<&mut Composite> {
        self.bodies.get_mut(id.index())
    }

    pub fn collider(&self, id: ShapeId) -> Option<&Collider> {
        self.colliders.get(id.index())
    }

    /// A collider together with its body's current pose.
    pub fn collider_view(&self, id: ShapeId) -> Option<ColliderView<'_>> {
        self.colliders.get(id.index())?;
        Some(view(&self.colliders, &self.bodies, id))
    }

    pub fn set_pre_collision_hook(
        &mut self,
        body: BodyId,
        hook: impl FnMut(&Contact) + 'static,
    ) -> PhysicsResult<()> {
        self.composite_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?
            .set_pre_collision_hook(hook);
        Ok(())
    }

    pub fn clear_pre_collision_hook(&mut self, body: BodyId) -> PhysicsResult<()> {
        self.composite_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?
            .clear_pre_collision_hook();
        Ok(())
    }

    /// Move a body's origin to the mean offset of its
    /// [`CENTER_OF_MASS`](ShapeFlags::CENTER_OF_MASS) colliders, keeping every
    /// collider's world pose. Returns the world-space shift of the origin.
    pub fn recenter_mass(&mut self, body: BodyId) -> PhysicsResult<Vec3> {
        let composite = self
            .bodies
            .get_mut(body.index())
            .ok_or(PhysicsError::UnknownBody(body))?;

        let (sum, count) = composite
            .shapes()
            .iter()
            .map(|id| &self.colliders[id.index()])
            .filter(|c| c.flags.contains(ShapeFlags::CENTER_OF_MASS))
            .fold((Vec3::ZERO, 0u32), |(sum, n), c| (sum + c.offset, n + 1));
        if count == 0 {
            return Ok(Vec3::ZERO);
        }
        let center = sum / count as f32;

        for id in composite.shapes() {
            self.colliders[id.index()].offset -= center;
        }
        let rb = &mut composite.body;
        let shift = rb.rotation * center;
        rb.position += shift;
        rb.previous_position += rb.previous_rotation * center;
        tracing::debug!(body = body.0, ?shift, "recentered body on its mass colliders");
        Ok(shift)
    }

    /// Advance every body by `dt` with the configured gravity.
    pub fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for composite in &mut self.bodies {
            composite.body.integrate(dt, gravity);
        }
    }

    /// Query the terrain surface under another collider's origin without
    /// resolving anything. The contact is returned even when the collider is
    /// above the surface; its signed depth is `penetration.dot(normal)`.
    pub fn probe_terrain(
        &self,
        terrain: ShapeId,
        shape: ShapeId,
    ) -> PhysicsResult<Option<Contact>> {
        let ground = self
            .collider_view(terrain)
            .ok_or(PhysicsError::UnknownShape(terrain))?;
        let probe = self
            .collider_view(shape)
            .ok_or(PhysicsError::UnknownShape(shape))?;
        let Shape::Terrain(heightfield) = ground.shape() else {
            return Ok(None);
        };
        Ok(terrain_point(ground, heightfield, probe, true))
    }

    /// Run one detect/resolve cycle over the current body state.
    pub fn step(&mut self) -> PhysicsResult<StepReport> {
        for (i, composite) in self.bodies.iter().enumerate() {
            if let Err(err) = composite.body.check_finite(BodyId(i as u32)) {
                tracing::warn!(%err, "rejecting collision step");
                return Err(err);
            }
        }

        let colliders = &self.colliders;
        let bodies = &self.bodies;
        self.index.rebuild((0..colliders.len() as u32).map(|i| {
            let id = ShapeId(i);
            (id, view(colliders, bodies, id).world_aabb())
        }));

        let moving = colliders
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_static())
            .map(|(i, _)| ShapeId(i as u32));
        self.pairs.handle_all(moving, &self.index);

        for (a, b) in self.pairs.iter() {
            detect_collision(
                view(colliders, bodies, a),
                view(colliders, bodies, b),
                &self.config,
                &mut self.contacts,
            );
        }

        self.aggregator.add_contacts(&self.contacts);
        let touched = self.aggregator.resolve(&mut self.bodies, &mut self.contacts);
        let report = StepReport {
            pairs: self.pairs.len(),
            contacts: self.contacts.len(),
            bodies: touched,
        };
        tracing::debug!(
            pairs = report.pairs,
            contacts = report.contacts,
            bodies = report.bodies,
            "collision step"
        );

        self.aggregator.clear();
        self.contacts.clear();
        self.pairs.clear();
        Ok(report)
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::heightfield::Heightfield;
    use crate::material::Material;

    const DT: f32 = 1.0 / 60.0;

    fn sphere(radius: f32) -> Collider {
        Collider::new(Shape::Sphere { radius })
    }

    fn ground_box(world: &mut CollisionWorld) -> BodyId {
        let ground = world.add_body(RigidBody::new_static()).unwrap();
        world
            .add_collider(
                ground,
                Collider::new(Shape::cuboid(4.0, 1.0, 4.0)).with_flags(ShapeFlags::STATIC),
            )
            .unwrap();
        ground
    }

    #[test]
    fn test_sphere_comes_to_rest_on_box() {
        let mut world = CollisionWorld::default();
        ground_box(&mut world);
        let ball = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(0.0, 3.0, 0.0)))
            .unwrap();
        world.add_collider(ball, sphere(0.5)).unwrap();

        for _ in 0..180 {
            world.integrate(DT);
            world.step().unwrap();
        }

        let body = world.body(ball).unwrap();
        // Box top at 0.5, radius 0.5
        assert!((body.position.y - 1.0).abs() < 0.05, "y = {}", body.position.y);
        assert!(body.linear_velocity.length() < 0.5);
    }

    #[test]
    fn test_fast_sphere_does_not_tunnel() {
        let mut world = CollisionWorld::default();
        ground_box(&mut world);
        let ball = world
            .add_body(
                RigidBody::new_dynamic(1.0)
                    .with_position(Vec3::new(0.0, 2.0, 0.0))
                    .with_velocity(Vec3::new(0.0, -200.0, 0.0)),
            )
            .unwrap();
        world.add_collider(ball, sphere(0.1)).unwrap();

        world.integrate(DT);
        assert!(world.body(ball).unwrap().position.y < -0.5);
        let report = world.step().unwrap();
        assert_eq!(report.contacts, 1);

        let body = world.body(ball).unwrap();
        assert!(body.position.y > 0.5, "y = {}", body.position.y);
        assert!(body.linear_velocity.y >= 0.0);
    }

    #[test]
    fn test_pair_detected_once_per_step() {
        let mut world = CollisionWorld::default();
        for x in [0.0, 1.5] {
            let b = world
                .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(x, 0.0, 0.0)))
                .unwrap();
            world.add_collider(b, sphere(1.0)).unwrap();
        }

        // Both spheres are refreshed and each sees the other
        let report = world.step().unwrap();
        assert_eq!(report.pairs, 1);
        assert_eq!(report.contacts, 1);
        assert_eq!(report.bodies, 2);

        // Equal masses split the 0.5 overlap
        let eps = 1e-4;
        let a = world.body(BodyId(0)).unwrap().position;
        let b = world.body(BodyId(1)).unwrap().position;
        assert!((a.x + 0.25).abs() < eps);
        assert!((b.x - 1.75).abs() < eps);
    }

    #[test]
    fn test_sibling_colliders_ignored() {
        let mut world = CollisionWorld::default();
        let body = world.add_body(RigidBody::new_dynamic(2.0)).unwrap();
        world.add_collider(body, sphere(1.0)).unwrap();
        world
            .add_collider(body, sphere(1.0).with_offset(Vec3::new(0.5, 0.0, 0.0)))
            .unwrap();

        let report = world.step().unwrap();
        assert_eq!(report.pairs, 1);
        assert_eq!(report.contacts, 0);
        assert_eq!(world.body(body).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_static_pairs_never_queried() {
        let mut world = CollisionWorld::default();
        ground_box(&mut world);
        ground_box(&mut world);
        let report = world.step().unwrap();
        assert_eq!(report, StepReport::default());
    }

    #[test]
    fn test_hook_sees_contacts() {
        let mut world = CollisionWorld::default();
        let ground = ground_box(&mut world);
        let ball = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(0.0, 0.9, 0.0)))
            .unwrap();
        world.add_collider(ball, sphere(0.5)).unwrap();

        let grounded = Rc::new(Cell::new(false));
        let flag = Rc::clone(&grounded);
        world
            .set_pre_collision_hook(ball, move |c: &Contact| {
                if c.body2 == ground && c.normal.y > 0.7 {
                    flag.set(true);
                }
            })
            .unwrap();

        world.step().unwrap();
        assert!(grounded.get());

        world.clear_pre_collision_hook(ball).unwrap();
        assert!(!world.composite(ball).unwrap().has_pre_collision_hook());
    }

    #[test]
    fn test_sphere_settles_on_terrain() {
        let mut world = CollisionWorld::default();
        let ground = world.add_body(RigidBody::new_static()).unwrap();
        let heightfield = Heightfield::flat(8, 8, 0.0, 1.0).unwrap();
        world
            .add_collider(
                ground,
                Collider::new(Shape::Terrain(heightfield)).with_flags(ShapeFlags::STATIC),
            )
            .unwrap();
        let ball = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(4.3, 2.0, 4.6)))
            .unwrap();
        world
            .add_collider(ball, sphere(0.5).with_material(Material::new(0.5, 0.0)))
            .unwrap();

        for _ in 0..180 {
            world.integrate(DT);
            world.step().unwrap();
        }

        let p = world.body(ball).unwrap().position;
        assert!(p.y > 0.4 && p.y < 0.6, "y = {}", p.y);
        assert!((p.x - 4.3).abs() < 0.5 && (p.z - 4.6).abs() < 0.5);
    }

    #[test]
    fn test_probe_terrain_reports_height() {
        let mut world = CollisionWorld::default();
        let ground = world.add_body(RigidBody::new_static()).unwrap();
        let terrain = world
            .add_collider(
                ground,
                Collider::new(Shape::Terrain(Heightfield::flat(4, 4, 1.0, 1.0).unwrap())),
            )
            .unwrap();
        let probe = world
            .add_body(RigidBody::new_kinematic().with_position(Vec3::new(2.0, 3.0, 2.0)))
            .unwrap();
        let point = world.add_collider(probe, Collider::new(Shape::Point)).unwrap();

        let contact = world.probe_terrain(terrain, point).unwrap().unwrap();
        assert!((contact.penetration.dot(contact.normal) + 2.0).abs() < 1e-5);
        assert!(world.probe_terrain(point, terrain).unwrap().is_none());
        assert_eq!(
            world.probe_terrain(ShapeId(9), point).unwrap_err(),
            PhysicsError::UnknownShape(ShapeId(9))
        );
    }

    #[test]
    fn test_boundary_validation() {
        let mut world = CollisionWorld::default();
        assert_eq!(
            world.add_body(RigidBody::new_dynamic(0.0)).unwrap_err(),
            PhysicsError::InvalidMass(0.0)
        );
        for mass in [-1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                world.add_body(RigidBody::new_dynamic(mass)),
                Err(PhysicsError::InvalidMass(_))
            ));
        }
        assert_eq!(world.body_count(), 0);
        assert!(world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::splat(f32::NAN)))
            .is_err());
        assert_eq!(
            world.add_collider(BodyId(3), sphere(1.0)).unwrap_err(),
            PhysicsError::UnknownBody(BodyId(3))
        );

        let body = world.add_body(RigidBody::new_dynamic(1.0)).unwrap();
        assert!(world.add_collider(body, sphere(-1.0)).is_err());
        world.add_collider(body, sphere(1.0)).unwrap();

        world.body_mut(body).unwrap().linear_velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);
        assert!(matches!(
            world.step(),
            Err(PhysicsError::NonFiniteState { field: "linear velocity", .. })
        ));
    }

    #[test]
    fn test_recenter_mass_keeps_world_pose() {
        let mut world = CollisionWorld::default();
        let body = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let heavy = world
            .add_collider(
                body,
                sphere(0.5)
                    .with_offset(Vec3::new(0.0, 2.0, 0.0))
                    .with_flags(ShapeFlags::CENTER_OF_MASS),
            )
            .unwrap();
        let light = world
            .add_collider(body, sphere(0.5).with_offset(Vec3::new(0.0, -1.0, 0.0)))
            .unwrap();
        let before = [heavy, light].map(|id| world.collider_view(id).unwrap().position());

        let shift = world.recenter_mass(body).unwrap();

        let eps = 1e-5;
        assert!((shift - Vec3::new(0.0, 2.0, 0.0)).length() < eps);
        assert!((world.body(body).unwrap().position - Vec3::new(1.0, 2.0, 0.0)).length() < eps);
        let after = [heavy, light].map(|id| world.collider_view(id).unwrap().position());
        for (b, a) in before.iter().zip(&after) {
            assert!((*b - *a).length() < eps);
        }
    }
}
