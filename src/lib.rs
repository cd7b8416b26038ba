//! Rein collision core
//!
//! Rigid-body collision detection and contact resolution: broadphase pair
//! finding, per shape-pair narrowphase tests, and an impulse solver that
//! spreads each body's response over its simultaneous contacts.
//!
//! # Architecture
//!
//! The library is organized leaf-first:
//!
//! 1. **rigid_body**, **material** - body state and surface properties
//! 2. **triangle**, **heightfield**, **collider** - shapes and their poses
//! 3. **composite** - top-level bodies owning their colliders
//! 4. **broadphase**, **pairs** - spatial hash and per-step pair dedup
//! 5. **narrowphase** - kind-pair dispatch and contact generation
//! 6. **contact**, **solver** - impulse solve and weighted aggregation
//! 7. **world** - arena owner and the detect/resolve step
//!
//! ```
//! use rein_collision::glam::Vec3;
//! use rein_collision::{Collider, CollisionWorld, RigidBody, Shape, ShapeFlags};
//!
//! let mut world = CollisionWorld::default();
//! let ground = world.add_body(RigidBody::new_static())?;
//! world.add_collider(
//!     ground,
//!     Collider::new(Shape::cuboid(10.0, 1.0, 10.0)).with_flags(ShapeFlags::STATIC),
//! )?;
//!
//! let ball = world.add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(0.0, 0.9, 0.0)))?;
//! world.add_collider(ball, Collider::new(Shape::Sphere { radius: 0.5 }))?;
//!
//! let report = world.step()?;
//! assert_eq!(report.contacts, 1);
//! assert!(world.body(ball).unwrap().position.y >= 1.0 - 1e-4);
//! # Ok::<(), rein_collision::PhysicsError>(())
//! ```

pub mod broadphase;
pub mod collider;
pub mod composite;
pub mod contact;
pub mod error;
pub mod heightfield;
pub mod material;
pub mod narrowphase;
pub mod pairs;
pub mod rigid_body;
pub mod solver;
pub mod triangle;
pub mod world;

pub use broadphase::{SpatialHash, SpatialIndex};
pub use collider::{Aabb, Collider, ColliderView, Shape, ShapeFlags, ShapeId, ShapeKind};
pub use composite::{BodyId, Composite, PreCollisionHook};
pub use contact::{Contact, SolverBody};
pub use error::{PhysicsError, PhysicsResult};
pub use heightfield::{HeightLayer, Heightfield};
pub use material::Material;
pub use narrowphase::detect_collision;
pub use pairs::PairTracker;
pub use rigid_body::{RigidBody, RigidBodyType};
pub use solver::ContactAggregator;
pub use triangle::Triangle;
pub use world::{CollisionConfig, CollisionWorld, StepReport};

// Re-export glam for convenience
pub use glam;
