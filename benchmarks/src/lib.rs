//! Scene builders shared by the collision benchmarks.

use glam::Vec3;
use rein_collision::{
    Collider, CollisionWorld, Heightfield, RigidBody, Shape, ShapeFlags, ShapeId,
};

/// Deterministic pseudo-random sequence so every run benches the same scene.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }

    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

fn add_ground(world: &mut CollisionWorld, half_size: f32) -> ShapeId {
    let ground = world
        .add_body(RigidBody::new_static().with_position(Vec3::new(0.0, -0.5, 0.0)))
        .expect("static body");
    world
        .add_collider(
            ground,
            Collider::new(Shape::cuboid(half_size * 2.0, 1.0, half_size * 2.0))
                .with_flags(ShapeFlags::STATIC),
        )
        .expect("ground collider")
}

/// `n` unit-ish spheres dropped into a box-floored arena, densely packed.
pub fn setup_sphere_world(n: usize) -> CollisionWorld {
    let mut world = CollisionWorld::default();
    let half_size = (n as f32).sqrt() * 1.2 + 2.0;
    add_ground(&mut world, half_size);

    let mut rng = Lcg::new(0x5eed);
    for _ in 0..n {
        let body = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(Vec3::new(
                rng.range(-half_size, half_size),
                rng.range(0.2, 4.0),
                rng.range(-half_size, half_size),
            )))
            .expect("sphere body");
        world
            .add_collider(body, Collider::new(Shape::Sphere { radius: 0.5 }))
            .expect("sphere collider");
    }
    world
}

/// Spheres and boxes mixed over a rolling heightfield.
pub fn setup_terrain_world(n: usize) -> CollisionWorld {
    let mut world = CollisionWorld::default();
    let cells = 32;
    let terrain = world.add_body(RigidBody::new_static()).expect("terrain body");
    let hills = Heightfield::from_fn(cells, cells, 1.0, |x, z| {
        (x as f32 * 0.3).sin() * (z as f32 * 0.3).cos()
    })
    .expect("heightfield");
    world
        .add_collider(
            terrain,
            Collider::new(Shape::Terrain(hills)).with_flags(ShapeFlags::STATIC),
        )
        .expect("terrain collider");

    let mut rng = Lcg::new(0x7e11);
    for i in 0..n {
        let position = Vec3::new(
            rng.range(1.0, cells as f32 - 1.0),
            rng.range(0.0, 1.5),
            rng.range(1.0, cells as f32 - 1.0),
        );
        let body = world
            .add_body(RigidBody::new_dynamic(1.0).with_position(position))
            .expect("body");
        let shape = if i % 2 == 0 {
            Shape::Sphere { radius: 0.4 }
        } else {
            Shape::cuboid(0.6, 0.6, 0.6)
        };
        world
            .add_collider(body, Collider::new(shape))
            .expect("collider");
    }
    world
}

/// Advance a world `steps` fixed steps of 1/60 s.
pub fn run_steps(world: &mut CollisionWorld, steps: usize) -> usize {
    let mut contacts = 0;
    for _ in 0..steps {
        world.integrate(1.0 / 60.0);
        contacts += world.step().expect("step").contacts;
    }
    contacts
}
