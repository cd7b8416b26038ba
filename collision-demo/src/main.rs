use std::cell::Cell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use rein_collision::{
    BodyId, Collider, CollisionConfig, CollisionWorld, Contact, Heightfield, Material, RigidBody,
    Shape, ShapeFlags,
};

/// Fixed-step loop settings for the demo run.
struct LoopConfig {
    fixed_timestep: f64,
    max_substeps: u32,
    frame_time: f64,
    frames: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            frame_time: 1.0 / 30.0,
            frames: 150,
        }
    }
}

struct Scene {
    world: CollisionWorld,
    balls: Vec<BodyId>,
    crate_body: BodyId,
    probe: BodyId,
}

fn build_scene() -> anyhow::Result<Scene> {
    let mut world = CollisionWorld::new(CollisionConfig {
        terrain_box_corner_probes: true,
        ..CollisionConfig::default()
    });

    // Rolling hills, 16 x 16 cells of 2 m
    let ground =
        world.add_body(RigidBody::new_static().with_position(Vec3::new(-16.0, 0.0, -16.0)))?;
    let hills = Heightfield::from_fn(16, 16, 2.0, |x, z| {
        let (x, z) = (x as f32 * 0.4, z as f32 * 0.4);
        x.sin() * z.cos() * 0.75
    })?;
    world.add_collider(
        ground,
        Collider::new(Shape::Terrain(hills)).with_flags(ShapeFlags::STATIC),
    )?;

    // A slab resting on the hills
    let slab = world.add_body(RigidBody::new_static().with_position(Vec3::new(4.0, 1.5, 4.0)))?;
    world.add_collider(
        slab,
        Collider::new(Shape::cuboid(6.0, 0.5, 6.0))
            .with_flags(ShapeFlags::STATIC)
            .with_material(Material::new(0.8, 0.1)),
    )?;

    let mut balls = Vec::new();
    for (i, x) in [-6.0f32, -2.0, 3.0, 5.0].into_iter().enumerate() {
        let ball = world.add_body(
            RigidBody::new_dynamic(1.0)
                .with_position(Vec3::new(x, 6.0 + i as f32, 4.0 - x * 0.25))
                .with_velocity(Vec3::new(0.5, 0.0, 0.0)),
        )?;
        world.add_collider(
            ball,
            Collider::new(Shape::Sphere { radius: 0.5 })
                .with_material(Material::new(0.4, 0.5)),
        )?;
        balls.push(ball);
    }

    // Two rigidly linked boxes; mass centered on the heavier one
    let crate_body = world.add_body(
        RigidBody::new_dynamic(4.0)
            .with_position(Vec3::new(-4.0, 5.0, -4.0))
            .with_rotation(Quat::from_rotation_y(0.3)),
    )?;
    world.add_collider(
        crate_body,
        Collider::new(Shape::cuboid(1.0, 1.0, 1.0)).with_flags(ShapeFlags::CENTER_OF_MASS),
    )?;
    world.add_collider(
        crate_body,
        Collider::new(Shape::cuboid(0.5, 0.5, 0.5)).with_offset(Vec3::new(0.75, 0.0, 0.0)),
    )?;
    world.recenter_mass(crate_body)?;

    // Kinematic marker used for height queries
    let probe =
        world.add_body(RigidBody::new_kinematic().with_position(Vec3::new(-8.0, 10.0, 2.0)))?;
    world.add_collider(probe, Collider::new(Shape::Point))?;

    Ok(Scene {
        world,
        balls,
        crate_body,
        probe,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let Scene {
        mut world,
        balls,
        crate_body,
        probe,
    } = build_scene()?;
    let config = LoopConfig::default();

    let landings = Rc::new(Cell::new(0u32));
    for &ball in &balls {
        let count = Rc::clone(&landings);
        world.set_pre_collision_hook(ball, move |contact: &Contact| {
            if contact.normal.y > 0.7 && contact.velocity.y < -1.0 {
                count.set(count.get() + 1);
            }
        })?;
    }

    let mut accumulator = 0.0f64;
    let mut contacts = 0usize;
    for frame in 0..config.frames {
        accumulator += config.frame_time;
        let mut substeps = 0u32;
        while accumulator >= config.fixed_timestep && substeps < config.max_substeps {
            world.integrate(config.fixed_timestep as f32);
            let report = world.step()?;
            contacts += report.contacts;
            accumulator -= config.fixed_timestep;
            substeps += 1;
        }
        // Clamp accumulator to avoid spiral of death
        if accumulator > config.fixed_timestep * config.max_substeps as f64 {
            accumulator = 0.0;
        }

        if frame % 30 == 0 {
            for &ball in &balls {
                if let Some(body) = world.body(ball) {
                    log::info!("frame {frame}: ball {} at {:.2}", ball.0, body.position);
                }
            }
        }
    }

    log::info!("{contacts} contacts resolved, {} hard landings", landings.get());
    if let Some(body) = world.body(crate_body) {
        log::info!("crate settled at {:.2}", body.position);
    }

    let terrain = world
        .composite(BodyId(0))
        .and_then(|c| c.shapes().first().copied())
        .ok_or_else(|| anyhow::anyhow!("terrain collider missing"))?;
    let marker = world
        .composite(probe)
        .and_then(|c| c.shapes().first().copied())
        .ok_or_else(|| anyhow::anyhow!("probe collider missing"))?;
    if let Some(contact) = world.probe_terrain(terrain, marker)? {
        log::info!(
            "probe is {:.2} m above the hills",
            -contact.penetration.dot(contact.normal)
        );
    }
    Ok(())
}
