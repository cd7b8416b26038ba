//! Narrowphase collision detection: kind-pair dispatch and contact generation.
//!
//! Every handler follows the same conventions:
//! - the normal points from body2 toward body1, where body1 is the collider
//!   with the lower [`ShapeKind`](crate::collider::ShapeKind) (terrain handlers
//!   put the probed collider first),
//! - the penetration is `normal * depth` with `depth > 0`; candidates with
//!   `depth <= 0` are dropped,
//! - degenerate normals are replaced by a unit axis instead of producing NaN.

pub mod sat;
pub mod sphere;
pub mod terrain;
pub mod triangle;

use glam::Vec3;

use crate::collider::{ColliderView, Shape};
use crate::contact::Contact;
use crate::world::CollisionConfig;

/// Detect contacts between two colliders and append them to `out`.
///
/// Returns `false` without testing when both colliders belong to the same
/// composite or are both static. Kind pairs without a handler never collide.
pub fn detect_collision(
    a: ColliderView<'_>,
    b: ColliderView<'_>,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> bool {
    if a.collider.body == b.collider.body {
        return false;
    }
    if a.collider.is_static() && b.collider.is_static() {
        return false;
    }
    // Handlers are only written for the lower kind first
    let (a, b) = if a.kind() > b.kind() { (b, a) } else { (a, b) };

    let before = out.len();
    match (a.shape(), b.shape()) {
        (Shape::Sphere { radius: r1 }, Shape::Sphere { radius: r2 }) => {
            out.extend(sphere::sphere_sphere(a, *r1, b, *r2));
        }
        (Shape::Sphere { radius }, Shape::Terrain(heightfield)) => {
            sphere::sphere_terrain(a, *radius, b, heightfield, config, out);
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            out.extend(sphere::sphere_box(a, *radius, b, *half_extents, config));
        }
        (Shape::Sphere { radius }, Shape::Triangle(tri)) => {
            out.extend(sphere::sphere_triangle(a, *radius, b, tri));
        }
        (Shape::Terrain(heightfield), Shape::Box { half_extents }) => {
            terrain::terrain_box(a, heightfield, b, *half_extents, config, out);
        }
        (Shape::Terrain(heightfield), Shape::Point) => {
            out.extend(terrain::terrain_point(a, heightfield, b, false));
        }
        (Shape::Box { half_extents: h1 }, Shape::Box { half_extents: h2 }) => {
            out.extend(sat::sat_box_box(a, *h1, b, *h2));
        }
        (Shape::Box { half_extents }, Shape::Triangle(tri)) => {
            out.extend(triangle::box_triangle(a, *half_extents, b, tri));
        }
        _ => {}
    }

    let found = out.len() - before;
    if found > 0 {
        tracing::trace!(
            shape_a = a.id.0,
            shape_b = b.id.0,
            contacts = found,
            "narrowphase hit"
        );
    }
    found > 0
}

/// Build a contact between `body1` and `body2` at `point`, sampling the
/// relative velocity there and combining both materials.
pub(crate) fn contact_between(
    body1: &ColliderView<'_>,
    body2: &ColliderView<'_>,
    normal: Vec3,
    depth: f32,
    point: Vec3,
) -> Contact {
    Contact::new(
        (body1.id, body1.collider.body),
        (body2.id, body2.collider.body),
        normal,
        depth,
        point,
        body1.velocity_at(point) - body2.velocity_at(point),
        body1.collider.material.combine(&body2.collider.material),
    )
}

/// Normalize `v`, substituting +X when it has (near) zero length.
#[inline]
pub(crate) fn safe_normal(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or_else(|| {
        tracing::debug!("degenerate contact normal, using +X");
        Vec3::X
    })
}
