//! Box against a one-sided triangle.

use glam::Vec3;

use super::contact_between;
use crate::collider::ColliderView;
use crate::contact::Contact;
use crate::narrowphase::sat::box_corners;
use crate::triangle::Triangle;

/// Box corners behind the triangle's plane whose projection lands inside the
/// triangle are candidates; the one nearest the triangle's first vertex wins.
///
/// The box must straddle the plane: a box entirely behind the triangle does
/// not collide with it.
pub fn box_triangle(
    cuboid: ColliderView<'_>,
    half_extents: Vec3,
    tri_view: ColliderView<'_>,
    triangle: &Triangle,
) -> Option<Contact> {
    let world = triangle.map(|v| tri_view.local_to_world(v));
    let normal = world.normal();
    let corners = box_corners(&cuboid, half_extents);
    let distances = corners.map(|c| (c - world.a).dot(normal));

    if distances.iter().all(|&d| d < 0.0) {
        return None;
    }

    let (corner, distance) = corners
        .into_iter()
        .zip(distances)
        .filter(|&(c, d)| d < 0.0 && world.contains_projection(c))
        .min_by(|a, b| {
            a.0.distance_squared(world.a)
                .total_cmp(&b.0.distance_squared(world.a))
        })?;

    Some(contact_between(&cuboid, &tri_view, normal, -distance, corner))
}
