//! Sphere handlers: sphere-sphere, sphere-box, sphere-triangle and
//! sphere-terrain. The sphere is always body1.

use glam::Vec3;

use super::{contact_between, safe_normal, terrain};
use crate::collider::ColliderView;
use crate::contact::Contact;
use crate::heightfield::{HeightLayer, Heightfield};
use crate::triangle::Triangle;
use crate::world::CollisionConfig;

pub fn sphere_sphere(
    s1: ColliderView<'_>,
    r1: f32,
    s2: ColliderView<'_>,
    r2: f32,
) -> Option<Contact> {
    let p1 = s1.position();
    let p2 = s2.position();
    let distance = p1.distance(p2);
    let depth = r1 + r2 - distance;
    if depth <= 0.0 {
        return None;
    }

    let normal = safe_normal(p1 - p2);
    Some(contact_between(&s1, &s2, normal, depth, (p1 + p2) * 0.5))
}

/// Sphere against an oriented box.
///
/// Three phases, first hit wins:
/// 1. swept test of the sphere center's path (in the box frame) against the
///    box, catching spheres that tunneled through a face this step,
/// 2. center strictly inside the box: push out through the nearest face,
/// 3. plain closest-point test.
pub fn sphere_box(
    sphere: ColliderView<'_>,
    radius: f32,
    cuboid: ColliderView<'_>,
    half_extents: Vec3,
    config: &CollisionConfig,
) -> Option<Contact> {
    let center = sphere.position();
    let local = cuboid.world_to_local(center);

    if let Some(contact) = swept_contact(&sphere, radius, &cuboid, half_extents, local, config) {
        return Some(contact);
    }

    if local.abs().cmplt(half_extents).all() {
        return Some(inside_contact(&sphere, radius, &cuboid, half_extents, local));
    }

    let closest = local.clamp(-half_extents, half_extents);
    let dist_sq = (local - closest).length_squared();
    if dist_sq >= radius * radius {
        return None;
    }
    let closest_world = cuboid.local_to_world(closest);
    let depth = radius - dist_sq.sqrt();
    if depth <= 0.0 {
        return None;
    }
    let normal = safe_normal(center - closest_world);
    Some(contact_between(&sphere, &cuboid, normal, depth, closest_world))
}

fn swept_contact(
    sphere: &ColliderView<'_>,
    radius: f32,
    cuboid: &ColliderView<'_>,
    half_extents: Vec3,
    local: Vec3,
    config: &CollisionConfig,
) -> Option<Contact> {
    // Previous center relative to the box's previous position, in the box's
    // current orientation.
    let previous =
        cuboid.rotation().inverse() * (sphere.previous_position() - cuboid.previous_position());
    let delta = local - previous;
    if delta.length_squared() == 0.0 {
        return None;
    }
    let toi = segment_box_toi(previous, local, half_extents, 0.0)?;

    let backed_off = previous + delta * (toi - config.toi_backoff);
    let closest = backed_off.clamp(-half_extents, half_extents);
    let dist_sq = (backed_off - closest).length_squared();
    if dist_sq <= 0.0 || dist_sq >= radius * radius {
        return None;
    }

    let normal = cuboid.rotation() * snap_to_axis(backed_off - closest);
    let closest_world = cuboid.local_to_world(closest);
    let center = sphere.position();
    let depth = radius - (center - closest_world).dot(normal);
    if depth <= 0.0 {
        return None;
    }
    tracing::trace!(toi, depth, "swept sphere-box contact");
    Some(contact_between(sphere, cuboid, normal, depth, center - normal * radius))
}

fn inside_contact(
    sphere: &ColliderView<'_>,
    radius: f32,
    cuboid: &ColliderView<'_>,
    half_extents: Vec3,
    local: Vec3,
) -> Contact {
    let to_face = half_extents - local.abs();
    let axis = if to_face.x < to_face.y && to_face.x < to_face.z {
        0
    } else if to_face.y < to_face.z {
        1
    } else {
        2
    };
    let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };

    let mut face_point = local;
    face_point[axis] = half_extents[axis] * sign;
    let mut local_normal = Vec3::ZERO;
    local_normal[axis] = sign;

    contact_between(
        sphere,
        cuboid,
        cuboid.rotation() * local_normal,
        radius + to_face[axis],
        cuboid.local_to_world(face_point),
    )
}

/// Entry time in `[0, 1]` of the segment `p0 -> p1` into the box
/// `[-half - margin, half + margin]` (slab method). `Some(0.0)` when `p0`
/// already starts inside.
pub fn segment_box_toi(p0: Vec3, p1: Vec3, half_extents: Vec3, margin: f32) -> Option<f32> {
    let delta = p1 - p0;
    let min = -half_extents - Vec3::splat(margin);
    let max = half_extents + Vec3::splat(margin);

    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;
    for axis in 0..3 {
        if delta[axis].abs() < f32::EPSILON {
            if p0[axis] < min[axis] || p0[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / delta[axis];
        let mut t1 = (min[axis] - p0[axis]) * inv;
        let mut t2 = (max[axis] - p0[axis]) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// Signed unit axis along the dominant component of `v`.
fn snap_to_axis(v: Vec3) -> Vec3 {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        Vec3::new(v.x.signum(), 0.0, 0.0)
    } else if a.y >= a.z {
        Vec3::new(0.0, v.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, v.z.signum())
    }
}

/// Sphere against a two-sided triangle.
pub fn sphere_triangle(
    sphere: ColliderView<'_>,
    radius: f32,
    tri_view: ColliderView<'_>,
    triangle: &Triangle,
) -> Option<Contact> {
    let center = sphere.position();
    let world = triangle.map(|v| tri_view.local_to_world(v));
    let closest = world.intersects_sphere(center, radius)?;

    let offset = center - closest;
    let normal = offset.try_normalize().unwrap_or_else(|| world.normal());
    let depth = radius - offset.length();
    if depth <= 0.0 {
        return None;
    }
    Some(contact_between(&sphere, &tri_view, normal, depth, closest))
}

/// Sphere against the top surface of a terrain.
///
/// Emits the center probe (biased by a fraction of the radius) plus up to
/// `terrain_manifold_size` of the deepest distinct triangle contacts.
pub fn sphere_terrain(
    sphere: ColliderView<'_>,
    radius: f32,
    terrain_view: ColliderView<'_>,
    heightfield: &Heightfield,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) {
    let center = sphere.position();
    let hm = heightfield.local_to_heightmap(terrain_view.world_to_local(center));
    let reach = radius * heightfield.inverse_scale();
    let width = heightfield.width_segments() as f32;
    let depth = heightfield.depth_segments() as f32;
    if hm.x <= -reach || hm.x >= width + reach || hm.z <= -reach || hm.z >= depth + reach {
        return;
    }

    let to_world = |v: Vec3| terrain_view.local_to_world(heightfield.heightmap_to_local(v));
    let last_x = i64::from(heightfield.width_segments()) - 1;
    let last_z = i64::from(heightfield.depth_segments()) - 1;
    let x_range = ((hm.x - reach).floor() as i64 - 1).max(0)
        ..=((hm.x + reach).floor() as i64 + 1).min(last_x);
    let z_range = ((hm.z - reach).floor() as i64 - 1).max(0)
        ..=((hm.z + reach).floor() as i64 + 1).min(last_z);

    let mut hits: Vec<(f32, Contact)> = Vec::new();
    for cell_x in x_range {
        for cell_z in z_range.clone() {
            let Some(cell) = heightfield.cell_triangles(HeightLayer::Top, cell_x, cell_z) else {
                continue;
            };
            for tri in cell {
                let world = tri.map(to_world);
                let (bound_center, bound_radius) = world.bounding_sphere();
                let reach_sq = (bound_radius + radius) * (bound_radius + radius);
                if (center - bound_center).length_squared() >= reach_sq {
                    continue;
                }
                let Some(closest) = world.intersects_sphere(center, radius) else {
                    continue;
                };

                let face_normal = world.normal();
                let offset = center - closest;
                let normal = offset.try_normalize().unwrap_or(face_normal);
                // Underside hits belong to the other side of the surface
                if normal.dot(face_normal) < 0.0 {
                    continue;
                }
                let hit_depth = radius - offset.length();
                if hit_depth <= 0.0 {
                    continue;
                }
                hits.push((
                    hit_depth,
                    contact_between(&sphere, &terrain_view, normal, hit_depth, closest),
                ));
            }
        }
    }

    if let Some((mut probe, probe_depth)) =
        terrain::probe_at(&terrain_view, heightfield, center, &sphere)
    {
        let biased = probe_depth + radius * config.terrain_probe_bias;
        if biased > 0.0 {
            probe.set_depth(biased);
            out.push(probe);
        }
    }

    hits.sort_by(|a, b| b.0.total_cmp(&a.0));
    let mut kept: Vec<Contact> = Vec::with_capacity(config.terrain_manifold_size);
    for (_, hit) in hits {
        if kept.len() == config.terrain_manifold_size {
            break;
        }
        let duplicate = kept.iter().any(|k| {
            (k.point - hit.point).length_squared() < 1e-10
                && (k.normal - hit.normal).length_squared() < 1e-10
        });
        if !duplicate {
            kept.push(hit);
        }
    }
    out.extend(kept);
}
