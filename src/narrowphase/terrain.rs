//! Terrain handlers built on the single-point height probe.

use glam::Vec3;

use super::contact_between;
use crate::collider::ColliderView;
use crate::contact::Contact;
use crate::heightfield::{HeightLayer, Heightfield};
use crate::narrowphase::sat::box_corners;
use crate::world::CollisionConfig;

/// Probe the top surface under a world-space `point` that belongs to `other`.
///
/// Returns the contact (with `other` as body1) and its signed depth, which is
/// positive when the point is below the surface. `None` outside the grid.
pub(crate) fn probe_at(
    terrain: &ColliderView<'_>,
    heightfield: &Heightfield,
    point: Vec3,
    other: &ColliderView<'_>,
) -> Option<(Contact, f32)> {
    let hm = heightfield.local_to_heightmap(terrain.world_to_local(point));
    if !heightfield.contains(hm) {
        return None;
    }
    let tri = heightfield
        .triangle_at(HeightLayer::Top, hm)?
        .map(|v| terrain.local_to_world(heightfield.heightmap_to_local(v)));

    let normal = tri.normal();
    let depth = (tri.a - point).dot(normal);
    Some((contact_between(other, terrain, normal, depth, point), depth))
}

/// Terrain against a point-like collider located at its origin.
///
/// With `manual` set the contact is returned even when the point lies above
/// the surface (non-positive depth), for callers that want a height query.
pub fn terrain_point(
    terrain: ColliderView<'_>,
    heightfield: &Heightfield,
    point: ColliderView<'_>,
    manual: bool,
) -> Option<Contact> {
    let (contact, depth) = probe_at(&terrain, heightfield, point.position(), &point)?;
    if depth <= 0.0 && !manual {
        return None;
    }
    Some(contact)
}

/// Terrain against a box.
///
/// Probes the box center by default; with `terrain_box_corner_probes` the
/// eight corners are probed instead and the deepest `terrain_manifold_size`
/// hits are kept.
pub fn terrain_box(
    terrain: ColliderView<'_>,
    heightfield: &Heightfield,
    cuboid: ColliderView<'_>,
    half_extents: Vec3,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) {
    if !config.terrain_box_corner_probes {
        out.extend(terrain_point(terrain, heightfield, cuboid, false));
        return;
    }

    let mut hits: Vec<(f32, Contact)> = box_corners(&cuboid, half_extents)
        .into_iter()
        .filter_map(|corner| probe_at(&terrain, heightfield, corner, &cuboid))
        .filter(|(_, depth)| *depth > 0.0)
        .map(|(contact, depth)| (depth, contact))
        .collect();
    hits.sort_by(|a, b| b.0.total_cmp(&a.0));
    out.extend(
        hits.into_iter()
            .take(config.terrain_manifold_size)
            .map(|(_, contact)| contact),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{Collider, Shape, ShapeId};
    use crate::composite::BodyId;
    use crate::rigid_body::RigidBody;

    fn terrain(heightfield: Heightfield) -> (Collider, RigidBody) {
        let mut collider = Collider::new(Shape::Terrain(heightfield));
        collider.body = BodyId(0);
        (collider, RigidBody::new_static())
    }

    fn body_with(shape: Shape, position: Vec3) -> (Collider, RigidBody) {
        let mut collider = Collider::new(shape);
        collider.body = BodyId(1);
        (collider, RigidBody::new_dynamic(1.0).with_position(position))
    }

    fn view<'a>(id: u32, pair: &'a (Collider, RigidBody)) -> ColliderView<'a> {
        ColliderView {
            id: ShapeId(id),
            collider: &pair.0,
            body: &pair.1,
        }
    }

    fn heightfield(t: &(Collider, RigidBody)) -> &Heightfield {
        match &t.0.shape {
            Shape::Terrain(hf) => hf,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_point_below_surface() {
        let t = terrain(Heightfield::flat(4, 4, 1.0, 2.0).unwrap());
        let p = body_with(Shape::Point, Vec3::new(3.0, 0.75, 5.0));
        let c = terrain_point(view(0, &t), heightfield(&t), view(1, &p), false).unwrap();

        let eps = 1e-5;
        assert!((c.normal - Vec3::Y).length() < eps);
        assert!((c.depth() - 0.25).abs() < eps);
        assert!((c.point - Vec3::new(3.0, 0.75, 5.0)).length() < eps);
        assert_eq!(c.body1, BodyId(1));
        assert_eq!(c.body2, BodyId(0));
    }

    #[test]
    fn test_point_above_surface_needs_manual() {
        let t = terrain(Heightfield::flat(4, 4, 0.0, 1.0).unwrap());
        let p = body_with(Shape::Point, Vec3::new(2.0, 0.5, 2.0));
        assert!(terrain_point(view(0, &t), heightfield(&t), view(1, &p), false).is_none());

        let c = terrain_point(view(0, &t), heightfield(&t), view(1, &p), true).unwrap();
        assert!((c.penetration.dot(c.normal) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_point_outside_grid() {
        let t = terrain(Heightfield::flat(4, 4, 10.0, 1.0).unwrap());
        // Exactly on the boundary counts as outside
        for pos in [Vec3::new(0.0, 0.0, 2.0), Vec3::new(4.0, 0.0, 2.0), Vec3::new(2.0, 0.0, -1.0)] {
            let p = body_with(Shape::Point, pos);
            assert!(terrain_point(view(0, &t), heightfield(&t), view(1, &p), true).is_none());
        }
    }

    #[test]
    fn test_point_on_slope() {
        // y = x: the surface normal tilts toward -X
        let t = terrain(Heightfield::from_fn(4, 4, 1.0, |x, _| x as f32).unwrap());
        let p = body_with(Shape::Point, Vec3::new(2.5, 2.0, 1.5));
        let c = terrain_point(view(0, &t), heightfield(&t), view(1, &p), false).unwrap();

        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!((c.normal - expected).length() < 1e-5);
        assert!((c.depth() - 0.5 / 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_translated_terrain() {
        let mut t = terrain(Heightfield::flat(4, 4, 0.0, 1.0).unwrap());
        t.1.position = Vec3::new(-2.0, 1.0, -2.0);
        let p = body_with(Shape::Point, Vec3::new(0.0, 0.9, 0.0));
        let c = terrain_point(view(0, &t), heightfield(&t), view(1, &p), false).unwrap();
        assert!((c.depth() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_box_center_probe() {
        let t = terrain(Heightfield::flat(8, 8, 0.0, 1.0).unwrap());
        let b = body_with(Shape::cuboid(1.0, 1.0, 1.0), Vec3::new(4.0, -0.2, 4.0));
        let mut out = Vec::new();
        terrain_box(
            view(0, &t),
            heightfield(&t),
            view(1, &b),
            Vec3::splat(0.5),
            &CollisionConfig::default(),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert!((out[0].depth() - 0.2).abs() < 1e-5);

        // Resting on its bottom face: the center is above ground, no contact
        let b = body_with(Shape::cuboid(1.0, 1.0, 1.0), Vec3::new(4.0, 0.4, 4.0));
        let mut out = Vec::new();
        terrain_box(
            view(0, &t),
            heightfield(&t),
            view(1, &b),
            Vec3::splat(0.5),
            &CollisionConfig::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_box_corner_probes() {
        let t = terrain(Heightfield::flat(8, 8, 0.0, 1.0).unwrap());
        let b = body_with(Shape::cuboid(1.0, 1.0, 1.0), Vec3::new(4.0, 0.4, 4.0));
        let config = CollisionConfig {
            terrain_box_corner_probes: true,
            ..CollisionConfig::default()
        };
        let mut out = Vec::new();
        terrain_box(view(0, &t), heightfield(&t), view(1, &b), Vec3::splat(0.5), &config, &mut out);

        // Four bottom corners are 0.1 deep, capped by the manifold size
        assert_eq!(out.len(), config.terrain_manifold_size);
        for c in &out {
            assert!((c.depth() - 0.1).abs() < 1e-5);
            assert!((c.point.y + 0.1).abs() < 1e-5);
        }
    }
}
