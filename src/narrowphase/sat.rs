//! Separating Axis Theorem (SAT) for oriented box pairs.

use glam::Vec3;

use super::contact_between;
use crate::collider::ColliderView;
use crate::contact::Contact;

/// Eight world-space corners of a box collider.
pub(crate) fn box_corners(cuboid: &ColliderView<'_>, half_extents: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let sign = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        *corner = cuboid.local_to_world(half_extents * sign);
    }
    corners
}

/// Projection interval of a vertex set onto `axis`.
#[inline]
fn project(vertices: &[Vec3; 8], axis: Vec3) -> (f32, f32) {
    vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Box-box contact from the axis of least overlap among the 15 SAT axes.
///
/// The contact point is the midpoint between the two box centers; this is a
/// single-point approximation, not a clipped manifold.
pub fn sat_box_box(
    b1: ColliderView<'_>,
    half1: Vec3,
    b2: ColliderView<'_>,
    half2: Vec3,
) -> Option<Contact> {
    let r1 = b1.rotation();
    let r2 = b2.rotation();
    let axes1 = [r1 * Vec3::X, r1 * Vec3::Y, r1 * Vec3::Z];
    let axes2 = [r2 * Vec3::X, r2 * Vec3::Y, r2 * Vec3::Z];

    let mut axes = [Vec3::ZERO; 15];
    axes[..3].copy_from_slice(&axes1);
    axes[3..6].copy_from_slice(&axes2);
    for i in 0..3 {
        for j in 0..3 {
            axes[6 + i * 3 + j] = axes1[i].cross(axes2[j]);
        }
    }

    let verts1 = box_corners(&b1, half1);
    let verts2 = box_corners(&b2, half2);

    let mut min_overlap = f32::INFINITY;
    let mut best_axis = None;
    for axis in axes {
        // Parallel edge pairs produce no usable axis
        if axis.length_squared() < 1e-12 {
            continue;
        }
        let axis = axis.normalize();

        let (min1, max1) = project(&verts1, axis);
        let (min2, max2) = project(&verts2, axis);
        let overlap = max1.min(max2) - min1.max(min2);
        if overlap < 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            best_axis = Some(axis);
        }
    }

    let mut normal = best_axis?;
    if min_overlap <= 0.0 {
        return None;
    }

    let p1 = b1.position();
    let p2 = b2.position();
    if (p1 - p2).dot(normal) < 0.0 {
        normal = -normal;
    }
    Some(contact_between(&b1, &b2, normal, min_overlap, (p1 + p2) * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{Collider, Shape, ShapeId};
    use crate::composite::BodyId;
    use crate::rigid_body::RigidBody;
    use glam::Quat;

    fn unit_box(body: u32, position: Vec3) -> (Collider, RigidBody) {
        let mut collider = Collider::new(Shape::cuboid(2.0, 2.0, 2.0));
        collider.body = BodyId(body);
        (collider, RigidBody::new_dynamic(1.0).with_position(position))
    }

    fn view<'a>(id: u32, pair: &'a (Collider, RigidBody)) -> ColliderView<'a> {
        ColliderView {
            id: ShapeId(id),
            collider: &pair.0,
            body: &pair.1,
        }
    }

    #[test]
    fn test_sat_overlapping() {
        let a = unit_box(0, Vec3::ZERO);
        let b = unit_box(1, Vec3::new(1.5, 0.0, 0.0));
        let c = sat_box_box(view(0, &a), Vec3::ONE, view(1, &b), Vec3::ONE).unwrap();

        let eps = 1e-5;
        assert!((c.depth() - 0.5).abs() < eps);
        // Normal points from body2 toward body1
        assert!((c.normal - Vec3::NEG_X).length() < eps);
        assert!((c.point - Vec3::new(0.75, 0.0, 0.0)).length() < eps);
    }

    #[test]
    fn test_sat_separated() {
        let a = unit_box(0, Vec3::ZERO);
        let b = unit_box(1, Vec3::new(2.5, 0.0, 0.0));
        assert!(sat_box_box(view(0, &a), Vec3::ONE, view(1, &b), Vec3::ONE).is_none());
    }

    #[test]
    fn test_sat_rotated_separated_by_edge_axis() {
        // Diagonal gap: AABBs would overlap, the rotated box does not
        let a = unit_box(0, Vec3::ZERO);
        let mut b = unit_box(1, Vec3::new(2.3, 2.3, 0.0));
        b.1.rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        assert!(sat_box_box(view(0, &a), Vec3::ONE, view(1, &b), Vec3::ONE).is_none());
    }

    #[test]
    fn test_sat_picks_least_overlap() {
        let a = unit_box(0, Vec3::ZERO);
        let b = unit_box(1, Vec3::new(0.2, 1.8, 0.0));
        let c = sat_box_box(view(0, &a), Vec3::ONE, view(1, &b), Vec3::ONE).unwrap();
        assert!((c.depth() - 0.2).abs() < 1e-5);
        assert!((c.normal - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_box_corners_rotated() {
        let mut b = unit_box(0, Vec3::new(0.0, 5.0, 0.0));
        b.1.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let corners = box_corners(&view(0, &b), Vec3::new(1.0, 0.5, 2.0));
        for c in corners {
            // Rotated 90 degrees about Y: x and z extents swap
            assert!((c.x.abs() - 2.0).abs() < 1e-5);
            assert!((c.z.abs() - 1.0).abs() < 1e-5);
            assert!(((c.y - 5.0).abs() - 0.5).abs() < 1e-5);
        }
    }
}
