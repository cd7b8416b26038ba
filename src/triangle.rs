//! Triangle geometry shared by terrain cells and standalone triangle shapes.

use glam::Vec3;

/// A triangle with counter-clockwise winding; the normal follows `(b - a) x (c - a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Apply `f` to every vertex (e.g. heightmap -> world).
    #[inline]
    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> Self {
        Self {
            a: f(self.a),
            b: f(self.b),
            c: f(self.c),
        }
    }

    /// Unit normal. Degenerate triangles report +Y.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or(Vec3::Y)
    }

    /// Signed distance of `point` from the triangle's plane along the normal.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.a).dot(self.normal())
    }

    /// Centroid and radius of a sphere enclosing all three vertices.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        let center = (self.a + self.b + self.c) / 3.0;
        let radius_sq = (self.a - center)
            .length_squared()
            .max((self.b - center).length_squared())
            .max((self.c - center).length_squared());
        (center, radius_sq.sqrt())
    }

    /// Whether `point` projects (along the normal) inside the triangle.
    pub fn contains_projection(&self, point: Vec3) -> bool {
        let n = (self.b - self.a).cross(self.c - self.a);
        if n.length_squared() < 1e-12 {
            return false;
        }
        let edges = [(self.a, self.b), (self.b, self.c), (self.c, self.a)];
        edges
            .iter()
            .all(|&(from, to)| (to - from).cross(point - from).dot(n) >= 0.0)
    }

    /// Closest point on the triangle (including its interior) to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }

    /// Closest point on the triangle if it lies strictly inside the sphere.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let closest = self.closest_point(center);
        if (closest - center).length_squared() < radius * radius {
            Some(closest)
        } else {
            None
        }
    }

    /// Height of the triangle's plane above `(x, z)`, or `None` for vertical triangles.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let n = (self.b - self.a).cross(self.c - self.a);
        if n.y.abs() < 1e-9 {
            return None;
        }
        // n . (p - a) = 0 solved for p.y
        Some(self.a.y - (n.x * (x - self.a.x) + n.z * (z - self.a.z)) / n.y)
    }
}
