//! Surface material used to combine friction and restitution per contact.

/// Surface response coefficients of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coulomb friction coefficient (0.0 - 1.0).
    pub friction: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.3,
        }
    }
}

impl Material {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// Material seen by a contact between `self` and `other` (component-wise mean).
    #[inline]
    pub fn combine(&self, other: &Material) -> Material {
        Material {
            friction: (self.friction + other.friction) * 0.5,
            restitution: (self.restitution + other.restitution) * 0.5,
        }
    }
}
