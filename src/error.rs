//! Errors raised when invalid state crosses into the collision core.
//!
//! Geometric degeneracies found while detecting or resolving contacts are
//! normalized in place and never surface here. These variants only cover
//! inputs the internal math cannot tolerate (non-finite poses, impossible
//! dimensions) and lookups of ids that do not exist.

use crate::collider::ShapeId;
use crate::composite::BodyId;

/// Result alias for fallible collision-world operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// A body carries a NaN or infinite position, rotation or velocity.
    #[error("body {body:?} has non-finite {field}")]
    NonFiniteState { body: BodyId, field: &'static str },

    /// A shape was built with a non-finite or non-positive dimension.
    #[error("invalid {field} for shape: {value}")]
    InvalidDimension { field: &'static str, value: f32 },

    /// Dynamic bodies need a finite, strictly positive mass.
    #[error("invalid mass {0}: dynamic bodies need a finite positive mass")]
    InvalidMass(f32),

    /// Heightmap sample count does not match the grid dimensions.
    #[error("heightmap has {actual} samples, expected {expected} for a {width}x{depth} grid")]
    HeightmapSize {
        width: u32,
        depth: u32,
        expected: usize,
        actual: usize,
    },

    #[error("unknown body {0:?}")]
    UnknownBody(BodyId),

    #[error("unknown shape {0:?}")]
    UnknownShape(ShapeId),
}

/// Reject a dimension that is NaN, infinite, or not strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> PhysicsResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError::InvalidDimension { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("radius", 2.0), Ok(2.0));
        assert!(ensure_positive("radius", 0.0).is_err());
        assert!(ensure_positive("radius", -1.0).is_err());
        assert!(ensure_positive("radius", f32::NAN).is_err());
        assert!(ensure_positive("radius", f32::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = PhysicsError::InvalidMass(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = PhysicsError::HeightmapSize {
            width: 2,
            depth: 2,
            expected: 9,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "heightmap has 4 samples, expected 9 for a 2x2 grid"
        );
    }
}
