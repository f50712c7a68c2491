use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// A directed point: an origin with a unit heading direction.
///
/// Used as a curve boundary condition, pairing the position of a curve
/// endpoint with the tangent direction the curve must take there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vector3,
}

impl Ray {
    /// Creates a ray from an origin and a direction.
    ///
    /// The direction is normalized on construction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Creates a ray in the XY plane from a heading angle in radians.
    #[must_use]
    pub fn from_heading(origin: Point3, heading: f64) -> Self {
        Self {
            origin,
            direction: Vector3::new(heading.cos(), heading.sin(), 0.0),
        }
    }

    /// Returns the origin point.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Heading angle of the direction projected into the XY plane.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }

    /// Point at the given signed distance along the ray.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Point3 {
        self.origin + self.direction * distance
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn direction_is_normalized() {
        let ray = Ray::new(Point3::origin(), Vector3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((ray.direction().norm() - 1.0).abs() < TOLERANCE);
        assert!((ray.direction().x - 0.6).abs() < TOLERANCE);
        assert!((ray.direction().y - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn rejects_zero_direction() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn heading_roundtrip() {
        let ray = Ray::from_heading(Point3::new(1.0, 2.0, 0.0), FRAC_PI_2);
        assert!((ray.heading() - FRAC_PI_2).abs() < TOLERANCE);
        assert!(ray.direction().x.abs() < TOLERANCE);
        assert!((ray.direction().y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn point_at_walks_the_direction() {
        let ray = Ray::from_heading(Point3::new(1.0, 0.0, 0.0), 0.0);
        let p = ray.point_at(2.5);
        assert!((p - Point3::new(3.5, 0.0, 0.0)).norm() < TOLERANCE);
    }
}
