mod bezier;
mod clothoid;

pub use bezier::BezierCurve;
pub use clothoid::{Clothoid, ClothoidShape, SOLVER_MAX_ITERATIONS, SOLVER_TOLERANCE};

use crate::error::{GeometryError, Result};
use crate::geometry::Polyline;
use crate::math::{Point3, Vector3};
use crate::tessellation::Flattening;

/// Trait for parametric curves over the normalized domain `s ∈ [0, 1]`.
///
/// Implementations are immutable once constructed; flattening never
/// mutates the curve and always allocates a fresh polyline.
pub trait Curve {
    /// Evaluates the curve position at parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is NaN or outside `[0, 1]`.
    fn evaluate(&self, s: f64) -> Result<Point3>;

    /// Unit tangent direction at parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is out of range or the tangent is
    /// degenerate (zero derivative).
    fn tangent(&self, s: f64) -> Result<Vector3>;

    /// Curvature (reciprocal radius) at parameter `s`.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is out of range.
    fn curvature(&self, s: f64) -> Result<f64>;

    /// Start point of the curve (`s = 0`).
    fn start_point(&self) -> Point3;

    /// End point of the curve (`s = 1`).
    fn end_point(&self) -> Point3;

    /// Total arc length, exact where available and estimated otherwise.
    fn length(&self) -> f64;

    /// Flattens the curve into a polyline with the given strategy.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, a failed curve
    /// evaluation, or an exceeded subdivision depth bound.
    fn to_polyline(&self, flattening: &Flattening) -> Result<Polyline>
    where
        Self: Sized,
    {
        crate::tessellation::flatten(self, flattening)
    }
}

/// Validates a normalized curve parameter.
pub(crate) fn check_parameter(s: f64) -> Result<()> {
    if s.is_nan() {
        return Err(GeometryError::NotANumber { parameter: "s" }.into());
    }
    if !(0.0..=1.0).contains(&s) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "s",
            value: s,
            min: 0.0,
            max: 1.0,
        }
        .into());
    }
    Ok(())
}
