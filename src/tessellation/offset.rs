use crate::error::{GeometryError, Result};
use crate::geometry::curve::Curve;
use crate::geometry::Polyline;
use crate::math::angle::angle_between;
use crate::math::linear_function::PiecewiseLinearFunction;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{flatten, Flattening};

/// Step used for finite-difference tangents of the offset geometry.
const TANGENT_STEP: f64 = 1e-6;

/// Number of chords summed when estimating the offset arc length.
const LENGTH_SEGMENTS: u32 = 256;

/// Flattens `curve` displaced laterally by `offsets`.
///
/// The offset value at parameter `s` displaces the curve point along the
/// left normal of its tangent in the XY plane; positive offsets go left
/// of the direction of travel. Deviation and angle bounds apply to the
/// displaced geometry, not the base curve, since lateral displacement
/// changes local curvature. A constant-zero profile reproduces the plain
/// flattening exactly.
///
/// # Errors
///
/// Returns an error for an invalid configuration, a failed curve
/// evaluation, an exceeded subdivision depth bound, or a base tangent
/// that leaves the offset direction undefined.
pub fn flatten_offset(
    curve: &dyn Curve,
    offsets: &PiecewiseLinearFunction,
    flattening: &Flattening,
) -> Result<Polyline> {
    let offset_curve = OffsetCurve { base: curve, offsets };
    flatten(&offset_curve, flattening)
}

/// Adapter presenting the laterally displaced curve as a curve of its
/// own, so the subdivision engine measures the displaced geometry.
struct OffsetCurve<'a> {
    base: &'a dyn Curve,
    offsets: &'a PiecewiseLinearFunction,
}

impl OffsetCurve<'_> {
    fn displace(&self, s: f64) -> Result<Point3> {
        let point = self.base.evaluate(s)?;
        let offset = self.offsets.get(s);
        if offset.abs() < TOLERANCE {
            return Ok(point);
        }
        let tangent = self.base.tangent(s)?;
        Ok(point + left_normal(&tangent)? * offset)
    }
}

/// Left normal of `tangent` projected into the XY plane.
fn left_normal(tangent: &Vector3) -> Result<Vector3> {
    let planar = Vector3::new(-tangent.y, tangent.x, 0.0);
    let len = planar.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(planar / len)
}

impl Curve for OffsetCurve<'_> {
    fn evaluate(&self, s: f64) -> Result<Point3> {
        self.displace(s)
    }

    fn tangent(&self, s: f64) -> Result<Vector3> {
        // Central difference over the displaced geometry; the offset
        // profile is only piecewise smooth, so no analytic form exists.
        let lo = (s - TANGENT_STEP).max(0.0);
        let hi = (s + TANGENT_STEP).min(1.0);
        let d = self.displace(hi)? - self.displace(lo)?;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    fn curvature(&self, s: f64) -> Result<f64> {
        // Heading rate over a short stretch of displaced arc length.
        let step = 1e-4;
        let lo = (s - step).max(0.0);
        let hi = (s + step).min(1.0);
        let turn = angle_between(&self.tangent(lo)?, &self.tangent(hi)?);
        let arc = (self.displace(hi)? - self.displace(lo)?).norm();
        if arc < TOLERANCE {
            return Ok(f64::INFINITY);
        }
        Ok(turn / arc)
    }

    fn start_point(&self) -> Point3 {
        // A degenerate offset direction falls back to the base point.
        self.displace(0.0)
            .unwrap_or_else(|_| self.base.start_point())
    }

    fn end_point(&self) -> Point3 {
        self.displace(1.0).unwrap_or_else(|_| self.base.end_point())
    }

    fn length(&self) -> f64 {
        let mut total = 0.0;
        let mut prev = self.start_point();
        for i in 1..=LENGTH_SEGMENTS {
            let s = f64::from(i) / f64::from(LENGTH_SEGMENTS);
            let Ok(point) = self.displace(s) else {
                continue;
            };
            total += (point - prev).norm();
            prev = point;
        }
        total
    }
}
