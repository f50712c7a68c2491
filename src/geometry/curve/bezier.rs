use crate::error::{GeometryError, Result};
use crate::geometry::curve::{check_parameter, Curve};
use crate::geometry::Ray;
use crate::math::binomial::binomial;
use crate::math::{Point3, Vector3, TOLERANCE};

/// Number of chords summed when estimating arc length.
const LENGTH_SEGMENTS: u32 = 256;

/// A Bézier curve of arbitrary degree.
///
/// Evaluated as the Bernstein-weighted sum of its control points:
/// `B(s) = Σ C(n,i) (1-s)^(n-i) s^i P_i`, which is the closed form of
/// repeated linear interpolation (de Casteljau).
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    control_points: Vec<Point3>,
}

impl BezierCurve {
    /// Creates a curve of degree `n` from `n + 1` explicit control points.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two control points are supplied or
    /// two consecutive control points coincide.
    pub fn new(control_points: Vec<Point3>) -> Result<Self> {
        if control_points.len() < 2 {
            return Err(GeometryError::InvalidArgument(
                "a Bézier curve requires at least two control points".into(),
            )
            .into());
        }
        for pair in control_points.windows(2) {
            if (pair[1] - pair[0]).norm() < TOLERANCE {
                return Err(GeometryError::InvalidArgument(
                    "consecutive control points coincide".into(),
                )
                .into());
            }
        }
        Ok(Self { control_points })
    }

    /// Creates a cubic curve from exactly four control points.
    ///
    /// Unlike [`BezierCurve::new`], coincident control points are allowed
    /// here; a fully collapsed control polygon is the degenerate point
    /// curve (with infinite curvature by convention).
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly four control points are supplied.
    pub fn cubic(control_points: &[Point3]) -> Result<Self> {
        if control_points.len() != 4 {
            return Err(GeometryError::InvalidArgument(format!(
                "a cubic Bézier curve requires exactly four control points, got {}",
                control_points.len()
            ))
            .into());
        }
        Ok(Self {
            control_points: control_points.to_vec(),
        })
    }

    /// Creates a cubic curve joining two directed endpoints.
    ///
    /// The interior control points sit along each endpoint's tangent at a
    /// distance of `chord · shape / 3`. With `weighted`, each distance is
    /// scaled by the chord's projection onto the respective tangent
    /// instead of the full chord length, falling back to the unweighted
    /// distance when the projection degenerates.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the endpoint locations coincide or
    /// `shape` is non-positive or infinite, and an arithmetic error if
    /// `shape` is NaN.
    pub fn from_rays(start: &Ray, end: &Ray, shape: f64, weighted: bool) -> Result<Self> {
        if shape.is_nan() {
            return Err(GeometryError::NotANumber { parameter: "shape" }.into());
        }
        if shape <= 0.0 || shape.is_infinite() {
            return Err(GeometryError::InvalidArgument(format!(
                "shape factor must be positive and finite, got {shape}"
            ))
            .into());
        }
        let chord = end.origin() - start.origin();
        let chord_len = chord.norm();
        if chord_len < TOLERANCE {
            return Err(GeometryError::InvalidArgument(
                "start and end locations coincide".into(),
            )
            .into());
        }

        let (start_dist, end_dist) = if weighted {
            let start_proj = chord.dot(start.direction()).abs();
            let end_proj = chord.dot(end.direction()).abs();
            (
                if start_proj < TOLERANCE { chord_len } else { start_proj } * shape / 3.0,
                if end_proj < TOLERANCE { chord_len } else { end_proj } * shape / 3.0,
            )
        } else {
            let dist = chord_len * shape / 3.0;
            (dist, dist)
        };

        Ok(Self {
            control_points: vec![
                *start.origin(),
                start.origin() + start.direction() * start_dist,
                end.origin() - end.direction() * end_dist,
                *end.origin(),
            ],
        })
    }

    /// Returns the control points in order.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Returns the polynomial degree (one less than the point count).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.control_points.len() - 1
    }

    /// Bernstein sum without parameter validation.
    fn point_at(&self, s: f64) -> Point3 {
        let n = self.degree();
        let mut acc = Vector3::zeros();
        for (i, p) in self.control_points.iter().enumerate() {
            acc += p.coords * bernstein(n, i, s);
        }
        Point3::from(acc)
    }

    /// First derivative of the Bernstein sum:
    /// `B'(s) = n Σ B_{i,n-1}(s) (P_{i+1} - P_i)`.
    fn derivative(&self, s: f64) -> Vector3 {
        let n = self.degree();
        let mut acc = Vector3::zeros();
        for i in 0..n {
            let delta = self.control_points[i + 1] - self.control_points[i];
            acc += delta * bernstein(n - 1, i, s);
        }
        acc * to_f64(n)
    }

    /// Second derivative of the Bernstein sum over second differences of
    /// the control polygon.
    fn second_derivative(&self, s: f64) -> Vector3 {
        let n = self.degree();
        if n < 2 {
            return Vector3::zeros();
        }
        let mut acc = Vector3::zeros();
        for i in 0..n - 1 {
            let delta = (self.control_points[i + 2] - self.control_points[i + 1])
                - (self.control_points[i + 1] - self.control_points[i]);
            acc += delta * bernstein(n - 2, i, s);
        }
        acc * to_f64(n * (n - 1))
    }
}

impl Curve for BezierCurve {
    fn evaluate(&self, s: f64) -> Result<Point3> {
        check_parameter(s)?;
        Ok(self.point_at(s))
    }

    fn tangent(&self, s: f64) -> Result<Vector3> {
        check_parameter(s)?;
        let d = self.derivative(s);
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    fn curvature(&self, s: f64) -> Result<f64> {
        check_parameter(s)?;
        let d1 = self.derivative(s);
        let speed = d1.norm();
        if speed < TOLERANCE {
            // Collapsed control polygon: an infinitely tight bend.
            return Ok(f64::INFINITY);
        }
        let d2 = self.second_derivative(s);
        Ok(d1.cross(&d2).norm() / speed.powi(3))
    }

    fn start_point(&self) -> Point3 {
        self.control_points[0]
    }

    fn end_point(&self) -> Point3 {
        self.control_points[self.control_points.len() - 1]
    }

    fn length(&self) -> f64 {
        if self.degree() == 1 {
            return (self.control_points[1] - self.control_points[0]).norm();
        }
        let mut total = 0.0;
        let mut prev = self.start_point();
        for i in 1..=LENGTH_SEGMENTS {
            let point = self.point_at(f64::from(i) / f64::from(LENGTH_SEGMENTS));
            total += (point - prev).norm();
            prev = point;
        }
        total
    }
}

/// Bernstein basis polynomial `B_{i,n}(s) = C(n,i) s^i (1-s)^(n-i)`.
#[allow(clippy::cast_possible_truncation)]
fn bernstein(n: usize, i: usize, s: f64) -> f64 {
    binomial(n as u32, i as u32) * s.powi(i as i32) * (1.0 - s).powi((n - i) as i32)
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tessellation::Flattening;

    fn spec_cubic() -> BezierCurve {
        BezierCurve::new(vec![
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(20.0, 0.0, 0.0),
            Point3::new(0.0, 20.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn endpoints_match_control_polygon() {
        let c = spec_cubic();
        assert!((c.start_point() - Point3::new(10.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((c.end_point() - Point3::new(0.0, 10.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn evaluates_by_the_bernstein_sum() {
        let c = spec_cubic();
        // At s = 1/3 the weights are (8, 12, 6, 1) / 27.
        let p = c.evaluate(1.0 / 3.0).unwrap();
        assert!((p.x - 320.0 / 27.0).abs() < 1e-10, "x={}", p.x);
        assert!((p.y - 130.0 / 27.0).abs() < 1e-10, "y={}", p.y);
    }

    #[test]
    fn linear_curve_is_the_chord() {
        let c = BezierCurve::new(vec![Point3::origin(), Point3::new(2.0, 2.0, 0.0)]).unwrap();
        let p = c.evaluate(0.25).unwrap();
        assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < TOLERANCE);
        assert!((c.length() - 8.0_f64.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn rejects_too_few_control_points() {
        assert!(BezierCurve::new(vec![Point3::origin()]).is_err());
        assert!(BezierCurve::cubic(&[Point3::origin(); 3]).is_err());
    }

    #[test]
    fn rejects_consecutive_duplicates() {
        let r = BezierCurve::new(vec![
            Point3::origin(),
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        assert!(r.is_err());
    }

    #[test]
    fn cubic_constructor_allows_duplicates() {
        assert!(BezierCurve::cubic(&[Point3::new(1.0, 1.0, 0.0); 4]).is_ok());
    }

    #[test]
    fn collapsed_cubic_has_infinite_curvature() {
        let c = BezierCurve::cubic(&[Point3::new(1.0, 1.0, 0.0); 4]).unwrap();
        assert!(c.curvature(0.5).unwrap().is_infinite());
        assert!(c.curvature(0.25).unwrap().is_infinite());
    }

    #[test]
    fn straight_polygon_has_zero_curvature() {
        let c = BezierCurve::new(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(c.curvature(0.5).unwrap().abs() < 1e-9);
    }

    #[test]
    fn quadratic_curvature_at_apex() {
        // Symmetric parabola-like arch; curvature at the apex is
        // |B''| / |B'|² since the vectors are orthogonal there.
        let c = BezierCurve::new(vec![
            Point3::origin(),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ])
        .unwrap();
        // B'(0.5) = (2, 0), B'' = (0, -8).
        let k = c.curvature(0.5).unwrap();
        assert!((k - 2.0).abs() < 1e-9, "k={k}");
    }

    #[test]
    fn from_rays_places_symmetric_control_points() {
        let start = Ray::from_heading(Point3::origin(), 0.0);
        let end = Ray::from_heading(Point3::new(3.0, 0.0, 0.0), 0.0);
        let c = BezierCurve::from_rays(&start, &end, 1.0, false).unwrap();
        let pts = c.control_points();
        assert!((pts[1] - Point3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((pts[2] - Point3::new(2.0, 0.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn weighted_placement_uses_chord_projection() {
        let start = Ray::from_heading(Point3::origin(), 0.0);
        // End tangent at 45°: projection of the chord (4, 0) is 4/√2.
        let end = Ray::from_heading(Point3::new(4.0, 0.0, 0.0), std::f64::consts::FRAC_PI_4);
        let c = BezierCurve::from_rays(&start, &end, 1.0, true).unwrap();
        let pts = c.control_points();
        assert!((pts[1] - Point3::new(4.0 / 3.0, 0.0, 0.0)).norm() < 1e-10);
        let expected = 4.0 / std::f64::consts::SQRT_2 / 3.0;
        let back = Point3::new(4.0, 0.0, 0.0)
            - Vector3::new(expected / std::f64::consts::SQRT_2, expected / std::f64::consts::SQRT_2, 0.0);
        assert!((pts[2] - back).norm() < 1e-10);
    }

    #[test]
    fn from_rays_rejects_bad_shape_factors() {
        let start = Ray::from_heading(Point3::origin(), 0.0);
        let end = Ray::from_heading(Point3::new(1.0, 0.0, 0.0), 0.0);
        assert!(BezierCurve::from_rays(&start, &end, 0.0, false).is_err());
        assert!(BezierCurve::from_rays(&start, &end, -2.0, false).is_err());
        assert!(BezierCurve::from_rays(&start, &end, f64::INFINITY, false).is_err());
        assert!(BezierCurve::from_rays(&start, &end, f64::NAN, false).is_err());
    }

    #[test]
    fn from_rays_rejects_coincident_endpoints() {
        let start = Ray::from_heading(Point3::origin(), 0.0);
        let end = Ray::from_heading(Point3::origin(), 1.0);
        assert!(BezierCurve::from_rays(&start, &end, 1.0, false).is_err());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let c = spec_cubic();
        assert!(c.evaluate(-0.1).is_err());
        assert!(c.evaluate(1.1).is_err());
        assert!(c.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn length_estimate_tracks_a_known_curve() {
        // Quarter-circle-ish cubic from (1,0) to (0,1) using the standard
        // kappa = 0.5523 control offsets; length ≈ π/2.
        let kappa = 0.552_284_749_831;
        let c = BezierCurve::new(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, kappa, 0.0),
            Point3::new(kappa, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        assert!((c.length() - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn spec_scenario_three_segments() {
        let poly = spec_cubic().to_polyline(&Flattening::NumSegments(3)).unwrap();
        let pts = poly.points();
        assert_eq!(pts.len(), 4);
        assert!((pts[0] - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-4);
        assert!((pts[3] - Point3::new(0.0, 10.0, 0.0)).norm() < 1e-4);
        for p in &pts[1..3] {
            assert!(p.x > 0.0 && p.x < 15.0, "x={}", p.x);
            assert!(p.y > 0.0 && p.y < 15.0, "y={}", p.y);
        }
    }
}
