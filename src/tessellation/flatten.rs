use tracing::trace;

use crate::error::{CurvisError, FlattenError, GeometryError, Result};
use crate::geometry::curve::Curve;
use crate::geometry::Polyline;
use crate::math::angle::angle_between;
use crate::math::distance::point_to_segment_dist;
use crate::math::{Point3, Vector3};

use super::{Flattening, MAX_SUBDIVISION_DEPTH};

/// Flattens `curve` into a polyline satisfying `flattening`.
///
/// The first and last polyline points are the exact curve start and end
/// points; criteria-based strategies bisect the parameter interval until
/// every emitted chord meets the bound.
///
/// # Errors
///
/// Returns an error for an invalid configuration, a failed curve
/// evaluation, or a subdivision that exceeds [`MAX_SUBDIVISION_DEPTH`].
pub fn flatten(curve: &dyn Curve, flattening: &Flattening) -> Result<Polyline> {
    flattening.validate()?;
    if let Flattening::NumSegments(count) = *flattening {
        return flatten_uniform(curve, count);
    }
    let mut points = vec![curve.evaluate(0.0)?];
    subdivide(curve, 0.0, 1.0, flattening, 0, &mut points)?;
    trace!(points = points.len(), "flattening complete");
    Polyline::new(points)
}

/// Uniform sampling at `count + 1` parameter values.
fn flatten_uniform(curve: &dyn Curve, count: usize) -> Result<Polyline> {
    let mut points = Vec::with_capacity(count + 1);
    #[allow(clippy::cast_precision_loss)]
    for i in 0..=count {
        points.push(curve.evaluate(i as f64 / count as f64)?);
    }
    Polyline::new(points)
}

/// Emits the chord for `[s0, s1]` if the criteria accept it, otherwise
/// bisects at the midpoint parameter and recurses on both halves.
fn subdivide(
    curve: &dyn Curve,
    s0: f64,
    s1: f64,
    flattening: &Flattening,
    depth: u32,
    points: &mut Vec<Point3>,
) -> Result<()> {
    let mid = 0.5 * (s0 + s1);
    if segment_accepted(curve, s0, mid, s1, flattening)? {
        points.push(curve.evaluate(s1)?);
        return Ok(());
    }
    if depth >= MAX_SUBDIVISION_DEPTH {
        return Err(FlattenError::MaxDepthExceeded {
            max_depth: MAX_SUBDIVISION_DEPTH,
        }
        .into());
    }
    subdivide(curve, s0, mid, flattening, depth + 1, points)?;
    subdivide(curve, mid, s1, flattening, depth + 1, points)
}

fn segment_accepted(
    curve: &dyn Curve,
    s0: f64,
    mid: f64,
    s1: f64,
    flattening: &Flattening,
) -> Result<bool> {
    match *flattening {
        // Uniform sampling never reaches the subdivision path.
        Flattening::NumSegments(_) => Ok(true),
        Flattening::MaxDeviation(deviation) => deviation_ok(curve, s0, s1, deviation),
        Flattening::MaxAngle(angle) => angle_ok(curve, s0, mid, s1, angle),
        Flattening::Combined { deviation, angle } => {
            Ok(deviation_ok(curve, s0, s1, deviation)? && angle_ok(curve, s0, mid, s1, angle)?)
        }
    }
}

/// Checks the chord against interior curve samples at 1/4, 1/2 and 3/4.
///
/// The quarter points keep symmetric S-shaped segments, whose midpoint
/// can fall exactly on the chord, from being accepted prematurely.
fn deviation_ok(curve: &dyn Curve, s0: f64, s1: f64, deviation: f64) -> Result<bool> {
    let p0 = curve.evaluate(s0)?;
    let p1 = curve.evaluate(s1)?;
    for fraction in [0.25, 0.5, 0.75] {
        let sample = curve.evaluate(s0 + (s1 - s0) * fraction)?;
        if point_to_segment_dist(&sample, &p0, &p1) > deviation {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Heading change across the segment; the midpoint tangent is checked as
/// well so a segment cannot hide a full turn between matching end
/// tangents.
fn angle_ok(curve: &dyn Curve, s0: f64, mid: f64, s1: f64, angle: f64) -> Result<bool> {
    let Some(t0) = tangent_or_none(curve, s0)? else {
        return Ok(true);
    };
    let Some(tm) = tangent_or_none(curve, mid)? else {
        return Ok(true);
    };
    let Some(t1) = tangent_or_none(curve, s1)? else {
        return Ok(true);
    };
    Ok(angle_between(&t0, &t1) <= angle && angle_between(&t0, &tm) <= angle)
}

/// A degenerate tangent (collapsed control polygon) satisfies angular
/// criteria vacuously.
fn tangent_or_none(curve: &dyn Curve, s: f64) -> Result<Option<Vector3>> {
    match curve.tangent(s) {
        Ok(tangent) => Ok(Some(tangent)),
        Err(CurvisError::Geometry(GeometryError::ZeroVector)) => Ok(None),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{BezierCurve, Clothoid, Ray};
    use crate::math::TOLERANCE;

    fn arch() -> BezierCurve {
        BezierCurve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ])
        .unwrap()
    }

    fn quarter_arc() -> Clothoid {
        let start = Ray::from_heading(Point3::origin(), 0.0);
        let end = Ray::from_heading(Point3::new(1.0, 1.0, 0.0), std::f64::consts::FRAC_PI_2);
        Clothoid::from_rays(&start, &end).unwrap()
    }

    /// Dense parameter sweep: distance from curve samples to the nearest
    /// chord of the polyline.
    fn max_midpoint_deviation(curve: &dyn Curve, poly: &Polyline) -> f64 {
        let mut worst = 0.0_f64;
        for step in 0..=1000 {
            let s = f64::from(step) / 1000.0;
            let p = curve.evaluate(s).unwrap();
            let mut best = f64::INFINITY;
            for w in poly.points().windows(2) {
                best = best.min(point_to_segment_dist(&p, &w[0], &w[1]));
            }
            worst = worst.max(best);
        }
        worst
    }

    #[test]
    fn uniform_sampling_has_exactly_n_plus_one_points() {
        for n in [1_usize, 2, 3, 8, 17] {
            let poly = flatten(&arch(), &Flattening::NumSegments(n)).unwrap();
            assert_eq!(poly.points().len(), n + 1);
            assert!((poly.first() - arch().start_point()).norm() < 1e-4);
            assert!((poly.last() - arch().end_point()).norm() < 1e-4);
        }
    }

    #[test]
    fn single_segment_is_the_chord() {
        let poly = flatten(&arch(), &Flattening::NumSegments(1)).unwrap();
        assert_eq!(poly.points().len(), 2);
        assert!((poly.length() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn deviation_bound_holds_everywhere() {
        let curve = arch();
        for eps in [0.1, 0.01, 0.001] {
            let poly = flatten(&curve, &Flattening::MaxDeviation(eps)).unwrap();
            let measured = max_midpoint_deviation(&curve, &poly);
            assert!(
                measured <= eps * 1.01,
                "eps={eps}: measured {measured}"
            );
        }
    }

    #[test]
    fn tighter_deviation_never_degrades_the_result() {
        let curve = quarter_arc();
        let mut previous = f64::INFINITY;
        for eps in [0.1, 0.01, 0.001, 0.0001] {
            let poly = flatten(&curve, &Flattening::MaxDeviation(eps)).unwrap();
            let measured = max_midpoint_deviation(&curve, &poly);
            assert!(
                measured <= previous + TOLERANCE,
                "eps={eps}: {measured} > {previous}"
            );
            previous = measured;
        }
    }

    #[test]
    fn tighter_deviation_adds_points() {
        let curve = arch();
        let coarse = flatten(&curve, &Flattening::MaxDeviation(0.1)).unwrap();
        let fine = flatten(&curve, &Flattening::MaxDeviation(0.001)).unwrap();
        assert!(fine.points().len() > coarse.points().len());
    }

    #[test]
    fn angle_bound_limits_heading_change_per_segment() {
        let curve = quarter_arc();
        let poly = flatten(&curve, &Flattening::MaxAngle(0.1)).unwrap();
        // A quarter turn split into ≤0.1 rad pieces needs at least 16
        // segments; each chord's heading change must stay within bound.
        assert!(poly.segment_count() >= 16);
        for w in poly.points().windows(3) {
            let h0 = (w[1] - w[0]).normalize();
            let h1 = (w[2] - w[1]).normalize();
            assert!(angle_between(&h0, &h1) <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn combined_criteria_satisfy_both_bounds() {
        let curve = quarter_arc();
        let combined = flatten(
            &curve,
            &Flattening::Combined { deviation: 0.01, angle: 0.05 },
        )
        .unwrap();
        let by_deviation = flatten(&curve, &Flattening::MaxDeviation(0.01)).unwrap();
        let by_angle = flatten(&curve, &Flattening::MaxAngle(0.05)).unwrap();
        assert!(combined.points().len() >= by_deviation.points().len());
        assert!(combined.points().len() >= by_angle.points().len());
        assert!(max_midpoint_deviation(&curve, &combined) <= 0.01 * 1.01);
    }

    #[test]
    fn endpoints_are_exact_for_every_strategy() {
        let curve = arch();
        for flattening in [
            Flattening::NumSegments(7),
            Flattening::MaxDeviation(0.01),
            Flattening::MaxAngle(0.2),
            Flattening::Combined { deviation: 0.01, angle: 0.2 },
        ] {
            let poly = flatten(&curve, &flattening).unwrap();
            assert!((poly.first() - curve.start_point()).norm() < 1e-4);
            assert!((poly.last() - curve.end_point()).norm() < 1e-4);
        }
    }

    #[test]
    fn collapsed_curve_flattens_to_its_point() {
        // All control points identical: deviation is zero everywhere and
        // the angle criterion is vacuous.
        let curve = BezierCurve::cubic(&[Point3::new(1.0, 1.0, 0.0); 4]).unwrap();
        let poly = flatten(
            &curve,
            &Flattening::Combined { deviation: 0.01, angle: 0.1 },
        )
        .unwrap();
        assert_eq!(poly.points().len(), 2);
        assert!((poly.first() - Point3::new(1.0, 1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn invalid_configurations_are_rejected_up_front() {
        let curve = arch();
        assert!(flatten(&curve, &Flattening::NumSegments(0)).is_err());
        assert!(flatten(&curve, &Flattening::MaxDeviation(-0.5)).is_err());
        assert!(flatten(&curve, &Flattening::MaxAngle(f64::NAN)).is_err());
    }
}
