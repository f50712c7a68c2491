use std::fmt;

use tracing::{debug, trace};

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{check_parameter, Curve};
use crate::geometry::{Polyline, Ray};
use crate::math::angle::normalize_angle;
use crate::math::fresnel::quadratic_phase_integral;
use crate::math::{Point3, Vector3, ANGLE_TOLERANCE, TOLERANCE};
use crate::tessellation::Flattening;

/// Residual tolerance on the solver's lateral closure integral.
pub const SOLVER_TOLERANCE: f64 = 1e-12;

/// Iteration cap shared by the Newton fast path and the bisection
/// fallback of the pose solver.
pub const SOLVER_MAX_ITERATIONS: u32 = 100;

/// Shape a clothoid degenerates to, judged against [`ANGLE_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClothoidShape {
    /// Negligible total heading change: a straight segment.
    Straight,
    /// Negligible curvature change: a circular arc.
    Arc,
    /// Linearly varying curvature: a true clothoid.
    Clothoid,
}

impl fmt::Display for ClothoidShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Straight => "Straight",
            Self::Arc => "Arc",
            Self::Clothoid => "Clothoid",
        };
        write!(f, "{name}")
    }
}

/// A clothoid (Euler spiral) segment in the XY plane.
///
/// Curvature varies linearly with arc length from `start_curvature` to
/// `end_curvature` over `length`; the heading is the quadratic
/// `θ(u) = θ₀ + k₀·u + (k₁-k₀)/(2L)·u²` of arc length `u`, and positions
/// integrate `(cos θ, sin θ)` through Fresnel-integral geometry. Positive
/// curvature turns left of the direction of travel. The z coordinate of
/// the start pose is carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Clothoid {
    start: Ray,
    length: f64,
    start_curvature: f64,
    end_curvature: f64,
}

impl Clothoid {
    /// Connects two directed points with a clothoid segment.
    ///
    /// Poses whose headings both line up with the chord within
    /// [`ANGLE_TOLERANCE`] degenerate to a straight segment; poses whose
    /// chord-relative headings are symmetric admit an exact circular arc.
    /// Anything else is solved iteratively for the connecting clothoid.
    /// The degenerations are deliberate reclassifications, not failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the two locations coincide or the pose solver
    /// does not converge.
    pub fn from_rays(start: &Ray, end: &Ray) -> Result<Self> {
        let chord = end.origin() - start.origin();
        let chord_len = chord.xy().norm();
        if chord_len < TOLERANCE {
            return Err(GeometryError::InvalidArgument(
                "start and end locations coincide".into(),
            )
            .into());
        }

        let chord_heading = chord.y.atan2(chord.x);
        let phi0 = normalize_angle(start.heading() - chord_heading);
        let phi1 = normalize_angle(end.heading() - chord_heading);

        if phi0.abs() < ANGLE_TOLERANCE && phi1.abs() < ANGLE_TOLERANCE {
            debug!(phi0, phi1, "poses are collinear, degenerating to a straight");
            return Ok(Self {
                start: Ray::from_heading(*start.origin(), chord_heading),
                length: chord_len,
                start_curvature: 0.0,
                end_curvature: 0.0,
            });
        }

        if (phi0 + phi1).abs() < ANGLE_TOLERANCE {
            // Symmetric chord-relative headings: an exact circular arc
            // with inscribed sweep φ1 - φ0.
            let sweep = phi1 - phi0;
            let radius = chord_len / (2.0 * (sweep.abs() / 2.0).sin());
            let length = radius * sweep.abs();
            let curvature = sweep / length;
            debug!(sweep, radius, "poses admit a circular arc");
            return Ok(Self {
                start: Ray::from_heading(*start.origin(), start.heading()),
                length,
                start_curvature: curvature,
                end_curvature: curvature,
            });
        }

        // Normalized frame: unit-length curve with heading
        // ψ(t) = φ0 + (δ - A)t + At², which meets ψ(1) = φ1 for every A.
        // Solve the lateral closure Y(A) = ∫₀¹ sin ψ = 0 so the endpoint
        // lands on the chord, then scale by the chord projection X.
        let delta = phi1 - phi0;
        let a_coeff = solve_lateral_closure(phi0, delta)?;
        let (x_closure, _) = quadratic_phase_integral(a_coeff, delta - a_coeff, phi0, 1.0);
        if x_closure <= TOLERANCE {
            return Err(GeometryError::Degenerate(
                "clothoid endpoint projects behind its start".into(),
            )
            .into());
        }
        let length = chord_len / x_closure;
        let start_curvature = (delta - a_coeff) / length;
        let end_curvature = (delta + a_coeff) / length;
        debug!(length, start_curvature, end_curvature, "solved clothoid from poses");

        Ok(Self {
            start: Ray::from_heading(*start.origin(), start.heading()),
            length,
            start_curvature,
            end_curvature,
        })
    }

    /// Creates a clothoid from an explicit arc length and curvatures.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error for NaN parameters and
    /// `InvalidArgument` for a non-positive or infinite length or an
    /// infinite curvature.
    pub fn from_length(
        start: &Ray,
        length: f64,
        start_curvature: f64,
        end_curvature: f64,
    ) -> Result<Self> {
        if length.is_nan() {
            return Err(GeometryError::NotANumber { parameter: "length" }.into());
        }
        if length <= 0.0 || length.is_infinite() {
            return Err(GeometryError::InvalidArgument(format!(
                "length must be positive and finite, got {length}"
            ))
            .into());
        }
        check_curvature(start_curvature, "start_curvature")?;
        check_curvature(end_curvature, "end_curvature")?;
        Ok(Self {
            start: *start,
            length,
            start_curvature,
            end_curvature,
        })
    }

    /// Creates a clothoid from an explicit scale parameter and curvatures.
    ///
    /// The A-value ties length to curvature change through
    /// `L = A²·|k₁ - k₀|`.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error for NaN parameters; `InvalidArgument`
    /// for a non-positive or infinite A-value, an infinite curvature, or
    /// equal curvatures (which leave the length undetermined).
    pub fn from_a(
        start: &Ray,
        a_value: f64,
        start_curvature: f64,
        end_curvature: f64,
    ) -> Result<Self> {
        if a_value.is_nan() {
            return Err(GeometryError::NotANumber { parameter: "a_value" }.into());
        }
        if a_value.is_infinite() {
            return Err(GeometryError::InvalidArgument("A-value must be finite".into()).into());
        }
        if a_value <= 0.0 {
            return Err(GeometryError::InvalidArgument(format!(
                "A-value must be positive, got {a_value}"
            ))
            .into());
        }
        check_curvature(start_curvature, "start_curvature")?;
        check_curvature(end_curvature, "end_curvature")?;
        if (end_curvature - start_curvature).abs() < TOLERANCE {
            return Err(GeometryError::InvalidArgument(
                "equal curvatures leave the length undetermined; use from_length".into(),
            )
            .into());
        }
        Ok(Self {
            start: *start,
            length: a_value * a_value * (end_curvature - start_curvature).abs(),
            start_curvature,
            end_curvature,
        })
    }

    /// Returns the start pose.
    #[must_use]
    pub fn start_ray(&self) -> &Ray {
        &self.start
    }

    /// Returns the end pose (end point plus end heading).
    #[must_use]
    pub fn end_ray(&self) -> Ray {
        Ray::from_heading(
            self.point_at_arc(self.length),
            normalize_angle(self.heading_at_arc(self.length)),
        )
    }

    /// Signed curvature at the start.
    #[must_use]
    pub fn start_curvature(&self) -> f64 {
        self.start_curvature
    }

    /// Signed curvature at the end.
    #[must_use]
    pub fn end_curvature(&self) -> f64 {
        self.end_curvature
    }

    /// Signed radius at the start; infinite where the curve is locally
    /// straight.
    #[must_use]
    pub fn start_radius(&self) -> f64 {
        reciprocal(self.start_curvature)
    }

    /// Signed radius at the end.
    #[must_use]
    pub fn end_radius(&self) -> f64 {
        reciprocal(self.end_curvature)
    }

    /// Clothoid scale parameter `A = sqrt(L / |k₁ - k₀|)`.
    ///
    /// Infinite for constant-curvature segments (straights and arcs).
    #[must_use]
    pub fn a_value(&self) -> f64 {
        let dk = (self.end_curvature - self.start_curvature).abs();
        if dk < TOLERANCE {
            f64::INFINITY
        } else {
            (self.length / dk).sqrt()
        }
    }

    /// Classifies the curve against [`ANGLE_TOLERANCE`].
    ///
    /// Derived from length and curvatures on every call, so it cannot
    /// drift from the construction parameters.
    #[must_use]
    pub fn shape(&self) -> ClothoidShape {
        if self.start_curvature.abs() * self.length < ANGLE_TOLERANCE
            && self.end_curvature.abs() * self.length < ANGLE_TOLERANCE
        {
            ClothoidShape::Straight
        } else if (self.end_curvature - self.start_curvature).abs() * self.length
            < ANGLE_TOLERANCE
        {
            ClothoidShape::Arc
        } else {
            ClothoidShape::Clothoid
        }
    }

    /// Heading at arc length `u` from the start.
    fn heading_at_arc(&self, u: f64) -> f64 {
        let sigma = (self.end_curvature - self.start_curvature) / self.length;
        self.start.heading() + self.start_curvature * u + 0.5 * sigma * u * u
    }

    /// Position at arc length `u` from the start.
    fn point_at_arc(&self, u: f64) -> Point3 {
        let sigma = (self.end_curvature - self.start_curvature) / self.length;
        let (dx, dy) = quadratic_phase_integral(
            0.5 * sigma,
            self.start_curvature,
            self.start.heading(),
            u,
        );
        let origin = self.start.origin();
        Point3::new(origin.x + dx, origin.y + dy, origin.z)
    }
}

impl Curve for Clothoid {
    fn evaluate(&self, s: f64) -> Result<Point3> {
        check_parameter(s)?;
        Ok(self.point_at_arc(s * self.length))
    }

    fn tangent(&self, s: f64) -> Result<Vector3> {
        check_parameter(s)?;
        let theta = self.heading_at_arc(s * self.length);
        Ok(Vector3::new(theta.cos(), theta.sin(), 0.0))
    }

    fn curvature(&self, s: f64) -> Result<f64> {
        check_parameter(s)?;
        Ok(self.start_curvature + (self.end_curvature - self.start_curvature) * s)
    }

    fn start_point(&self) -> Point3 {
        *self.start.origin()
    }

    fn end_point(&self) -> Point3 {
        self.point_at_arc(self.length)
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn to_polyline(&self, flattening: &Flattening) -> Result<Polyline>
    where
        Self: Sized,
    {
        flattening.validate()?;
        if self.shape() == ClothoidShape::Straight {
            // A straight reduces to its endpoints at any resolution.
            return Polyline::new(vec![self.start_point(), self.end_point()]);
        }
        crate::tessellation::flatten(self, flattening)
    }
}

fn check_curvature(value: f64, parameter: &'static str) -> Result<()> {
    if value.is_nan() {
        return Err(GeometryError::NotANumber { parameter }.into());
    }
    if value.is_infinite() {
        return Err(GeometryError::InvalidArgument(format!(
            "{parameter} must be finite"
        ))
        .into());
    }
    Ok(())
}

fn reciprocal(curvature: f64) -> f64 {
    if curvature.abs() < TOLERANCE {
        f64::INFINITY
    } else {
        1.0 / curvature
    }
}

/// Solves `Y(A) = ∫₀¹ sin(φ0 + (δ-A)t + At²) dt = 0` for `A`.
///
/// Newton iteration from the small-angle guess `A ≈ 3(φ0 + φ1)`, with an
/// expanding-bracket bisection fallback when Newton stalls. Convergence
/// means the residual drops below [`SOLVER_TOLERANCE`] within
/// [`SOLVER_MAX_ITERATIONS`] iterations.
fn solve_lateral_closure(phi0: f64, delta: f64) -> Result<f64> {
    let lateral = |a: f64| quadratic_phase_integral(a, delta - a, phi0, 1.0).1;
    let guess = 3.0 * (2.0 * phi0 + delta);

    let mut a = guess;
    let mut y = lateral(a);
    for iteration in 0..SOLVER_MAX_ITERATIONS {
        if y.abs() < SOLVER_TOLERANCE {
            trace!(iteration, a, "lateral closure converged");
            return Ok(a);
        }
        let h = 1e-7 * (1.0 + a.abs());
        let slope = (lateral(a + h) - lateral(a - h)) / (2.0 * h);
        if slope.abs() < 1e-14 {
            break;
        }
        let step = y / slope;
        if !step.is_finite() || step.abs() > 10.0 {
            break;
        }
        a -= step;
        y = lateral(a);
    }

    debug!(phi0, delta, "Newton stalled, switching to bisection");
    bisect_lateral(&lateral, guess)
}

/// Expanding-bracket bisection around `center`.
fn bisect_lateral<F: Fn(f64) -> f64>(lateral: &F, center: f64) -> Result<f64> {
    let mut iterations = 0_u32;
    let mut radius = 1.0;
    let mut lo = center - radius;
    let mut hi = center + radius;
    let mut y_lo = lateral(lo);
    while y_lo.signum() == lateral(hi).signum() {
        radius *= 2.0;
        lo = center - radius;
        hi = center + radius;
        y_lo = lateral(lo);
        iterations += 1;
        if iterations >= SOLVER_MAX_ITERATIONS {
            return Err(GeometryError::NoConvergence { iterations }.into());
        }
    }
    loop {
        let mid = 0.5 * (lo + hi);
        let y_mid = lateral(mid);
        if y_mid.abs() < SOLVER_TOLERANCE || hi - lo < 1e-14 {
            return Ok(mid);
        }
        if y_mid.signum() == y_lo.signum() {
            lo = mid;
            y_lo = y_mid;
        } else {
            hi = mid;
        }
        iterations += 1;
        if iterations >= SOLVER_MAX_ITERATIONS {
            return Err(GeometryError::NoConvergence { iterations }.into());
        }
    }
}
