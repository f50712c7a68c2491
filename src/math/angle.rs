use std::f64::consts::PI;

use crate::math::{Vector3, TOLERANCE};

/// Normalizes an angle to the range `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Returns the unsigned angle between two vectors, in `[0, π]`.
///
/// A degenerate (near-zero) vector contributes no angle; the result is 0.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a < TOLERANCE || norm_b < TOLERANCE {
        return 0.0;
    }
    (a.dot(b) / (norm_a * norm_b)).clamp(-1.0, 1.0).acos()
}
