mod flatten;
mod offset;

pub use flatten::flatten;
pub use offset::flatten_offset;

use crate::error::{FlattenError, Result};

/// Maximum recursion depth of the subdivision engine.
///
/// Exceeding the bound reports an error instead of exhausting the stack
/// near curvature singularities.
pub const MAX_SUBDIVISION_DEPTH: u32 = 32;

/// Strategy for flattening a continuous curve into a polyline.
///
/// Criteria-based strategies subdivide until their bound holds for every
/// emitted segment; [`Flattening::NumSegments`] samples uniformly with no
/// error checking. Every strategy keeps the exact curve start and end
/// points as the first and last polyline points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flattening {
    /// Exactly this many segments, uniformly spaced in parameter.
    NumSegments(usize),
    /// Maximum perpendicular distance between curve and chord.
    MaxDeviation(f64),
    /// Maximum heading change across a segment, in radians.
    MaxAngle(f64),
    /// Both bounds must hold simultaneously.
    Combined { deviation: f64, angle: f64 },
}

impl Flattening {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for a zero segment count or a
    /// non-positive tolerance; a NaN tolerance is an arithmetic error.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::NumSegments(count) => {
                if count < 1 {
                    return Err(FlattenError::InvalidParameters(
                        "segment count must be at least 1".into(),
                    )
                    .into());
                }
            }
            Self::MaxDeviation(deviation) => check_tolerance(deviation, "deviation")?,
            Self::MaxAngle(angle) => check_tolerance(angle, "angle")?,
            Self::Combined { deviation, angle } => {
                check_tolerance(deviation, "deviation")?;
                check_tolerance(angle, "angle")?;
            }
        }
        Ok(())
    }
}

fn check_tolerance(value: f64, parameter: &'static str) -> Result<()> {
    if value.is_nan() {
        return Err(FlattenError::NotANumber { parameter }.into());
    }
    if value <= 0.0 {
        return Err(FlattenError::InvalidParameters(format!(
            "{parameter} tolerance must be positive, got {value}"
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_configurations() {
        assert!(Flattening::NumSegments(1).validate().is_ok());
        assert!(Flattening::MaxDeviation(0.01).validate().is_ok());
        assert!(Flattening::MaxAngle(0.1).validate().is_ok());
        assert!(Flattening::Combined { deviation: 0.01, angle: 0.1 }.validate().is_ok());
    }

    #[test]
    fn rejects_zero_segments() {
        assert!(Flattening::NumSegments(0).validate().is_err());
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        assert!(Flattening::MaxDeviation(0.0).validate().is_err());
        assert!(Flattening::MaxDeviation(-1.0).validate().is_err());
        assert!(Flattening::MaxAngle(0.0).validate().is_err());
        assert!(Flattening::Combined { deviation: 0.01, angle: -0.1 }.validate().is_err());
    }

    #[test]
    fn nan_tolerance_is_an_arithmetic_error() {
        use crate::error::{CurvisError, FlattenError};
        let err = Flattening::MaxDeviation(f64::NAN).validate().unwrap_err();
        assert!(matches!(
            err,
            CurvisError::Flatten(FlattenError::NotANumber { .. })
        ));
    }
}
