use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

/// A piecewise-linear scalar function over the normalized domain `[0, 1]`.
///
/// Breakpoints are `(position, value)` pairs with strictly increasing
/// positions. Evaluation interpolates linearly between the bracketing
/// breakpoints and clamps to the boundary values outside the breakpoint
/// range; the derivative is zero out there. Used to describe a laterally
/// varying offset profile along a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearFunction {
    breakpoints: Vec<(f64, f64)>,
}

impl PiecewiseLinearFunction {
    /// Creates a function from `(position, value)` breakpoints.
    ///
    /// The input does not need to be sorted; breakpoints are stored in
    /// ascending position order.
    ///
    /// # Errors
    ///
    /// Returns an error if no breakpoints are given, any position or value
    /// is non-finite, a position lies outside `[0, 1]`, or two breakpoints
    /// share a position.
    pub fn new(breakpoints: &[(f64, f64)]) -> Result<Self> {
        if breakpoints.is_empty() {
            return Err(GeometryError::InvalidArgument(
                "at least one breakpoint is required".into(),
            )
            .into());
        }
        for &(position, value) in breakpoints {
            if !position.is_finite() || !value.is_finite() {
                return Err(GeometryError::InvalidArgument(format!(
                    "non-finite breakpoint ({position}, {value})"
                ))
                .into());
            }
            if !(0.0..=1.0).contains(&position) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: "breakpoint position",
                    value: position,
                    min: 0.0,
                    max: 1.0,
                }
                .into());
            }
        }

        let mut sorted = breakpoints.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in sorted.windows(2) {
            if pair[1].0 - pair[0].0 < TOLERANCE {
                return Err(GeometryError::InvalidArgument(format!(
                    "duplicate breakpoint position {}",
                    pair[0].0
                ))
                .into());
            }
        }

        Ok(Self { breakpoints: sorted })
    }

    /// Creates a function from a flat `[position, value, position, value, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns an error for an odd-length list, plus everything
    /// [`PiecewiseLinearFunction::new`] rejects.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() % 2 != 0 {
            return Err(GeometryError::InvalidArgument(
                "flat breakpoint list must have an even length".into(),
            )
            .into());
        }
        let pairs: Vec<(f64, f64)> = values.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        Self::new(&pairs)
    }

    /// A constant function over the whole domain.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is non-finite.
    pub fn constant(value: f64) -> Result<Self> {
        Self::new(&[(0.0, value)])
    }

    /// First breakpoint position.
    #[must_use]
    pub fn min_position(&self) -> f64 {
        self.breakpoints[0].0
    }

    /// Last breakpoint position.
    #[must_use]
    pub fn max_position(&self) -> f64 {
        self.breakpoints[self.breakpoints.len() - 1].0
    }

    /// Evaluates the function at `position`.
    ///
    /// Outside the breakpoint range the nearest boundary value applies.
    #[must_use]
    pub fn get(&self, position: f64) -> f64 {
        let (first_pos, first_value) = self.breakpoints[0];
        let (last_pos, last_value) = self.breakpoints[self.breakpoints.len() - 1];
        if position <= first_pos {
            return first_value;
        }
        if position >= last_pos {
            return last_value;
        }
        let idx = self.breakpoints.partition_point(|&(p, _)| p <= position);
        let (p0, v0) = self.breakpoints[idx - 1];
        let (p1, v1) = self.breakpoints[idx];
        v0 + (v1 - v0) * (position - p0) / (p1 - p0)
    }

    /// Local slope at `position`, or 0 outside the breakpoint range.
    ///
    /// At an interior breakpoint the slope of the segment to its right
    /// applies.
    #[must_use]
    pub fn derivative(&self, position: f64) -> f64 {
        if self.breakpoints.len() < 2 {
            return 0.0;
        }
        if position < self.min_position() || position > self.max_position() {
            return 0.0;
        }
        let idx = self
            .breakpoints
            .partition_point(|&(p, _)| p <= position)
            .clamp(1, self.breakpoints.len() - 1);
        let (p0, v0) = self.breakpoints[idx - 1];
        let (p1, v1) = self.breakpoints[idx];
        (v1 - v0) / (p1 - p0)
    }

    /// Iterates breakpoints as `(position, value)` pairs in ascending
    /// position order.
    pub fn breakpoints(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.breakpoints.iter().copied()
    }
}
