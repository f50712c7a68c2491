use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};

/// An ordered, immutable sequence of at least two points.
///
/// The discrete result of flattening a continuous curve. Length and
/// fractional-position queries treat the polyline as a chain of straight
/// chords.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3>,
}

impl Polyline {
    /// Creates a polyline from its points.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are supplied.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::InvalidArgument(
                "a polyline requires at least two points".into(),
            )
            .into());
        }
        Ok(Self { points })
    }

    /// Returns the points in order.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the first point.
    #[must_use]
    pub fn first(&self) -> &Point3 {
        &self.points[0]
    }

    /// Returns the last point.
    #[must_use]
    pub fn last(&self) -> &Point3 {
        &self.points[self.points.len() - 1]
    }

    /// Returns the number of straight segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Total length: the sum of all chord lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Point at `fraction` of the total arc length.
    ///
    /// The fraction is clamped to `[0, 1]`.
    #[must_use]
    pub fn point_at_fraction(&self, fraction: f64) -> Point3 {
        if fraction <= 0.0 {
            return *self.first();
        }
        let total = self.length();
        if fraction >= 1.0 || total < TOLERANCE {
            return *self.last();
        }
        let mut remaining = fraction * total;
        for w in self.points.windows(2) {
            let chord = (w[1] - w[0]).norm();
            if remaining <= chord {
                if chord < TOLERANCE {
                    return w[0];
                }
                return w[0] + (w[1] - w[0]) * (remaining / chord);
            }
            remaining -= chord;
        }
        *self.last()
    }

    /// Returns a copy with the point order reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Iterates over the points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a Polyline {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn l_shape() -> Polyline {
        Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_fewer_than_two_points() {
        assert!(Polyline::new(vec![]).is_err());
        assert!(Polyline::new(vec![Point3::origin()]).is_err());
    }

    #[test]
    fn length_sums_chords() {
        assert!((l_shape().length() - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn segment_count_and_endpoints() {
        let p = l_shape();
        assert_eq!(p.segment_count(), 2);
        assert!((p.first() - Point3::origin()).norm() < TOLERANCE);
        assert!((p.last() - Point3::new(3.0, 1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn fraction_walks_arc_length() {
        let p = l_shape();
        // Halfway along a total length of 4 lands at x = 2 on the first leg.
        let mid = p.point_at_fraction(0.5);
        assert!((mid - Point3::new(2.0, 0.0, 0.0)).norm() < TOLERANCE);
        // 7/8 of the way is halfway up the second leg.
        let near_end = p.point_at_fraction(0.875);
        assert!((near_end - Point3::new(3.0, 0.5, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn fraction_clamps_outside_unit_range() {
        let p = l_shape();
        assert!((p.point_at_fraction(-0.5) - *p.first()).norm() < TOLERANCE);
        assert!((p.point_at_fraction(1.5) - *p.last()).norm() < TOLERANCE);
    }

    #[test]
    fn reversed_flips_order() {
        let p = l_shape().reversed();
        assert!((p.first() - Point3::new(3.0, 1.0, 0.0)).norm() < TOLERANCE);
        assert!((p.last() - Point3::origin()).norm() < TOLERANCE);
        assert!((p.length() - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn iterates_in_order() {
        let p = l_shape();
        assert_eq!(p.iter().count(), 3);
        let xs: Vec<f64> = (&p).into_iter().map(|pt| pt.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 3.0]);
    }
}
