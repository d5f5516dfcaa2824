//! Geometry
//!
//! Bounds, distance and interpolation over spectrum points.

use crate::components::point::{AxisSet, Point};

/// Lowest value any axis can hold.
pub const AXIS_MIN: i32 = 0;
/// Highest value any axis can hold.
pub const AXIS_MAX: i32 = 100;

/// Slack absorbed before rounding an interpolation step up.
const STEP_SLACK: f64 = 1e-9;

/// Bounds a value to [AXIS_MIN, AXIS_MAX].
pub fn clamp(value: i32) -> i32 {
    value.clamp(AXIS_MIN, AXIS_MAX)
}

/// Euclidean distance between two points over a subset of axes.
///
/// The squared sum is accumulated exactly in integers, in canonical axis
/// order, so the result does not depend on how `axes` was built. An empty
/// subset yields 0.
pub fn distance(a: &Point, b: &Point, axes: AxisSet) -> f64 {
    let squared: i64 = axes
        .iter()
        .map(|axis| {
            let diff = i64::from(a.get(axis)) - i64::from(b.get(axis));
            diff * diff
        })
        .sum();
    (squared as f64).sqrt()
}

/// One step from `current` toward `target`, covering `fraction` of the gap.
///
/// The step is rounded away from zero, so any positive fraction moves at
/// least one unit while the values differ; it never overshoots the target.
/// `fraction` is expected in [0,1].
pub fn interpolate(current: i32, target: i32, fraction: f64) -> i32 {
    let gap = target - current;
    if gap == 0 || fraction <= 0.0 {
        return current;
    }
    let magnitude = (f64::from(gap.abs()) * fraction.min(1.0) - STEP_SLACK).ceil();
    let step = (magnitude.max(1.0) as i32).min(gap.abs());
    clamp(current + step * gap.signum())
}

/// The point's coordinates on the selected axes, as floats for linear algebra.
pub fn projected(point: &Point, axes: AxisSet) -> Vec<f64> {
    axes.iter().map(|axis| f64::from(point.get(axis))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::point::Axis;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(-1), 0);
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(57), 57);
        assert_eq!(clamp(100), 100);
        assert_eq!(clamp(i32::MAX), 100);
    }

    #[test]
    fn test_distance_full_and_subset() {
        let a = Point::new([0, 0, 0, 0, 0, 0]);
        let b = Point::new([3, 4, 0, 0, 0, 12]);
        assert_eq!(distance(&a, &b, AxisSet::all()), 13.0);

        let pair = AxisSet::only(Axis::Entropy).with(Axis::Oblivion);
        assert_eq!(distance(&a, &b, pair), 5.0);
        assert_eq!(distance(&a, &b, AxisSet::empty()), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric_and_reflexive() {
        let a = Point::new([10, 90, 33, 47, 0, 100]);
        let b = Point::new([55, 2, 70, 47, 18, 64]);
        assert_eq!(distance(&a, &b, AxisSet::all()), distance(&b, &a, AxisSet::all()));
        assert_eq!(distance(&a, &a, AxisSet::all()), 0.0);
    }

    #[test]
    fn test_interpolate_small_fraction_moves_one_unit() {
        assert_eq!(interpolate(50, 0, 0.01), 49);
        assert_eq!(interpolate(0, 50, 0.01), 1);
        assert_eq!(interpolate(10, 11, 0.01), 11);
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate(37, 80, 0.0), 37);
        assert_eq!(interpolate(37, 80, 1.0), 80);
        assert_eq!(interpolate(80, 37, 1.0), 37);
        assert_eq!(interpolate(42, 42, 0.5), 42);
    }

    #[test]
    fn test_interpolate_half_rounds_away_from_zero() {
        assert_eq!(interpolate(0, 5, 0.5), 3);
        assert_eq!(interpolate(5, 0, 0.5), 2);
        assert_eq!(interpolate(0, 10, 0.5), 5);
    }

    #[test]
    fn test_projected_follows_canonical_order() {
        let point = Point::new([1, 2, 3, 4, 5, 6]);
        let axes = AxisSet::only(Axis::Skeptic).with(Axis::Oblivion);
        assert_eq!(projected(&point, axes), vec![2.0, 6.0]);
    }
}
