//! Joint-angle geometry.
//!
//! The single computation the rest of the workspace is built around:
//! the interior angle at a joint given three 2D points. For posture this is
//! the hip angle (shoulder, hip, knee), but the math is joint-agnostic.

use crate::types::Point2D;
use crate::utils::{clamp, rad_to_deg};

/// Computes the interior angle at `vertex` formed by `a` and `c`, in degrees.
///
/// Forms the vectors `a - vertex` and `c - vertex` and returns the angle
/// between them via `arccos(dot / (|a-vertex| |c-vertex|))`, in `[0, 180]`.
///
/// The cosine argument is clamped to `[-1, 1]` before the inverse cosine.
/// For (near-)collinear inputs the quotient can overshoot the domain by a
/// few ulps, and acos would return NaN; the clamp makes that case land
/// exactly on 0 or 180 instead.
///
/// Returns `None` when either vector has zero magnitude (a point coincides
/// with the vertex) or a coordinate is non-finite. Coordinates large enough
/// to overflow the dot product also read as `None`: the angle is undefined
/// or unrepresentable in those cases and must never surface as NaN.
#[must_use]
pub fn joint_angle_degrees(a: Point2D, vertex: Point2D, c: Point2D) -> Option<f64> {
    let (ab_x, ab_y) = (a.x - vertex.x, a.y - vertex.y);
    let (cb_x, cb_y) = (c.x - vertex.x, c.y - vertex.y);

    let mag_ab = ab_x.hypot(ab_y);
    let mag_cb = cb_x.hypot(cb_y);
    if mag_ab == 0.0 || mag_cb == 0.0 || !mag_ab.is_finite() || !mag_cb.is_finite() {
        return None;
    }

    let cosine = (ab_x * cb_x + ab_y * cb_y) / (mag_ab * mag_cb);
    if !cosine.is_finite() {
        // Finite magnitudes can still overflow the dot product or the
        // normalizer, leaving inf/inf = NaN.
        return None;
    }
    Some(rad_to_deg(clamp(cosine, -1.0, 1.0).acos()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    const TOLERANCE: f64 = 0.01;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle_degrees(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0)).expect("defined");
        assert!(approx_eq(angle, 90.0, TOLERANCE), "got {angle}");
    }

    #[test]
    fn test_collinear_opposite_sides_is_straight() {
        let angle = joint_angle_degrees(p(0.0, 1.0), p(0.0, 0.0), p(0.0, -1.0)).expect("defined");
        assert!(approx_eq(angle, 180.0, TOLERANCE), "got {angle}");
    }

    #[test]
    fn test_collinear_same_side_is_zero() {
        let angle = joint_angle_degrees(p(0.0, 1.0), p(0.0, 0.0), p(0.0, 2.0)).expect("defined");
        assert!(approx_eq(angle, 0.0, TOLERANCE), "got {angle}");
    }

    #[test]
    fn test_known_triangles() {
        // 3-4-5 right triangle, right angle at the vertex.
        let angle = joint_angle_degrees(p(3.0, 0.0), p(0.0, 0.0), p(0.0, 4.0)).expect("defined");
        assert!(approx_eq(angle, 90.0, TOLERANCE), "got {angle}");

        // Equilateral triangle corner.
        let angle = joint_angle_degrees(
            p(1.0, 0.0),
            p(0.0, 0.0),
            p(0.5, 3.0_f64.sqrt() / 2.0),
        )
        .expect("defined");
        assert!(approx_eq(angle, 60.0, TOLERANCE), "got {angle}");

        // 45 degrees.
        let angle = joint_angle_degrees(p(1.0, 0.0), p(0.0, 0.0), p(1.0, 1.0)).expect("defined");
        assert!(approx_eq(angle, 45.0, TOLERANCE), "got {angle}");
    }

    #[test]
    fn test_translation_invariance() {
        let base = joint_angle_degrees(p(0.0, 1.0), p(0.0, 0.0), p(1.0, 0.0)).expect("defined");
        let moved = joint_angle_degrees(p(0.37, 1.91), p(0.37, 0.91), p(1.37, 0.91))
            .expect("defined");
        assert!(approx_eq(base, moved, 1e-9));
    }

    #[test]
    fn test_clamp_prevents_nan_on_near_parallel_vectors() {
        // Scaled copies of one direction: the cosine quotient can land a few
        // ulps outside [-1, 1], where acos would return NaN.
        let cases = [
            (p(0.1, 0.1), p(0.0, 0.0), p(0.2, 0.2)),
            (p(0.3, 0.7), p(0.0, 0.0), p(0.6, 1.4)),
            (p(-0.1, 0.1), p(0.0, 0.0), p(0.1, -0.1)),
            (p(1e-8, 1e-8), p(0.0, 0.0), p(3e-8, 3e-8)),
        ];
        for (a, vertex, c) in cases {
            let angle = joint_angle_degrees(a, vertex, c).expect("defined");
            assert!(angle.is_finite(), "NaN for ({a}, {vertex}, {c})");
            assert!((0.0..=180.0).contains(&angle), "got {angle}");
        }
    }

    #[test]
    fn test_total_over_finite_non_degenerate_inputs() {
        // A coarse sweep of shoulder positions around a fixed vertex; every
        // result must be a finite value in [0, 180].
        let vertex = p(0.5, 0.5);
        let knee = p(0.5, 0.9);
        for i in 0..360 {
            let theta = f64::from(i).to_radians();
            let shoulder = p(0.5 + 0.4 * theta.cos(), 0.5 + 0.4 * theta.sin());
            let angle = joint_angle_degrees(shoulder, vertex, knee).expect("defined");
            assert!((0.0..=180.0).contains(&angle), "i={i} angle={angle}");
        }
    }

    #[test]
    fn test_degenerate_inputs_are_unavailable() {
        // First point on the vertex.
        assert_eq!(
            joint_angle_degrees(p(0.5, 0.5), p(0.5, 0.5), p(1.0, 1.0)),
            None
        );
        // Second point on the vertex.
        assert_eq!(
            joint_angle_degrees(p(0.0, 0.0), p(0.5, 0.5), p(0.5, 0.5)),
            None
        );
        // Everything coincident.
        assert_eq!(
            joint_angle_degrees(p(0.5, 0.5), p(0.5, 0.5), p(0.5, 0.5)),
            None
        );
    }

    #[test]
    fn test_non_finite_inputs_are_unavailable() {
        assert_eq!(
            joint_angle_degrees(p(f64::NAN, 0.0), p(0.0, 0.0), p(1.0, 0.0)),
            None
        );
        assert_eq!(
            joint_angle_degrees(p(0.0, 1.0), p(0.0, 0.0), p(f64::INFINITY, 0.0)),
            None
        );
    }

    #[test]
    fn test_overflowing_magnitudes_are_unavailable() {
        // Each magnitude is finite on its own, but the dot product and its
        // normalizer both overflow, so the quotient would be inf/inf = NaN.
        assert_eq!(
            joint_angle_degrees(p(1e300, 1e300), p(0.0, 0.0), p(2e300, 2e300)),
            None
        );

        // Large but non-overflowing coordinates still resolve.
        let angle =
            joint_angle_degrees(p(1e150, 0.0), p(0.0, 0.0), p(0.0, 1e150)).expect("defined");
        assert!(approx_eq(angle, 90.0, TOLERANCE), "got {angle}");
    }

    #[test]
    fn test_idempotence() {
        let a = p(0.31, 0.77);
        let vertex = p(0.52, 0.61);
        let c = p(0.49, 0.95);
        let first = joint_angle_degrees(a, vertex, c);
        let second = joint_angle_degrees(a, vertex, c);
        assert_eq!(first, second);
    }
}
