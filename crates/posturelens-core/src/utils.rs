//! Common utility functions for PostureLens.
//!
//! This module provides the small numeric helpers used throughout the
//! workspace: range clamping, interpolation, angle unit conversion, and
//! point distance.

/// Clamps a value to a range.
#[must_use]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linearly interpolates between two values.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (b - a).mul_add(t, a)
}

/// Converts degrees to radians.
#[must_use]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Converts radians to degrees.
#[must_use]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Calculates the Euclidean distance between two points.
#[must_use]
pub fn euclidean_distance(p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;
    dx.hypot(dy)
}

/// Returns `true` if two values are equal within the given tolerance.
#[must_use]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(7, 0, 5), 5);
    }

    #[test]
    fn test_clamp_cosine_overshoot() {
        // The exact guard the angle computation relies on.
        assert_eq!(clamp(1.000_000_000_000_000_2, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.000_000_000_000_000_2, -1.0, 1.0), -1.0);
    }

    #[test]
    fn test_lerp() {
        assert!(approx_eq(lerp(0.0, 10.0, 0.5), 5.0, 1e-12));
        assert!(approx_eq(lerp(2.0, 4.0, 0.0), 2.0, 1e-12));
        assert!(approx_eq(lerp(2.0, 4.0, 1.0), 4.0, 1e-12));
    }

    #[test]
    fn test_angle_conversions() {
        assert!(approx_eq(deg_to_rad(180.0), std::f64::consts::PI, 1e-12));
        assert!(approx_eq(rad_to_deg(std::f64::consts::PI), 180.0, 1e-12));
        assert!(approx_eq(rad_to_deg(deg_to_rad(37.5)), 37.5, 1e-12));
    }

    #[test]
    fn test_euclidean_distance() {
        assert!(approx_eq(
            euclidean_distance((0.0, 0.0), (3.0, 4.0)),
            5.0,
            1e-12
        ));
        assert!(approx_eq(
            euclidean_distance((1.0, 1.0), (1.0, 1.0)),
            0.0,
            1e-12
        ));
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(180.0, 180.005, 0.01));
        assert!(!approx_eq(180.0, 180.02, 0.01));
    }
}
