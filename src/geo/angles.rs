//! Angular math on the compass circle.
//!
//! All angles are degrees. Azimuths and headings live in `[0, 360)`; signed
//! rotations live in `(-180, 180]`.

const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;

/// Normalize any finite angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= FULL_TURN {
        0.0
    } else {
        normalized
    }
}

/// Shortest signed rotation from `from` to `to`, in `(-180, 180]`.
///
/// This is the representative of `to - from` modulo 360 with the smallest
/// magnitude. At the antipodal point the result is `+180`.
pub fn arc(from: f64, to: f64) -> f64 {
    let delta = normalize_degrees(to - from);
    if delta > HALF_TURN {
        delta - FULL_TURN
    } else {
        delta
    }
}

/// Absolute angular distance between two directions, in `[0, 180]`.
pub fn distance(from: f64, to: f64) -> f64 {
    arc(from, to).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_arc_basic() {
        assert!(approx(arc(10.0, 30.0), 20.0));
        assert!(approx(arc(30.0, 10.0), -20.0));
        assert!(approx(arc(0.0, 0.0), 0.0));
    }

    #[test]
    fn test_arc_crosses_north() {
        assert!(approx(arc(350.0, 10.0), 20.0));
        assert!(approx(arc(10.0, 350.0), -20.0));
        assert!(approx(arc(-10.0, 370.0), 20.0));
    }

    #[test]
    fn test_arc_antipodal_is_positive() {
        assert!(approx(arc(0.0, 180.0), 180.0));
        assert!(approx(arc(180.0, 0.0), 180.0));
        assert!(approx(arc(90.0, 270.0), 180.0));
        assert!(approx(arc(270.0, 90.0), 180.0));
    }

    #[test]
    fn test_distance() {
        assert!(approx(distance(350.0, 10.0), 20.0));
        assert!(approx(distance(10.0, 350.0), 20.0));
        assert!(approx(distance(0.0, 180.0), 180.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(approx(normalize_degrees(-90.0), 270.0));
        assert!(approx(normalize_degrees(720.0), 0.0));
        assert!(approx(normalize_degrees(359.5), 359.5));
        let tiny = normalize_degrees(-1e-15);
        assert!((0.0..360.0).contains(&tiny));
    }
}
