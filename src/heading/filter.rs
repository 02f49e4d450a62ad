//! Exponential low-pass filter on the compass circle.
//!
//! Each raw sample moves the smoothed heading a fraction `alpha` of the shortest
//! signed rotation towards it, so the filter follows the needle across north
//! instead of spinning the long way round. The smoothed value is then quantized
//! to suppress redraws caused by sub-quantum jitter.

use crate::geo::{arc, normalize_degrees};

/// One smoothing step from `previous` towards `raw`.
pub fn smooth(previous: f64, raw: f64, alpha: f64) -> f64 {
    normalize_degrees(previous + alpha * arc(previous, raw))
}

/// Round `value` to the nearest multiple of `quantum`, folded into `[0, 360)`.
pub fn quantize(value: f64, quantum: f64) -> f64 {
    normalize_degrees((value / quantum).round() * quantum)
}

#[derive(Debug, Clone)]
pub struct HeadingFilter {
    alpha: f64,
    quantum: f64,
    smoothed: Option<f64>,
}

impl HeadingFilter {
    pub fn new(alpha: f64, quantum: f64) -> Self {
        Self {
            alpha,
            quantum,
            smoothed: None,
        }
    }

    /// Feed a raw sample and return the new smoothed heading.
    ///
    /// The first sample seeds the filter. Non-finite samples are dropped and
    /// leave the state untouched.
    pub fn push(&mut self, raw: f64) -> Option<f64> {
        if !raw.is_finite() {
            return None;
        }

        let raw = normalize_degrees(raw);
        let next = match self.smoothed {
            Some(previous) => smooth(previous, raw, self.alpha),
            None => raw,
        };
        self.smoothed = Some(next);
        Some(next)
    }

    pub fn smoothed(&self) -> Option<f64> {
        self.smoothed
    }

    pub fn quantized(&self) -> Option<f64> {
        self.smoothed.map(|value| quantize(value, self.quantum))
    }

    /// Forget the smoothed state; the next sample seeds the filter again.
    pub fn reset(&mut self) {
        self.smoothed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_smoothing_crosses_north_the_short_way() {
        // +20 rotation, not -340
        let next = smooth(350.0, 10.0, 0.15);
        assert!(approx(next, 353.0));

        let back = smooth(10.0, 350.0, 0.5);
        assert!(approx(back, 0.0));
    }

    #[test]
    fn test_quantize() {
        assert!(approx(quantize(12.26, 0.5), 12.5));
        assert!(approx(quantize(12.24, 0.5), 12.0));
        assert!(approx(quantize(359.9, 0.5), 0.0));
    }

    #[test]
    fn test_filter_seeds_then_smooths() {
        let mut filter = HeadingFilter::new(0.15, 0.5);
        assert_eq!(filter.quantized(), None);

        assert_eq!(filter.push(90.0), Some(90.0));
        let next = filter.push(100.0).unwrap();
        assert!(approx(next, 91.5));
        assert_eq!(filter.quantized(), Some(91.5));
    }

    #[test]
    fn test_filter_ignores_non_finite_samples() {
        let mut filter = HeadingFilter::new(0.15, 0.5);
        filter.push(45.0);
        assert_eq!(filter.push(f64::NAN), None);
        assert_eq!(filter.push(f64::INFINITY), None);
        assert_eq!(filter.smoothed(), Some(45.0));
    }

    #[test]
    fn test_reset() {
        let mut filter = HeadingFilter::new(0.15, 0.5);
        filter.push(45.0);
        filter.reset();
        assert_eq!(filter.push(200.0), Some(200.0));
    }
}
