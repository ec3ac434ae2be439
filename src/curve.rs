//! Clamped piecewise-linear curves and exponential approach helpers.
//!
//! Every visual magnitude in the engine (stretch, flight, impact, edge squish)
//! is read through one of these so that a transient physics spike can never
//! produce an unbounded transform.

use crate::float::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A four-point piecewise-linear curve, clamped at both ends.
///
/// Points must be sorted by `x`. Inputs below the first point return the first
/// `y`, inputs above the last return the last `y`, NaN returns the first `y`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve4<F: Float> {
    pub points: [(F, F); 4],
}

impl<F: Float> Curve4<F> {
    pub fn new(points: [(f32, f32); 4]) -> Self {
        let mut out = [(F::zero(), F::zero()); 4];
        for (dst, src) in out.iter_mut().zip(points.iter()) {
            *dst = (F::from_f32(src.0), F::from_f32(src.1));
        }
        Curve4 { points: out }
    }

    /// Evaluate the curve at `x`.
    pub fn sample(&self, x: F) -> F {
        let first = self.points[0];
        let last = self.points[3];
        if !(x > first.0) {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        for pair in self.points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x <= x1 {
                let span = x1 - x0;
                if span.is_near_zero(F::from_f32(1e-12)) {
                    return y1;
                }
                return y0.lerp(y1, (x - x0) / span);
            }
        }
        last.1
    }

    /// Largest output the curve can produce.
    pub fn max_output(&self) -> F {
        self.points.iter().fold(self.points[0].1, |acc, p| acc.max(p.1))
    }
}

/// Map `x` from `[lo, hi]` onto `[0, 1]`, clamped. A degenerate range is a step at `lo`.
pub fn unit_ramp<F: Float>(x: F, lo: F, hi: F) -> F {
    let span = hi - lo;
    if !(span > F::zero()) {
        return if x >= lo { F::one() } else { F::zero() };
    }
    ((x - lo) / span).clamp(F::zero(), F::one())
}

/// Fraction of the remaining distance covered in `dt` by an exponential
/// approach with time constant `tau`.
pub fn approach_factor<F: Float>(dt: F, tau: F) -> F {
    if !(tau > F::zero()) {
        return F::one();
    }
    (F::one() - (-dt / tau).exp()).clamp(F::zero(), F::one())
}

/// Exponential decay multiplier for `dt` with time constant `tau`.
pub fn decay_factor<F: Float>(dt: F, tau: F) -> F {
    F::one() - approach_factor(dt, tau)
}

/// Smoothstep easing on `[0, 1]`.
pub fn smoothstep<F: Float>(t: F) -> F {
    let t = t.clamp(F::zero(), F::one());
    t * t * (F::from_f32(3.0) - F::two() * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Curve4<f32> {
        Curve4::new([(0.0, 0.0), (10.0, 1.0), (20.0, 1.5), (40.0, 2.0)])
    }

    #[test]
    fn clamps_outside_domain() {
        let c = curve();
        assert_eq!(c.sample(-5.0), 0.0);
        assert_eq!(c.sample(1000.0), 2.0);
        assert_eq!(c.sample(f32::NAN), 0.0);
        assert_eq!(c.sample(f32::INFINITY), 2.0);
    }

    #[test]
    fn interpolates_inside_segments() {
        let c = curve();
        assert!((c.sample(5.0) - 0.5).abs() < 1e-6);
        assert!((c.sample(15.0) - 1.25).abs() < 1e-6);
        assert!((c.sample(30.0) - 1.75).abs() < 1e-6);
    }

    #[test]
    fn unit_ramp_bounds() {
        assert_eq!(unit_ramp(-1.0f32, 0.0, 10.0), 0.0);
        assert_eq!(unit_ramp(20.0f32, 0.0, 10.0), 1.0);
        assert!((unit_ramp(2.5f32, 0.0, 10.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn approach_factor_is_fraction() {
        let a = approach_factor(1.0f32 / 60.0, 0.1);
        assert!(a > 0.0 && a < 1.0);
        assert_eq!(approach_factor(0.1f32, 0.0), 1.0);
    }
}
