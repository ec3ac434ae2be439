//! Floating-point abstraction trait for generic numeric operations.

use core::cmp::PartialOrd;
use core::ops::{Add, Sub, Mul, Div, Neg};

/// Trait abstracting floating-point operations needed by the slime engine.
///
/// Implemented for `f32` and `f64`. All transcendental functions go through
/// `libm` so results are identical across targets, WASM included.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Pi (~3.14159).
    fn pi() -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine.
    fn sin(self) -> Self;
    /// Cosine.
    fn cos(self) -> Self;
    /// Natural exponential (e^self).
    fn exp(self) -> Self;
    /// self raised to `n`.
    fn powf(self, n: Self) -> Self;
    /// Floating-point remainder of self / rhs, with the sign of self.
    fn fmod(self, rhs: Self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Minimum of two values.
    fn min(self, other: Self) -> Self;
    /// Maximum of two values.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Lossy conversion to f32 (for host-facing output).
    fn to_f32(self) -> f32;
    /// Neither NaN nor infinite.
    fn is_finite(self) -> bool;
    /// Floor.
    fn floor(self) -> Self;

    /// Clamp self to [min, max]. NaN collapses to `min`.
    fn clamp(self, min: Self, max: Self) -> Self {
        if !(self >= min) {
            return min;
        }
        if self > max { max } else { self }
    }

    /// Linear interpolation: self + (other - self) * t
    fn lerp(self, other: Self, t: Self) -> Self {
        self + (other - self) * t
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }

    /// -1, 0 or 1 depending on the sign of self.
    fn signum(self) -> Self {
        if self > Self::zero() {
            Self::one()
        } else if self < Self::zero() {
            -Self::one()
        } else {
            Self::zero()
        }
    }

    /// Wrap into `[0, period)`. Returns zero for a non-positive period.
    fn wrap(self, period: Self) -> Self {
        if !(period > Self::zero()) {
            return Self::zero();
        }
        let r = self.fmod(period);
        if r < Self::zero() { r + period } else { r }
    }

    /// Replace NaN/infinity with `fallback`.
    fn finite_or(self, fallback: Self) -> Self {
        if self.is_finite() { self } else { fallback }
    }
}

impl Float for f32 {
    fn zero() -> Self { 0.0 }
    fn one() -> Self { 1.0 }
    fn half() -> Self { 0.5 }
    fn two() -> Self { 2.0 }
    fn pi() -> Self { core::f32::consts::PI }
    fn sqrt(self) -> Self { libm::sqrtf(self) }
    fn sin(self) -> Self { libm::sinf(self) }
    fn cos(self) -> Self { libm::cosf(self) }
    fn exp(self) -> Self { libm::expf(self) }
    fn powf(self, n: Self) -> Self { libm::powf(self, n) }
    fn fmod(self, rhs: Self) -> Self { libm::fmodf(self, rhs) }
    fn abs(self) -> Self { libm::fabsf(self) }
    fn min(self, other: Self) -> Self { if self < other { self } else { other } }
    fn max(self, other: Self) -> Self { if self > other { self } else { other } }
    fn from_f32(v: f32) -> Self { v }
    fn to_f32(self) -> f32 { self }
    fn is_finite(self) -> bool { f32::is_finite(self) }
    fn floor(self) -> Self { libm::floorf(self) }
}

impl Float for f64 {
    fn zero() -> Self { 0.0 }
    fn one() -> Self { 1.0 }
    fn half() -> Self { 0.5 }
    fn two() -> Self { 2.0 }
    fn pi() -> Self { core::f64::consts::PI }
    fn sqrt(self) -> Self { libm::sqrt(self) }
    fn sin(self) -> Self { libm::sin(self) }
    fn cos(self) -> Self { libm::cos(self) }
    fn exp(self) -> Self { libm::exp(self) }
    fn powf(self, n: Self) -> Self { libm::pow(self, n) }
    fn fmod(self, rhs: Self) -> Self { libm::fmod(self, rhs) }
    fn abs(self) -> Self { libm::fabs(self) }
    fn min(self, other: Self) -> Self { if self < other { self } else { other } }
    fn max(self, other: Self) -> Self { if self > other { self } else { other } }
    fn from_f32(v: f32) -> Self { v as f64 }
    fn to_f32(self) -> f32 { self as f32 }
    fn is_finite(self) -> bool { f64::is_finite(self) }
    fn floor(self) -> Self { libm::floor(self) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_swallows_nan() {
        assert_eq!(Float::clamp(f32::NAN, 0.0, 1.0), 0.0);
        assert_eq!(Float::clamp(2.0f32, 0.0, 1.0), 1.0);
    }

    #[test]
    fn wrap_negative() {
        let w = (-0.25f32).wrap(1.0);
        assert!((w - 0.75).abs() < 1e-6);
    }
}
