//! Vector types and traits for the slime simulation.

use crate::float::Float;
use core::ops::{Add, Sub, Neg};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Trait for vector types the spring integrator can drive.
///
/// Abstracts over dimensionality so the same closed-form spring moves a
/// 2D body center and a 1D pinch scale.
pub trait Vec:
    Copy
    + Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + PartialEq
    + Default
    + core::fmt::Debug
{
    /// The scalar (float) type for this vector.
    type Scalar: Float;

    /// Zero vector.
    fn zero() -> Self;

    /// Dot product.
    fn dot(self, other: Self) -> Self::Scalar;

    /// Squared length (avoids sqrt).
    fn length_sq(self) -> Self::Scalar {
        self.dot(self)
    }

    /// Length (magnitude).
    fn length(self) -> Self::Scalar {
        self.length_sq().sqrt()
    }

    /// Normalize to unit length. Returns zero vector if length is near zero.
    fn normalize(self) -> Self {
        let len = self.length();
        if len.is_near_zero(Self::Scalar::from_f32(1e-10)) {
            Self::zero()
        } else {
            self.scale(Self::Scalar::one() / len)
        }
    }

    /// Scale all components by a scalar.
    fn scale(self, s: Self::Scalar) -> Self;

    /// True when every component is finite.
    fn is_finite(self) -> bool;

    /// Distance between two points.
    fn distance(self, other: Self) -> Self::Scalar {
        (self - other).length()
    }

    /// Linear interpolation between self and other.
    fn lerp(self, other: Self, t: Self::Scalar) -> Self {
        self + (other - self).scale(t)
    }

    /// Rescale so the length does not exceed `max`. Non-finite input becomes zero.
    fn clamp_length(self, max: Self::Scalar) -> Self {
        if !self.is_finite() {
            return Self::zero();
        }
        let len_sq = self.length_sq();
        if len_sq > max * max {
            self.scale(max / len_sq.sqrt())
        } else {
            self
        }
    }
}

// --------------------------------------------------------------------------
// Scalar<F>: 1D wrapper
// --------------------------------------------------------------------------

/// 1D "vector": a scalar value implementing the Vec trait.
///
/// Used for pinch scale and stretch-distance springs.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scalar<F: Float>(pub F);

impl<F: Float> Add for Scalar<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Scalar(self.0 + rhs.0) }
}

impl<F: Float> Sub for Scalar<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Scalar(self.0 - rhs.0) }
}

impl<F: Float> Neg for Scalar<F> {
    type Output = Self;
    fn neg(self) -> Self { Scalar(-self.0) }
}

impl<F: Float> Vec for Scalar<F> {
    type Scalar = F;
    fn zero() -> Self { Scalar(F::zero()) }
    fn dot(self, other: Self) -> F { self.0 * other.0 }
    fn scale(self, s: F) -> Self { Scalar(self.0 * s) }
    fn is_finite(self) -> bool { self.0.is_finite() }
}

// --------------------------------------------------------------------------
// Vec2<F>: 2D vector
// --------------------------------------------------------------------------

/// 2D vector in container space: origin at the container center, +y down.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    /// Create a new 2D vector.
    pub fn new(x: F, y: F) -> Self { Vec2 { x, y } }

    /// Unit vector along +x.
    pub fn unit_x() -> Self { Vec2 { x: F::one(), y: F::zero() } }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    pub fn perp(self) -> Self {
        Vec2 { x: -self.y, y: self.x }
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Vec2 { x: self.x.abs(), y: self.y.abs() }
    }

    /// Component-wise clamp.
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Vec2 { x: self.x.clamp(min.x, max.x), y: self.y.clamp(min.y, max.y) }
    }

    /// Component-wise multiplication.
    pub fn component_mul(self, other: Self) -> Self {
        Vec2 { x: self.x * other.x, y: self.y * other.y }
    }

    /// Midpoint between two points.
    pub fn midpoint(self, other: Self) -> Self {
        (self + other).scale(F::half())
    }

    /// Replace non-finite components with zero.
    pub fn sanitized(self) -> Self {
        Vec2 { x: self.x.finite_or(F::zero()), y: self.y.finite_or(F::zero()) }
    }
}

impl<F: Float> Add for Vec2<F> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Vec2 { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl<F: Float> Sub for Vec2<F> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Vec2 { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl<F: Float> Neg for Vec2<F> {
    type Output = Self;
    fn neg(self) -> Self { Vec2 { x: -self.x, y: -self.y } }
}

impl<F: Float> Vec for Vec2<F> {
    type Scalar = F;
    fn zero() -> Self { Vec2 { x: F::zero(), y: F::zero() } }
    fn dot(self, other: Self) -> F { self.x * other.x + self.y * other.y }
    fn scale(self, s: F) -> Self { Vec2 { x: self.x * s, y: self.y * s } }
    fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_length() {
        let v = Vec2::new(3.0f32, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn scalar_dot() {
        let a = Scalar(3.0f32);
        let b = Scalar(4.0f32);
        assert!((a.dot(b) - 12.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector() {
        let v = Vec2::<f32>::zero();
        let n = v.normalize();
        assert_eq!(n, Vec2::zero());
    }

    #[test]
    fn clamp_length_caps_magnitude() {
        let v = Vec2::new(30.0f32, 40.0).clamp_length(10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn clamp_length_zeroes_nan() {
        let v = Vec2::new(f32::NAN, 1.0).clamp_length(10.0);
        assert_eq!(v, Vec2::zero());
    }

    #[test]
    fn distance_calculation() {
        let a = Vec2::new(0.0f32, 0.0);
        let b = Vec2::new(3.0f32, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }
}
