//! Analytical spring-damper integration with closed-form solutions.
//!
//! The body center chasing the grab point, the grab point snapping back, the
//! post-flick settle, wobble decay and the pinch release all run through
//! [`advance`], parameterised by a [`SpringParams`] preset.

use crate::float::Float;
use crate::vec::Vec;
use crate::vec::{Scalar, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest step the solver takes in one piece. Longer frames are sub-stepped.
pub const MAX_SPRING_DT: f32 = 1.0 / 30.0;

/// Upper bound on sub-steps for a single call; the closed form stays stable past it.
const MAX_SUB_STEPS: f32 = 64.0;

/// Damping regime of a spring-damper system.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DampingMode<F: Float> {
    CriticallyDamped,
    Underdamped { ratio: F },
    Overdamped { ratio: F },
}

/// Physical parameters of a damped spring: `m x'' = -k (x - target) - c x'`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpringParams<F: Float> {
    pub stiffness: F,
    pub damping: F,
    pub mass: F,
}

impl<F: Float> SpringParams<F> {
    pub fn new(stiffness: F, damping: F, mass: F) -> Self {
        SpringParams { stiffness, damping, mass }
    }

    /// Slow catch-up with visible lag. Used for the center chasing a dragged grab point.
    pub fn soft_follow() -> Self {
        Self::new(F::from_f32(260.0), F::from_f32(32.25), F::one())
    }

    /// Fast catch-up without overshoot. Grab point snapping back onto the body.
    pub fn snap() -> Self {
        Self::new(F::from_f32(700.0), F::from_f32(53.0), F::one())
    }

    /// Bouncy, low stiffness settle after a flick comes to rest.
    pub fn jelly_settle() -> Self {
        Self::new(F::from_f32(150.0), F::from_f32(9.0), F::one())
    }

    /// Post-release ripple: lively oscillation that dies out within about a second.
    pub fn wobble() -> Self {
        Self::new(F::from_f32(320.0), F::from_f32(11.0), F::one())
    }

    /// Pinch scale and stretch distance returning to rest.
    pub fn pinch_release() -> Self {
        Self::new(F::from_f32(400.0), F::from_f32(28.0), F::one())
    }

    /// Undamped natural angular frequency `sqrt(k / m)`.
    pub fn angular_freq(&self) -> F {
        (self.stiffness / self.mass).sqrt()
    }

    /// Damping ratio `c / (2 sqrt(k m))`.
    pub fn damping_ratio(&self) -> F {
        self.damping / (F::two() * (self.stiffness * self.mass).sqrt())
    }

    pub fn mode(&self) -> DampingMode<F> {
        let zeta = self.damping_ratio();
        if (zeta - F::one()).abs() < F::from_f32(1e-3) {
            DampingMode::CriticallyDamped
        } else if zeta < F::one() {
            DampingMode::Underdamped { ratio: zeta }
        } else {
            DampingMode::Overdamped { ratio: zeta }
        }
    }

    /// Positive, finite stiffness and mass; non-negative, finite damping.
    pub fn is_valid(&self) -> bool {
        self.stiffness.is_finite()
            && self.damping.is_finite()
            && self.mass.is_finite()
            && self.stiffness > F::zero()
            && self.mass > F::zero()
            && self.damping >= F::zero()
    }
}

impl<F: Float> Default for SpringParams<F> {
    fn default() -> Self {
        Self::snap()
    }
}

/// Advance `current` toward `target` by `dt` seconds.
///
/// Returns the new value and velocity. Frames longer than [`MAX_SPRING_DT`]
/// are split into equal sub-steps. A non-finite or negative `dt` is a no-op,
/// and a result that is not finite snaps to `target` at rest.
pub fn advance<V: Vec>(
    current: V,
    target: V,
    velocity: V,
    params: &SpringParams<V::Scalar>,
    dt: V::Scalar,
) -> (V, V) {
    let zero = V::Scalar::zero();
    if !dt.is_finite() || !(dt > zero) || !params.is_valid() {
        return (current, velocity);
    }
    let max_dt = V::Scalar::from_f32(MAX_SPRING_DT);
    let steps = ((dt / max_dt).floor() + V::Scalar::one()).min(V::Scalar::from_f32(MAX_SUB_STEPS));
    let sub_dt = dt / steps;
    let count = steps.to_f32() as usize;

    let w = params.angular_freq();
    let mode = params.mode();
    let mut offset = current - target;
    let mut vel = velocity;
    for _ in 0..count {
        let (x, v) = solve(offset, vel, w, mode, sub_dt);
        offset = x;
        vel = v;
    }

    let value = target + offset;
    if value.is_finite() && vel.is_finite() {
        (value, vel)
    } else {
        (target, V::zero())
    }
}

/// Closed-form step of the offset `x0` from the rest position.
fn solve<V: Vec>(
    x0: V,
    v0: V,
    w: V::Scalar,
    mode: DampingMode<V::Scalar>,
    dt: V::Scalar,
) -> (V, V) {
    match mode {
        DampingMode::CriticallyDamped => {
            let exp_term = (-w * dt).exp();
            let c2 = v0 + x0.scale(w);
            let new_x = (x0 + c2.scale(dt)).scale(exp_term);
            let new_v = (v0 - c2.scale(w * dt)).scale(exp_term);
            (new_x, new_v)
        }
        DampingMode::Underdamped { ratio: zeta } => {
            let one = V::Scalar::one();
            let wd = w * (one - zeta * zeta).sqrt();
            let exp_term = (-zeta * w * dt).exp();
            let cos_term = (wd * dt).cos();
            let sin_term = (wd * dt).sin();

            let a = x0;
            let b = (v0 + x0.scale(zeta * w)).scale(one / wd);

            let new_x = (a.scale(cos_term) + b.scale(sin_term)).scale(exp_term);

            let v_cos_coeff = b.scale(wd) - a.scale(zeta * w);
            let v_sin_coeff = a.scale(wd) + b.scale(zeta * w);
            let new_v = (v_cos_coeff.scale(cos_term) - v_sin_coeff.scale(sin_term))
                .scale(exp_term);

            (new_x, new_v)
        }
        DampingMode::Overdamped { ratio: zeta } => {
            let one = V::Scalar::one();
            let s = (zeta * zeta - one).sqrt();
            let r1 = -w * (zeta - s);
            let r2 = -w * (zeta + s);
            let denom = one / (r2 - r1);

            let c1 = (x0.scale(r2) - v0).scale(denom);
            let c2 = (v0 - x0.scale(r1)).scale(denom);

            let exp1 = (r1 * dt).exp();
            let exp2 = (r2 * dt).exp();

            let new_x = c1.scale(exp1) + c2.scale(exp2);
            let new_v = c1.scale(r1 * exp1) + c2.scale(r2 * exp2);

            (new_x, new_v)
        }
    }
}

/// Stateful spring: a value chasing a target under fixed [`SpringParams`].
#[derive(Clone, Debug)]
pub struct Spring<V: Vec> {
    current: V,
    velocity: V,
    target: V,
    params: SpringParams<V::Scalar>,
}

impl<V: Vec> Spring<V> {
    pub fn new(initial: V, target: V, params: SpringParams<V::Scalar>) -> Self {
        Spring { current: initial, velocity: V::zero(), target, params }
    }

    /// A spring already at rest on `value`.
    pub fn at_rest(value: V, params: SpringParams<V::Scalar>) -> Self {
        Self::new(value, value, params)
    }

    pub fn update(&mut self, dt: V::Scalar) {
        let (value, velocity) = advance(self.current, self.target, self.velocity, &self.params, dt);
        self.current = value;
        self.velocity = velocity;
    }

    pub fn set_target(&mut self, target: V) { self.target = target; }
    pub fn set_params(&mut self, params: SpringParams<V::Scalar>) { self.params = params; }
    pub fn value(&self) -> V { self.current }
    pub fn velocity(&self) -> V { self.velocity }
    pub fn target(&self) -> V { self.target }
    pub fn params(&self) -> &SpringParams<V::Scalar> { &self.params }

    /// Add to the current velocity, e.g. to kick a wobble.
    pub fn impulse(&mut self, dv: V) {
        self.velocity = self.velocity + dv;
    }

    pub fn is_settled(&self, eps_pos: V::Scalar, eps_vel: V::Scalar) -> bool {
        let offset = self.current - self.target;
        offset.length_sq() < eps_pos * eps_pos
            && self.velocity.length_sq() < eps_vel * eps_vel
    }

    pub fn reset(&mut self, position: V) {
        self.current = position;
        self.velocity = V::zero();
    }

    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.velocity = V::zero();
    }
}

pub type Spring1D<F> = Spring<Scalar<F>>;
pub type Spring2D<F> = Spring<Vec2<F>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pick_expected_regimes() {
        assert!(matches!(SpringParams::<f32>::snap().mode(), DampingMode::CriticallyDamped | DampingMode::Overdamped { .. }));
        assert!(matches!(SpringParams::<f32>::wobble().mode(), DampingMode::Underdamped { .. }));
        assert!(matches!(SpringParams::<f32>::jelly_settle().mode(), DampingMode::Underdamped { .. }));
    }

    #[test]
    fn long_frame_is_substepped_and_stable() {
        let p = SpringParams::<f32>::snap();
        let (x, v) = advance(Scalar(0.0), Scalar(100.0), Scalar(0.0), &p, 0.5);
        assert!(x.0.is_finite() && v.0.is_finite());
        assert!((x.0 - 100.0).abs() < 1.0);
    }

    #[test]
    fn invalid_dt_is_noop() {
        let p = SpringParams::<f32>::snap();
        let (x, v) = advance(Scalar(3.0), Scalar(10.0), Scalar(1.0), &p, f32::NAN);
        assert_eq!(x.0, 3.0);
        assert_eq!(v.0, 1.0);
        let (x, _) = advance(Scalar(3.0), Scalar(10.0), Scalar(1.0), &p, -1.0);
        assert_eq!(x.0, 3.0);
    }
}
