//! Free-body motion: a flicked body coasting under friction and bouncing off walls.

use alloc::vec::Vec as AllocVec;

use crate::body::{Body, BodyMode};
use crate::bounds::{Bounds, Wall};
use crate::config::FlickParams;
use crate::curve::{approach_factor, unit_ramp};
use crate::float::Float;
use crate::vec::{Vec, Vec2};

/// A wall bounce produced by one step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WallHit<F: Float> {
    pub wall: Wall,
    /// Speed into the wall before the bounce (px/s, non-negative).
    pub speed_in: F,
    /// Speed away from the wall after the bounce (px/s, non-negative).
    pub speed_out: F,
}

/// What happened during a [`step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome<F: Float> {
    pub hits: AllocVec<WallHit<F>>,
    /// The flick ended this step and the body handed off to its settle spring.
    pub came_to_rest: bool,
}

/// Turn a drag release into a flick if it is fast enough.
///
/// Returns true when the body entered [`BodyMode::Flicking`].
pub fn launch<F: Float>(body: &mut Body<F>, exit_velocity: Vec2<F>, params: &FlickParams<F>) -> bool {
    let v = exit_velocity.sanitized();
    if !(v.length() > params.flick_speed) {
        return false;
    }
    body.mode = BodyMode::Flicking;
    body.velocity = v.scale(params.launch_scale).clamp_length(params.max_velocity);
    body.settle_target = None;
    body.center_velocity = Vec2::zero();
    true
}

/// Put a body into free flight with an explicit velocity, e.g. after a split or
/// a body-body impulse. Unlike [`launch`] there is no speed threshold.
pub fn set_flying<F: Float>(body: &mut Body<F>, velocity: Vec2<F>, params: &FlickParams<F>) {
    body.mode = BodyMode::Flicking;
    body.velocity = velocity.clamp_length(params.max_velocity);
    body.settle_target = None;
    body.center_velocity = Vec2::zero();
}

/// Advance a flicking body by `dt`. Bodies in any other mode are untouched.
pub fn step<F: Float>(
    body: &mut Body<F>,
    bounds: &Bounds<F>,
    params: &FlickParams<F>,
    dt: F,
) -> StepOutcome<F> {
    let mut outcome = StepOutcome::default();
    if body.mode != BodyMode::Flicking || !dt.is_finite() || !(dt > F::zero()) {
        return outcome;
    }

    let friction = params.friction.powf(dt / params.reference_dt).clamp(F::zero(), F::one());
    let mut v = body.velocity.scale(friction).clamp_length(params.max_velocity);

    let speed = v.length();
    let dir = v.normalize();
    let magnitude = unit_ramp(speed, F::zero(), params.reference_speed) * params.max_flight_stretch;
    let fade = unit_ramp(speed, params.min_velocity, params.flight_fade_speed);
    let flight_target = dir.scale(magnitude * fade);
    body.flight = body.flight.lerp(flight_target, approach_factor(dt, params.flight_tau));

    let mut next = body.center + v.scale(dt);

    if next.x < bounds.min.x {
        next.x = bounds.min.x;
        if v.x < F::zero() {
            bounce_x(body, &mut v, Wall::Left, params, &mut outcome);
        }
    } else if next.x > bounds.max.x {
        next.x = bounds.max.x;
        if v.x > F::zero() {
            bounce_x(body, &mut v, Wall::Right, params, &mut outcome);
        }
    }
    if next.y < bounds.min.y {
        next.y = bounds.min.y;
        if v.y < F::zero() {
            bounce_y(body, &mut v, Wall::Top, params, &mut outcome);
        }
    } else if next.y > bounds.max.y {
        next.y = bounds.max.y;
        if v.y > F::zero() {
            bounce_y(body, &mut v, Wall::Bottom, params, &mut outcome);
        }
    }

    body.center = bounds.clamp(next.sanitized());
    body.velocity = v;

    if body.velocity.length() < params.min_velocity {
        come_to_rest(body);
        outcome.came_to_rest = true;
    }
    outcome
}

fn bounce_x<F: Float>(
    body: &mut Body<F>,
    v: &mut Vec2<F>,
    wall: Wall,
    params: &FlickParams<F>,
    outcome: &mut StepOutcome<F>,
) {
    let speed_in = v.x.abs();
    v.x = -v.x * params.bounce_damping;
    let strength = unit_ramp(speed_in, F::zero(), params.impact_reference_speed);
    let sign = if wall == Wall::Right { F::one() } else { -F::one() };
    body.trigger_impact(Vec2::new(sign * strength, F::zero()));
    body.flash_edge(wall, strength);
    outcome.hits.push(WallHit { wall, speed_in, speed_out: v.x.abs() });
}

fn bounce_y<F: Float>(
    body: &mut Body<F>,
    v: &mut Vec2<F>,
    wall: Wall,
    params: &FlickParams<F>,
    outcome: &mut StepOutcome<F>,
) {
    let speed_in = v.y.abs();
    v.y = -v.y * params.bounce_damping;
    let strength = unit_ramp(speed_in, F::zero(), params.impact_reference_speed);
    let sign = if wall == Wall::Bottom { F::one() } else { -F::one() };
    body.trigger_impact(Vec2::new(F::zero(), sign * strength));
    body.flash_edge(wall, strength);
    outcome.hits.push(WallHit { wall, speed_in, speed_out: v.y.abs() });
}

/// End a flick: drop velocity and flight, then settle on the current spot.
fn come_to_rest<F: Float>(body: &mut Body<F>) {
    body.mode = BodyMode::Idle;
    // The leftover drift becomes the settle spring's initial velocity.
    body.center_velocity = body.velocity;
    body.velocity = Vec2::zero();
    body.flight = Vec2::zero();
    body.settle_target = Some(body.center);
}
