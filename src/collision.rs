//! Pairwise body-body collision: circle overlap, positional separation and an
//! inelastic velocity exchange.

use crate::body::{Body, BodyMode};
use crate::bounds::Bounds;
use crate::config::PhysicsParams;
use crate::curve::unit_ramp;
use crate::float::Float;
use crate::physics::set_flying;
use crate::vec::{Vec, Vec2};

/// An overlap found and resolved by [`resolve`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact<F: Float> {
    /// Unit vector from the first body toward the second.
    pub normal: Vec2<F>,
    /// Penetration depth before correction (px).
    pub overlap: F,
    /// Closing speed along the normal (px/s, non-negative).
    pub approach_speed: F,
    /// Whether any positional correction was applied.
    pub corrected: bool,
    /// Whether an impulse was exchanged.
    pub impulse: bool,
}

/// Velocity the body is actually moving with: free flight, or spring motion.
fn effective_velocity<F: Float>(body: &Body<F>) -> Vec2<F> {
    if body.mode == BodyMode::Flicking {
        body.velocity
    } else {
        body.center_velocity
    }
}

/// Separate two overlapping bodies whose centers must stay `min_separation` apart.
///
/// A dragged body is never displaced; when both are dragged no correction or
/// impulse happens at all. The impact pulse plays in every case.
pub fn resolve<F: Float>(
    a: &mut Body<F>,
    b: &mut Body<F>,
    min_separation: F,
    physics: &PhysicsParams<F>,
) -> Option<Contact<F>> {
    let params = &physics.collision;
    let flick = &physics.flick;
    let delta = b.center - a.center;
    let dist = delta.length();
    if !(dist < min_separation) {
        a.relax_impact(params.impact_rest_epsilon);
        b.relax_impact(params.impact_rest_epsilon);
        return None;
    }
    let normal = if dist > F::from_f32(1e-6) {
        delta.scale(F::one() / dist)
    } else {
        Vec2::unit_x()
    };
    let overlap = min_separation - dist;

    let a_held = a.is_controlled();
    let b_held = b.is_controlled();
    let corrected = match (a_held, b_held) {
        (false, false) => {
            let half = normal.scale(overlap * F::half());
            displace(a, -half);
            displace(b, half);
            true
        }
        (true, false) => {
            displace(b, normal.scale(overlap));
            true
        }
        (false, true) => {
            displace(a, -normal.scale(overlap));
            true
        }
        (true, true) => false,
    };

    let strength = unit_ramp(overlap, F::zero(), params.reference_overlap);
    if normal.x.abs() >= normal.y.abs() {
        let s = normal.x.signum() * strength;
        a.trigger_impact(Vec2::new(s, F::zero()));
        b.trigger_impact(Vec2::new(-s, F::zero()));
    } else {
        let s = normal.y.signum() * strength;
        a.trigger_impact(Vec2::new(F::zero(), s));
        b.trigger_impact(Vec2::new(F::zero(), -s));
    }

    let va = effective_velocity(a);
    let vb = effective_velocity(b);
    let closing = (vb - va).dot(normal);
    let approach_speed = (-closing).max(F::zero());
    let mut impulse = false;

    if closing < -params.approach_epsilon && !(a_held && b_held) {
        let restitution = F::one() + params.bounce_damping;
        // Equal masses share the exchange; a held body acts as an immovable wall.
        let share = if a_held || b_held { restitution } else { restitution * F::half() };
        let dv = normal.scale(closing * share);
        let wobble = approach_speed * params.wobble_per_speed;
        if !a_held {
            set_flying(a, va + dv, flick);
            a.wobble.kick(Vec2::zero(), wobble, F::zero(), F::zero(), &physics.wobble);
        }
        if !b_held {
            set_flying(b, vb - dv, flick);
            b.wobble.kick(Vec2::zero(), wobble, F::zero(), F::zero(), &physics.wobble);
        }
        impulse = true;
    }

    Some(Contact { normal, overlap, approach_speed, corrected, impulse })
}

/// Move a body's center. A body not under direct control carries its grab
/// point along so the follow spring does not pull it back.
fn displace<F: Float>(body: &mut Body<F>, delta: Vec2<F>) {
    let delta = delta.sanitized();
    body.center = body.center + delta;
    if !body.is_controlled() {
        body.grab_point = body.grab_point + delta;
    }
}

/// Clamp both bodies into their bounds, then restore `min_separation` where a
/// wall swallowed the correction from [`resolve`].
///
/// A dragged body stays put; the free one slides along the wall instead.
/// Returns false when no placement inside the bounds clears the overlap.
pub fn confine<F: Float>(a: &mut Body<F>, b: &mut Body<F>, min_separation: F, container: Vec2<F>) -> bool {
    for body in [&mut *a, &mut *b] {
        let clamped = body.bounds(container).clamp(body.center);
        displace(body, clamped - body.center);
    }
    let a_bounds = a.bounds(container);
    let b_bounds = b.bounds(container);
    match (a.is_controlled(), b.is_controlled()) {
        (true, true) => true,
        (true, false) => separate_within(b, a.center, min_separation, &b_bounds),
        (false, true) => separate_within(a, b.center, min_separation, &a_bounds),
        (false, false) => {
            separate_within(b, a.center, min_separation, &b_bounds)
                || separate_within(a, b.center, min_separation, &a_bounds)
        }
    }
}

/// Move `free` to the nearest spot inside `bounds` at least `min_separation`
/// from `anchor`.
///
/// Candidates are the straight push-out, the points on the separation circle
/// along each wall the push ran into, and the corners of `bounds`. Returns
/// false (leaving the farthest candidate) when none of them clears.
pub fn separate_within<F: Float>(
    free: &mut Body<F>,
    anchor: Vec2<F>,
    min_separation: F,
    bounds: &Bounds<F>,
) -> bool {
    let delta = free.center - anchor;
    let dist = delta.length();
    if !(dist < min_separation) {
        return true;
    }
    let normal = if dist > F::from_f32(1e-6) {
        delta.scale(F::one() / dist)
    } else {
        escape_direction(anchor, bounds)
    };
    let pushed = bounds.clamp(anchor + normal.scale(min_separation));

    // Stay on the wall the push hit and solve for the other axis.
    let r2 = min_separation * min_separation;
    let dx = pushed.x - anchor.x;
    let dy = pushed.y - anchor.y;
    let along_x = (r2 - dx * dx).max(F::zero()).sqrt();
    let along_y = (r2 - dy * dy).max(F::zero()).sqrt();
    let candidates = [
        pushed,
        Vec2::new(pushed.x, anchor.y + along_x),
        Vec2::new(pushed.x, anchor.y - along_x),
        Vec2::new(anchor.x + along_y, pushed.y),
        Vec2::new(anchor.x - along_y, pushed.y),
        bounds.min,
        bounds.max,
        Vec2::new(bounds.min.x, bounds.max.y),
        Vec2::new(bounds.max.x, bounds.min.y),
    ];

    let needed = min_separation - F::from_f32(1e-3);
    let mut best: Option<Vec2<F>> = None;
    let mut farthest = free.center;
    for candidate in candidates.iter().map(|c| bounds.clamp(*c)) {
        if candidate.distance(anchor) > farthest.distance(anchor) {
            farthest = candidate;
        }
        if candidate.distance(anchor) < needed {
            continue;
        }
        let closer = match best {
            Some(b) => candidate.distance(free.center) < b.distance(free.center),
            None => true,
        };
        if closer {
            best = Some(candidate);
        }
    }

    let target = best.unwrap_or(farthest);
    displace(free, target - free.center);
    best.is_some()
}

/// Push-out direction for coincident centers: toward the middle of the
/// bounds, away from whatever wall both bodies are pinned against.
fn escape_direction<F: Float>(from: Vec2<F>, bounds: &Bounds<F>) -> Vec2<F> {
    let inward = (bounds.center() - from).normalize();
    if inward == Vec2::zero() {
        Vec2::new(F::one(), -F::one()).normalize()
    } else {
        inward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32, y: f32) -> Body<f32> {
        Body::new(Vec2::new(x, y), Vec2::new(40.0, 40.0), 1.0)
    }

    #[test]
    fn free_bodies_split_correction() {
        let mut a = body_at(0.0, 0.0);
        let mut b = body_at(60.0, 0.0);
        let c = resolve(&mut a, &mut b, 80.0, &PhysicsParams::default()).unwrap();
        assert!((c.overlap - 20.0).abs() < 1e-4);
        assert!((a.center.x + 10.0).abs() < 1e-4);
        assert!((b.center.x - 70.0).abs() < 1e-4);
    }

    #[test]
    fn dragged_body_is_not_displaced() {
        let mut a = body_at(0.0, 0.0);
        a.begin_drag(0.0);
        let mut b = body_at(50.0, 0.0);
        resolve(&mut a, &mut b, 80.0, &PhysicsParams::default());
        assert_eq!(a.center, Vec2::new(0.0, 0.0));
        assert!((b.center.x - 80.0).abs() < 1e-4);
    }

    #[test]
    fn both_dragged_skips_correction() {
        let mut a = body_at(0.0, 0.0);
        let mut b = body_at(50.0, 0.0);
        a.begin_drag(0.0);
        b.begin_drag(0.0);
        let c = resolve(&mut a, &mut b, 80.0, &PhysicsParams::default()).unwrap();
        assert!(!c.corrected);
        assert!(!c.impulse);
        assert_eq!(b.center.x, 50.0);
    }

    #[test]
    fn approaching_bodies_exchange_impulse() {
        let params = PhysicsParams::default();
        let mut a = body_at(0.0, 0.0);
        let mut b = body_at(70.0, 0.0);
        set_flying(&mut a, Vec2::new(600.0, 0.0), &params.flick);
        let c = resolve(&mut a, &mut b, 80.0, &params).unwrap();
        assert!(c.impulse);
        assert!(a.velocity.x < 600.0);
        assert!(b.velocity.x > 0.0);
        assert_eq!(b.mode, BodyMode::Flicking);
        assert!(b.wobble.scale > 0.0);
    }

    #[test]
    fn coincident_centers_separate_along_x() {
        let mut a = body_at(5.0, 5.0);
        let mut b = body_at(5.0, 5.0);
        resolve(&mut a, &mut b, 80.0, &PhysicsParams::default());
        assert!((a.center.distance(b.center) - 80.0).abs() < 1e-3);
    }

    #[test]
    fn free_body_slides_along_blocking_wall() {
        let bounds = Bounds::new(Vec2::new(-90.0f32, -90.0), Vec2::new(90.0, 90.0));
        let mut free = body_at(85.0, 0.0);
        assert!(separate_within(&mut free, Vec2::zero(), 120.0, &bounds));
        assert_eq!(free.center.x, 90.0);
        assert!((free.center.distance(Vec2::zero()) - 120.0).abs() < 1e-2);
        assert!((free.center.y.abs() - 79.372).abs() < 1e-2, "{:?}", free.center);
        assert_eq!(free.grab_point, free.center);
    }

    #[test]
    fn stacked_bodies_at_wall_escape_inward() {
        let bounds = Bounds::new(Vec2::new(-90.0f32, -90.0), Vec2::new(90.0, 90.0));
        let mut free = body_at(90.0, 0.0);
        assert!(separate_within(&mut free, Vec2::new(90.0, 0.0), 120.0, &bounds));
        assert!((free.center.x + 30.0).abs() < 1e-3, "{:?}", free.center);
        assert!(bounds.contains(free.center));
    }

    #[test]
    fn confine_keeps_dragged_body_and_clears_overlap() {
        let mut a = body_at(90.0, 0.0);
        a.begin_drag(0.0);
        let mut b = body_at(95.0, 0.0);
        assert!(confine(&mut a, &mut b, 80.0, Vec2::new(300.0, 300.0)));
        assert_eq!(a.center, Vec2::new(90.0, 0.0));
        assert!(a.center.distance(b.center) >= 80.0 - 1e-2);
        assert!(b.bounds(Vec2::new(300.0, 300.0)).contains(b.center));
    }

    #[test]
    fn correction_carries_grab_point_of_idle_body() {
        let mut a = body_at(0.0, 0.0);
        a.begin_drag(0.0);
        let mut b = body_at(50.0, 0.0);
        resolve(&mut a, &mut b, 80.0, &PhysicsParams::default());
        assert_eq!(b.grab_point, b.center);
        assert_eq!(b.stretch(), Vec2::zero());
        assert_eq!(a.grab_point, Vec2::zero());
    }
}
