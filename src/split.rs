//! Split/merge choreography: one full body pinched into two half-scale bodies
//! that bounce apart, crawl back together, bridge and merge.

use crate::body::{Body, BodyMode};
use crate::bounds::Bounds;
use crate::config::{PhysicsParams, SplitParams};
use crate::curve::{approach_factor, smoothstep, unit_ramp};
use crate::float::Float;
use crate::physics::set_flying;
use crate::vec::{Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the split/merge choreography currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SplitPhase {
    #[default]
    Merged,
    SplitBouncing,
    Crawling,
    Approaching,
    Contact,
    Merging,
}

impl SplitPhase {
    /// Whether two half bodies are live.
    pub fn is_split(self) -> bool {
        self != SplitPhase::Merged
    }

    /// Whether the halves are free bodies that must not overlap.
    pub fn halves_collide(self) -> bool {
        self == SplitPhase::SplitBouncing
    }
}

/// Inchworm state of one half.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfState<F: Float> {
    /// Position in the compress/extend cycle, in [0, 1). Extending below 0.5.
    pub cycle: F,
    /// How far the half reaches toward its partner, in [0, 1].
    pub reach: F,
}

impl<F: Float> HalfState<F> {
    pub fn is_extending(&self) -> bool {
        self.cycle < F::half()
    }

    /// Signed cycle stretch: positive while extending, negative while compressing.
    pub fn cycle_stretch(&self) -> F {
        (F::two() * F::pi() * self.cycle).sin()
    }
}

/// Result of one [`SplitMachine::advance`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitStep<F: Float> {
    /// `(from, to)` when the phase changed this step.
    pub transition: Option<(SplitPhase, SplitPhase)>,
    /// The reunited body, once merging completes. Replaces both halves.
    pub merged: Option<Body<F>>,
}

/// The split/merge state machine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitMachine<F: Float> {
    phase: SplitPhase,
    /// Seconds spent in the current phase.
    elapsed: F,
    halves: [HalfState<F>; 2],
    bridge: F,
    merge_progress: F,
    /// Body center when the split happened; the merge lands back here.
    origin: Vec2<F>,
}

impl<F: Float> SplitMachine<F> {
    pub fn new() -> Self {
        SplitMachine {
            phase: SplitPhase::Merged,
            elapsed: F::zero(),
            halves: [HalfState::default(), HalfState::default()],
            bridge: F::zero(),
            merge_progress: F::zero(),
            origin: Vec2::zero(),
        }
    }

    pub fn phase(&self) -> SplitPhase {
        self.phase
    }

    pub fn halves(&self) -> &[HalfState<F>; 2] {
        &self.halves
    }

    /// Connecting-bridge progress in [0, 1]; nonzero from `Contact` on.
    pub fn bridge_progress(&self) -> F {
        self.bridge
    }

    /// Merge fade progress in [0, 1].
    pub fn merge_progress(&self) -> F {
        self.merge_progress
    }

    /// Where the body was when it split.
    pub fn origin(&self) -> Vec2<F> {
        self.origin
    }

    /// Split `body` into two half-scale bodies along the horizontal pinch axis.
    ///
    /// `full_half_extents` is the full-scale body size. Returns `None` unless
    /// currently merged. Callers must clamp the halves into their bounds.
    pub fn split(
        &mut self,
        body: &Body<F>,
        full_half_extents: Vec2<F>,
        params: &PhysicsParams<F>,
    ) -> Option<[Body<F>; 2]> {
        if self.phase != SplitPhase::Merged {
            return None;
        }
        let split = &params.split;
        let axis = Vec2::unit_x();
        let mut a = Body::new(body.center, full_half_extents, F::half());
        let mut b = Body::new(body.center, full_half_extents, F::half());
        let offset = axis.scale(a.radius() + split.spawn_gap * F::half());
        a.center = body.center - offset;
        a.grab_point = a.center;
        b.center = body.center + offset;
        b.grab_point = b.center;
        for half in [&mut a, &mut b] {
            half.last_interaction_at = body.last_interaction_at;
            half.idle = body.idle;
        }
        set_flying(&mut a, -axis.scale(split.launch_speed), &params.flick);
        set_flying(&mut b, axis.scale(split.launch_speed), &params.flick);

        self.enter(SplitPhase::SplitBouncing);
        self.origin = body.center;
        Some([a, b])
    }

    fn enter(&mut self, phase: SplitPhase) {
        self.phase = phase;
        self.elapsed = F::zero();
    }

    /// Drop back to merged without choreography (teardown or a missing half).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the choreography by `dt`.
    ///
    /// `halves` must be the two live half bodies while split. The larger of
    /// `full_half_extents` is the unit of the split distances.
    pub fn advance(
        &mut self,
        halves: &mut [Body<F>],
        full_half_extents: Vec2<F>,
        container: Vec2<F>,
        params: &PhysicsParams<F>,
        dt: F,
    ) -> SplitStep<F> {
        let mut out = SplitStep::default();
        if self.phase == SplitPhase::Merged || !dt.is_finite() || !(dt > F::zero()) {
            return out;
        }
        let [a, b] = halves else {
            let from = self.phase;
            self.reset();
            out.transition = Some((from, SplitPhase::Merged));
            return out;
        };

        self.elapsed = self.elapsed + dt;
        let from = self.phase;
        let split = &params.split;
        let full_radius = full_half_extents.x.max(full_half_extents.y);
        let approach_d = split.approach_distance * full_radius;
        let contact_d = split.contact_distance * full_radius;
        let merge_d = split.merge_distance * full_radius;
        let home = Bounds::from_container(container, full_half_extents).clamp(self.origin);
        let home_pull = approach_factor(dt, split.home_pull_tau.max(F::from_f32(1e-3)));

        match self.phase {
            SplitPhase::Merged => {}
            SplitPhase::SplitBouncing => {
                let combined = speed_of(a) + speed_of(b);
                if self.elapsed >= split.min_bounce_time && combined < split.settle_speed {
                    for half in [&mut *a, &mut *b] {
                        stop(half);
                    }
                    self.halves[0] = HalfState::default();
                    self.halves[1] = HalfState { cycle: split.crawl_phase_offset.wrap(F::one()), reach: F::zero() };
                    self.enter(SplitPhase::Crawling);
                }
            }
            SplitPhase::Crawling => {
                let step = split.crawl_speed * dt;
                self.crawl(a, b, split, dt, |half| if half.is_extending() { step } else { F::zero() }, F::one(), merge_d);
                if a.center.distance(b.center) < approach_d {
                    self.enter(SplitPhase::Approaching);
                }
            }
            SplitPhase::Approaching => {
                let decay = (-self.elapsed / split.approach_decay_tau.max(F::from_f32(1e-3))).exp();
                let speed = split.approach_min_speed + (split.approach_speed - split.approach_min_speed).max(F::zero()) * decay;
                let step = speed * dt;
                self.crawl(a, b, split, dt, |_| step, decay, merge_d);
                let dist = a.center.distance(b.center);
                let reach = unit_ramp(approach_d - dist, F::zero(), approach_d - contact_d);
                for h in self.halves.iter_mut() {
                    h.reach = reach;
                }
                set_crawl(a, b, &self.halves, split, decay);
                drift(a, b, home, home_pull);
                if dist < contact_d {
                    self.enter(SplitPhase::Contact);
                }
            }
            SplitPhase::Contact => {
                self.bridge = (self.bridge + dt / split.bridge_duration.max(F::from_f32(1e-3))).min(F::one());
                let pull = split.contact_pull_speed * (F::one() + split.contact_pull_gain * self.bridge);
                converge(a, b, pull * dt, F::zero());
                for h in self.halves.iter_mut() {
                    h.reach = F::one();
                }
                set_crawl(a, b, &self.halves, split, F::zero());
                drift(a, b, home, home_pull);
                let dist = a.center.distance(b.center);
                if self.bridge >= F::one() || dist < merge_d {
                    self.enter(SplitPhase::Merging);
                }
            }
            SplitPhase::Merging => {
                self.merge_progress = (self.merge_progress + dt / split.merge_duration.max(F::from_f32(1e-3))).min(F::one());
                let k = approach_factor(dt, split.merge_duration * F::from_f32(0.3));
                for half in [&mut *a, &mut *b] {
                    let delta = (home - half.center).scale(k);
                    shift(half, delta);
                    half.opacity = F::one() - smoothstep(self.merge_progress);
                    half.growth = F::one() + split.merge_growth * self.merge_progress;
                }
                if self.merge_progress >= F::one() {
                    out.merged = Some(self.reunite(a, b, home, full_half_extents, container, params));
                    self.reset();
                }
            }
        }

        if self.phase != from {
            out.transition = Some((from, self.phase));
        }
        out
    }

    /// Move both halves toward each other, the per-half step given by `step_of`.
    #[allow(clippy::too_many_arguments)]
    fn crawl(
        &mut self,
        a: &mut Body<F>,
        b: &mut Body<F>,
        split: &SplitParams<F>,
        dt: F,
        step_of: impl Fn(&HalfState<F>) -> F,
        amplitude: F,
        floor: F,
    ) {
        let period = split.crawl_period.max(F::from_f32(1e-3));
        for h in self.halves.iter_mut() {
            h.cycle = (h.cycle + dt / period).wrap(F::one());
        }
        let dist = a.center.distance(b.center);
        let room = ((dist - floor) * F::half()).max(F::zero());
        let da = step_of(&self.halves[0]).min(room);
        let db = step_of(&self.halves[1]).min(room);
        let dir = direction(a, b);
        shift(a, dir.scale(da));
        shift(b, -dir.scale(db));
        set_crawl(a, b, &self.halves, split, amplitude);
    }

    #[allow(clippy::too_many_arguments)]
    fn reunite(
        &self,
        a: &Body<F>,
        b: &Body<F>,
        home: Vec2<F>,
        full_half_extents: Vec2<F>,
        container: Vec2<F>,
        params: &PhysicsParams<F>,
    ) -> Body<F> {
        let mut body = Body::new(home, full_half_extents, F::one());
        body.center = body.bounds(container).clamp(home);
        body.grab_point = body.center;
        body.idle = a.idle;
        body.last_interaction_at = a.last_interaction_at.max(b.last_interaction_at);
        let kick = params.split.merge_wobble;
        body.wobble.kick(Vec2::zero(), kick, F::zero(), F::zero(), &params.wobble);
        body
    }
}

impl<F: Float> Default for SplitMachine<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn speed_of<F: Float>(body: &Body<F>) -> F {
    if body.mode == BodyMode::Flicking {
        body.velocity.length()
    } else {
        body.center_velocity.length()
    }
}

fn stop<F: Float>(body: &mut Body<F>) {
    body.mode = BodyMode::Idle;
    body.velocity = Vec2::zero();
    body.flight = Vec2::zero();
    body.center_velocity = Vec2::zero();
    body.settle_target = None;
}

/// Translate a half, grab point included, so the move reads as crawling rather than stretch.
fn shift<F: Float>(body: &mut Body<F>, delta: Vec2<F>) {
    let delta = delta.sanitized();
    body.center = body.center + delta;
    body.grab_point = body.grab_point + delta;
}

fn direction<F: Float>(a: &Body<F>, b: &Body<F>) -> Vec2<F> {
    let dir = (b.center - a.center).normalize();
    if dir == Vec2::zero() { Vec2::unit_x() } else { dir }
}

/// Translate the pair so its midpoint moves a fraction `k` of the way to `home`.
fn drift<F: Float>(a: &mut Body<F>, b: &mut Body<F>, home: Vec2<F>, k: F) {
    let delta = (home - a.center.midpoint(b.center)).scale(k);
    shift(a, delta);
    shift(b, delta);
}

/// Pull both halves together by up to `step` each, never closer than `floor`.
fn converge<F: Float>(a: &mut Body<F>, b: &mut Body<F>, step: F, floor: F) {
    let dist = a.center.distance(b.center);
    let room = ((dist - floor) * F::half()).max(F::zero());
    let d = step.min(room);
    let dir = direction(a, b);
    shift(a, dir.scale(d));
    shift(b, -dir.scale(d));
}

/// Write each half's crawl stretch along the axis toward its partner.
fn set_crawl<F: Float>(
    a: &mut Body<F>,
    b: &mut Body<F>,
    halves: &[HalfState<F>; 2],
    split: &SplitParams<F>,
    cycle_amplitude: F,
) {
    let dir = direction(a, b);
    let amount = |h: &HalfState<F>| {
        split.crawl_amplitude * (h.reach + cycle_amplitude * h.cycle_stretch())
    };
    a.crawl = amount(&halves[0]);
    a.crawl_axis = dir;
    b.crawl = amount(&halves[1]);
    b.crawl_axis = -dir;
}
