//! The simulated slime body and its decaying visual pulses.

use crate::bounds::{Bounds, Wall};
use crate::config::{FlickParams, PhysicsParams, WobbleParams};
use crate::curve::{approach_factor, decay_factor};
use crate::float::Float;
use crate::idle::IdlePhases;
use crate::spring::{advance, SpringParams};
use crate::vec::{Scalar, Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Who is moving the body right now.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyMode {
    #[default]
    Idle,
    Dragging,
    Flicking,
}

/// Post-release ripple. Each channel springs back to zero on its own.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Wobble<F: Float> {
    pub offset: Vec2<F>,
    pub scale: F,
    pub skew_x: F,
    pub skew_y: F,
    offset_velocity: Vec2<F>,
    scale_velocity: F,
    skew_x_velocity: F,
    skew_y_velocity: F,
}

impl<F: Float> Wobble<F> {
    /// Add a displacement to every channel, clamped to the configured ceilings.
    pub fn kick(&mut self, offset: Vec2<F>, scale: F, skew_x: F, skew_y: F, limits: &WobbleParams<F>) {
        self.offset = (self.offset + offset.sanitized()).clamp_length(limits.max_offset);
        let clamp = |v: F, max: F| v.finite_or(F::zero()).clamp(-max, max);
        self.scale = clamp(self.scale + scale, limits.max_scale);
        self.skew_x = clamp(self.skew_x + skew_x, limits.max_skew_deg);
        self.skew_y = clamp(self.skew_y + skew_y, limits.max_skew_deg);
    }

    pub fn update(&mut self, params: &SpringParams<F>, dt: F) {
        let (o, ov) = advance(self.offset, Vec2::zero(), self.offset_velocity, params, dt);
        self.offset = o;
        self.offset_velocity = ov;
        let step = |value: F, velocity: F| {
            let (x, v) = advance(Scalar(value), Scalar(F::zero()), Scalar(velocity), params, dt);
            (x.0, v.0)
        };
        (self.scale, self.scale_velocity) = step(self.scale, self.scale_velocity);
        (self.skew_x, self.skew_x_velocity) = step(self.skew_x, self.skew_x_velocity);
        (self.skew_y, self.skew_y_velocity) = step(self.skew_y, self.skew_y_velocity);

        if self.magnitude() < F::from_f32(1e-5) && self.velocity_magnitude() < F::from_f32(1e-4) {
            *self = Wobble::default();
        }
    }

    /// Rough size of the ripple: scale plus skew (per 45°) plus offset (per 100 px).
    pub fn magnitude(&self) -> F {
        let deg = F::from_f32(1.0 / 45.0);
        let px = F::from_f32(1.0 / 100.0);
        self.scale.abs() + (self.skew_x.abs() + self.skew_y.abs()) * deg + self.offset.length() * px
    }

    fn velocity_magnitude(&self) -> F {
        let deg = F::from_f32(1.0 / 45.0);
        let px = F::from_f32(1.0 / 100.0);
        self.scale_velocity.abs()
            + (self.skew_x_velocity.abs() + self.skew_y_velocity.abs()) * deg
            + self.offset_velocity.length() * px
    }
}

/// One animated slime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body<F: Float> {
    /// Where the body is being pulled; follows input immediately.
    pub grab_point: Vec2<F>,
    /// Lagging visual center.
    pub center: Vec2<F>,
    /// Free-flight velocity (px/s); zero unless flicking.
    pub velocity: Vec2<F>,
    pub wobble: Wobble<F>,
    /// Signed per-axis compression in [-1, 1].
    pub impact: Vec2<F>,
    /// Velocity-aligned stretch while airborne.
    pub flight: Vec2<F>,
    /// Left, right, top, bottom proximity in [0, 1].
    pub edge_proximity: [F; 4],
    pub idle: IdlePhases<F>,
    pub mode: BodyMode,
    /// Simulation clock (s) of the last gesture touching this body.
    pub last_interaction_at: F,
    /// 1 for a full body, 0.5 for a split half.
    pub scale: F,
    /// Half-extents at `scale`.
    pub half_extents: Vec2<F>,
    pub opacity: F,
    /// Extra scale while merging.
    pub growth: F,
    /// Signed inchworm elongation for split halves: positive extends, negative compresses.
    pub crawl: F,
    /// Unit axis toward the partner half.
    pub crawl_axis: Vec2<F>,
    pub(crate) impact_target: Vec2<F>,
    pub(crate) edge_flash: [F; 4],
    pub(crate) center_velocity: Vec2<F>,
    pub(crate) grab_velocity: Vec2<F>,
    pub(crate) settle_target: Option<Vec2<F>>,
}

impl<F: Float> Body<F> {
    /// A body at rest on `center`. `full_half_extents` is the full-scale size.
    pub fn new(center: Vec2<F>, full_half_extents: Vec2<F>, scale: F) -> Self {
        Body {
            grab_point: center,
            center,
            velocity: Vec2::zero(),
            wobble: Wobble::default(),
            impact: Vec2::zero(),
            flight: Vec2::zero(),
            edge_proximity: [F::zero(); 4],
            idle: IdlePhases::default(),
            mode: BodyMode::Idle,
            last_interaction_at: F::zero(),
            scale,
            half_extents: full_half_extents.scale(scale),
            opacity: F::one(),
            growth: F::one(),
            crawl: F::zero(),
            crawl_axis: Vec2::unit_x(),
            impact_target: Vec2::zero(),
            edge_flash: [F::zero(); 4],
            center_velocity: Vec2::zero(),
            grab_velocity: Vec2::zero(),
            settle_target: None,
        }
    }

    /// `grab_point - center`.
    pub fn stretch(&self) -> Vec2<F> {
        self.grab_point - self.center
    }

    /// Collision radius: half the larger side.
    pub fn radius(&self) -> F {
        self.half_extents.x.max(self.half_extents.y)
    }

    pub fn bounds(&self, container: Vec2<F>) -> Bounds<F> {
        Bounds::from_container(container, self.half_extents)
    }

    /// Under direct user control.
    pub fn is_controlled(&self) -> bool {
        self.mode == BodyMode::Dragging
    }

    /// Inside the body's rounded footprint, approximated by its ellipse.
    pub fn contains(&self, point: Vec2<F>) -> bool {
        let d = point - self.center;
        let hx = self.half_extents.x;
        let hy = self.half_extents.y;
        if !(hx > F::zero() && hy > F::zero()) {
            return false;
        }
        let nx = d.x / hx;
        let ny = d.y / hy;
        nx * nx + ny * ny <= F::one()
    }

    /// Whether a spring-to-target animation is in flight.
    pub fn is_springing(&self) -> bool {
        self.settle_target.is_some()
    }

    /// Take direct control. Cancels any flight and in-flight spring-to-target.
    pub fn begin_drag(&mut self, now: F) {
        self.mode = BodyMode::Dragging;
        self.settle_target = None;
        self.velocity = Vec2::zero();
        self.flight = Vec2::zero();
        self.grab_point = self.center;
        self.grab_velocity = Vec2::zero();
        self.last_interaction_at = now;
    }

    /// Move the grab point while dragging.
    pub fn drag_to(&mut self, target: Vec2<F>, now: F) {
        if self.mode != BodyMode::Dragging || !target.is_finite() {
            return;
        }
        self.grab_point = target;
        self.last_interaction_at = now;
    }

    /// Let go. Plays the release wobble and launches a flick when fast enough.
    /// Returns true when the body started flicking.
    pub fn release(&mut self, exit_velocity: Vec2<F>, params: &PhysicsParams<F>, now: F) -> bool {
        if self.mode != BodyMode::Dragging {
            return false;
        }
        self.mode = BodyMode::Idle;
        self.last_interaction_at = now;
        self.kick_release_wobble(&params.wobble);
        crate::physics::launch(self, exit_velocity, &params.flick)
    }

    /// Ripple proportional to how far the body was stretched when let go.
    pub fn kick_release_wobble(&mut self, limits: &WobbleParams<F>) {
        let s = self.stretch().sanitized();
        let len = s.length();
        let skew_x = -s.x.signum() * (s.x.abs() * limits.skew_per_px);
        let skew_y = -s.y.signum() * (s.y.abs() * limits.skew_per_px);
        self.wobble.kick(s.scale(limits.offset_ratio), len * limits.scale_per_px, skew_x, skew_y, limits);
    }

    /// Start a spring toward `target`; the body is treated as idle meanwhile.
    pub fn spring_to(&mut self, target: Vec2<F>) {
        if !target.is_finite() {
            return;
        }
        self.mode = BodyMode::Idle;
        self.velocity = Vec2::zero();
        self.settle_target = Some(target);
    }

    /// Spring-driven motion for everything except free flight.
    ///
    /// Dragging: the center chases the grab point. Idle: the grab point snaps
    /// back onto the center (and the center onto a settle target, if any).
    /// Flicking: only the grab point follows; the physics step owns the center.
    pub fn follow(&mut self, params: &PhysicsParams<F>, bounds: &Bounds<F>, dt: F) {
        match self.mode {
            BodyMode::Dragging => {
                let (c, cv) = advance(self.center, self.grab_point, self.center_velocity, &params.follow, dt);
                self.center = c;
                self.center_velocity = cv;
            }
            BodyMode::Idle => {
                let (target, spring) = match self.settle_target {
                    Some(t) => (bounds.clamp(t), &params.settle),
                    None => (self.grab_point, &params.follow),
                };
                let (c, cv) = advance(self.center, target, self.center_velocity, spring, dt);
                self.center = c;
                self.center_velocity = cv;
                self.snap_grab(params, dt);

                if let Some(t) = self.settle_target {
                    let eps = F::from_f32(0.05);
                    if self.center.distance(bounds.clamp(t)) < eps && self.center_velocity.length() < eps {
                        self.center = bounds.clamp(t);
                        self.center_velocity = Vec2::zero();
                        self.settle_target = None;
                    }
                }
            }
            BodyMode::Flicking => {
                self.center_velocity = Vec2::zero();
                self.snap_grab(params, dt);
            }
        }
        self.center = bounds.clamp(self.center.sanitized());
        if self.mode != BodyMode::Dragging {
            self.center_velocity = self.center_velocity.clamp_length(params.flick.max_velocity);
        }
    }

    fn snap_grab(&mut self, params: &PhysicsParams<F>, dt: F) {
        let (g, gv) = advance(self.grab_point, self.center, self.grab_velocity, &params.snap, dt);
        self.grab_point = g;
        self.grab_velocity = gv;
        let eps = F::from_f32(0.01);
        if self.stretch().length() < eps && self.grab_velocity.length() < eps && self.center_velocity.length() < eps {
            self.grab_point = self.center;
            self.grab_velocity = Vec2::zero();
        }
    }

    /// Register a collision on one axis. `amount` is signed and clamped to [-1, 1].
    /// The larger of the running and new pulse wins.
    pub fn trigger_impact(&mut self, amount: Vec2<F>) {
        let one = F::one();
        let pick = |current: F, new: F| {
            let new = new.finite_or(F::zero()).clamp(-one, one);
            if new.abs() > current.abs() { new } else { current }
        };
        self.impact_target.x = pick(self.impact_target.x, amount.x);
        self.impact_target.y = pick(self.impact_target.y, amount.y);
    }

    /// Light up one wall's proximity regardless of distance.
    pub fn flash_edge(&mut self, wall: Wall, strength: F) {
        let slot = &mut self.edge_flash[wall.index()];
        *slot = slot.max(strength.clamp(F::zero(), F::one()));
    }

    /// Advance impact, edge flash and wobble decay.
    pub fn update_pulses(&mut self, params: &PhysicsParams<F>, dt: F) {
        let flick: &FlickParams<F> = &params.flick;
        let rise = approach_factor(dt, flick.impact_rise_tau);
        let recover = decay_factor(dt, flick.impact_recover_tau);
        self.impact = self.impact.lerp(self.impact_target, rise);
        self.impact_target = self.impact_target.scale(recover);
        let one = F::one();
        self.impact = Vec2::new(self.impact.x.clamp(-one, one), self.impact.y.clamp(-one, one)).sanitized();

        let flash = decay_factor(dt, flick.edge_flash_tau);
        for f in self.edge_flash.iter_mut() {
            *f = *f * flash;
            if *f < F::from_f32(1e-3) {
                *f = F::zero();
            }
        }

        self.wobble.update(&params.wobble_spring, dt);
    }

    /// Zero a small impact once nothing sustains it.
    pub fn relax_impact(&mut self, epsilon: F) {
        if self.impact.length() < epsilon && self.impact_target.length() < epsilon {
            self.impact = Vec2::zero();
            self.impact_target = Vec2::zero();
        }
    }

    /// Recompute edge proximity from distance, combined with any wall flash.
    pub fn update_edges(&mut self, bounds: &Bounds<F>, margin: F) {
        let distance = bounds.proximity(self.center, margin);
        for (i, slot) in self.edge_proximity.iter_mut().enumerate() {
            *slot = distance[i].max(self.edge_flash[i]);
        }
    }

    /// Knock out NaN/infinity and cap speeds after a step.
    pub fn sanitize(&mut self, bounds: &Bounds<F>, max_velocity: F) {
        self.center = bounds.clamp(self.center.sanitized());
        if !self.grab_point.is_finite() {
            self.grab_point = self.center;
            self.grab_velocity = Vec2::zero();
        }
        self.velocity = self.velocity.clamp_length(max_velocity);
        self.center_velocity = self.center_velocity.sanitized();
        self.grab_velocity = self.grab_velocity.sanitized();
        self.flight = self.flight.sanitized();
    }

    /// Nothing left to animate apart from idle oscillation.
    pub fn is_at_rest(&self) -> bool {
        let eps = F::from_f32(0.05);
        self.mode == BodyMode::Idle
            && self.settle_target.is_none()
            && self.stretch().length() < eps
            && self.center_velocity.length() < eps
            && self.wobble.magnitude() < F::from_f32(1e-3)
    }
}
