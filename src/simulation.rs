//! The owned simulation: bodies, split state, gesture state and clock.
//!
//! `tick` is the only mutator of body state. Gesture commands are queued by the
//! host at any time and applied together at the start of the next tick; the
//! renderer reads the [`FrameSnapshot`] published at the end of it.

use alloc::vec::Vec as AllocVec;

use crate::body::{Body, BodyMode};
use crate::bounds::Bounds;
use crate::collision;
use crate::config::SimConfig;
use crate::deform::{self, DeformContext, Transform};
use crate::error::SimError;
use crate::float::Float;
use crate::gesture::{BodyId, GestureCommand, GestureQueue, GestureState};
use crate::idle::IdleOscillator;
use crate::observer::SimObserver;
use crate::physics;
use crate::split::{SplitMachine, SplitPhase};
use crate::vec::{Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most sub-steps one tick will take, whatever the frame and sub-step limits.
const MAX_SUB_STEPS: usize = 32;

/// Distance (px) from home under which the idle check leaves a body alone.
const HOME_EPSILON: f32 = 0.5;

/// What the renderer draws this frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameSnapshot<F: Float> {
    /// One transform per visible body, in body slot order.
    pub transforms: AllocVec<Transform<F>>,
    pub split_phase: SplitPhase,
    /// Progress of the bridge between split halves, in [0, 1].
    pub bridge_progress: F,
    /// Simulation clock (s) at publication.
    pub clock: F,
}

/// The slime engine.
///
/// # Example
/// ```
/// use slimy::{NoOpObserver, SimConfig, Simulation, BodyId};
/// use slimy::vec::Vec2;
///
/// let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
/// sim.on_drag_begin(BodyId::Primary);
/// sim.on_drag_update(BodyId::Primary, Vec2::new(40.0, 0.0), 0.0);
/// sim.tick(1.0 / 60.0, &mut NoOpObserver);
/// assert!(sim.snapshot().transforms[0].translate.x > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Simulation<F: Float> {
    config: SimConfig<F>,
    bodies: AllocVec<Body<F>>,
    split: SplitMachine<F>,
    queue: GestureQueue<F>,
    gestures: GestureState<F>,
    oscillators: [IdleOscillator<F>; 2],
    clock: F,
    snapshot: FrameSnapshot<F>,
}

impl<F: Float> Simulation<F> {
    /// Build a simulation with every body resting at home.
    pub fn new(config: SimConfig<F>) -> Result<Self, SimError> {
        config.validate()?;
        let idle = config.params.idle;
        let mut sim = Simulation {
            config,
            bodies: AllocVec::new(),
            split: SplitMachine::new(),
            queue: GestureQueue::new(),
            gestures: GestureState::new(config.params.split.split_threshold),
            // The second body runs a little out of step so the pair never breathes in unison.
            oscillators: [
                IdleOscillator::new(idle),
                IdleOscillator::with_offset(idle, idle.breathing_period * F::from_f32(0.37)),
            ],
            clock: F::zero(),
            snapshot: FrameSnapshot {
                transforms: AllocVec::new(),
                split_phase: SplitPhase::Merged,
                bridge_progress: F::zero(),
                clock: F::zero(),
            },
        };
        let full = sim.full_half_extents();
        sim.bodies = sim.homes().into_iter().map(|home| Body::new(home, full, F::one())).collect();
        sim.publish();
        Ok(sim)
    }

    // -- input ------------------------------------------------------------

    /// Queue a raw command. Applied at the start of the next tick.
    pub fn push(&mut self, command: GestureCommand<F>) {
        self.queue.push(command);
    }

    pub fn on_drag_begin(&mut self, body: BodyId) {
        self.push(GestureCommand::DragBegin { body });
    }

    pub fn on_drag_update(&mut self, body: BodyId, translation: Vec2<F>, timestamp: F) {
        self.push(GestureCommand::DragUpdate { body, translation, timestamp });
    }

    pub fn on_drag_end(&mut self, body: BodyId, exit_velocity: Vec2<F>) {
        self.push(GestureCommand::DragEnd { body, exit_velocity });
    }

    pub fn on_pinch_begin(&mut self) {
        self.push(GestureCommand::PinchBegin);
    }

    pub fn on_pinch_update(&mut self, scale: F, focal: Vec2<F>) {
        self.push(GestureCommand::PinchUpdate { scale, focal });
    }

    pub fn on_pinch_end(&mut self) {
        self.push(GestureCommand::PinchEnd);
    }

    /// Change the container size. Bodies are clamped into the new bounds
    /// immediately; non-positive or non-finite sizes are ignored.
    pub fn resize(&mut self, width: F, height: F) {
        let size = Vec2::new(width, height);
        if !size.is_finite() || !(width > F::zero() && height > F::zero()) {
            return;
        }
        self.config.container = size;
        for body in self.bodies.iter_mut() {
            let bounds = body.bounds(size);
            body.center = bounds.clamp(body.center);
            if !body.is_controlled() {
                body.grab_point = bounds.clamp(body.grab_point);
            }
        }
        self.publish();
    }

    /// Topmost body whose footprint contains `point`.
    pub fn body_at(&self, point: Vec2<F>) -> Option<BodyId> {
        self.bodies
            .iter()
            .enumerate()
            .rev()
            .find(|(_, body)| body.contains(point))
            .and_then(|(i, _)| BodyId::from_index(i))
    }

    // -- stepping ---------------------------------------------------------

    /// Advance by one display frame of measured length `dt` (seconds).
    ///
    /// Non-finite or negative `dt` only applies queued commands; frames longer
    /// than `max_frame_dt` are truncated, then sub-stepped at `max_sub_dt`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn tick<O: SimObserver<F>>(&mut self, dt: F, observer: &mut O) {
        let dt = if dt.is_finite() && dt > F::zero() { dt.min(self.config.max_frame_dt) } else { F::zero() };

        self.apply_commands(observer);

        if dt > F::zero() {
            let mut steps = 1;
            while self.config.max_sub_dt * F::from_f32(steps as f32) < dt && steps < MAX_SUB_STEPS {
                steps += 1;
            }
            let sub_dt = dt / F::from_f32(steps as f32);
            for _ in 0..steps {
                self.substep(sub_dt, observer);
            }
            self.clock = self.clock + dt;

            for (body, osc) in self.bodies.iter_mut().zip(self.oscillators.iter_mut()) {
                osc.advance(dt);
                body.idle = osc.phases();
            }
        }

        self.publish();
        observer.on_tick_complete(self.clock);
    }

    fn apply_commands<O: SimObserver<F>>(&mut self, observer: &mut O) {
        let mut queue = core::mem::take(&mut self.queue);
        for command in queue.drain() {
            let was_engaged = self.gestures.any_active();
            self.apply(command, observer);
            match (was_engaged, self.gestures.any_active()) {
                (false, true) => observer.on_gesture_start(),
                (true, false) => observer.on_gesture_end(),
                _ => {}
            }
        }
        self.queue = queue;
    }

    fn apply<O: SimObserver<F>>(&mut self, command: GestureCommand<F>, observer: &mut O) {
        let now = self.clock;
        let container = self.config.container;
        match command {
            GestureCommand::DragBegin { body } => {
                if self.split.phase().is_split() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?body, "drag ignored while split");
                    return;
                }
                let Some(target) = self.bodies.get_mut(body.index()) else {
                    return;
                };
                target.begin_drag(now);
                let origin = target.center;
                self.gestures.drag_mut(body).begin(origin);
            }
            GestureCommand::DragUpdate { body, translation, timestamp } => {
                let track = self.gestures.drag_mut(body);
                if !track.active {
                    return;
                }
                track.update(translation, timestamp);
                let point = track.target();
                if let Some(target) = self.bodies.get_mut(body.index()) {
                    let grab = target.bounds(container).rubber_band(point, self.config.params.rubber_band);
                    target.drag_to(grab, now);
                }
            }
            GestureCommand::DragEnd { body, exit_velocity } => {
                let track = self.gestures.drag_mut(body);
                if !track.active {
                    return;
                }
                let velocity = track.end(exit_velocity);
                if let Some(target) = self.bodies.get_mut(body.index()) {
                    target.release(velocity, &self.config.params, now);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(?body, mode = ?target.mode, speed = velocity.length().to_f32(), "drag released");
                }
            }
            GestureCommand::PinchBegin => {
                if self.config.dual_body || self.split.phase().is_split() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("pinch ignored");
                    return;
                }
                self.gestures.pinch.begin();
            }
            GestureCommand::PinchUpdate { scale, focal } => {
                if !self.gestures.pinch.active || self.split.phase().is_split() {
                    return;
                }
                self.gestures.pinch.update(scale, focal, self.config.body_size.x);
                if self.gestures.pinch.exceeds_threshold() {
                    self.split_body(observer);
                }
            }
            GestureCommand::PinchEnd => {
                if !self.gestures.pinch.active {
                    return;
                }
                self.gestures.pinch.end();
                // Below the threshold: spring back with a corrective wobble.
                let stretch = self.gestures.pinch.stretch_distance;
                if let Some(body) = self.bodies.first_mut() {
                    let limits = &self.config.params.wobble;
                    body.wobble.kick(Vec2::zero(), stretch * limits.scale_per_px, F::zero(), F::zero(), limits);
                    body.last_interaction_at = now;
                }
            }
        }
    }

    /// Swap the single body for two halves in one assignment.
    fn split_body<O: SimObserver<F>>(&mut self, observer: &mut O) {
        let full = self.full_half_extents();
        let Some(source) = self.bodies.first() else {
            return;
        };
        let Some(mut halves) = self.split.split(source, full, &self.config.params) else {
            return;
        };
        for half in halves.iter_mut() {
            half.center = half.bounds(self.config.container).clamp(half.center);
            half.grab_point = half.center;
        }
        self.bodies = AllocVec::from(halves);
        self.gestures.pinch.clear();
        for drag in self.gestures.drags.iter_mut() {
            drag.active = false;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("body split");
        observer.on_split_phase(SplitPhase::Merged, SplitPhase::SplitBouncing);
    }

    fn substep<O: SimObserver<F>>(&mut self, dt: F, observer: &mut O) {
        let full = self.full_half_extents();
        let Simulation { config, bodies, split, gestures, .. } = self;
        let params = &config.params;
        let container = config.container;

        for (i, body) in bodies.iter_mut().enumerate() {
            let Some(id) = BodyId::from_index(i) else {
                continue;
            };
            let bounds = body.bounds(container);
            let outcome = physics::step(body, &bounds, &params.flick, dt);
            for hit in outcome.hits.iter() {
                #[cfg(feature = "tracing")]
                tracing::debug!(?id, wall = ?hit.wall, speed = hit.speed_in.to_f32(), "wall hit");
                observer.on_wall_hit(id, hit.wall, hit.speed_in);
            }
            if outcome.came_to_rest {
                #[cfg(feature = "tracing")]
                tracing::debug!(?id, "flick ended");
                observer.on_flick_end(id);
            }
            body.follow(params, &bounds, dt);
        }

        if bodies.len() == 2 && (config.dual_body || split.phase().halves_collide()) {
            let min_separation = bodies[0].radius() + bodies[1].radius();
            let (head, tail) = bodies.split_at_mut(1);
            let (a, b) = (&mut head[0], &mut tail[0]);
            for pass in 0..params.collision.iterations.max(1) {
                let Some(contact) = collision::resolve(a, b, min_separation, params) else {
                    break;
                };
                if pass == 0 {
                    observer.on_body_contact(contact.approach_speed);
                }
                // Walls win over separation: whatever the clamp undid is made up along the wall.
                if !collision::confine(a, b, min_separation, container) {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("no room to separate bodies");
                }
            }
        }

        for body in bodies.iter_mut() {
            let bounds = body.bounds(container);
            body.update_pulses(params, dt);
            body.update_edges(&bounds, params.edge_margin);
            body.sanitize(&bounds, params.flick.max_velocity);
        }

        if split.phase().is_split() {
            let step = split.advance(bodies.as_mut_slice(), full, container, params, dt);
            if let Some((from, to)) = step.transition {
                #[cfg(feature = "tracing")]
                tracing::debug!(?from, ?to, "split phase");
                observer.on_split_phase(from, to);
            }
            if let Some(merged) = step.merged {
                *bodies = alloc::vec![merged];
            }
            for body in bodies.iter_mut() {
                let bounds = body.bounds(container);
                body.center = bounds.clamp(body.center);
            }
        }

        if gestures.pinch.is_engaged() {
            gestures.pinch.relax(&params.pinch_release, dt);
        }
    }

    fn publish(&mut self) {
        let pinch = if self.config.dual_body || self.split.phase().is_split() {
            F::one()
        } else {
            self.gestures.pinch.scale
        };
        let ctx = DeformContext::new(self.config.body_size).with_pinch(pinch);
        let deform = &self.config.params.deform;
        self.snapshot = FrameSnapshot {
            transforms: self.bodies.iter().map(|b| deform::map(b, deform, &ctx)).collect(),
            split_phase: self.split.phase(),
            bridge_progress: self.split.bridge_progress(),
            clock: self.clock,
        };
    }

    // -- idle -------------------------------------------------------------

    /// Coarse idle check, driven by a host timer rather than the frame loop.
    ///
    /// Springs every body that has sat untouched for `idle_timeout` back home,
    /// unless it is held, flying, already springing, or the slime is split.
    /// Returns true when any body started moving.
    pub fn check_idle(&mut self) -> bool {
        if self.split.phase().is_split() || self.gestures.any_active() {
            return false;
        }
        let homes = self.homes();
        let mut moved = false;
        for (body, home) in self.bodies.iter_mut().zip(homes) {
            if body.mode != BodyMode::Idle || body.is_springing() {
                continue;
            }
            if self.clock - body.last_interaction_at < self.config.idle_timeout {
                continue;
            }
            if body.center.distance(home) < F::from_f32(HOME_EPSILON) {
                continue;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(x = home.x.to_f32(), y = home.y.to_f32(), "idle timeout, springing home");
            body.spring_to(home);
            moved = true;
        }
        moved
    }

    /// Home position of each body slot, clamped into the container.
    pub fn homes(&self) -> AllocVec<Vec2<F>> {
        let full = self.full_half_extents();
        let bounds = Bounds::from_container(self.config.container, full);
        let home = self.config.home_offset;
        if self.config.dual_body {
            let dx = Vec2::new(full.x.max(full.y) + self.config.params.split.spawn_gap, F::zero());
            alloc::vec![bounds.clamp(home - dx), bounds.clamp(home + dx)]
        } else {
            alloc::vec![bounds.clamp(home)]
        }
    }

    // -- accessors --------------------------------------------------------

    /// The frame published by the last tick.
    pub fn snapshot(&self) -> &FrameSnapshot<F> {
        &self.snapshot
    }

    pub fn bodies(&self) -> &[Body<F>] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body<F>> {
        self.bodies.get(id.index())
    }

    pub fn split_phase(&self) -> SplitPhase {
        self.split.phase()
    }

    pub fn split_machine(&self) -> &SplitMachine<F> {
        &self.split
    }

    pub fn gestures(&self) -> &GestureState<F> {
        &self.gestures
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    pub fn clock(&self) -> F {
        self.clock
    }

    pub fn config(&self) -> &SimConfig<F> {
        &self.config
    }

    fn full_half_extents(&self) -> Vec2<F> {
        self.config.body_size.scale(F::half())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoOpObserver;

    #[derive(Default)]
    struct Recorder {
        starts: usize,
        ends: usize,
        phases: alloc::vec::Vec<(SplitPhase, SplitPhase)>,
    }

    impl SimObserver<f32> for Recorder {
        fn on_gesture_start(&mut self) {
            self.starts += 1;
        }
        fn on_gesture_end(&mut self) {
            self.ends += 1;
        }
        fn on_split_phase(&mut self, from: SplitPhase, to: SplitPhase) {
            self.phases.push((from, to));
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SimConfig::<f32>::new().with_body_size(-1.0, 10.0);
        assert_eq!(Simulation::new(config).err(), Some(SimError::InvalidBodySize));
    }

    #[test]
    fn commands_wait_for_tick() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
        sim.on_drag_begin(BodyId::Primary);
        assert_eq!(sim.pending_commands(), 1);
        assert_eq!(sim.bodies()[0].mode, BodyMode::Idle);
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
        assert_eq!(sim.pending_commands(), 0);
        assert_eq!(sim.bodies()[0].mode, BodyMode::Dragging);
    }

    #[test]
    fn gesture_start_and_end_fire_once() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
        let mut rec = Recorder::default();
        sim.on_drag_begin(BodyId::Primary);
        sim.on_drag_update(BodyId::Primary, Vec2::new(10.0, 0.0), 0.0);
        sim.tick(1.0 / 60.0, &mut rec);
        sim.on_drag_end(BodyId::Primary, Vec2::zero());
        sim.tick(1.0 / 60.0, &mut rec);
        assert_eq!(rec.starts, 1);
        assert_eq!(rec.ends, 1);
    }

    #[test]
    fn drag_of_missing_body_is_ignored() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
        sim.on_drag_begin(BodyId::Secondary);
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
        assert!(!sim.gestures().any_active());
        assert_eq!(sim.bodies().len(), 1);
    }

    #[test]
    fn pinch_is_ignored_in_dual_mode() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new().with_dual_body(true)).unwrap();
        sim.on_pinch_begin();
        sim.on_pinch_update(2.0, Vec2::zero());
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
        assert_eq!(sim.split_phase(), SplitPhase::Merged);
        assert_eq!(sim.bodies().len(), 2);
    }

    #[test]
    fn split_reports_phase_change() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
        let mut rec = Recorder::default();
        sim.on_pinch_begin();
        sim.on_pinch_update(1.8, Vec2::zero());
        sim.tick(1.0 / 60.0, &mut rec);
        assert_eq!(rec.phases.first(), Some(&(SplitPhase::Merged, SplitPhase::SplitBouncing)));
        assert_eq!(sim.snapshot().transforms.len(), 2);
    }

    #[test]
    fn idle_check_springs_home_after_timeout() {
        let config = SimConfig::<f32>::new().with_idle_timeout(1.0);
        let mut sim = Simulation::new(config).unwrap();
        sim.on_drag_begin(BodyId::Primary);
        sim.on_drag_update(BodyId::Primary, Vec2::new(60.0, 0.0), 0.0);
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
        sim.on_drag_end(BodyId::Primary, Vec2::zero());
        for _ in 0..30 {
            sim.tick(1.0 / 60.0, &mut NoOpObserver);
        }
        assert!(!sim.check_idle(), "too early");
        for _ in 0..120 {
            sim.tick(1.0 / 60.0, &mut NoOpObserver);
        }
        assert!(sim.check_idle());
        for _ in 0..300 {
            sim.tick(1.0 / 60.0, &mut NoOpObserver);
        }
        assert!(sim.bodies()[0].center.length() < 1.0, "{:?}", sim.bodies()[0].center);
    }

    #[test]
    fn resize_clamps_bodies() {
        let mut sim: Simulation<f32> = Simulation::new(SimConfig::new().with_home_offset(Vec2::new(80.0, 0.0))).unwrap();
        sim.resize(200.0, 200.0);
        assert_eq!(sim.bodies()[0].center.x, 40.0);
        sim.resize(f32::NAN, 10.0);
        assert_eq!(sim.config().container, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn body_at_hit_tests() {
        let sim: Simulation<f32> = Simulation::new(SimConfig::new().with_dual_body(true)).unwrap();
        assert_eq!(sim.body_at(Vec2::new(-64.0, 0.0)), Some(BodyId::Primary));
        assert_eq!(sim.body_at(Vec2::new(64.0, 0.0)), Some(BodyId::Secondary));
        assert_eq!(sim.body_at(Vec2::new(0.0, 140.0)), None);
    }
}
