//! Gesture commands, the input queue, and per-gesture tracking state.
//!
//! The host's input dispatcher may push commands at any time; the simulation
//! drains the queue once at the start of each tick so no physics step ever
//! sees half of a gesture.

use alloc::collections::VecDeque;

use crate::curve::approach_factor;
use crate::float::Float;
use crate::spring::{advance, SpringParams};
use crate::vec::{Scalar, Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which body a drag addresses. Single-body simulations only have `Primary`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyId {
    Primary,
    Secondary,
}

impl BodyId {
    pub fn index(self) -> usize {
        match self {
            BodyId::Primary => 0,
            BodyId::Secondary => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(BodyId::Primary),
            1 => Some(BodyId::Secondary),
            _ => None,
        }
    }
}

/// A normalized input event.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GestureCommand<F: Float> {
    DragBegin { body: BodyId },
    /// `translation` is measured from where the drag began; `timestamp` in seconds.
    DragUpdate { body: BodyId, translation: Vec2<F>, timestamp: F },
    /// `exit_velocity` in px/s as reported by the host recognizer.
    DragEnd { body: BodyId, exit_velocity: Vec2<F> },
    PinchBegin,
    PinchUpdate { scale: F, focal: Vec2<F> },
    PinchEnd,
}

/// Single-consumer command queue drained at the top of each tick.
#[derive(Clone, Debug)]
pub struct GestureQueue<F: Float> {
    pending: VecDeque<GestureCommand<F>>,
}

impl<F: Float> GestureQueue<F> {
    pub fn new() -> Self {
        GestureQueue { pending: VecDeque::new() }
    }

    pub fn push(&mut self, command: GestureCommand<F>) {
        self.pending.push_back(command);
    }

    /// Take every pending command in arrival order, leaving the queue empty.
    pub fn drain(&mut self) -> impl Iterator<Item = GestureCommand<F>> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<F: Float> Default for GestureQueue<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracking for one drag.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DragTrack<F: Float> {
    pub active: bool,
    /// Body center when the drag began; translations are relative to it.
    pub origin: Vec2<F>,
    pub translation: Vec2<F>,
    pub last_timestamp: Option<F>,
    /// Smoothed velocity estimated from successive updates (px/s).
    pub sampled_velocity: Vec2<F>,
}

impl<F: Float> DragTrack<F> {
    /// Time constant of the velocity estimate smoothing (s).
    const VELOCITY_TAU: f32 = 0.04;

    pub fn begin(&mut self, origin: Vec2<F>) {
        *self = DragTrack { active: true, origin, ..DragTrack::default() };
    }

    /// Record a new translation sample. Non-finite samples are ignored.
    pub fn update(&mut self, translation: Vec2<F>, timestamp: F) {
        if !translation.is_finite() || !timestamp.is_finite() {
            return;
        }
        if let Some(last) = self.last_timestamp {
            let dt = timestamp - last;
            if dt > F::from_f32(1e-4) {
                let instant = (translation - self.translation).scale(F::one() / dt);
                let k = approach_factor(dt, F::from_f32(Self::VELOCITY_TAU));
                self.sampled_velocity = self.sampled_velocity.lerp(instant, k).sanitized();
            }
        }
        self.translation = translation;
        self.last_timestamp = Some(timestamp);
    }

    /// Pick the host's exit velocity, falling back to the sampled estimate.
    pub fn end(&mut self, exit_velocity: Vec2<F>) -> Vec2<F> {
        self.active = false;
        if exit_velocity.is_finite() {
            exit_velocity
        } else {
            self.sampled_velocity
        }
    }

    /// Target point for the grab.
    pub fn target(&self) -> Vec2<F> {
        self.origin + self.translation
    }
}

/// Pinch tracking: current scale, focal point and accumulated stretch distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PinchState<F: Float> {
    pub active: bool,
    pub scale: F,
    pub focal: Vec2<F>,
    /// Outward stretch in px, accumulated from the pinch scale.
    pub stretch_distance: F,
    /// Stretch distance at which the body splits.
    pub split_threshold: F,
    scale_velocity: F,
    distance_velocity: F,
}

impl<F: Float> PinchState<F> {
    const MIN_SCALE: f32 = 0.25;
    const MAX_SCALE: f32 = 4.0;

    pub fn new(split_threshold: F) -> Self {
        PinchState {
            active: false,
            scale: F::one(),
            focal: Vec2::zero(),
            stretch_distance: F::zero(),
            split_threshold,
            scale_velocity: F::zero(),
            distance_velocity: F::zero(),
        }
    }

    pub fn begin(&mut self) {
        self.active = true;
        self.scale_velocity = F::zero();
        self.distance_velocity = F::zero();
    }

    /// Apply a pinch sample. `reference_width` converts scale into px of stretch.
    pub fn update(&mut self, scale: F, focal: Vec2<F>, reference_width: F) {
        if !scale.is_finite() {
            return;
        }
        self.scale = scale.clamp(F::from_f32(Self::MIN_SCALE), F::from_f32(Self::MAX_SCALE));
        if focal.is_finite() {
            self.focal = focal;
        }
        self.stretch_distance = ((self.scale - F::one()) * reference_width).max(F::zero());
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.stretch_distance > self.split_threshold
    }

    /// End the gesture; the scale and distance spring back from here.
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Zero everything immediately (after a split consumed the stretch).
    pub fn clear(&mut self) {
        let threshold = self.split_threshold;
        *self = Self::new(threshold);
    }

    /// Spring the released pinch back toward rest.
    pub fn relax(&mut self, params: &SpringParams<F>, dt: F) {
        if self.active {
            return;
        }
        let (scale, sv) = advance(Scalar(self.scale), Scalar(F::one()), Scalar(self.scale_velocity), params, dt);
        self.scale = scale.0;
        self.scale_velocity = sv.0;
        let (dist, dv) = advance(
            Scalar(self.stretch_distance),
            Scalar(F::zero()),
            Scalar(self.distance_velocity),
            params,
            dt,
        );
        self.stretch_distance = dist.0.max(F::zero());
        self.distance_velocity = dv.0;

        let eps = F::from_f32(1e-3);
        if (self.scale - F::one()).abs() < eps
            && self.scale_velocity.abs() < eps
            && self.stretch_distance < eps
        {
            self.scale = F::one();
            self.scale_velocity = F::zero();
            self.stretch_distance = F::zero();
            self.distance_velocity = F::zero();
        }
    }

    /// True while pinched or still springing back.
    pub fn is_engaged(&self) -> bool {
        self.active || (self.scale - F::one()).abs() > F::from_f32(1e-3) || self.stretch_distance > F::zero()
    }
}

/// Everything the adapter remembers between commands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureState<F: Float> {
    pub drags: [DragTrack<F>; 2],
    pub pinch: PinchState<F>,
}

impl<F: Float> GestureState<F> {
    pub fn new(split_threshold: F) -> Self {
        GestureState {
            drags: [DragTrack::default(), DragTrack::default()],
            pinch: PinchState::new(split_threshold),
        }
    }

    pub fn drag(&self, body: BodyId) -> &DragTrack<F> {
        &self.drags[body.index()]
    }

    pub fn drag_mut(&mut self, body: BodyId) -> &mut DragTrack<F> {
        &mut self.drags[body.index()]
    }

    /// Any drag or pinch in progress.
    pub fn any_active(&self) -> bool {
        self.pinch.active || self.drags.iter().any(|d| d.active)
    }
}
