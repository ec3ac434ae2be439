//! Simulation observer trait for hosts that react to engine events.

use crate::bounds::Wall;
use crate::float::Float;
use crate::gesture::BodyId;
use crate::split::SplitPhase;

/// Receives events from [`Simulation::tick`](crate::Simulation::tick).
///
/// Implement this to drive haptics, sounds or debug overlays, or to let a
/// parent UI suspend competing scroll gestures while the slime is held.
/// All methods have default no-op implementations.
pub trait SimObserver<F: Float> {
    /// A drag or pinch started on the slime.
    fn on_gesture_start(&mut self) {}

    /// The last active drag or pinch ended.
    fn on_gesture_end(&mut self) {}

    /// A flicking body bounced off a wall.
    fn on_wall_hit(&mut self, _body: BodyId, _wall: Wall, _speed: F) {}

    /// Two bodies overlapped and were pushed apart.
    fn on_body_contact(&mut self, _approach_speed: F) {}

    /// The split/merge choreography moved to a new phase.
    fn on_split_phase(&mut self, _from: SplitPhase, _to: SplitPhase) {}

    /// A flick ran out of speed and the body began to settle.
    fn on_flick_end(&mut self, _body: BodyId) {}

    /// Called once per tick after the snapshot is published.
    fn on_tick_complete(&mut self, _clock: F) {}
}

/// A no-op observer. Use as default when no observation is needed.
pub struct NoOpObserver;

impl<F: Float> SimObserver<F> for NoOpObserver {}
