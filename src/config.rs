//! Tuning parameters and simulation configuration.
//!
//! All physics "feel" constants live here as named fields with defaults, so a
//! host can retune the slime without touching integration code. The damping
//! ratios are tuned for a heavy, doughy response and are not derived from
//! collision physics.

use crate::curve::Curve4;
use crate::error::SimError;
use crate::float::Float;
use crate::spring::SpringParams;
use crate::vec::{Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Free-body (flick) tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlickParams<F: Float> {
    /// Velocity multiplier applied once per `reference_dt`. Must be in (0, 1).
    pub friction: F,
    /// Frame length the friction constant is expressed against (seconds).
    pub reference_dt: F,
    /// Release speed (px/s) above which a drag end becomes a flick.
    pub flick_speed: F,
    /// Exit velocity multiplier on launch.
    pub launch_scale: F,
    /// Hard cap on speed (px/s).
    pub max_velocity: F,
    /// Speed (px/s) under which a flick comes to rest.
    pub min_velocity: F,
    /// Fraction of the normal speed kept after a wall bounce. Must be in [0, 1).
    pub bounce_damping: F,
    /// Speed (px/s) at which flight stretch saturates.
    pub reference_speed: F,
    /// Flight stretch at saturation (fraction of body size).
    pub max_flight_stretch: F,
    /// Below this speed (px/s) flight stretch fades toward zero.
    pub flight_fade_speed: F,
    /// Time constant (s) of the flight stretch following its target.
    pub flight_tau: F,
    /// Wall-normal speed (px/s) producing a full impact pulse.
    pub impact_reference_speed: F,
    /// Impact pulse rise time constant (s).
    pub impact_rise_tau: F,
    /// Impact pulse recovery time constant (s).
    pub impact_recover_tau: F,
    /// Edge flash decay time constant (s).
    pub edge_flash_tau: F,
}

impl<F: Float> Default for FlickParams<F> {
    fn default() -> Self {
        FlickParams {
            friction: F::from_f32(0.985),
            reference_dt: F::from_f32(1.0 / 60.0),
            flick_speed: F::from_f32(250.0),
            launch_scale: F::one(),
            max_velocity: F::from_f32(3000.0),
            min_velocity: F::from_f32(25.0),
            bounce_damping: F::from_f32(0.55),
            reference_speed: F::from_f32(1500.0),
            max_flight_stretch: F::from_f32(0.18),
            flight_fade_speed: F::from_f32(120.0),
            flight_tau: F::from_f32(0.05),
            impact_reference_speed: F::from_f32(1200.0),
            impact_rise_tau: F::from_f32(0.025),
            impact_recover_tau: F::from_f32(0.16),
            edge_flash_tau: F::from_f32(0.2),
        }
    }
}

/// Body-body collision tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionParams<F: Float> {
    /// Overlap (px) producing a full impact pulse.
    pub reference_overlap: F,
    /// Closing speed (px/s) below which no impulse is exchanged.
    pub approach_epsilon: F,
    /// Fraction of the closing speed returned as separation. Must be in [0, 1).
    pub bounce_damping: F,
    /// Wobble scale per px/s of closing speed.
    pub wobble_per_speed: F,
    /// Impact magnitude under which a non-overlapping body is zeroed.
    pub impact_rest_epsilon: F,
    /// Resolve/clamp passes per sub-step when walls push back.
    pub iterations: usize,
}

impl<F: Float> Default for CollisionParams<F> {
    fn default() -> Self {
        CollisionParams {
            reference_overlap: F::from_f32(30.0),
            approach_epsilon: F::from_f32(5.0),
            bounce_damping: F::from_f32(0.5),
            wobble_per_speed: F::from_f32(0.0002),
            impact_rest_epsilon: F::from_f32(0.01),
            iterations: 4,
        }
    }
}

/// Split/merge choreography tuning.
///
/// Distances are multiples of the full body collision radius so the
/// choreography scales with the mascot.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitParams<F: Float> {
    /// Accumulated pinch stretch (px) that splits the body.
    pub split_threshold: F,
    /// Outward launch speed (px/s) of each half.
    pub launch_speed: F,
    /// Extra spacing between the spawned halves (px).
    pub spawn_gap: F,
    /// Combined speed (px/s) under which bouncing halves start crawling.
    pub settle_speed: F,
    /// Minimum time (s) spent bouncing before crawling may start.
    pub min_bounce_time: F,
    /// Inchworm cycle period (s).
    pub crawl_period: F,
    /// Advance speed (px/s) during the extend half-cycle.
    pub crawl_speed: F,
    /// Cycle offset of the second half, as a fraction of the period.
    pub crawl_phase_offset: F,
    /// Compress/extend stretch amplitude.
    pub crawl_amplitude: F,
    /// Separation (x radius) that ends crawling.
    pub approach_distance: F,
    /// Convergence speed (px/s) entering the approach.
    pub approach_speed: F,
    /// Time constant (s) of crawl speed/cycle decay while approaching.
    pub approach_decay_tau: F,
    /// Floor on approach speed (px/s) so convergence always completes.
    pub approach_min_speed: F,
    /// Separation (x radius) that starts the contact bridge.
    pub contact_distance: F,
    /// Time (s) for the bridge to reach full progress.
    pub bridge_duration: F,
    /// Pull speed (px/s) at zero bridge progress.
    pub contact_pull_speed: F,
    /// Pull speed gain at full bridge progress.
    pub contact_pull_gain: F,
    /// Separation (x radius) that triggers merging regardless of bridge progress.
    pub merge_distance: F,
    /// Fade/grow duration (s) of the merge.
    pub merge_duration: F,
    /// Extra scale reached at the end of the merge.
    pub merge_growth: F,
    /// Wobble scale kick given to the recreated body.
    pub merge_wobble: F,
    /// Time constant (s) pulling the converging pair back to where the split happened.
    pub home_pull_tau: F,
}

impl<F: Float> Default for SplitParams<F> {
    fn default() -> Self {
        SplitParams {
            split_threshold: F::from_f32(60.0),
            launch_speed: F::from_f32(700.0),
            spawn_gap: F::from_f32(4.0),
            settle_speed: F::from_f32(60.0),
            min_bounce_time: F::from_f32(0.4),
            crawl_period: F::from_f32(0.9),
            crawl_speed: F::from_f32(60.0),
            crawl_phase_offset: F::from_f32(0.35),
            crawl_amplitude: F::from_f32(0.18),
            approach_distance: F::from_f32(2.2),
            approach_speed: F::from_f32(45.0),
            approach_decay_tau: F::from_f32(0.6),
            approach_min_speed: F::from_f32(20.0),
            contact_distance: F::from_f32(1.15),
            bridge_duration: F::from_f32(0.45),
            contact_pull_speed: F::from_f32(30.0),
            contact_pull_gain: F::from_f32(3.0),
            merge_distance: F::from_f32(0.3),
            merge_duration: F::from_f32(0.35),
            merge_growth: F::from_f32(0.12),
            merge_wobble: F::from_f32(0.14),
            home_pull_tau: F::from_f32(0.5),
        }
    }
}

/// Post-release wobble tuning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WobbleParams<F: Float> {
    /// Scale kick per px of stretch at release.
    pub scale_per_px: F,
    /// Offset kick as a fraction of the stretch at release.
    pub offset_ratio: F,
    /// Skew kick (degrees) per px of stretch at release.
    pub skew_per_px: F,
    /// Ceiling on the scale channel.
    pub max_scale: F,
    /// Ceiling on the skew channels (degrees).
    pub max_skew_deg: F,
    /// Ceiling on the offset channel (px).
    pub max_offset: F,
}

impl<F: Float> Default for WobbleParams<F> {
    fn default() -> Self {
        WobbleParams {
            scale_per_px: F::from_f32(0.0025),
            offset_ratio: F::from_f32(0.12),
            skew_per_px: F::from_f32(0.08),
            max_scale: F::from_f32(0.25),
            max_skew_deg: F::from_f32(12.0),
            max_offset: F::from_f32(18.0),
        }
    }
}

/// Deformation mapper tuning. Scales are fractions, angles are degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeformParams<F: Float> {
    /// Stretch distance (px) to elongation.
    pub stretch_curve: Curve4<F>,
    /// Perpendicular compression per unit of elongation.
    pub perpendicular_ratio: F,
    /// Skew at full stretch.
    pub stretch_skew_deg: F,
    /// Fraction of the stretch the body leans toward the grab point.
    pub lean_ratio: F,
    /// Ceiling on the lean offset (px).
    pub max_lean: F,
    /// Squish across a wall at full proximity.
    pub edge_squish: F,
    /// Bulge along a wall at full proximity.
    pub edge_bulge: F,
    /// Corner radius lost on the touching side at full proximity.
    pub edge_corner_flatten: F,
    /// Compression along the impact axis at full impact.
    pub impact_compress: F,
    /// Bulge across the impact axis at full impact.
    pub impact_bulge: F,
    /// Skew at full impact.
    pub impact_skew_deg: F,
    /// Elongation per unit of crawl stretch.
    pub crawl_stretch: F,
    /// Breathing amplitude (vertical).
    pub breathing_amplitude: F,
    /// Squish amplitude (horizontal).
    pub squish_amplitude: F,
    /// Corner radius modulation by the morph phases.
    pub morph_radius_amplitude: F,
    /// Vertical squash at a full blink.
    pub blink_squash: F,
    /// Base corner radius as a fraction of the smaller body side.
    pub corner_radius_ratio: F,
    pub min_scale: F,
    pub max_scale: F,
    pub max_skew_deg: F,
}

impl<F: Float> Default for DeformParams<F> {
    fn default() -> Self {
        DeformParams {
            stretch_curve: Curve4::new([(0.0, 0.0), (30.0, 0.06), (90.0, 0.16), (200.0, 0.24)]),
            perpendicular_ratio: F::from_f32(0.5),
            stretch_skew_deg: F::from_f32(8.0),
            lean_ratio: F::from_f32(0.15),
            max_lean: F::from_f32(24.0),
            edge_squish: F::from_f32(0.14),
            edge_bulge: F::from_f32(0.07),
            edge_corner_flatten: F::from_f32(0.55),
            impact_compress: F::from_f32(0.28),
            impact_bulge: F::from_f32(0.16),
            impact_skew_deg: F::from_f32(7.0),
            crawl_stretch: F::from_f32(1.0),
            breathing_amplitude: F::from_f32(0.025),
            squish_amplitude: F::from_f32(0.018),
            morph_radius_amplitude: F::from_f32(0.08),
            blink_squash: F::from_f32(0.04),
            corner_radius_ratio: F::from_f32(0.46),
            min_scale: F::from_f32(0.4),
            max_scale: F::from_f32(1.8),
            max_skew_deg: F::from_f32(25.0),
        }
    }
}

/// Idle oscillator periods (seconds).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdleParams<F: Float> {
    pub breathing_period: F,
    pub morph1_period: F,
    pub morph2_period: F,
    pub squish_period: F,
    pub blink_period: F,
    /// Length of one blink inside its period.
    pub blink_duration: F,
}

impl<F: Float> Default for IdleParams<F> {
    fn default() -> Self {
        IdleParams {
            breathing_period: F::from_f32(4.0),
            morph1_period: F::from_f32(5.0),
            morph2_period: F::from_f32(7.0),
            squish_period: F::from_f32(2.5),
            blink_period: F::from_f32(6.0),
            blink_duration: F::from_f32(0.25),
        }
    }
}

/// Every tuning knob of the engine, grouped per concern.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsParams<F: Float> {
    /// Center chasing the grab point while dragging.
    pub follow: SpringParams<F>,
    /// Grab point snapping back onto the center after release.
    pub snap: SpringParams<F>,
    /// Settle after a flick and spring-to-home.
    pub settle: SpringParams<F>,
    /// Wobble channels returning to rest.
    pub wobble_spring: SpringParams<F>,
    /// Pinch scale and stretch distance springing back.
    pub pinch_release: SpringParams<F>,
    pub flick: FlickParams<F>,
    pub collision: CollisionParams<F>,
    pub split: SplitParams<F>,
    pub wobble: WobbleParams<F>,
    pub deform: DeformParams<F>,
    pub idle: IdleParams<F>,
    /// Depth (px) of the wall band where edge proximity is nonzero.
    pub edge_margin: F,
    /// Fraction of an out-of-bounds drag that the grab point still follows.
    pub rubber_band: F,
}

impl<F: Float> Default for PhysicsParams<F> {
    fn default() -> Self {
        PhysicsParams {
            follow: SpringParams::soft_follow(),
            snap: SpringParams::snap(),
            settle: SpringParams::jelly_settle(),
            wobble_spring: SpringParams::wobble(),
            pinch_release: SpringParams::pinch_release(),
            flick: FlickParams::default(),
            collision: CollisionParams::default(),
            split: SplitParams::default(),
            wobble: WobbleParams::default(),
            deform: DeformParams::default(),
            idle: IdleParams::default(),
            edge_margin: F::from_f32(18.0),
            rubber_band: F::from_f32(0.35),
        }
    }
}

impl<F: Float> PhysicsParams<F> {
    /// Check every group for values the integrators cannot honour.
    pub fn validate(&self) -> Result<(), SimError> {
        let springs = [
            ("follow", &self.follow),
            ("snap", &self.snap),
            ("settle", &self.settle),
            ("wobble", &self.wobble_spring),
            ("pinch_release", &self.pinch_release),
        ];
        for (preset, params) in springs {
            if !params.is_valid() {
                return Err(SimError::InvalidSpring { preset });
            }
        }

        let flick = &self.flick;
        if !(flick.friction > F::zero() && flick.friction < F::one()) {
            return Err(SimError::InvalidFriction);
        }
        let bounce_ok = |b: F| b >= F::zero() && b < F::one();
        if !bounce_ok(flick.bounce_damping) || !bounce_ok(self.collision.bounce_damping) {
            return Err(SimError::InvalidBounceDamping);
        }
        if !(flick.min_velocity > F::zero()
            && flick.min_velocity < flick.flick_speed
            && flick.flick_speed < flick.max_velocity
            && flick.reference_dt > F::zero())
        {
            return Err(SimError::InvalidSpeedLimits);
        }

        let split = &self.split;
        if !(split.split_threshold > F::zero()) || !split.split_threshold.is_finite() {
            return Err(SimError::InvalidSplitThreshold);
        }
        if !(split.merge_distance > F::zero()
            && split.merge_distance < split.contact_distance
            && split.contact_distance < split.approach_distance)
        {
            return Err(SimError::InvalidSplitDistances);
        }
        Ok(())
    }
}

/// Configuration for a [`Simulation`](crate::Simulation).
///
/// # Builder Pattern
/// ```
/// use slimy::config::SimConfig;
/// use slimy::vec::Vec2;
///
/// let config: SimConfig<f32> = SimConfig::new()
///     .with_container(360.0, 640.0)
///     .with_body_size(120.0, 110.0)
///     .with_home_offset(Vec2::new(0.0, 80.0))
///     .with_idle_timeout(10.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimConfig<F: Float> {
    /// Container width and height (px). Default: 300 x 300.
    pub container: Vec2<F>,
    /// Full-scale body width and height (px). Default: 120 x 120.
    pub body_size: Vec2<F>,
    /// Home position relative to the container center. Default: zero.
    pub home_offset: Vec2<F>,
    /// Two independently controlled full-scale bodies instead of one. Default: false.
    pub dual_body: bool,
    /// Seconds without interaction before the body springs home. Default: 8.
    pub idle_timeout: F,
    /// Longest frame `tick` integrates; longer frames are truncated. Default: 0.1.
    pub max_frame_dt: F,
    /// Longest physics sub-step. Default: 1/60.
    pub max_sub_dt: F,
    pub params: PhysicsParams<F>,
}

impl<F: Float> SimConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        SimConfig {
            container: Vec2::new(F::from_f32(300.0), F::from_f32(300.0)),
            body_size: Vec2::new(F::from_f32(120.0), F::from_f32(120.0)),
            home_offset: Vec2::zero(),
            dual_body: false,
            idle_timeout: F::from_f32(8.0),
            max_frame_dt: F::from_f32(0.1),
            max_sub_dt: F::from_f32(1.0 / 60.0),
            params: PhysicsParams::default(),
        }
    }

    /// Set the container size.
    pub fn with_container(mut self, width: F, height: F) -> Self {
        self.container = Vec2::new(width, height);
        self
    }

    /// Set the full-scale body size.
    pub fn with_body_size(mut self, width: F, height: F) -> Self {
        self.body_size = Vec2::new(width, height);
        self
    }

    /// Set the home position relative to the container center.
    pub fn with_home_offset(mut self, offset: Vec2<F>) -> Self {
        self.home_offset = offset;
        self
    }

    /// Enable the two-body variant.
    pub fn with_dual_body(mut self, dual: bool) -> Self {
        self.dual_body = dual;
        self
    }

    /// Set the idle spring-home timeout.
    pub fn with_idle_timeout(mut self, seconds: F) -> Self {
        self.idle_timeout = seconds;
        self
    }

    /// Set the longest frame integrated by one `tick`.
    pub fn with_max_frame_dt(mut self, dt: F) -> Self {
        self.max_frame_dt = dt;
        self
    }

    /// Set the physics sub-step length.
    pub fn with_sub_dt(mut self, dt: F) -> Self {
        self.max_sub_dt = dt;
        self
    }

    /// Replace the tuning parameters.
    pub fn with_params(mut self, params: PhysicsParams<F>) -> Self {
        self.params = params;
        self
    }

    /// Full-scale collision radius (half the larger body side).
    pub fn body_radius(&self) -> F {
        self.body_size.x.max(self.body_size.y) * F::half()
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = |v: Vec2<F>| v.is_finite() && v.x > F::zero() && v.y > F::zero();
        if !positive(self.container) {
            return Err(SimError::InvalidContainer);
        }
        if !positive(self.body_size) {
            return Err(SimError::InvalidBodySize);
        }
        if !(self.max_frame_dt > F::zero()
            && self.max_sub_dt > F::zero()
            && self.max_sub_dt <= self.max_frame_dt)
        {
            return Err(SimError::InvalidTimeStep);
        }
        self.params.validate()
    }
}

impl<F: Float> Default for SimConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(SimConfig::<f32>::default().validate(), Ok(()));
        assert_eq!(SimConfig::<f64>::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_elastic_bounce() {
        let mut params = PhysicsParams::<f32>::default();
        params.flick.bounce_damping = 1.0;
        let config = SimConfig::new().with_params(params);
        assert_eq!(config.validate(), Err(SimError::InvalidBounceDamping));
    }

    #[test]
    fn rejects_bad_container() {
        let config = SimConfig::<f32>::new().with_container(0.0, 100.0);
        assert_eq!(config.validate(), Err(SimError::InvalidContainer));
        let config = SimConfig::<f32>::new().with_container(f32::NAN, 100.0);
        assert_eq!(config.validate(), Err(SimError::InvalidContainer));
    }

    #[test]
    fn rejects_unordered_split_distances() {
        let mut params = PhysicsParams::<f32>::default();
        params.split.contact_distance = 3.0;
        let config = SimConfig::new().with_params(params);
        assert_eq!(config.validate(), Err(SimError::InvalidSplitDistances));
    }

    #[test]
    fn rejects_invalid_spring() {
        let mut params = PhysicsParams::<f32>::default();
        params.snap.mass = 0.0;
        let config = SimConfig::new().with_params(params);
        assert_eq!(config.validate(), Err(SimError::InvalidSpring { preset: "snap" }));
    }
}
