//! Idle oscillators: breathing, two morph phases, squish and blink.
//!
//! Each channel is a pure function of time, independent of interaction. The
//! running oscillator keeps every channel's phase wrapped into its own period
//! so long sessions do not lose float precision.

use crate::config::IdleParams;
use crate::float::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sampled idle channels. Periodic channels are in [-1, 1]; `blink` is in [0, 1]
/// where 1 means fully closed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdlePhases<F: Float> {
    pub breathing: F,
    pub morph1: F,
    pub morph2: F,
    pub squish: F,
    pub blink: F,
}

fn wave<F: Float>(t: F, period: F) -> F {
    if !(period > F::zero()) {
        return F::zero();
    }
    let phase = t.wrap(period) / period;
    (F::two() * F::pi() * phase).sin()
}

fn blink<F: Float>(t: F, period: F, duration: F) -> F {
    if !(period > F::zero()) || !(duration > F::zero()) {
        return F::zero();
    }
    let local = t.wrap(period);
    if local >= duration {
        return F::zero();
    }
    // Triangle: close over the first half, open over the second.
    let half = duration * F::half();
    if local < half {
        local / half
    } else {
        (duration - local) / half
    }
}

/// Sample every channel at absolute time `t` (seconds).
pub fn sample<F: Float>(params: &IdleParams<F>, t: F) -> IdlePhases<F> {
    IdlePhases {
        breathing: wave(t, params.breathing_period),
        morph1: wave(t, params.morph1_period),
        morph2: wave(t, params.morph2_period),
        squish: wave(t, params.squish_period),
        blink: blink(t, params.blink_period, params.blink_duration),
    }
}

/// Free-running oscillator bank advanced by `tick`.
#[derive(Clone, Debug)]
pub struct IdleOscillator<F: Float> {
    params: IdleParams<F>,
    // Per-channel local time, each wrapped into its own period.
    breathing: F,
    morph1: F,
    morph2: F,
    squish: F,
    blink: F,
}

impl<F: Float> IdleOscillator<F> {
    pub fn new(params: IdleParams<F>) -> Self {
        Self::with_offset(params, F::zero())
    }

    /// Start every channel `offset` seconds in, so two bodies don't breathe in unison.
    pub fn with_offset(params: IdleParams<F>, offset: F) -> Self {
        let mut osc = IdleOscillator {
            params,
            breathing: F::zero(),
            morph1: F::zero(),
            morph2: F::zero(),
            squish: F::zero(),
            blink: F::zero(),
        };
        osc.advance(offset);
        osc
    }

    pub fn advance(&mut self, dt: F) {
        if !dt.is_finite() || !(dt > F::zero()) {
            return;
        }
        let p = &self.params;
        self.breathing = (self.breathing + dt).wrap(p.breathing_period);
        self.morph1 = (self.morph1 + dt).wrap(p.morph1_period);
        self.morph2 = (self.morph2 + dt).wrap(p.morph2_period);
        self.squish = (self.squish + dt).wrap(p.squish_period);
        self.blink = (self.blink + dt).wrap(p.blink_period);
    }

    pub fn phases(&self) -> IdlePhases<F> {
        let p = &self.params;
        IdlePhases {
            breathing: wave(self.breathing, p.breathing_period),
            morph1: wave(self.morph1, p.morph1_period),
            morph2: wave(self.morph2, p.morph2_period),
            squish: wave(self.squish, p.squish_period),
            blink: blink(self.blink, p.blink_period, p.blink_duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blink_is_closed_mid_blink_and_open_after() {
        let params = IdleParams::<f32>::default();
        let mid = sample(&params, params.blink_duration * 0.5);
        assert!((mid.blink - 1.0).abs() < 1e-5);
        let after = sample(&params, params.blink_duration + 0.5);
        assert_eq!(after.blink, 0.0);
    }

    #[test]
    fn oscillator_matches_pure_sample() {
        let params = IdleParams::<f64>::default();
        let mut osc = IdleOscillator::new(params);
        for _ in 0..120 {
            osc.advance(1.0 / 60.0);
        }
        let running = osc.phases();
        let pure = sample(&params, 2.0);
        assert!((running.breathing - pure.breathing).abs() < 1e-9);
        assert!((running.squish - pure.squish).abs() < 1e-9);
    }

    #[test]
    fn channels_stay_in_range() {
        let params = IdleParams::<f32>::default();
        for i in 0..2000 {
            let p = sample(&params, i as f32 * 0.037);
            for v in [p.breathing, p.morph1, p.morph2, p.squish] {
                assert!((-1.0..=1.0).contains(&v));
            }
            assert!((0.0..=1.0).contains(&p.blink));
        }
    }
}
