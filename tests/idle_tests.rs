use proptest::prelude::*;
use slimy::idle::sample;
use slimy::{IdleOscillator, IdleParams};

proptest! {
    #[test]
    fn every_channel_is_strictly_periodic(k in 0u32..200_000) {
        // Dyadic times are exact in f64, so the wrap is exact too.
        let t = k as f64 / 64.0;
        let params = IdleParams::<f64>::default();
        let now = sample(&params, t);
        prop_assert_eq!(now.breathing, sample(&params, t + params.breathing_period).breathing);
        prop_assert_eq!(now.morph1, sample(&params, t + params.morph1_period).morph1);
        prop_assert_eq!(now.morph2, sample(&params, t + params.morph2_period).morph2);
        prop_assert_eq!(now.squish, sample(&params, t + params.squish_period).squish);
        prop_assert_eq!(now.blink, sample(&params, t + params.blink_period).blink);
    }
}

#[test]
fn breathing_period_in_f32() {
    let params = IdleParams::<f32>::default();
    for k in 0..4096 {
        let t = k as f32 / 32.0;
        assert_eq!(sample(&params, t).breathing, sample(&params, t + 4.0).breathing, "t = {}", t);
    }
}

#[test]
fn long_sessions_do_not_drift() {
    let params = IdleParams::<f32>::default();
    let mut osc = IdleOscillator::new(params);
    // Six hours at 60 fps.
    for _ in 0..(6 * 3600 * 60) {
        osc.advance(1.0 / 60.0);
    }
    let p = osc.phases();
    for v in [p.breathing, p.morph1, p.morph2, p.squish] {
        assert!(v.is_finite() && (-1.0..=1.0).contains(&v));
    }
    assert!((0.0..=1.0).contains(&p.blink));
}

#[test]
fn offset_oscillators_differ() {
    let params = IdleParams::<f32>::default();
    let a = IdleOscillator::new(params);
    let b = IdleOscillator::with_offset(params, 1.0);
    assert_ne!(a.phases().breathing, b.phases().breathing);
}
