use proptest::prelude::*;
use slimy::deform::{map, DeformContext, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use slimy::{Body, BodyId, DeformParams, NoOpObserver, SimConfig, Simulation, Vec, Vec2};

fn any_float() -> impl Strategy<Value = f32> {
    prop_oneof![
        -1.0e6f32..1.0e6,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
        Just(0.0f32),
    ]
}

proptest! {
    #[test]
    fn transform_is_bounded_for_any_state(
        gx in any_float(), gy in any_float(),
        fx in any_float(), fy in any_float(),
        ix in any_float(), iy in any_float(),
        wobble in any_float(), skew in any_float(),
        edge in any_float(), crawl in any_float(),
        pinch in any_float(),
    ) {
        let params = DeformParams::default();
        let mut body: Body<f32> = Body::new(Vec2::new(10.0, -20.0), Vec2::new(60.0, 60.0), 1.0);
        body.grab_point = Vec2::new(gx, gy);
        body.flight = Vec2::new(fx, fy);
        body.impact = Vec2::new(ix, iy);
        body.wobble.scale = wobble;
        body.wobble.skew_x = skew;
        body.wobble.skew_y = -skew;
        body.edge_proximity = [edge; 4];
        body.crawl = crawl;
        let ctx = DeformContext::new(Vec2::new(120.0, 120.0)).with_pinch(pinch);
        let t = map(&body, &params, &ctx);

        prop_assert!(t.is_finite(), "{:?}", t);
        prop_assert!(t.scale_x >= params.min_scale && t.scale_x <= params.max_scale);
        prop_assert!(t.scale_y >= params.min_scale && t.scale_y <= params.max_scale);
        prop_assert!(t.skew_x_deg.abs() <= params.max_skew_deg);
        prop_assert!(t.skew_y_deg.abs() <= params.max_skew_deg);
        for r in t.corner_radii {
            prop_assert!((0.0..=60.0).contains(&r));
        }
        prop_assert!((0.0..=1.0).contains(&t.opacity));
        prop_assert!(t.translate.distance(body.center) <= 60.0 + 1e-3);
    }
}

#[test]
fn stretch_is_clamped_by_curve() {
    let params = DeformParams::default();
    let ctx = DeformContext::new(Vec2::new(120.0, 120.0));
    let mut body: Body<f32> = Body::new(Vec2::zero(), Vec2::new(60.0, 60.0), 1.0);
    body.grab_point = Vec2::new(0.0, 200.0);
    let at_end = map(&body, &params, &ctx);
    body.grab_point = Vec2::new(0.0, 5000.0);
    let far = map(&body, &params, &ctx);
    assert_eq!(at_end.scale_y, far.scale_y);
    assert!((far.scale_y - 1.24).abs() < 1e-4);
}

#[test]
fn diagonal_stretch_skews() {
    let params = DeformParams::default();
    let ctx = DeformContext::new(Vec2::new(120.0, 120.0));
    let mut body: Body<f32> = Body::new(Vec2::zero(), Vec2::new(60.0, 60.0), 1.0);
    body.grab_point = Vec2::new(60.0, 60.0);
    let t = map(&body, &params, &ctx);
    assert!(t.skew_x_deg > 0.0);
    body.grab_point = Vec2::new(-60.0, 60.0);
    let t = map(&body, &params, &ctx);
    assert!(t.skew_x_deg < 0.0);
}

#[test]
fn corner_flattens_in_a_corner() {
    let params = DeformParams::default();
    let ctx = DeformContext::new(Vec2::new(120.0, 120.0));
    let mut body: Body<f32> = Body::new(Vec2::zero(), Vec2::new(60.0, 60.0), 1.0);
    body.edge_proximity = [1.0, 0.0, 1.0, 0.0];
    let t = map(&body, &params, &ctx);
    assert!(t.corner_radii[TOP_LEFT] < t.corner_radii[BOTTOM_RIGHT]);
    assert_eq!(t.corner_radii[TOP_LEFT], t.corner_radii[TOP_RIGHT]);
}

#[test]
fn snapshot_follows_stretch_during_drag() {
    let mut sim: Simulation<f32> = Simulation::new(SimConfig::new()).unwrap();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(0.0, 80.0), 0.0);
    sim.tick(1.0 / 60.0, &mut NoOpObserver);
    let t = sim.snapshot().transforms[0];
    assert!(t.scale_y > t.scale_x, "vertical drag should elongate vertically: {:?}", t);
    assert!(t.translate.y > 0.0);
}
