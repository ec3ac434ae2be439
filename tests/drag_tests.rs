use slimy::{BodyId, BodyMode, NoOpObserver, SimConfig, Simulation, Vec, Vec2};

fn sim() -> Simulation<f32> {
    Simulation::new(SimConfig::new()).unwrap()
}

fn run(sim: &mut Simulation<f32>, frames: usize) {
    for _ in 0..frames {
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
    }
}

#[test]
fn center_lags_behind_grab_point() {
    let mut sim = sim();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(50.0, 0.0), 0.0);
    run(&mut sim, 3);
    let body = &sim.bodies()[0];
    assert_eq!(body.mode, BodyMode::Dragging);
    assert_eq!(body.grab_point.x, 50.0);
    assert!(body.center.x > 0.0 && body.center.x < 50.0, "center {}", body.center.x);
}

#[test]
fn release_without_velocity_settles_inside_drag_range() {
    let mut sim = sim();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(50.0, 0.0), 0.0);
    run(&mut sim, 1);
    sim.on_drag_end(BodyId::Primary, Vec2::zero());
    run(&mut sim, 1);
    assert_eq!(sim.bodies()[0].mode, BodyMode::Idle);
    assert!(sim.bodies()[0].wobble.magnitude() > 0.0, "release should ripple");

    run(&mut sim, 600);
    let body = &sim.bodies()[0];
    assert!(body.center.x >= -0.5 && body.center.x <= 50.5, "settled at {}", body.center.x);
    assert!(body.center.y.abs() < 0.5);
    assert!(body.wobble.magnitude() < 0.01, "wobble {}", body.wobble.magnitude());
    assert!(body.stretch().length() < 0.05);
}

#[test]
fn drag_past_wall_is_rubber_banded() {
    let mut sim = sim();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(400.0, 0.0), 0.0);
    for _ in 0..120 {
        sim.tick(1.0 / 60.0, &mut NoOpObserver);
        let body = &sim.bodies()[0];
        assert!(body.center.x <= 90.0, "center escaped to {}", body.center.x);
    }
    let body = &sim.bodies()[0];
    assert!((body.grab_point.x - (90.0 + 310.0 * 0.35)).abs() < 1e-3, "grab {}", body.grab_point.x);
    assert!(body.edge_proximity[1] > 0.9);
}

#[test]
fn drag_begin_cancels_spring_home() {
    let config = SimConfig::new().with_idle_timeout(0.5);
    let mut sim: Simulation<f32> = Simulation::new(config).unwrap();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(60.0, 40.0), 0.0);
    run(&mut sim, 1);
    sim.on_drag_end(BodyId::Primary, Vec2::zero());
    run(&mut sim, 90);
    assert!(sim.check_idle());
    assert!(sim.bodies()[0].is_springing());

    sim.on_drag_begin(BodyId::Primary);
    run(&mut sim, 1);
    assert!(!sim.bodies()[0].is_springing());
    assert_eq!(sim.bodies()[0].mode, BodyMode::Dragging);
    assert!(!sim.check_idle(), "held bodies never spring home");
}

#[test]
fn dual_bodies_drag_independently() {
    let mut sim: Simulation<f32> = Simulation::new(SimConfig::new().with_dual_body(true)).unwrap();
    let start = sim.bodies()[1].center;
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(0.0, 60.0), 0.0);
    run(&mut sim, 30);
    assert_eq!(sim.bodies()[0].mode, BodyMode::Dragging);
    assert_eq!(sim.bodies()[1].mode, BodyMode::Idle);
    assert_eq!(sim.bodies()[1].center, start);
}
