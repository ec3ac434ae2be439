use slimy::{BodyId, BodyMode, SimConfig, SimObserver, Simulation, Vec, Vec2, Wall};

#[derive(Default)]
struct Hits {
    hits: std::vec::Vec<(Wall, f32)>,
    flick_ends: usize,
}

impl SimObserver<f32> for Hits {
    fn on_wall_hit(&mut self, _body: BodyId, wall: Wall, speed: f32) {
        self.hits.push((wall, speed));
    }

    fn on_flick_end(&mut self, _body: BodyId) {
        self.flick_ends += 1;
    }
}

fn fling(velocity: Vec2<f32>) -> Simulation<f32> {
    let mut sim = Simulation::new(SimConfig::new().with_container(300.0, 300.0)).unwrap();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_end(BodyId::Primary, velocity);
    sim
}

#[test]
fn fling_right_bounces_off_right_wall_then_settles() {
    let mut sim = fling(Vec2::new(1000.0, 0.0));
    let mut obs = Hits::default();
    let mut bounced_at = None;
    for frame in 0..60 {
        sim.tick(1.0 / 60.0, &mut obs);
        if !obs.hits.is_empty() {
            bounced_at = Some(frame);
            break;
        }
    }
    assert!(bounced_at.is_some(), "body never reached the wall");
    assert_eq!(obs.hits[0].0, Wall::Right);
    let body = &sim.bodies()[0];
    assert_eq!(body.center.x, 90.0);
    assert!(body.velocity.x < 0.0, "velocity should point away from the wall");
    assert!(body.velocity.x.abs() <= 0.55 * obs.hits[0].1 + 1e-3, "bounce must be lossy");

    for _ in 0..900 {
        sim.tick(1.0 / 60.0, &mut obs);
        let body = &sim.bodies()[0];
        assert!(body.bounds(sim.config().container).contains(body.center));
    }
    let body = &sim.bodies()[0];
    assert_eq!(body.mode, BodyMode::Idle);
    assert_eq!(body.velocity, Vec2::zero());
    assert!(body.is_at_rest(), "body should settle: {:?}", body);
    assert_eq!(obs.flick_ends, 1);
}

#[test]
fn flung_body_stays_in_bounds_every_tick() {
    let mut sim = fling(Vec2::new(2600.0, -1900.0));
    let mut obs = Hits::default();
    for _ in 0..600 {
        sim.tick(1.0 / 60.0, &mut obs);
        let body = &sim.bodies()[0];
        let bounds = body.bounds(sim.config().container);
        assert!(bounds.contains(body.center), "center {:?} left {:?}", body.center, bounds);
    }
    assert!(obs.hits.len() >= 2);
}

#[test]
fn flick_speed_never_grows() {
    let mut sim = fling(Vec2::new(1800.0, 700.0));
    let mut obs = Hits::default();
    sim.tick(1.0 / 60.0, &mut obs);
    let mut last = sim.bodies()[0].velocity.length();
    while sim.bodies()[0].mode == BodyMode::Flicking {
        sim.tick(1.0 / 60.0, &mut obs);
        let now = sim.bodies()[0].velocity.length();
        assert!(now <= last + 1e-3, "speed rose from {} to {}", last, now);
        last = now;
    }
}

#[test]
fn flick_ends_below_min_velocity_with_flight_cleared() {
    let mut sim = fling(Vec2::new(600.0, 0.0));
    let mut obs = Hits::default();
    let mut saw_flight = false;
    for _ in 0..1200 {
        sim.tick(1.0 / 60.0, &mut obs);
        let body = &sim.bodies()[0];
        if body.flight.length() > 0.0 {
            saw_flight = true;
        }
        if body.mode != BodyMode::Flicking {
            break;
        }
    }
    let body = &sim.bodies()[0];
    assert!(saw_flight);
    assert_eq!(body.mode, BodyMode::Idle);
    assert_eq!(body.velocity, Vec2::zero());
    assert_eq!(body.flight, Vec2::zero());
    assert_eq!(obs.flick_ends, 1);
}

#[test]
fn slow_release_does_not_fling() {
    let mut sim = fling(Vec2::new(120.0, 0.0));
    let mut obs = Hits::default();
    sim.tick(1.0 / 60.0, &mut obs);
    assert_eq!(sim.bodies()[0].mode, BodyMode::Idle);
}

#[test]
fn wall_hit_squashes_against_wall() {
    let mut sim = fling(Vec2::new(0.0, 2000.0));
    let mut obs = Hits::default();
    while obs.hits.is_empty() {
        sim.tick(1.0 / 60.0, &mut obs);
    }
    for _ in 0..3 {
        sim.tick(1.0 / 60.0, &mut obs);
    }
    assert_eq!(obs.hits[0].0, Wall::Bottom);
    let body = &sim.bodies()[0];
    assert!(body.impact.y > 0.0);
    assert!(body.edge_proximity[Wall::Bottom.index()] > 0.0);
    let t = sim.snapshot().transforms[0];
    assert!(t.scale_y < t.scale_x, "impact should compress along y: {:?}", t);
}
