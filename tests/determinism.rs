use slimy::{BodyId, NoOpObserver, SimConfig, Simulation, Spring, Spring2D, SpringParams, Vec2};
use slimy::Vec as _;

#[test]
fn spring_deterministic() {
    let results: Vec<_> = (0..10).map(|_| {
        let mut spring: Spring2D<f32> = Spring::new(
            Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0), SpringParams::jelly_settle(),
        );
        for _ in 0..500 {
            spring.update(1.0 / 60.0);
        }
        spring.value()
    }).collect();

    for r in &results[1..] {
        assert_eq!(results[0].x, r.x);
        assert_eq!(results[0].y, r.y);
    }
}

fn fling_and_split() -> Vec<slimy::Transform<f32>> {
    let mut sim: Simulation<f32> = Simulation::new(SimConfig::new().with_container(320.0, 480.0)).unwrap();
    sim.on_drag_begin(BodyId::Primary);
    sim.on_drag_update(BodyId::Primary, Vec2::new(30.0, -20.0), 0.0);
    sim.tick(1.0 / 60.0, &mut NoOpObserver);
    sim.on_drag_end(BodyId::Primary, Vec2::new(900.0, 1300.0));
    let mut frames = Vec::new();
    for i in 0..400 {
        if i == 200 {
            sim.on_pinch_begin();
            sim.on_pinch_update(1.7, Vec2::zero());
        }
        // Uneven frame lengths, as on a real display.
        let dt = if i % 7 == 0 { 1.0 / 30.0 } else { 1.0 / 60.0 };
        sim.tick(dt, &mut NoOpObserver);
        frames.extend(sim.snapshot().transforms.iter().copied());
    }
    frames
}

#[test]
fn simulation_deterministic() {
    let first = fling_and_split();
    for _ in 0..3 {
        let again = fling_and_split();
        assert_eq!(first.len(), again.len());
        for (a, b) in first.iter().zip(again.iter()) {
            assert_eq!(a, b);
        }
    }
}
