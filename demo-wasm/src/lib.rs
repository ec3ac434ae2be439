use slimy::{BodyId, NoOpObserver, SimConfig, Simulation, SplitPhase, Vec2};
use wasm_bindgen::prelude::*;

/// Floats per body in [`SlimeDemo::transforms`].
const STRIDE: usize = 12;

fn body_id(index: usize) -> Option<BodyId> {
    BodyId::from_index(index)
}

#[wasm_bindgen]
pub struct SlimeDemo {
    sim: Simulation<f32>,
}

#[wasm_bindgen]
impl SlimeDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, dual: bool) -> Result<SlimeDemo, JsValue> {
        let config = SimConfig::new()
            .with_container(width, height)
            .with_dual_body(dual);
        let sim = Simulation::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(SlimeDemo { sim })
    }

    /// Index of the body under the container-space point, or -1.
    pub fn hit_test(&self, x: f32, y: f32) -> i32 {
        match self.sim.body_at(Vec2::new(x, y)) {
            Some(id) => id.index() as i32,
            None => -1,
        }
    }

    pub fn drag_begin(&mut self, body: usize) {
        if let Some(id) = body_id(body) {
            self.sim.on_drag_begin(id);
        }
    }

    pub fn drag_update(&mut self, body: usize, dx: f32, dy: f32, timestamp: f32) {
        if let Some(id) = body_id(body) {
            self.sim.on_drag_update(id, Vec2::new(dx, dy), timestamp);
        }
    }

    pub fn drag_end(&mut self, body: usize, vx: f32, vy: f32) {
        if let Some(id) = body_id(body) {
            self.sim.on_drag_end(id, Vec2::new(vx, vy));
        }
    }

    pub fn pinch_begin(&mut self) {
        self.sim.on_pinch_begin();
    }

    pub fn pinch_update(&mut self, scale: f32, fx: f32, fy: f32) {
        self.sim.on_pinch_update(scale, Vec2::new(fx, fy));
    }

    pub fn pinch_end(&mut self) {
        self.sim.on_pinch_end();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.sim.resize(width, height);
    }

    pub fn update(&mut self, dt: f32) {
        self.sim.tick(dt, &mut NoOpObserver);
    }

    /// Returns true once the slime has sat untouched long enough to be sent home.
    pub fn check_idle(&mut self) -> bool {
        self.sim.check_idle()
    }

    pub fn body_count(&self) -> usize {
        self.sim.snapshot().transforms.len()
    }

    /// Returns flat [tx, ty, sx, sy, skew_x, skew_y, r_tl, r_tr, r_br, r_bl, opacity, 0, ...]
    /// with `STRIDE` floats per body.
    pub fn transforms(&self) -> Vec<f32> {
        let transforms = &self.sim.snapshot().transforms;
        let mut out = Vec::with_capacity(transforms.len() * STRIDE);
        for t in transforms.iter() {
            out.push(t.translate.x);
            out.push(t.translate.y);
            out.push(t.scale_x);
            out.push(t.scale_y);
            out.push(t.skew_x_deg);
            out.push(t.skew_y_deg);
            out.extend_from_slice(&t.corner_radii);
            out.push(t.opacity);
            out.push(0.0);
        }
        out
    }

    pub fn bridge_progress(&self) -> f32 {
        self.sim.snapshot().bridge_progress
    }

    /// 0 merged, 1 bouncing, 2 crawling, 3 approaching, 4 contact, 5 merging.
    pub fn split_phase(&self) -> u8 {
        match self.sim.split_phase() {
            SplitPhase::Merged => 0,
            SplitPhase::SplitBouncing => 1,
            SplitPhase::Crawling => 2,
            SplitPhase::Approaching => 3,
            SplitPhase::Contact => 4,
            SplitPhase::Merging => 5,
        }
    }
}
