//! Deformation mapper: body state in, renderable transform out.
//!
//! [`map`] is pure. Scale terms combine multiplicatively and skew/radius terms
//! additively; every magnitude goes through a clamped curve or ramp, and the
//! result is clamped once more so transient physics spikes never reach the
//! renderer.

use crate::body::Body;
use crate::bounds::Wall;
use crate::config::DeformParams;
use crate::float::Float;
use crate::vec::{Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Corner order of [`Transform::corner_radii`].
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// What the renderer applies to a body box of the full configured size.
///
/// `translate` is the body center in container coordinates (origin at the
/// container center, +y down). Radii are in px of the unscaled box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform<F: Float> {
    pub translate: Vec2<F>,
    pub scale_x: F,
    pub scale_y: F,
    pub skew_x_deg: F,
    pub skew_y_deg: F,
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corner_radii: [F; 4],
    pub opacity: F,
}

impl<F: Float> Transform<F> {
    /// Undeformed box at `translate`.
    pub fn identity(translate: Vec2<F>, scale: F, corner_radius: F) -> Self {
        Transform {
            translate,
            scale_x: scale,
            scale_y: scale,
            skew_x_deg: F::zero(),
            skew_y_deg: F::zero(),
            corner_radii: [corner_radius; 4],
            opacity: F::one(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.translate.is_finite()
            && self.scale_x.is_finite()
            && self.scale_y.is_finite()
            && self.skew_x_deg.is_finite()
            && self.skew_y_deg.is_finite()
            && self.corner_radii.iter().all(|r| r.is_finite())
            && self.opacity.is_finite()
    }
}

/// Inputs beyond the body itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeformContext<F: Float> {
    /// Full-scale body width and height (px).
    pub body_size: Vec2<F>,
    /// Current pinch scale; 1 when no pinch is in progress.
    pub pinch_scale: F,
}

impl<F: Float> DeformContext<F> {
    pub fn new(body_size: Vec2<F>) -> Self {
        DeformContext { body_size, pinch_scale: F::one() }
    }

    pub fn with_pinch(mut self, scale: F) -> Self {
        self.pinch_scale = scale;
        self
    }
}

/// Running scale/skew accumulator.
struct Shape<F: Float> {
    sx: F,
    sy: F,
    skew_x: F,
    skew_y: F,
}

impl<F: Float> Shape<F> {
    /// Elongate by `amount` along unit `dir` and compress the perpendicular by
    /// `amount * ratio`, expressed on the box axes.
    fn directional(&mut self, dir: Vec2<F>, amount: F, ratio: F, skew_deg: F) {
        if amount == F::zero() || dir == Vec2::zero() {
            return;
        }
        let xx = dir.x * dir.x;
        let yy = dir.y * dir.y;
        let squeeze = amount * ratio;
        self.sx = self.sx * (F::one() + amount * xx - squeeze * yy);
        self.sy = self.sy * (F::one() + amount * yy - squeeze * xx);
        // A diagonal pull shears the box; zero along either axis.
        let diagonal = F::two() * dir.x * dir.y;
        self.skew_x = self.skew_x + skew_deg * diagonal;
    }
}

/// Map a body to its transform.
pub fn map<F: Float>(body: &Body<F>, params: &DeformParams<F>, ctx: &DeformContext<F>) -> Transform<F> {
    let one = F::one();
    let full = ctx.body_size;
    let base_radius = params.corner_radius_ratio * full.x.min(full.y) * F::half();
    let body_scale = body.scale * body.growth;
    let identity = Transform::identity(body.center.sanitized(), body_scale.finite_or(one), base_radius.finite_or(F::zero()));

    let mut shape = Shape { sx: one, sy: one, skew_x: F::zero(), skew_y: F::zero() };
    let mut offset = Vec2::zero();

    // Idle breathing, squish and blink.
    let idle = &body.idle;
    shape.sy = shape.sy * (one + idle.breathing * params.breathing_amplitude - idle.blink * params.blink_squash);
    shape.sx = shape.sx * (one + idle.squish * params.squish_amplitude);

    // Directional stretch toward the grab point.
    let stretch = body.stretch().sanitized();
    let distance = stretch.length();
    let elongation = params.stretch_curve.sample(distance);
    let peak = params.stretch_curve.max_output();
    let skew_weight = if peak > F::zero() { elongation / peak } else { F::zero() };
    shape.directional(stretch.normalize(), elongation, params.perpendicular_ratio, params.stretch_skew_deg * skew_weight);
    offset = offset + stretch.scale(params.lean_ratio).clamp_length(params.max_lean);

    // Pinch: widen along the horizontal pinch axis, preserving area.
    let pinch = ctx.pinch_scale.finite_or(one).clamp(F::half(), F::two());
    if pinch != one {
        shape.sx = shape.sx * pinch;
        shape.sy = shape.sy / pinch.sqrt();
    }

    // Post-release wobble.
    let wobble = &body.wobble;
    let wobble_scale = wobble.scale.finite_or(F::zero()).clamp(-F::half(), F::half());
    shape.sx = shape.sx * (one + wobble_scale);
    shape.sy = shape.sy * (one - wobble_scale * F::half());
    shape.skew_x = shape.skew_x + wobble.skew_x;
    shape.skew_y = shape.skew_y + wobble.skew_y;
    offset = offset + wobble.offset;

    // Walls: squish across the near wall, bulge along it.
    let p = body.edge_proximity.map(|v| v.finite_or(F::zero()).clamp(F::zero(), one));
    let across_x = p[Wall::Left.index()].max(p[Wall::Right.index()]);
    let across_y = p[Wall::Top.index()].max(p[Wall::Bottom.index()]);
    shape.sx = shape.sx * (one - params.edge_squish * across_x + params.edge_bulge * across_y);
    shape.sy = shape.sy * (one - params.edge_squish * across_y + params.edge_bulge * across_x);

    // Flight: velocity-aligned stretch while airborne.
    let flight = body.flight.sanitized();
    shape.directional(flight.normalize(), flight.length().min(F::half()), params.perpendicular_ratio, F::zero());

    // Impact compression and bulge, with a skew toward the hit.
    let impact = Vec2::new(body.impact.x.finite_or(F::zero()).clamp(-one, one), body.impact.y.finite_or(F::zero()).clamp(-one, one));
    let ix = impact.x.abs();
    let iy = impact.y.abs();
    shape.sx = shape.sx * (one - params.impact_compress * ix + params.impact_bulge * iy);
    shape.sy = shape.sy * (one - params.impact_compress * iy + params.impact_bulge * ix);
    shape.skew_x = shape.skew_x + params.impact_skew_deg * impact.x;
    shape.skew_y = shape.skew_y + params.impact_skew_deg * impact.y;

    // Inchworm crawl for split halves, anchored at the trailing edge.
    let crawl = body.crawl.finite_or(F::zero()) * params.crawl_stretch;
    if crawl != F::zero() {
        let axis = body.crawl_axis.normalize();
        let extend = crawl.clamp(-F::half(), F::half());
        let xx = axis.x * axis.x;
        let yy = axis.y * axis.y;
        shape.sx = shape.sx * (one + extend * xx - extend * params.perpendicular_ratio * yy);
        shape.sy = shape.sy * (one + extend * yy - extend * params.perpendicular_ratio * xx);
        let reach = axis.x.abs() * body.half_extents.x + axis.y.abs() * body.half_extents.y;
        offset = offset + axis.scale(extend * reach);
    }

    // Corners: morph phases breathe the radii, walls flatten the touching side.
    let mut radii = [base_radius; 4];
    let morph_a = one + body.idle.morph1 * params.morph_radius_amplitude;
    let morph_b = one + body.idle.morph2 * params.morph_radius_amplitude;
    radii[TOP_LEFT] = radii[TOP_LEFT] * morph_a;
    radii[BOTTOM_RIGHT] = radii[BOTTOM_RIGHT] * morph_a;
    radii[TOP_RIGHT] = radii[TOP_RIGHT] * morph_b;
    radii[BOTTOM_LEFT] = radii[BOTTOM_LEFT] * morph_b;
    let flatten = |corner: usize, walls: [Wall; 2]| {
        let touch = p[walls[0].index()].max(p[walls[1].index()]);
        radii[corner] * (one - params.edge_corner_flatten * touch)
    };
    let radii = [
        flatten(TOP_LEFT, [Wall::Left, Wall::Top]),
        flatten(TOP_RIGHT, [Wall::Right, Wall::Top]),
        flatten(BOTTOM_RIGHT, [Wall::Right, Wall::Bottom]),
        flatten(BOTTOM_LEFT, [Wall::Left, Wall::Bottom]),
    ];

    let max_radius = full.x.min(full.y) * F::half();
    let max_offset = full.x.max(full.y) * F::half();
    let skew_limit = params.max_skew_deg;
    let out = Transform {
        translate: body.center + offset.clamp_length(max_offset),
        scale_x: shape.sx.finite_or(one).clamp(params.min_scale, params.max_scale) * body_scale,
        scale_y: shape.sy.finite_or(one).clamp(params.min_scale, params.max_scale) * body_scale,
        skew_x_deg: shape.skew_x.finite_or(F::zero()).clamp(-skew_limit, skew_limit),
        skew_y_deg: shape.skew_y.finite_or(F::zero()).clamp(-skew_limit, skew_limit),
        corner_radii: radii.map(|r| r.clamp(F::zero(), max_radius)),
        opacity: body.opacity.clamp(F::zero(), one),
    };
    sanitize(out, &identity)
}

/// Replace every non-finite channel with the identity's.
fn sanitize<F: Float>(t: Transform<F>, identity: &Transform<F>) -> Transform<F> {
    if t.is_finite() {
        return t;
    }
    let pick = |v: F, fallback: F| if v.is_finite() { v } else { fallback };
    let mut radii = t.corner_radii;
    for (r, fallback) in radii.iter_mut().zip(identity.corner_radii) {
        *r = pick(*r, fallback);
    }
    Transform {
        translate: if t.translate.is_finite() { t.translate } else { identity.translate },
        scale_x: pick(t.scale_x, identity.scale_x),
        scale_y: pick(t.scale_y, identity.scale_y),
        skew_x_deg: pick(t.skew_x_deg, identity.skew_x_deg),
        skew_y_deg: pick(t.skew_y_deg, identity.skew_y_deg),
        corner_radii: radii,
        opacity: pick(t.opacity, identity.opacity),
    }
}
