//! Axis-aligned limits for a body center inside its container.

use crate::float::Float;
use crate::vec::{Vec, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A container wall, also used to index [`Body::edge_proximity`](crate::Body).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Wall {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl Wall {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Range the center of a body with the given half-extents may occupy.
///
/// The container is centered on the origin. When the body is larger than the
/// container on an axis, that axis collapses to the container center.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds<F: Float> {
    pub min: Vec2<F>,
    pub max: Vec2<F>,
}

impl<F: Float> Bounds<F> {
    pub fn new(min: Vec2<F>, max: Vec2<F>) -> Self {
        Bounds { min, max }
    }

    pub fn from_container(container: Vec2<F>, half_extents: Vec2<F>) -> Self {
        let axis = |size: F, half: F| {
            let reach = (size * F::half() - half).max(F::zero());
            (-reach, reach)
        };
        let (min_x, max_x) = axis(container.x, half_extents.x);
        let (min_y, max_y) = axis(container.y, half_extents.y);
        Bounds { min: Vec2::new(min_x, min_y), max: Vec2::new(max_x, max_y) }
    }

    pub fn clamp(&self, p: Vec2<F>) -> Vec2<F> {
        p.clamp(self.min, self.max)
    }

    pub fn contains(&self, p: Vec2<F>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2<F> {
        self.min.midpoint(self.max)
    }

    /// Distance from `p` to each wall's limit, indexed like [`Wall`].
    pub fn wall_distances(&self, p: Vec2<F>) -> [F; 4] {
        [
            (p.x - self.min.x).max(F::zero()),
            (self.max.x - p.x).max(F::zero()),
            (p.y - self.min.y).max(F::zero()),
            (self.max.y - p.y).max(F::zero()),
        ]
    }

    /// Proximity to each wall in [0, 1]: 1 at the limit, falling linearly to
    /// exactly 0 at `margin` and beyond.
    pub fn proximity(&self, p: Vec2<F>, margin: F) -> [F; 4] {
        let mut out = [F::zero(); 4];
        if !(margin > F::zero()) {
            return out;
        }
        for (slot, d) in out.iter_mut().zip(self.wall_distances(p)) {
            *slot = ((margin - d) / margin).clamp(F::zero(), F::one());
        }
        out
    }

    /// Pull an out-of-bounds point back toward the bounds, keeping `ratio` of
    /// the overshoot.
    pub fn rubber_band(&self, p: Vec2<F>, ratio: F) -> Vec2<F> {
        let clamped = self.clamp(p);
        clamped + (p - clamped).scale(ratio.clamp(F::zero(), F::one()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_container_centers_range() {
        let b = Bounds::from_container(Vec2::new(300.0f32, 200.0), Vec2::new(60.0, 40.0));
        assert_eq!(b.min, Vec2::new(-90.0, -60.0));
        assert_eq!(b.max, Vec2::new(90.0, 60.0));
    }

    #[test]
    fn oversized_body_collapses_axis() {
        let b = Bounds::from_container(Vec2::new(100.0f32, 300.0), Vec2::new(80.0, 40.0));
        assert_eq!(b.min.x, 0.0);
        assert_eq!(b.max.x, 0.0);
        assert_eq!(b.clamp(Vec2::new(25.0, 0.0)).x, 0.0);
    }

    #[test]
    fn proximity_zero_outside_margin() {
        let b = Bounds::from_container(Vec2::new(300.0f32, 300.0), Vec2::new(60.0, 60.0));
        let p = b.proximity(Vec2::new(0.0, 0.0), 18.0);
        assert_eq!(p, [0.0; 4]);
        let p = b.proximity(Vec2::new(90.0, 0.0), 18.0);
        assert_eq!(p[Wall::Right.index()], 1.0);
        let p = b.proximity(Vec2::new(81.0, 0.0), 18.0);
        assert!((p[Wall::Right.index()] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn rubber_band_keeps_fraction_of_overshoot() {
        let b = Bounds::new(Vec2::new(-10.0f32, -10.0), Vec2::new(10.0, 10.0));
        let p = b.rubber_band(Vec2::new(30.0, 0.0), 0.25);
        assert!((p.x - 15.0).abs() < 1e-5);
    }
}
