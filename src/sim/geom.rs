//! Axis-aligned rectangles and polygon helpers
//!
//! World space is screen-like: +x runs forward through the level, +y points
//! down toward the ground.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rotate_point;

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test; touching edges do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive point containment
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Shrink inward by `amount` on every side
    pub fn shrink(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.width - amount * 2.0,
            self.height - amount * 2.0,
        )
    }

    /// Grow outward by `amount` on every side
    pub fn expand(&self, amount: f32) -> Rect {
        self.shrink(-amount)
    }

    /// Corners in winding order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }

    /// Corners rotated by `angle` radians around the rect center
    pub fn rotated_corners(&self, angle: f32) -> [Vec2; 4] {
        let center = self.center();
        self.corners().map(|c| rotate_point(c, center, angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_shrink_keeps_center() {
        let r = Rect::new(0.0, 0.0, 30.0, 30.0);
        let s = r.shrink(4.5);
        assert_eq!(s.center(), r.center());
        assert_eq!(s.width, 21.0);
    }

    #[test]
    fn test_rotated_corners_zero_angle() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let rotated = r.rotated_corners(0.0);
        for (a, b) in rotated.iter().zip(r.corners().iter()) {
            assert!((*a - *b).length() < 1e-5);
        }
    }
}
