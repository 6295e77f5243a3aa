//! Integer pixel geometry used throughout Hopper2D.
//!
//! All positions are in map-pixel space with the origin at the top-left
//! corner. Coordinate-to-tile conversion relies on Rust's truncating
//! integer division; the few negative coordinates that occur (an entity
//! jumping above the visible map) are handled explicitly by the sweep
//! algorithms rather than by flooring division.

use serde::{Deserialize, Serialize};

/// 2D point in map pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned bounding box in map pixels, position at the top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Vertical center, used by the stomp rule in entity combat.
    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Returns a copy shrunk by `t` pixels on every side.
    ///
    /// Entity-vs-entity tests use an inset copy of one box so that two
    /// boxes merely touching across a tile boundary do not register.
    pub fn inset(&self, t: i32) -> Rect {
        Rect::new(self.x + t, self.y + t, self.w - 2 * t, self.h - 2 * t)
    }

    /// Strict overlap test. Degenerate boxes (zero or negative extent)
    /// never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 30, 30);
        let b = Rect::new(30, 0, 30, 30);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn one_pixel_overlap_intersects() {
        let a = Rect::new(0, 0, 30, 30);
        let b = Rect::new(29, 0, 30, 30);
        assert!(a.intersects(&b));
    }

    #[test]
    fn inset_trims_every_side() {
        let r = Rect::new(10, 20, 30, 40).inset(5);
        assert_eq!(r, Rect::new(15, 25, 20, 30));
    }

    #[test]
    fn over_inset_box_is_inert() {
        let a = Rect::new(0, 0, 8, 8);
        let b = Rect::new(0, 0, 8, 8).inset(5);
        assert!(!a.intersects(&b));
    }
}
