//! Fixed-Point 2D Geometry
//!
//! Board positions and axis-aligned boxes on top of `Fixed`.
//! The board origin is the bottom-left corner with y pointing up.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE, to_float};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Convert to floats for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (to_float(self.x), to_float(self.y))
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_floats();
        write!(f, "({:.3}, {:.3})", x, y)
    }
}

/// Axis-aligned bounding box anchored at its bottom-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Bottom-left corner
    pub origin: FixedVec2,
    /// Width (fixed-point)
    pub width: Fixed,
    /// Height (fixed-point)
    pub height: Fixed,
}

impl Aabb {
    /// Create a box from its corner and size.
    #[inline]
    pub const fn new(origin: FixedVec2, width: Fixed, height: Fixed) -> Self {
        Self { origin, width, height }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> Fixed {
        self.origin.x + self.width
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> Fixed {
        self.origin.y + self.height
    }

    /// Horizontal center.
    #[inline]
    pub fn center_x(&self) -> Fixed {
        self.origin.x + self.width / 2
    }

    /// Horizontal spans overlap (strict, touching edges do not count).
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.origin.x < other.right() && self.right() > other.origin.x
    }

    /// Vertical spans overlap (strict).
    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.origin.y < other.top() && self.top() > other.origin.y
    }

    /// Full AABB overlap test.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    fn boxed(x: i32, y: i32, w: i32, h: i32) -> Aabb {
        Aabb::new(FixedVec2::from_ints(x, y), from_int(w), from_int(h))
    }

    #[test]
    fn test_edges() {
        let b = boxed(10, 20, 30, 40);
        assert_eq!(b.right(), from_int(40));
        assert_eq!(b.top(), from_int(60));
        assert_eq!(b.center_x(), from_int(25));
    }

    #[test]
    fn test_overlap() {
        let a = boxed(0, 0, 30, 40);
        assert!(a.overlaps(&boxed(20, 30, 30, 40)));
        assert!(!a.overlaps(&boxed(100, 0, 30, 40)));
        assert!(!a.overlaps(&boxed(0, 50, 30, 40)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = boxed(0, 0, 30, 40);
        assert!(!a.overlaps(&boxed(30, 0, 30, 40)));
        assert!(!a.overlaps(&boxed(0, 40, 30, 40)));
    }

    #[test]
    fn test_from_ints() {
        let v = FixedVec2::from_ints(3, -2);
        assert_eq!(v.x, from_int(3));
        assert_eq!(v.y, from_int(-2));
    }
}
