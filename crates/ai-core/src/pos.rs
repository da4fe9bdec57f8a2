//! Position types and distance metrics.
//!
//! Two coordinate spaces exist: `GridPos` addresses a cell inside one bounded
//! local grid, `WorldPos` is a continuous map position used by zone
//! connectors and by the planner's travel estimates.  Every metric here is an
//! admissible lower bound for the unit-cost movement model it matches, so
//! destinations can use them directly as heuristics.

use std::fmt;

// ── GridPos ───────────────────────────────────────────────────────────────────

/// Integer cell coordinate within a local grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance.  Exact on an obstacle-free 4-connected grid.
    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev distance (king moves).
    #[inline]
    pub fn chebyshev(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Octile distance: diagonal steps cost √2, straight steps cost 1.
    /// Exact on an obstacle-free 8-connected grid.
    pub fn octile(self, other: GridPos) -> f32 {
        let dx = self.x.abs_diff(other.x) as f32;
        let dy = self.y.abs_diff(other.y) as f32;
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        hi + (std::f32::consts::SQRT_2 - 1.0) * lo
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

// ── WorldPos ──────────────────────────────────────────────────────────────────

/// Continuous map position in world units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance.
    #[inline]
    pub fn distance(self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: WorldPos, t: f32) -> WorldPos {
        WorldPos::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<GridPos> for WorldPos {
    /// Cell centre in world units, assuming one unit per cell.
    fn from(p: GridPos) -> Self {
        WorldPos::new(p.x as f32 + 0.5, p.y as f32 + 0.5)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
