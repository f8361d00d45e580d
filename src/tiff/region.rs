//! Rectangular regions of a plane.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `{x, y, w, h}` in plane coordinates.
///
/// A region with zero width or height is invalid and covers nothing. The
/// default region is `{0, 0, 0, 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlaneRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PlaneRegion {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Check that the region is non-empty.
    #[inline]
    pub const fn valid(&self) -> bool {
        self.w > 0 && self.h > 0
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Exclusive right bound.
    #[inline]
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.w as u64
    }

    /// Exclusive bottom bound.
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.h as u64
    }

    /// Check if the point lies inside the region.
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }

    /// Check if `other` lies entirely inside this region.
    pub fn contains(&self, other: &PlaneRegion) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping part of two regions, or the default region if they do
    /// not overlap.
    pub fn intersection(&self, other: &PlaneRegion) -> PlaneRegion {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > left as u64 && bottom > top as u64 {
            PlaneRegion::new(left, top, (right - left as u64) as u32, (bottom - top as u64) as u32)
        } else {
            PlaneRegion::default()
        }
    }

    /// Check if two regions share positive area.
    pub fn overlaps(&self, other: &PlaneRegion) -> bool {
        self.intersection(other).valid()
    }

    /// Rectangle covering exactly both regions, or the default region if no
    /// such rectangle exists.
    ///
    /// A union exists only when the regions share one full edge and do not
    /// overlap.
    pub fn union(&self, other: &PlaneRegion) -> PlaneRegion {
        if !self.valid() || !other.valid() {
            return PlaneRegion::default();
        }

        let joined = if self.y == other.y && self.h == other.h {
            let x = if self.right() == other.x as u64 {
                Some(self.x)
            } else if other.right() == self.x as u64 {
                Some(other.x)
            } else {
                None
            };
            x.zip(self.w.checked_add(other.w))
                .map(|(x, w)| PlaneRegion::new(x, self.y, w, self.h))
        } else {
            None
        };

        let joined = joined.or_else(|| {
            if self.x != other.x || self.w != other.w {
                return None;
            }
            let y = if self.bottom() == other.y as u64 {
                Some(self.y)
            } else if other.bottom() == self.y as u64 {
                Some(other.y)
            } else {
                None
            };
            y.zip(self.h.checked_add(other.h))
                .map(|(y, h)| PlaneRegion::new(self.x, y, self.w, h))
        });

        // a width or height beyond u32 has no representation
        joined.unwrap_or_default()
    }

    /// Check if the closed rectangles meet, i.e. the regions overlap or share
    /// at least one boundary point.
    ///
    /// Every pair with a valid [`union`](Self::union) touches.
    pub fn touches(&self, other: &PlaneRegion) -> bool {
        self.x as u64 <= other.right()
            && other.x as u64 <= self.right()
            && self.y as u64 <= other.bottom()
            && other.y as u64 <= self.bottom()
    }
}

impl BitAnd for PlaneRegion {
    type Output = PlaneRegion;

    fn bitand(self, rhs: PlaneRegion) -> PlaneRegion {
        self.intersection(&rhs)
    }
}

impl BitOr for PlaneRegion {
    type Output = PlaneRegion;

    fn bitor(self, rhs: PlaneRegion) -> PlaneRegion {
        self.union(&rhs)
    }
}

impl fmt::Display for PlaneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={} w={} h={}", self.x, self.y, self.w, self.h)
    }
}

// =============================================================================
// Tests
// =============================================================================
