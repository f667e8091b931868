//! Line segment value type shared by every stage after interpretation.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places kept when comparing slopes.
pub const SLOPE_PRECISION: i32 = 10;

/// An immutable line segment from `(x1, y1)` to `(x2, y2)`.
///
/// Equality is exact and order-sensitive: `(a -> b)` is not equal to `(b -> a)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_points(start: DVec2, end: DVec2) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    pub fn start(&self) -> DVec2 {
        DVec2::new(self.x1, self.y1)
    }

    pub fn end(&self) -> DVec2 {
        DVec2::new(self.x2, self.y2)
    }

    /// Vector from start to end.
    pub fn direction(&self) -> DVec2 {
        self.end() - self.start()
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Returns true if the two segments share at least one endpoint, in either order.
    pub fn is_joined(&self, other: &LineSegment) -> bool {
        let (a, b) = (self.start(), self.end());
        let (c, d) = (other.start(), other.end());
        a == c || a == d || b == c || b == d
    }

    /// Slope rounded to [`SLOPE_PRECISION`] decimal places.
    ///
    /// Vertical segments yield an infinite slope. A zero-length segment yields NaN
    /// and is therefore parallel to nothing.
    pub fn slope(&self) -> f64 {
        let scale = 10f64.powi(SLOPE_PRECISION);
        let raw = (self.y2 - self.y1) / (self.x2 - self.x1);
        (raw * scale).round() / scale
    }

    /// Returns true if both segments have the same rounded slope.
    ///
    /// A vertical segment is parallel only to another vertical segment, regardless
    /// of which way either one points.
    pub fn is_parallel(&self, other: &LineSegment) -> bool {
        let (a, b) = (self.slope(), other.slope());
        if a.is_infinite() && b.is_infinite() {
            return true;
        }
        a == b
    }

    /// Smallest segment covering both `self` and a joined, parallel `other`.
    ///
    /// Endpoints are the per-axis extremes of the four input points. Which extreme
    /// lands on which end follows the sign of the slope, and the result keeps the
    /// orientation of `self`.
    pub fn union(&self, other: &LineSegment) -> LineSegment {
        let points = [self.start(), self.end(), other.start(), other.end()];
        let lo = points.iter().fold(DVec2::INFINITY, |acc, p| acc.min(*p));
        let hi = points.iter().fold(DVec2::NEG_INFINITY, |acc, p| acc.max(*p));

        let (a, b) = if self.slope() < 0.0 {
            (DVec2::new(lo.x, hi.y), DVec2::new(hi.x, lo.y))
        } else {
            (lo, hi)
        };

        if (b - a).dot(self.direction()) < 0.0 {
            LineSegment::from_points(b, a)
        } else {
            LineSegment::from_points(a, b)
        }
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) -> ({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}
