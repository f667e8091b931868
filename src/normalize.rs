//! Fits world-space segments into a padded viewport.

use crate::error::SandboxError;
use crate::segment::LineSegment;
use glam::DVec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Padding used when none is configured, in pixels.
pub const DEFAULT_PADDING: f64 = 16.0;

/// Target drawing area in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Minimum margin kept clear on every side.
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            padding: DEFAULT_PADDING,
        }
    }
}

impl Viewport {
    /// Creates a viewport, rejecting sizes that leave no area inside the padding.
    pub fn new(width: f64, height: f64, padding: f64) -> Result<Self, SandboxError> {
        let viewport = Self {
            width,
            height,
            padding,
        };
        let inner = viewport.inner_size();
        let drawable = inner.is_finite() && inner.min_element() > 0.0;
        if !padding.is_finite() || padding < 0.0 || !drawable {
            return Err(SandboxError::InvalidViewport {
                width,
                height,
                padding,
            });
        }
        Ok(viewport)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Size of the area left after removing the padding from both sides.
    pub fn inner_size(&self) -> DVec2 {
        self.size() - DVec2::splat(2.0 * self.padding)
    }
}

/// Uniformly rescales and centers segments into a [`Viewport`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalizer {
    viewport: Viewport,
}

impl Normalizer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Maps `segments` into viewport coordinates.
    ///
    /// A single scale factor is chosen so the bounding box of all endpoints fits the
    /// padded area on both axes, and each axis is then centered. An empty input is
    /// returned as is. If every endpoint is the same point the scale falls back to 1,
    /// which places that point at the center of the viewport.
    pub fn normalize(&self, segments: &[LineSegment]) -> Vec<LineSegment> {
        if segments.is_empty() {
            return Vec::new();
        }

        let (min, max) = segments.iter().fold(
            (DVec2::INFINITY, DVec2::NEG_INFINITY),
            |(lo, hi), s| {
                (
                    lo.min(s.start()).min(s.end()),
                    hi.max(s.start()).max(s.end()),
                )
            },
        );
        let extent = max - min;

        let mut scale = (extent / self.viewport.inner_size()).max_element();
        if scale <= 0.0 {
            warn!("bounding box collapsed to a single point at {min}; using unit scale");
            scale = 1.0;
        }

        let offset = ((self.viewport.size() - extent / scale) / 2.0)
            .max(DVec2::splat(self.viewport.padding));
        debug!(
            "normalizing {} segments: bounds {min}..{max}, scale {scale}, offset {offset}",
            segments.len()
        );

        let map = |p: DVec2| (p - min) / scale + offset;
        segments
            .iter()
            .map(|s| LineSegment::from_points(map(s.start()), map(s.end())))
            .collect()
    }
}
