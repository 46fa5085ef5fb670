//! Coordinate transform between world space and canvas grid space.
//!
//! DESIGN
//! ======
//! A canvas lies in a single vertical plane. Which horizontal world axis
//! carries canvas width depends on how the arena is built, so the transform
//! infers it from the two bounding corners: the horizontal axis on which the
//! corners agree is the depth axis, and the other one is the width axis.
//! Canvas height always runs up the vertical axis.
//!
//! The inference is resolved exactly once, at canvas construction. Every
//! later conversion reuses the resolved [`Orientation`], so draw calls and
//! full renders can never disagree about which way the grid runs.

use crate::world::{WorldPosition, WorldRegion};

// =============================================================================
// TYPES
// =============================================================================

/// Which horizontal world axis carries canvas width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthAxis {
    X,
    Z,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    /// Corners identical, or no horizontal extent at all.
    #[error("degenerate canvas corners: no grid between {0:?} and {1:?}")]
    Degenerate(WorldPosition, WorldPosition),
    /// Corners differ on both horizontal axes — not a single vertical plane.
    #[error("canvas corners {0:?} and {1:?} do not lie in one vertical plane")]
    NotPlanar(WorldPosition, WorldPosition),
}

/// Resolved canvas geometry: axis assignment, grid origin, and bounds.
#[derive(Debug, Clone)]
pub struct Orientation {
    width_axis: WidthAxis,
    /// World position of canvas cell `(0, 0)`: the bottom end of the canvas
    /// on the lesser side of the width axis.
    origin: WorldPosition,
    max_x: i32,
    max_y: i32,
    bounds: WorldRegion,
}

// =============================================================================
// RESOLUTION
// =============================================================================

impl Orientation {
    /// Infer the grid layout from two opposite canvas corners.
    ///
    /// Corner order does not matter; extents are normalized. Fails fast on
    /// geometry that cannot hold a grid, so no partially-built canvas ever
    /// exists.
    ///
    /// # Errors
    ///
    /// `Degenerate` when the corners coincide or share both horizontal axes,
    /// `NotPlanar` when they differ on both horizontal axes.
    pub fn resolve(a: WorldPosition, b: WorldPosition) -> Result<Self, GeometryError> {
        if a == b {
            return Err(GeometryError::Degenerate(a, b));
        }

        let width_axis = match (a.x == b.x, a.z == b.z) {
            (true, true) => return Err(GeometryError::Degenerate(a, b)),
            (false, false) => return Err(GeometryError::NotPlanar(a, b)),
            (true, false) => WidthAxis::Z,
            (false, true) => WidthAxis::X,
        };

        let (width_a, width_b) = match width_axis {
            WidthAxis::X => (a.x, b.x),
            WidthAxis::Z => (a.z, b.z),
        };

        let origin = match width_axis {
            WidthAxis::X => WorldPosition::new(width_a.min(width_b), a.y.min(b.y), a.z),
            WidthAxis::Z => WorldPosition::new(a.x, a.y.min(b.y), width_a.min(width_b)),
        };

        Ok(Self {
            width_axis,
            origin,
            max_x: (width_a - width_b).abs(),
            max_y: (a.y - b.y).abs(),
            bounds: WorldRegion::new(a, b),
        })
    }

    #[must_use]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }

    #[must_use]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl Orientation {
    /// Project a world position onto the canvas grid.
    ///
    /// The depth coordinate is ignored (pure plane projection); `None` when
    /// the projected cell falls outside the grid.
    #[must_use]
    pub fn world_to_point(&self, pos: WorldPosition) -> Option<(i32, i32)> {
        let px = match self.width_axis {
            WidthAxis::X => pos.x - self.origin.x,
            WidthAxis::Z => pos.z - self.origin.z,
        };
        let py = pos.y - self.origin.y;

        if (0..=self.max_x).contains(&px) && (0..=self.max_y).contains(&py) {
            Some((px, py))
        } else {
            None
        }
    }

    /// World position of a grid cell. Exact inverse of [`world_to_point`]
    /// for any cell inside the grid.
    ///
    /// [`world_to_point`]: Self::world_to_point
    #[must_use]
    pub fn point_to_world(&self, x: i32, y: i32) -> WorldPosition {
        match self.width_axis {
            WidthAxis::X => WorldPosition::new(self.origin.x + x, self.origin.y + y, self.origin.z),
            WidthAxis::Z => WorldPosition::new(self.origin.x, self.origin.y + y, self.origin.z + x),
        }
    }

    /// Whether a position lies inside the 3D box spanned by the corners,
    /// regardless of grid alignment.
    #[must_use]
    pub fn belongs(&self, pos: WorldPosition) -> bool {
        self.bounds.contains(pos)
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
