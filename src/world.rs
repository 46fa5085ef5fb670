//! World-space primitives shared by the canvas and palette subsystems.
//!
//! DESIGN
//! ======
//! The host simulation addresses everything by integer block coordinate.
//! `WorldPosition` is that coordinate; `ChunkKey` is the fixed 16×16
//! horizontal partition of world space used purely to batch visual updates.
//! A chunk key is *not* a canvas point — the two share an integer-pair shape
//! but mean different things, so they are different types.

use serde::{Deserialize, Serialize};

use crate::color::PaletteColor;

/// Horizontal chunk edge length in blocks.
pub const CHUNK_SIZE: i32 = 16;

// =============================================================================
// POSITION
// =============================================================================

/// An integer 3D coordinate in the host simulation's space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPosition {
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The spatial cell containing this position.
    #[must_use]
    pub fn chunk(self) -> ChunkKey {
        ChunkKey { x: self.x.div_euclid(CHUNK_SIZE), z: self.z.div_euclid(CHUNK_SIZE) }
    }
}

// =============================================================================
// CHUNK KEY
// =============================================================================

/// Identifies one spatial cell: a 16×16 column of world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

// =============================================================================
// REGION
// =============================================================================

/// Inclusive axis-aligned 3D box between two corner positions.
#[derive(Debug, Clone, Copy)]
pub struct WorldRegion {
    min: WorldPosition,
    max: WorldPosition,
}

impl WorldRegion {
    /// Build a region from any two opposite corners.
    #[must_use]
    pub fn new(a: WorldPosition, b: WorldPosition) -> Self {
        Self {
            min: WorldPosition::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: WorldPosition::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    #[must_use]
    pub fn contains(&self, pos: WorldPosition) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Every lattice position in the region, in deterministic x → y → z order.
    pub fn positions(&self) -> impl Iterator<Item = WorldPosition> + '_ {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y)
                .flat_map(move |y| (min.z..=max.z).map(move |z| WorldPosition::new(x, y, z)))
        })
    }
}

// =============================================================================
// MARKER SOURCE
// =============================================================================

/// Read access to the host world's color-coded surface markers.
///
/// The palette scanner only needs to ask "is there a recognized marker here,
/// and which color does it encode?" — anything else about the host world's
/// block representation stays behind this seam.
pub trait MarkerSource {
    fn marker_at(&self, pos: WorldPosition) -> Option<PaletteColor>;
}

/// In-memory marker field storing the raw `0..=15` marker encoding, the way
/// the host world does. Production code uses it to lay out the default
/// color-picker wall; tests use it to stage arbitrary scan volumes.
#[derive(Debug, Default, Clone)]
pub struct GridMarkerSource {
    markers: std::collections::HashMap<WorldPosition, u8>,
}

impl GridMarkerSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, pos: WorldPosition, color: PaletteColor) {
        self.markers.insert(pos, color.marker_value());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl MarkerSource for GridMarkerSource {
    fn marker_at(&self, pos: WorldPosition) -> Option<PaletteColor> {
        self.markers.get(&pos).and_then(|v| PaletteColor::from_marker_value(*v))
    }
}

#[cfg(test)]
#[path = "world_test.rs"]
mod tests;
