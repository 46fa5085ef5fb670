//! Color picker regions — scanning the world for palette markers.
//!
//! DESIGN
//! ======
//! An arena's color picker is a wall of color-coded surface markers near the
//! canvas. At arena setup the designated region is scanned once; every
//! recognized marker is bucketed by the color it encodes, producing one
//! [`ColorSelectionArea`] per distinct color. The areas are immutable after
//! the scan — pointer interactions only ever ask `is_within`.

use std::collections::HashSet;

use crate::color::PaletteColor;
use crate::world::{MarkerSource, WorldPosition, WorldRegion};

/// All world positions representing one selectable color.
#[derive(Debug, Clone)]
pub struct ColorSelectionArea {
    color: PaletteColor,
    positions: HashSet<WorldPosition>,
}

impl ColorSelectionArea {
    #[must_use]
    pub fn color(&self) -> PaletteColor {
        self.color
    }

    /// Whether a position is one of this area's swatch markers.
    #[must_use]
    pub fn is_within(&self, pos: WorldPosition) -> bool {
        self.positions.contains(&pos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Scan a bounded volume and bucket every recognized palette marker by its
/// encoded color. Unrecognized positions are skipped silently. Areas come
/// back in first-seen order under the region's deterministic scan order.
#[must_use]
pub fn create_areas(region: &WorldRegion, source: &dyn MarkerSource) -> Vec<ColorSelectionArea> {
    let mut areas: Vec<ColorSelectionArea> = Vec::new();

    for pos in region.positions() {
        let Some(color) = source.marker_at(pos) else {
            continue;
        };
        match areas.iter_mut().find(|a| a.color == color) {
            Some(area) => {
                area.positions.insert(pos);
            }
            None => {
                areas.push(ColorSelectionArea { color, positions: HashSet::from([pos]) });
            }
        }
    }

    areas
}

/// The color a position selects, if any area claims it.
#[must_use]
pub fn color_at(areas: &[ColorSelectionArea], pos: WorldPosition) -> Option<PaletteColor> {
    areas.iter().find(|a| a.is_within(pos)).map(ColorSelectionArea::color)
}

#[cfg(test)]
#[path = "palette_test.rs"]
mod tests;
