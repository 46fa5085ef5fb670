//! A canvas cell: 2D grid address plus its current color.
//!
//! Identity is the `(x, y)` address only — two points at the same cell are
//! equal regardless of color, so a recolored point still hashes and compares
//! as the same grid member.

use serde::{Deserialize, Serialize};

use crate::color::PaletteColor;

/// One cell of a canvas grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub color: PaletteColor,
}

impl Point {
    #[must_use]
    pub fn new(x: i32, y: i32, color: PaletteColor) -> Self {
        Self { x, y, color }
    }

    /// A point at the given cell with the blank color.
    #[must_use]
    pub fn blank(x: i32, y: i32) -> Self {
        Self::new(x, y, PaletteColor::BLANK)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

#[cfg(test)]
#[path = "point_test.rs"]
mod tests;
