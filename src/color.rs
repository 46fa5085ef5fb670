//! The 16-value drawing palette.
//!
//! Colors travel on the wire as lowercase snake_case strings and map to the
//! host world's marker encoding as a stable `0..=15` value (`marker_value` /
//! `from_marker_value`). White is the blank canvas color.

use serde::{Deserialize, Serialize};

/// One of the 16 discrete colors a canvas cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

/// All palette colors in marker-encoding order.
pub const ALL_COLORS: [PaletteColor; 16] = [
    PaletteColor::White,
    PaletteColor::Orange,
    PaletteColor::Magenta,
    PaletteColor::LightBlue,
    PaletteColor::Yellow,
    PaletteColor::Lime,
    PaletteColor::Pink,
    PaletteColor::Gray,
    PaletteColor::LightGray,
    PaletteColor::Cyan,
    PaletteColor::Purple,
    PaletteColor::Blue,
    PaletteColor::Brown,
    PaletteColor::Green,
    PaletteColor::Red,
    PaletteColor::Black,
];

impl PaletteColor {
    /// The blank canvas color.
    pub const BLANK: PaletteColor = PaletteColor::White;

    /// Stable marker encoding, `0..=15`.
    #[must_use]
    pub fn marker_value(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let idx = ALL_COLORS.iter().position(|c| *c == self).unwrap_or(0) as u8;
        idx
    }

    /// Decode a marker value. `None` for anything outside `0..=15`.
    #[must_use]
    pub fn from_marker_value(value: u8) -> Option<Self> {
        ALL_COLORS.get(usize::from(value)).copied()
    }
}
