//! Painting tools — the capabilities a drawer applies to the canvas.
//!
//! DESIGN
//! ======
//! Each tool is an independent implementation of a two-method capability:
//! `apply` for a single use and `apply_move` for continuous drags (default
//! no-op; only brush-like tools override it). Tools mutate the canvas only
//! through `draw_pixels`, so batching and dispatch behavior is identical no
//! matter which tool produced the stroke. New tools plug in without touching
//! the canvas.
//!
//! Every tool also exposes a stable hotbar slot and an item identity so the
//! UI layer can build the drawer's toolbar.

use uuid::Uuid;

use crate::canvas::{Canvas, Point};
use crate::color::PaletteColor;
use crate::dispatch::UpdateDispatcher;

// =============================================================================
// CONTRACT
// =============================================================================

/// Item identity shown in the drawer's toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolItem {
    pub id: &'static str,
    pub label: &'static str,
}

/// A capability the active drawer applies to canvas cells.
pub trait PaintingTool: Send + Sync {
    /// Apply the tool once at `point`.
    fn apply(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    );

    /// Apply the tool while dragging. Default: drags do nothing.
    fn apply_move(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        let _ = (canvas, point, color, dispatcher, viewers);
    }

    /// Stable toolbar slot.
    fn slot(&self) -> u8;

    /// Item identity for toolbar selection.
    fn item(&self) -> ToolItem;
}

// =============================================================================
// PENCIL
// =============================================================================

/// Single-pixel brush. Drag-capable.
pub struct Pencil;

impl PaintingTool for Pencil {
    fn apply(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        canvas.draw_pixel(color, point, dispatcher, viewers);
    }

    fn apply_move(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        self.apply(canvas, point, color, dispatcher, viewers);
    }

    fn slot(&self) -> u8 {
        0
    }

    fn item(&self) -> ToolItem {
        ToolItem { id: "pencil", label: "Pencil" }
    }
}

// =============================================================================
// BRUSH
// =============================================================================

/// Diamond-shaped brush of the given radius. Drag-capable.
pub struct Brush {
    pub radius: i32,
}

/// Grid members within Manhattan distance `radius` of `point`.
fn diamond(canvas: &Canvas, point: Point, radius: i32) -> Vec<Point> {
    let mut out = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx.abs() + dy.abs() > radius {
                continue;
            }
            if let Some(p) = canvas.get_relative(point, dx, dy) {
                out.push(p);
            }
        }
    }
    out
}

impl PaintingTool for Brush {
    fn apply(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        let targets = diamond(canvas, point, self.radius);
        canvas.draw_pixels(color, &targets, dispatcher, viewers);
    }

    fn apply_move(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        self.apply(canvas, point, color, dispatcher, viewers);
    }

    fn slot(&self) -> u8 {
        1
    }

    fn item(&self) -> ToolItem {
        ToolItem { id: "brush", label: "Brush" }
    }
}

// =============================================================================
// ERASER
// =============================================================================

/// Brush that always paints the blank color, whatever the selected color is.
pub struct Eraser {
    pub radius: i32,
}

impl PaintingTool for Eraser {
    fn apply(
        &self,
        canvas: &mut Canvas,
        point: Point,
        _color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        let targets = diamond(canvas, point, self.radius);
        canvas.draw_pixels(PaletteColor::BLANK, &targets, dispatcher, viewers);
    }

    fn apply_move(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        self.apply(canvas, point, color, dispatcher, viewers);
    }

    fn slot(&self) -> u8 {
        2
    }

    fn item(&self) -> ToolItem {
        ToolItem { id: "eraser", label: "Eraser" }
    }
}

// =============================================================================
// BUCKET
// =============================================================================

/// Flood fill: recolors the connected region sharing the target's color.
/// Not drag-capable.
pub struct Bucket;

impl PaintingTool for Bucket {
    fn apply(
        &self,
        canvas: &mut Canvas,
        point: Point,
        color: PaletteColor,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        let Some(origin) = canvas.point(point.x, point.y) else {
            return;
        };
        if origin.color == color {
            return;
        }

        let match_color = origin.color;
        let mut region = vec![origin];
        let mut seen = std::collections::HashSet::from([origin]);
        let mut queue = std::collections::VecDeque::from([origin]);

        while let Some(current) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let Some(neighbor) = canvas.get_relative(current, dx, dy) else {
                    continue;
                };
                if neighbor.color != match_color || !seen.insert(neighbor) {
                    continue;
                }
                region.push(neighbor);
                queue.push_back(neighbor);
            }
        }

        canvas.draw_pixels(color, &region, dispatcher, viewers);
    }

    fn slot(&self) -> u8 {
        3
    }

    fn item(&self) -> ToolItem {
        ToolItem { id: "bucket", label: "Fill Bucket" }
    }
}

// =============================================================================
// TOOL SET
// =============================================================================

/// The toolbar: every available tool, addressable by slot.
pub struct ToolSet {
    tools: Vec<Box<dyn PaintingTool>>,
}

impl ToolSet {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            tools: vec![
                Box::new(Pencil),
                Box::new(Brush { radius: 1 }),
                Box::new(Eraser { radius: 1 }),
                Box::new(Bucket),
            ],
        }
    }

    #[must_use]
    pub fn by_slot(&self, slot: u8) -> Option<&dyn PaintingTool> {
        self.tools.iter().find(|t| t.slot() == slot).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn slots(&self) -> Vec<u8> {
        self.tools.iter().map(|t| t.slot()).collect()
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
