//! The shared pixel canvas — one drawing surface rendered into world blocks.
//!
//! DESIGN
//! ======
//! A canvas owns a fixed grid of [`Point`]s enumerated once at construction
//! from the arena's two bounding corners. All mutation funnels through
//! `draw_pixels`, which batches the touched cells by spatial chunk so a
//! stroke costs one update per chunk rather than one per pixel — the core
//! performance goal of the whole subsystem.
//!
//! Geometry is immutable after construction: the full-render chunk grouping
//! (`cached_batches`) is computed lazily on the first `render_full` and is
//! valid for the canvas's entire lifetime. Colors are looked up fresh at
//! render time, so a cached grouping never serves stale pixels.
//!
//! ERROR HANDLING
//! ==============
//! Off-grid lookups return `None`. Draw requests naming cells that are not
//! grid members are dropped with a warning — the constructor enumerates the
//! exhaustive valid set, so such a request is always caller error. Dispatch
//! failures are logged per viewer and never abort the batch.

pub mod point;
pub mod transform;

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::color::PaletteColor;
use crate::dispatch::{BlockChange, ChunkUpdate, UpdateDispatcher};
use crate::world::{ChunkKey, WorldPosition};

pub use point::Point;
pub use transform::{GeometryError, Orientation};

// =============================================================================
// CANVAS
// =============================================================================

#[derive(Debug)]
pub struct Canvas {
    arena_id: Uuid,
    orientation: Orientation,
    /// Row-major grid: index `y * (max_x + 1) + x`.
    points: Vec<Point>,
    /// Geometry-only chunk grouping for full renders. Built on first use,
    /// never invalidated — it does not depend on color.
    cached_batches: Option<HashMap<ChunkKey, Vec<WorldPosition>>>,
}

impl Canvas {
    /// Build the canvas for an arena from its two bounding corners.
    ///
    /// # Errors
    ///
    /// Fails fast on degenerate or non-planar corners; no partial canvas is
    /// ever constructed.
    pub fn new(arena_id: Uuid, corner_a: WorldPosition, corner_b: WorldPosition) -> Result<Self, GeometryError> {
        let orientation = Orientation::resolve(corner_a, corner_b)?;

        let width = usize::try_from(orientation.max_x()).unwrap_or(0) + 1;
        let height = usize::try_from(orientation.max_y()).unwrap_or(0) + 1;
        let mut points = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..=orientation.max_y() {
            for x in 0..=orientation.max_x() {
                points.push(Point::blank(x, y));
            }
        }

        Ok(Self { arena_id, orientation, points, cached_batches: None })
    }

    #[must_use]
    pub fn arena_id(&self) -> Uuid {
        self.arena_id
    }

    #[must_use]
    pub fn max_point_x(&self) -> i32 {
        self.orientation.max_x()
    }

    #[must_use]
    pub fn max_point_y(&self) -> i32 {
        self.orientation.max_y()
    }

    /// Every grid cell, row-major from the bottom-left.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if (0..=self.max_point_x()).contains(&x) && (0..=self.max_point_y()).contains(&y) {
            usize::try_from(y * (self.max_point_x() + 1) + x).ok()
        } else {
            None
        }
    }

    /// The grid member at `(x, y)`, if in bounds.
    #[must_use]
    pub fn point(&self, x: i32, y: i32) -> Option<Point> {
        self.index_of(x, y).map(|i| self.points[i])
    }

    /// The grid member at `(origin.x + dx, origin.y + dy)`. `None` out of
    /// bounds — never an error.
    #[must_use]
    pub fn get_relative(&self, origin: Point, dx: i32, dy: i32) -> Option<Point> {
        self.point(origin.x + dx, origin.y + dy)
    }

    /// Whether a world position lies inside the canvas's bounding box.
    #[must_use]
    pub fn belongs(&self, pos: WorldPosition) -> bool {
        self.orientation.belongs(pos)
    }

    /// The grid member a world position projects onto, if any.
    #[must_use]
    pub fn point_at(&self, pos: WorldPosition) -> Option<Point> {
        let (x, y) = self.orientation.world_to_point(pos)?;
        self.point(x, y)
    }

    /// World position of a grid cell.
    #[must_use]
    pub fn world_position(&self, point: Point) -> WorldPosition {
        self.orientation.point_to_world(point.x, point.y)
    }
}

// =============================================================================
// DRAWING
// =============================================================================

impl Canvas {
    /// Color a single cell. Convenience wrapper over [`draw_pixels`].
    ///
    /// [`draw_pixels`]: Self::draw_pixels
    pub fn draw_pixel(
        &mut self,
        color: PaletteColor,
        point: Point,
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        self.draw_pixels(color, &[point], dispatcher, viewers);
    }

    /// Color many cells with one update per touched chunk.
    ///
    /// Groups the targets by the chunk containing each cell's world
    /// position, sends one [`ChunkUpdate`] per chunk to every viewer, then
    /// stores the new color. Targets that are not grid members are dropped
    /// with a warning.
    pub fn draw_pixels(
        &mut self,
        color: PaletteColor,
        targets: &[Point],
        dispatcher: &mut dyn UpdateDispatcher,
        viewers: &[Uuid],
    ) {
        let mut valid: Vec<usize> = Vec::with_capacity(targets.len());
        let mut by_chunk: HashMap<ChunkKey, Vec<WorldPosition>> = HashMap::new();

        for target in targets {
            let Some(index) = self.index_of(target.x, target.y) else {
                warn!(
                    arena_id = %self.arena_id,
                    x = target.x,
                    y = target.y,
                    "draw request for a cell outside the canvas grid; dropped"
                );
                continue;
            };
            let world = self.orientation.point_to_world(target.x, target.y);
            by_chunk.entry(world.chunk()).or_default().push(world);
            valid.push(index);
        }

        for (chunk, positions) in by_chunk {
            let update = ChunkUpdate {
                chunk,
                changes: positions
                    .into_iter()
                    .map(|position| BlockChange { position, color })
                    .collect(),
            };
            self.send_to_all(&update, dispatcher, viewers);
        }

        // Mutate stored state only after the batch has been dispatched.
        for index in valid {
            self.points[index].color = color;
        }
    }

    /// Set every cell to `color`.
    pub fn fill(&mut self, color: PaletteColor, dispatcher: &mut dyn UpdateDispatcher, viewers: &[Uuid]) {
        let all: Vec<Point> = self.points.clone();
        self.draw_pixels(color, &all, dispatcher, viewers);
    }

    /// Reset the canvas to blank.
    pub fn clear(&mut self, dispatcher: &mut dyn UpdateDispatcher, viewers: &[Uuid]) {
        self.fill(PaletteColor::BLANK, dispatcher, viewers);
    }

    fn send_to_all(&self, update: &ChunkUpdate, dispatcher: &mut dyn UpdateDispatcher, viewers: &[Uuid]) {
        for viewer in viewers {
            if let Err(e) = dispatcher.send(*viewer, update) {
                warn!(arena_id = %self.arena_id, %viewer, error = %e, "chunk update dropped for viewer");
            }
        }
    }
}

// =============================================================================
// FULL RENDER
// =============================================================================

impl Canvas {
    /// Send the entire current canvas state to one viewer.
    ///
    /// Used when a viewer joins mid-round. The chunk grouping is memoized
    /// (geometry never changes); colors are read from the grid at call time.
    pub fn render_full(&mut self, viewer: Uuid, dispatcher: &mut dyn UpdateDispatcher) {
        if self.cached_batches.is_none() {
            let mut batches: HashMap<ChunkKey, Vec<WorldPosition>> = HashMap::new();
            for p in &self.points {
                let world = self.orientation.point_to_world(p.x, p.y);
                batches.entry(world.chunk()).or_default().push(world);
            }
            self.cached_batches = Some(batches);
        }

        let Some(batches) = &self.cached_batches else {
            return;
        };

        for (chunk, positions) in batches {
            let changes = positions
                .iter()
                .filter_map(|&position| {
                    let point = self.point_at(position)?;
                    Some(BlockChange { position, color: point.color })
                })
                .collect();
            let update = ChunkUpdate { chunk: *chunk, changes };
            if let Err(e) = dispatcher.send(viewer, &update) {
                warn!(arena_id = %self.arena_id, %viewer, error = %e, "full render chunk dropped");
            }
        }
    }
}

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;
