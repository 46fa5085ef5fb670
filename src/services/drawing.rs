//! Drawing service — strokes, color picks, and tool selection.
//!
//! DESIGN
//! ======
//! Only the active drawer may touch the canvas, and only while a round is
//! running. A stroke arrives as a world position; it is projected onto the
//! canvas, routed through the player's selected tool, and fanned out to
//! every viewer by the canvas itself. Drag strokes interpolate a line from
//! the previous cell so fast cursor movement leaves no gaps.
//!
//! ERROR HANDLING
//! ==============
//! Every rejection is a typed `DrawError` with a stable code — clients
//! show "not your turn" style feedback off the code, never the message.

use tracing::debug;
use uuid::Uuid;

use crate::canvas::Point;
use crate::color::PaletteColor;
use crate::dispatch::FrameDispatcher;
use crate::palette;
use crate::state::{AppState, ArenaState};
use crate::tools::ToolItem;
use crate::world::WorldPosition;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error("arena not found: {0}")]
    ArenaNotFound(Uuid),
    #[error("player not registered: {0}")]
    UnknownPlayer(Uuid),
    #[error("no round in progress")]
    NoActiveRound,
    #[error("only the drawer may draw")]
    NotDrawer,
    #[error("position is outside the canvas")]
    OffCanvas,
    #[error("no tool in slot {0}")]
    UnknownTool(u8),
    #[error("no color swatch at that position")]
    NoSwatch,
}

impl crate::frame::ErrorCode for DrawError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ArenaNotFound(_) => "E_ARENA_NOT_FOUND",
            Self::UnknownPlayer(_) => "E_UNKNOWN_PLAYER",
            Self::NoActiveRound => "E_NO_ROUND",
            Self::NotDrawer => "E_NOT_DRAWER",
            Self::OffCanvas => "E_OFF_CANVAS",
            Self::UnknownTool(_) => "E_UNKNOWN_TOOL",
            Self::NoSwatch => "E_NO_SWATCH",
        }
    }
}

/// How a stroke event was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    /// A fresh press — always applies the tool.
    Press,
    /// Cursor movement while held — interpolated from the previous cell.
    Drag,
}

// =============================================================================
// STROKES
// =============================================================================

/// Apply one stroke event at a world position.
///
/// # Errors
///
/// Rejects strokes from anyone but the active drawer, strokes outside the
/// canvas plane, and strokes with an invalid tool slot.
pub async fn stroke(
    state: &AppState,
    arena_id: Uuid,
    client_id: Uuid,
    pos: WorldPosition,
    kind: StrokeKind,
) -> Result<(), DrawError> {
    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).ok_or(DrawError::ArenaNotFound(arena_id))?;

    if arena.round.is_none() {
        return Err(DrawError::NoActiveRound);
    }
    if !arena.is_drawer(client_id) {
        return Err(DrawError::NotDrawer);
    }

    // Projection ignores depth, so gate on the real plane first.
    if !arena.canvas.belongs(pos) {
        return Err(DrawError::OffCanvas);
    }
    let point = arena.canvas.point_at(pos).ok_or(DrawError::OffCanvas)?;
    let player = arena.players.get(&client_id).ok_or(DrawError::UnknownPlayer(client_id))?;
    let color = player.selected_color;
    let slot = player.tool_slot;
    let last = player.last_point;
    let tool = state.tools.by_slot(slot).ok_or(DrawError::UnknownTool(slot))?;

    let viewers = arena.viewers();
    {
        let ArenaState { canvas, clients, .. } = &mut *arena;
        let mut dispatcher = FrameDispatcher::new(clients, arena_id);

        match kind {
            StrokeKind::Press => {
                tool.apply(canvas, point, color, &mut dispatcher, &viewers);
            }
            StrokeKind::Drag => {
                // Walk the line from the previous cell so fast drags stay
                // continuous. Without a previous cell, apply in place.
                let cells = match last {
                    Some((lx, ly)) => line_cells(lx, ly, point.x, point.y),
                    None => vec![(point.x, point.y)],
                };
                for (x, y) in cells {
                    let Some(cell) = canvas.point(x, y) else {
                        continue;
                    };
                    tool.apply_move(canvas, cell, color, &mut dispatcher, &viewers);
                }
            }
        }
    }

    if let Some(player) = arena.players.get_mut(&client_id) {
        player.last_point = Some((point.x, point.y));
    }
    debug!(%arena_id, %client_id, x = point.x, y = point.y, ?kind, "stroke applied");
    Ok(())
}

/// Bresenham walk from `(x0, y0)` toward `(x1, y1)`, excluding the start
/// cell (already painted by the previous event).
fn line_cells(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    let mut cells = Vec::new();
    while (x, y) != (x1, y1) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        cells.push((x, y));
    }
    cells
}

// =============================================================================
// COLOR / TOOL SELECTION
// =============================================================================

/// Resolve a world position against the arena's picker wall and remember
/// the color for the player's next strokes.
///
/// # Errors
///
/// Returns `NoSwatch` when the position hits no selection area.
pub async fn pick_color(
    state: &AppState,
    arena_id: Uuid,
    client_id: Uuid,
    pos: WorldPosition,
) -> Result<PaletteColor, DrawError> {
    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).ok_or(DrawError::ArenaNotFound(arena_id))?;

    let color = palette::color_at(&arena.palette, pos).ok_or(DrawError::NoSwatch)?;
    let player = arena.players.get_mut(&client_id).ok_or(DrawError::UnknownPlayer(client_id))?;
    player.selected_color = color;
    debug!(%arena_id, %client_id, ?color, "color picked");
    Ok(color)
}

/// Switch the player's active tool by toolbar slot.
///
/// # Errors
///
/// Returns `UnknownTool` for a slot with no tool behind it.
pub async fn select_tool(
    state: &AppState,
    arena_id: Uuid,
    client_id: Uuid,
    slot: u8,
) -> Result<ToolItem, DrawError> {
    let item = state.tools.by_slot(slot).ok_or(DrawError::UnknownTool(slot))?.item();

    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).ok_or(DrawError::ArenaNotFound(arena_id))?;
    let player = arena.players.get_mut(&client_id).ok_or(DrawError::UnknownPlayer(client_id))?;
    player.tool_slot = slot;
    // Switching tools breaks any drag in progress.
    player.last_point = None;
    debug!(%arena_id, %client_id, slot, "tool selected");
    Ok(item)
}

/// Drop the drag anchor, e.g. when the cursor is released.
pub async fn release(state: &AppState, arena_id: Uuid, client_id: Uuid) {
    let mut arenas = state.arenas.write().await;
    if let Some(arena) = arenas.get_mut(&arena_id)
        && let Some(player) = arena.players.get_mut(&client_id)
    {
        player.last_point = None;
    }
}

#[cfg(test)]
#[path = "drawing_test.rs"]
mod tests;
