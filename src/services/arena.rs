//! Arena service — create/list, join/part, and frame broadcast.
//!
//! DESIGN
//! ======
//! An arena is one game room: a canvas, its color-picker wall, and the
//! connected players. The canvas is built up front at creation so bad
//! geometry fails fast and no partial arena ever exists. A viewer joining
//! mid-round gets the full current canvas state rendered to them alone.
//!
//! ERROR HANDLING
//! ==============
//! When the active drawer disconnects, the round cannot continue — it is
//! ended with the word revealed and the next round starts with the next
//! drawer, rather than leaving guessers staring at a frozen canvas.

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::canvas::{Canvas, GeometryError};
use crate::color::ALL_COLORS;
use crate::dispatch::FrameDispatcher;
use crate::frame::Frame;
use crate::palette;
use crate::services::round;
use crate::state::{AppState, ArenaState, PlayerData};
use crate::world::{GridMarkerSource, WorldPosition, WorldRegion};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("arena not found: {0}")]
    NotFound(Uuid),
    #[error("invalid arena geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("canvas dimensions {0}x{1} out of range (1..={MAX_CANVAS_EDGE})")]
    Dimensions(i32, i32),
}

impl crate::frame::ErrorCode for ArenaError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ARENA_NOT_FOUND",
            Self::Geometry(_) => "E_BAD_GEOMETRY",
            Self::Dimensions(..) => "E_BAD_DIMENSIONS",
        }
    }
}

/// Arena state snapshot returned to a joining client.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArenaSummary {
    pub arena_id: Uuid,
    pub name: String,
    pub max_point_x: i32,
    pub max_point_y: i32,
    pub players: Vec<PlayerSummary>,
    pub round: Option<RoundSummary>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayerSummary {
    pub client_id: Uuid,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoundSummary {
    pub number: u32,
    pub drawer: Uuid,
    pub masked_word: String,
    pub seconds_left: u32,
}

/// Listing row for the lobby.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArenaRow {
    pub arena_id: Uuid,
    pub name: String,
    pub players: usize,
}

// =============================================================================
// GEOMETRY LAYOUT
// =============================================================================

/// Vertical base of every arena's canvas.
const CANVAS_BASE_Y: i32 = 64;

/// Gap between the canvas bottom edge and the picker wall.
const PALETTE_Y_OFFSET: i32 = 2;

/// Largest canvas edge accepted at creation. Dimensions arrive over the
/// wire, so they are bounded before any grid is allocated.
const MAX_CANVAS_EDGE: i32 = 256;

/// Canvas corners for a `width × height` arena: a vertical plane at `z = 0`.
#[must_use]
pub fn default_corners(width: i32, height: i32) -> (WorldPosition, WorldPosition) {
    (
        WorldPosition::new(0, CANVAS_BASE_Y + height - 1, 0),
        WorldPosition::new(width - 1, CANVAS_BASE_Y, 0),
    )
}

/// Lay out the 16-swatch picker wall below the canvas and scan it into
/// selection areas.
fn build_palette_wall() -> Vec<palette::ColorSelectionArea> {
    let y = CANVAS_BASE_Y - PALETTE_Y_OFFSET;
    let mut source = GridMarkerSource::new();
    for (i, color) in ALL_COLORS.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        source.place(WorldPosition::new(i as i32, y, 0), *color);
    }

    let region = WorldRegion::new(WorldPosition::new(0, y, 0), WorldPosition::new(15, y, 0));
    palette::create_areas(&region, &source)
}

// =============================================================================
// CREATE / LIST
// =============================================================================

/// Create a new arena with a `width × height` canvas.
///
/// # Errors
///
/// Fails fast on degenerate canvas geometry or out-of-range dimensions.
pub async fn create_arena(state: &AppState, name: &str, width: i32, height: i32) -> Result<Uuid, ArenaError> {
    if !(1..=MAX_CANVAS_EDGE).contains(&width) || !(1..=MAX_CANVAS_EDGE).contains(&height) {
        return Err(ArenaError::Dimensions(width, height));
    }
    let arena_id = Uuid::new_v4();
    let (corner_a, corner_b) = default_corners(width, height);
    let canvas = Canvas::new(arena_id, corner_a, corner_b)?;
    let palette = build_palette_wall();

    let mut arenas = state.arenas.write().await;
    arenas.insert(arena_id, ArenaState::new(name, canvas, palette));
    info!(%arena_id, name, width, height, "arena created");
    Ok(arena_id)
}

/// List all arenas with player counts.
pub async fn list_arenas(state: &AppState) -> Vec<ArenaRow> {
    let arenas = state.arenas.read().await;
    arenas
        .iter()
        .map(|(id, a)| ArenaRow { arena_id: *id, name: a.name.clone(), players: a.clients.len() })
        .collect()
}

// =============================================================================
// JOIN / PART
// =============================================================================

/// Join an arena: register the client, render the full current canvas to
/// them, and return a state snapshot for the reply frame.
///
/// # Errors
///
/// Returns `NotFound` for an unknown arena.
pub async fn join_arena(
    state: &AppState,
    arena_id: Uuid,
    client_id: Uuid,
    name: &str,
    tx: mpsc::Sender<Frame>,
) -> Result<ArenaSummary, ArenaError> {
    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).ok_or(ArenaError::NotFound(arena_id))?;

    arena.clients.insert(client_id, tx);
    arena.players.insert(client_id, PlayerData::new(name));
    arena.join_order.push(client_id);

    // Mid-round joiners see the picture so far.
    {
        let ArenaState { canvas, clients, .. } = &mut *arena;
        let mut dispatcher = FrameDispatcher::new(clients, arena_id);
        canvas.render_full(client_id, &mut dispatcher);
    }

    info!(%arena_id, %client_id, name, clients = arena.clients.len(), "client joined arena");
    Ok(summarize(arena_id, arena))
}

/// Leave an arena. Evicts the arena when the last client leaves; if the
/// drawer leaves mid-round, the round is ended and the next one started.
pub async fn part_arena(state: &AppState, arena_id: Uuid, client_id: Uuid) {
    let mut arenas = state.arenas.write().await;
    let Some(arena) = arenas.get_mut(&arena_id) else {
        return;
    };

    arena.clients.remove(&client_id);
    arena.players.remove(&client_id);
    arena.join_order.retain(|id| *id != client_id);
    let drawer_left = arena.is_drawer(client_id);
    info!(%arena_id, %client_id, remaining = arena.clients.len(), "client left arena");

    if arena.clients.is_empty() {
        arenas.remove(&arena_id);
        info!(%arena_id, "evicted empty arena");
        return;
    }

    if drawer_left {
        round::end_round(arena, &state.settings, &state.words, round::EndReason::DrawerLeft);
    }
}

fn summarize(arena_id: Uuid, arena: &ArenaState) -> ArenaSummary {
    ArenaSummary {
        arena_id,
        name: arena.name.clone(),
        max_point_x: arena.canvas.max_point_x(),
        max_point_y: arena.canvas.max_point_y(),
        players: arena
            .players
            .iter()
            .map(|(id, p)| PlayerSummary { client_id: *id, name: p.name.clone(), score: p.score })
            .collect(),
        round: arena.round.as_ref().map(|r| RoundSummary {
            number: r.number,
            drawer: r.drawer,
            masked_word: r.masked_word(),
            seconds_left: r.seconds_left,
        }),
    }
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Broadcast a frame to all clients in an arena, optionally excluding one.
pub async fn broadcast(state: &AppState, arena_id: Uuid, frame: &Frame, exclude: Option<Uuid>) {
    let arenas = state.arenas.read().await;
    let Some(arena) = arenas.get(&arena_id) else {
        return;
    };
    broadcast_sync(arena, frame, exclude);
}

/// Lock-free variant for callers already holding the arena entry.
pub fn broadcast_sync(arena: &ArenaState, frame: &Frame, exclude: Option<Uuid>) {
    for (client_id, tx) in &arena.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(frame.clone());
    }
}

/// Send a frame to a single client, best-effort.
pub fn send_to(arena: &ArenaState, client_id: Uuid, frame: &Frame) {
    if let Some(tx) = arena.clients.get(&client_id) {
        let _ = tx.try_send(frame.clone());
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod tests;
