//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live arena map plus the immutable pieces every arena shares:
//! game settings, the tool set, and the word bank. Each arena owns its
//! canvas, palette areas, connected clients, per-player game data, and the
//! current round — all mutation happens under the arenas write lock, which
//! keeps canvas operations strictly ordered.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::canvas::Canvas;
use crate::color::PaletteColor;
use crate::frame::Frame;
use crate::palette::ColorSelectionArea;
use crate::services::round::WordBank;
use crate::tools::ToolSet;

// =============================================================================
// SETTINGS
// =============================================================================

const DEFAULT_CANVAS_WIDTH: i32 = 32;
const DEFAULT_CANVAS_HEIGHT: i32 = 16;
const DEFAULT_ROUND_SECONDS: u32 = 90;
const DEFAULT_ROUNDS_PER_GAME: u32 = 10;
const DEFAULT_MIN_PLAYERS: usize = 2;
const DEFAULT_SCOREBOARD_UPDATE_MS: u64 = 1000;

/// Game tuning knobs, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GameSettings {
    /// Default canvas width in cells for arenas created without corners.
    pub canvas_width: i32,
    /// Default canvas height in cells.
    pub canvas_height: i32,
    /// Round length in seconds.
    pub round_seconds: u32,
    /// Rounds before the game ends and scores reset.
    pub rounds_per_game: u32,
    /// Connected players required before a round starts.
    pub min_players: usize,
    /// Scoreboard re-render interval.
    pub scoreboard_update_ms: u64,
    /// Optional newline-separated word list file.
    pub words_file: Option<String>,
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl GameSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            canvas_width: env_parse("CANVAS_WIDTH", DEFAULT_CANVAS_WIDTH),
            canvas_height: env_parse("CANVAS_HEIGHT", DEFAULT_CANVAS_HEIGHT),
            round_seconds: env_parse("ROUND_SECONDS", DEFAULT_ROUND_SECONDS),
            rounds_per_game: env_parse("ROUNDS_PER_GAME", DEFAULT_ROUNDS_PER_GAME),
            min_players: env_parse("MIN_PLAYERS", DEFAULT_MIN_PLAYERS),
            scoreboard_update_ms: env_parse("SCOREBOARD_UPDATE_MS", DEFAULT_SCOREBOARD_UPDATE_MS),
            words_file: std::env::var("WORDS_FILE").ok(),
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            round_seconds: DEFAULT_ROUND_SECONDS,
            rounds_per_game: DEFAULT_ROUNDS_PER_GAME,
            min_players: DEFAULT_MIN_PLAYERS,
            scoreboard_update_ms: DEFAULT_SCOREBOARD_UPDATE_MS,
            words_file: None,
        }
    }
}

// =============================================================================
// PLAYER DATA
// =============================================================================

/// Per-player game data, kept for the lifetime of the connection.
#[derive(Debug, Clone)]
pub struct PlayerData {
    pub name: String,
    pub score: i64,
    pub selected_color: PaletteColor,
    pub tool_slot: u8,
    /// Last canvas cell this player drew on, for drag strokes.
    pub last_point: Option<(i32, i32)>,
}

impl PlayerData {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            selected_color: PaletteColor::BLANK,
            tool_slot: 0,
            last_point: None,
        }
    }
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// One drawing round in progress.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub number: u32,
    pub drawer: Uuid,
    pub word: String,
    pub seconds_left: u32,
    /// Clients who guessed correctly, in guess order.
    pub guessed: Vec<Uuid>,
}

impl RoundState {
    /// The word with letters hidden, as shown to guessers.
    #[must_use]
    pub fn masked_word(&self) -> String {
        self.word
            .chars()
            .map(|c| if c == ' ' { ' ' } else { '_' })
            .collect()
    }
}

// =============================================================================
// ARENA STATE
// =============================================================================

/// Per-arena live state. Owned exclusively by the arenas map entry.
pub struct ArenaState {
    pub name: String,
    pub canvas: Canvas,
    /// Color picker areas, scanned once at arena creation.
    pub palette: Vec<ColorSelectionArea>,
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
    pub players: HashMap<Uuid, PlayerData>,
    /// Join order, drives drawer rotation.
    pub join_order: Vec<Uuid>,
    pub round: Option<RoundState>,
    /// Words already used this game, not offered again.
    pub used_words: Vec<String>,
    /// Completed rounds this game.
    pub rounds_played: u32,
    /// Drawer of the previous round, anchor for rotation.
    pub last_drawer: Option<Uuid>,
}

impl ArenaState {
    #[must_use]
    pub fn new(name: impl Into<String>, canvas: Canvas, palette: Vec<ColorSelectionArea>) -> Self {
        Self {
            name: name.into(),
            canvas,
            palette,
            clients: HashMap::new(),
            players: HashMap::new(),
            join_order: Vec::new(),
            round: None,
            used_words: Vec::new(),
            rounds_played: 0,
            last_drawer: None,
        }
    }

    /// Current viewer IDs, the recipients of every canvas update.
    #[must_use]
    pub fn viewers(&self) -> Vec<Uuid> {
        self.clients.keys().copied().collect()
    }

    /// Whether `client_id` is the active drawer.
    #[must_use]
    pub fn is_drawer(&self, client_id: Uuid) -> bool {
        self.round.as_ref().is_some_and(|r| r.drawer == client_id)
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub arenas: Arc<RwLock<HashMap<Uuid, ArenaState>>>,
    pub settings: GameSettings,
    pub tools: Arc<ToolSet>,
    pub words: Arc<WordBank>,
}

impl AppState {
    #[must_use]
    pub fn new(settings: GameSettings, words: WordBank) -> Self {
        Self {
            arenas: Arc::new(RwLock::new(HashMap::new())),
            settings,
            tools: Arc::new(ToolSet::standard()),
            words: Arc::new(words),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
