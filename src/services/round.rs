//! Round service — drawer rotation, word selection, guessing, scoring.
//!
//! DESIGN
//! ======
//! A round pairs one drawer with one hidden word. Guessers submit chat
//! frames; a correct guess scores by guess order plus a speed bonus, and the
//! drawer earns a cut per correct guesser. Rounds end when the timer runs
//! out, when everyone has guessed, or when the drawer disconnects. After
//! `ROUNDS_PER_GAME` rounds the game ends, final standings go out, and
//! scores reset.
//!
//! All round transitions are synchronous helpers over `&mut ArenaState`,
//! called under the arenas write lock — the same lock canvas mutation uses,
//! so a round never flips mid-stroke.

use rand::seq::IndexedRandom;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::FrameDispatcher;
use crate::frame::{Data, Frame};
use crate::services::arena::{broadcast_sync, send_to};
use crate::state::{AppState, ArenaState, GameSettings, RoundState};

// =============================================================================
// WORD BANK
// =============================================================================

/// Built-in word list, used when `WORDS_FILE` is not configured.
const STANDARD_WORDS: &[&str] = &[
    "anchor", "apple", "balloon", "banana", "bridge", "butterfly", "cactus", "camera",
    "candle", "castle", "cloud", "compass", "crown", "dolphin", "dragon", "drum",
    "elephant", "feather", "fireplace", "flashlight", "glacier", "guitar", "hammock",
    "island", "kite", "lantern", "lighthouse", "mermaid", "mountain", "mushroom",
    "octopus", "pirate ship", "pyramid", "rainbow", "robot", "rocket", "sandcastle",
    "scarecrow", "snowman", "submarine", "telescope", "tornado", "treehouse",
    "umbrella", "volcano", "waterfall", "windmill", "wizard",
];

/// The pool of drawable words.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    #[must_use]
    pub fn standard() -> Self {
        Self::from_words(STANDARD_WORDS.iter().copied())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// Load a newline-separated word list.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from reading the file.
    pub fn from_file(path: &str) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let words = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { words })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Pick a random word not in `used`. Falls back to the full pool when
    /// everything has been used.
    #[must_use]
    pub fn pick(&self, used: &[String]) -> Option<String> {
        let mut rng = rand::rng();
        let unused: Vec<&String> = self.words.iter().filter(|w| !used.contains(w)).collect();
        if unused.is_empty() {
            self.words.choose(&mut rng).cloned()
        } else {
            unused.choose(&mut rng).map(|w| (*w).clone())
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error("arena not found: {0}")]
    ArenaNotFound(Uuid),
}

impl crate::frame::ErrorCode for RoundError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ArenaNotFound(_) => "E_ARENA_NOT_FOUND",
        }
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    TimeUp,
    AllGuessed,
    DrawerLeft,
}

impl EndReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::TimeUp => "time_up",
            Self::AllGuessed => "all_guessed",
            Self::DrawerLeft => "drawer_left",
        }
    }
}

/// What became of one chat guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Right word; the guesser earned `award` points.
    Correct { award: i64 },
    /// Plain chat: wrong guess, or no round running.
    Chat,
    /// The drawer cannot guess their own word.
    Rejected,
}

// Scoring: first correct guess earns the full base, later guesses decay to a
// floor; remaining seconds are the speed bonus.
const GUESS_BASE: i64 = 100;
const GUESS_DECAY: i64 = 10;
const GUESS_FLOOR: i64 = 50;
const DRAWER_CUT: i64 = 25;

// =============================================================================
// ROUND LIFECYCLE
// =============================================================================

/// Start a round if none is running and enough players are present.
/// Returns true when a round was started.
pub fn maybe_start_round(arena: &mut ArenaState, settings: &GameSettings, words: &WordBank) -> bool {
    if arena.round.is_some() || arena.players.len() < settings.min_players {
        return false;
    }

    let Some(drawer) = next_drawer(arena) else {
        return false;
    };
    let Some(word) = words.pick(&arena.used_words) else {
        warn!(arena = %arena.canvas.arena_id(), "word bank is empty; cannot start round");
        return false;
    };
    arena.used_words.push(word.clone());

    // Fresh surface for the new drawer.
    let arena_id = arena.canvas.arena_id();
    let viewers = arena.viewers();
    {
        let ArenaState { canvas, clients, .. } = &mut *arena;
        let mut dispatcher = FrameDispatcher::new(clients, arena_id);
        canvas.clear(&mut dispatcher, &viewers);
    }

    for player in arena.players.values_mut() {
        player.last_point = None;
    }

    let round = RoundState {
        number: arena.rounds_played + 1,
        drawer,
        word,
        seconds_left: settings.round_seconds,
        guessed: Vec::new(),
    };

    let mut data = Data::new();
    data.insert("number".into(), serde_json::json!(round.number));
    data.insert("drawer".into(), serde_json::json!(round.drawer));
    data.insert("masked_word".into(), serde_json::json!(round.masked_word()));
    data.insert("seconds".into(), serde_json::json!(round.seconds_left));
    broadcast_sync(arena, &Frame::request("round:start", data).with_arena_id(arena_id), None);

    // Only the drawer learns the word.
    let word_frame = Frame::request("round:word", Data::new())
        .with_arena_id(arena_id)
        .with_data("word", round.word.clone());
    send_to(arena, drawer, &word_frame);

    info!(%arena_id, round = round.number, %drawer, "round started");
    arena.round = Some(round);
    true
}

/// End the current round, reveal the word, and chain into the next round
/// (or the end of the game).
pub fn end_round(arena: &mut ArenaState, settings: &GameSettings, words: &WordBank, reason: EndReason) {
    let Some(round) = arena.round.take() else {
        return;
    };
    let arena_id = arena.canvas.arena_id();

    let mut data = Data::new();
    data.insert("number".into(), serde_json::json!(round.number));
    data.insert("word".into(), serde_json::json!(round.word));
    data.insert("reason".into(), serde_json::json!(reason.as_str()));
    data.insert("scores".into(), serde_json::json!(standings(arena)));
    broadcast_sync(arena, &Frame::request("round:end", data).with_arena_id(arena_id), None);

    arena.last_drawer = Some(round.drawer);
    arena.rounds_played += 1;
    info!(%arena_id, round = round.number, reason = reason.as_str(), "round ended");

    if arena.rounds_played >= settings.rounds_per_game {
        finish_game(arena);
    }

    maybe_start_round(arena, settings, words);
}

fn finish_game(arena: &mut ArenaState) {
    let arena_id = arena.canvas.arena_id();
    let mut data = Data::new();
    data.insert("standings".into(), serde_json::json!(standings(arena)));
    broadcast_sync(arena, &Frame::request("game:end", data).with_arena_id(arena_id), None);
    info!(%arena_id, "game finished; scores reset");

    for player in arena.players.values_mut() {
        player.score = 0;
    }
    arena.rounds_played = 0;
    arena.used_words.clear();
}

/// Players sorted by score, best first.
fn standings(arena: &ArenaState) -> Vec<serde_json::Value> {
    let mut rows: Vec<(&Uuid, &crate::state::PlayerData)> = arena.players.iter().collect();
    rows.sort_by(|a, b| b.1.score.cmp(&a.1.score).then_with(|| a.1.name.cmp(&b.1.name)));
    rows.into_iter()
        .map(|(id, p)| serde_json::json!({"client_id": id, "name": p.name, "score": p.score}))
        .collect()
}

/// Round-robin over join order, starting after the previous drawer.
fn next_drawer(arena: &ArenaState) -> Option<Uuid> {
    if arena.join_order.is_empty() {
        return None;
    }
    let start = arena
        .last_drawer
        .and_then(|last| arena.join_order.iter().position(|id| *id == last))
        .map_or(0, |i| (i + 1) % arena.join_order.len());
    arena.join_order.get(start).copied()
}

// =============================================================================
// GUESSING
// =============================================================================

/// Evaluate one chat message as a guess.
///
/// # Errors
///
/// Returns `ArenaNotFound` for an unknown arena.
pub async fn guess(
    state: &AppState,
    arena_id: Uuid,
    client_id: Uuid,
    text: &str,
) -> Result<GuessOutcome, RoundError> {
    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).ok_or(RoundError::ArenaNotFound(arena_id))?;

    let Some(round) = &mut arena.round else {
        return Ok(GuessOutcome::Chat);
    };

    if round.drawer == client_id {
        return Ok(GuessOutcome::Rejected);
    }
    if round.guessed.contains(&client_id) {
        return Ok(GuessOutcome::Chat);
    }
    if !text.trim().eq_ignore_ascii_case(&round.word) {
        return Ok(GuessOutcome::Chat);
    }

    // Order decays the base award; remaining time is the speed bonus.
    #[allow(clippy::cast_possible_wrap)]
    let order = round.guessed.len() as i64;
    let award = (GUESS_BASE - GUESS_DECAY * order).max(GUESS_FLOOR) + i64::from(round.seconds_left);
    round.guessed.push(client_id);
    let drawer = round.drawer;
    let everyone_guessed = round.guessed.len() >= arena.players.len().saturating_sub(1);

    if let Some(player) = arena.players.get_mut(&client_id) {
        player.score += award;
    }
    if let Some(drawer_data) = arena.players.get_mut(&drawer) {
        drawer_data.score += DRAWER_CUT;
    }
    info!(%arena_id, %client_id, award, "correct guess");

    if everyone_guessed {
        end_round(arena, &state.settings, &state.words, EndReason::AllGuessed);
    }

    Ok(GuessOutcome::Correct { award })
}

// =============================================================================
// TICKER
// =============================================================================

/// Spawn the 1 Hz round ticker: counts rounds down, ends them at zero, and
/// starts rounds in arenas that have enough players waiting.
pub fn spawn_round_ticker(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tick_all(&state).await;
        }
    })
}

/// One ticker pass over every arena.
pub async fn tick_all(state: &AppState) {
    let mut arenas = state.arenas.write().await;
    for arena in arenas.values_mut() {
        match &mut arena.round {
            Some(round) => {
                round.seconds_left = round.seconds_left.saturating_sub(1);
                if round.seconds_left == 0 {
                    end_round(arena, &state.settings, &state.words, EndReason::TimeUp);
                }
            }
            None => {
                maybe_start_round(arena, &state.settings, &state.words);
            }
        }
    }
}

#[cfg(test)]
#[path = "round_test.rs"]
mod tests;
