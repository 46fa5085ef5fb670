//! Scoreboard service — templated sidebar rendering on a timer.
//!
//! DESIGN
//! ======
//! The sidebar every player sees is declared as a template: a title, fixed
//! lines with `{placeholder}` slots, and named animations that cycle one
//! frame per render tick. A ticker re-renders the template per player
//! (placeholders like `{score}` and `{rank}` differ between viewers) and
//! ships the result as a `scoreboard:update` frame. Rendering is pure
//! string work; all game data comes from a per-player context map built
//! under the arenas lock.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::state::{AppState, ArenaState};

// =============================================================================
// ANIMATIONS
// =============================================================================

/// A named sequence of frames, advanced one step per render tick.
#[derive(Debug, Clone)]
pub struct ScoreboardAnimation {
    frames: Vec<String>,
    index: usize,
}

impl ScoreboardAnimation {
    #[must_use]
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { frames: frames.into_iter().map(Into::into).collect(), index: 0 }
    }

    /// The frame shown on this tick.
    #[must_use]
    pub fn current(&self) -> &str {
        self.frames.get(self.index).map_or("", String::as_str)
    }

    pub fn advance(&mut self) {
        if !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
        }
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// A declarative sidebar layout rendered against a placeholder context.
#[derive(Debug, Clone)]
pub struct ScoreboardTemplate {
    title: String,
    lines: Vec<String>,
    animations: HashMap<String, ScoreboardAnimation>,
}

/// One rendered sidebar, ready to send.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct RenderedScoreboard {
    pub title: String,
    pub lines: Vec<String>,
}

impl ScoreboardTemplate {
    #[must_use]
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self { title: title.into(), lines, animations: HashMap::new() }
    }

    #[must_use]
    pub fn with_animation(mut self, name: impl Into<String>, animation: ScoreboardAnimation) -> Self {
        self.animations.insert(name.into(), animation);
        self
    }

    /// The sidebar every arena ships with.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            "{spinner} {arena}",
            vec![
                "Round {round}".to_string(),
                "Time {time}s".to_string(),
                "Word {word}".to_string(),
                String::new(),
                "{player}".to_string(),
                "Score {score}  #{rank}".to_string(),
            ],
        )
        .with_animation("spinner", ScoreboardAnimation::new(["◐", "◓", "◑", "◒"]))
    }

    /// Substitute `{placeholder}` slots from `ctx`, then from animations.
    /// Unknown placeholders render as empty.
    #[must_use]
    pub fn render(&self, ctx: &HashMap<String, String>) -> RenderedScoreboard {
        RenderedScoreboard {
            title: self.render_line(&self.title, ctx),
            lines: self.lines.iter().map(|line| self.render_line(line, ctx)).collect(),
        }
    }

    /// Step every animation to its next frame.
    pub fn tick(&mut self) {
        for animation in self.animations.values_mut() {
            animation.advance();
        }
    }

    fn render_line(&self, line: &str, ctx: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                // Unterminated brace, keep it literally.
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            if let Some(value) = ctx.get(key) {
                out.push_str(value);
            } else if let Some(animation) = self.animations.get(key) {
                out.push_str(animation.current());
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Placeholder context for one viewer in one arena.
fn player_context(arena: &ArenaState, client_id: Uuid) -> HashMap<String, String> {
    let mut ctx = HashMap::new();
    ctx.insert("arena".into(), arena.name.clone());

    match &arena.round {
        Some(round) => {
            ctx.insert("round".into(), round.number.to_string());
            ctx.insert("time".into(), round.seconds_left.to_string());
            // The drawer sees the word, guessers see the mask.
            let word = if round.drawer == client_id {
                round.word.clone()
            } else {
                round.masked_word()
            };
            ctx.insert("word".into(), word);
        }
        None => {
            ctx.insert("round".into(), "-".into());
            ctx.insert("time".into(), "-".into());
            ctx.insert("word".into(), "waiting...".into());
        }
    }

    if let Some(player) = arena.players.get(&client_id) {
        ctx.insert("player".into(), player.name.clone());
        ctx.insert("score".into(), player.score.to_string());
        ctx.insert("rank".into(), rank_of(arena, client_id).to_string());
    }
    ctx
}

/// 1-based standing of `client_id` by score, ties sharing the better rank.
fn rank_of(arena: &ArenaState, client_id: Uuid) -> usize {
    let Some(me) = arena.players.get(&client_id) else {
        return arena.players.len();
    };
    1 + arena.players.values().filter(|p| p.score > me.score).count()
}

// =============================================================================
// TICKER
// =============================================================================

/// Spawn the scoreboard ticker: every `scoreboard_update_ms` it re-renders
/// the sidebar for each connected player and pushes a `scoreboard:update`.
pub fn spawn_scoreboard_ticker(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut template = ScoreboardTemplate::standard();
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(
            state.settings.scoreboard_update_ms,
        ));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            template.tick();
            push_all(&state, &template).await;
        }
    })
}

/// One render pass over every arena and viewer.
pub async fn push_all(state: &AppState, template: &ScoreboardTemplate) {
    let arenas = state.arenas.read().await;
    for arena in arenas.values() {
        let arena_id = arena.canvas.arena_id();
        for (client_id, tx) in &arena.clients {
            let rendered = template.render(&player_context(arena, *client_id));
            let mut data = Data::new();
            data.insert("title".into(), serde_json::json!(rendered.title));
            data.insert("lines".into(), serde_json::json!(rendered.lines));
            let frame = Frame::request("scoreboard:update", data).with_arena_id(arena_id);
            // Slow consumers miss a tick, never block the renderer.
            let _ = tx.try_send(frame);
        }
    }
}

#[cfg(test)]
#[path = "scoreboard_test.rs"]
mod tests;
