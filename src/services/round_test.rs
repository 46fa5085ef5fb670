use tokio::time::{Duration, timeout};
use uuid::Uuid;

use super::*;
use crate::state::test_helpers::{join_client, seed_arena, test_app_state};
use crate::state::{AppState, GameSettings};

async fn current_word(state: &AppState, arena_id: Uuid) -> String {
    let arenas = state.arenas.read().await;
    arenas[&arena_id].round.as_ref().expect("round running").word.clone()
}

async fn current_drawer(state: &AppState, arena_id: Uuid) -> Uuid {
    let arenas = state.arenas.read().await;
    arenas[&arena_id].round.as_ref().expect("round running").drawer
}

async fn score_of(state: &AppState, arena_id: Uuid, client: Uuid) -> i64 {
    let arenas = state.arenas.read().await;
    arenas[&arena_id].players[&client].score
}

// =============================================================================
// WORD BANK
// =============================================================================

#[test]
fn word_bank_prefers_unused_words() {
    let bank = WordBank::from_words(["alpha", "beta"]);
    let used = vec!["alpha".to_string()];
    for _ in 0..20 {
        assert_eq!(bank.pick(&used).as_deref(), Some("beta"));
    }
}

#[test]
fn exhausted_word_bank_falls_back_to_full_pool() {
    let bank = WordBank::from_words(["alpha"]);
    let used = vec!["alpha".to_string()];
    assert_eq!(bank.pick(&used).as_deref(), Some("alpha"));
}

#[test]
fn empty_word_bank_picks_nothing() {
    let bank = WordBank::from_words(Vec::<String>::new());
    assert!(bank.is_empty());
    assert_eq!(bank.pick(&[]), None);
}

#[test]
fn standard_bank_is_populated() {
    assert!(WordBank::standard().len() > 40);
}

// =============================================================================
// ROUND LIFECYCLE
// =============================================================================

#[tokio::test]
async fn round_starts_once_enough_players_are_present() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, mut rx_a) = join_client(&state, arena_id, "a").await;

    // One player: the ticker must not start anything.
    tick_all(&state).await;
    {
        let arenas = state.arenas.read().await;
        assert!(arenas[&arena_id].round.is_none());
    }

    let (_b, mut rx_b) = join_client(&state, arena_id, "b").await;
    tick_all(&state).await;

    let word = current_word(&state, arena_id).await;
    let drawer = current_drawer(&state, arena_id).await;
    assert_eq!(drawer, a, "first joiner draws first");

    // Both clients saw round:start; only the drawer saw round:word.
    let mut a_saw_word = false;
    let mut a_saw_start = false;
    while let Ok(Some(frame)) = timeout(Duration::from_millis(100), rx_a.recv()).await {
        match frame.syscall.as_str() {
            "round:word" => {
                assert_eq!(frame.data.get("word").and_then(|v| v.as_str()), Some(word.as_str()));
                a_saw_word = true;
            }
            "round:start" => {
                let masked = frame.data.get("masked_word").and_then(|v| v.as_str()).unwrap();
                assert!(!masked.contains(|c: char| c.is_alphabetic()), "word is hidden");
                a_saw_start = true;
            }
            _ => {}
        }
    }
    assert!(a_saw_word && a_saw_start);

    let mut b_saw_word = false;
    while let Ok(Some(frame)) = timeout(Duration::from_millis(100), rx_b.recv()).await {
        if frame.syscall == "round:word" {
            b_saw_word = true;
        }
    }
    assert!(!b_saw_word, "guessers never receive the word");
}

#[test]
fn masked_word_preserves_spaces() {
    let round = crate::state::RoundState {
        number: 1,
        drawer: Uuid::new_v4(),
        word: "rocket ship".into(),
        seconds_left: 30,
        guessed: Vec::new(),
    };
    assert_eq!(round.masked_word(), "______ ____");
}

#[tokio::test]
async fn drawer_rotates_in_join_order() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (b, _rx_b) = join_client(&state, arena_id, "b").await;

    tick_all(&state).await;
    assert_eq!(current_drawer(&state, arena_id).await, a);

    {
        let mut arenas = state.arenas.write().await;
        let arena = arenas.get_mut(&arena_id).unwrap();
        end_round(arena, &state.settings, &state.words, EndReason::TimeUp);
    }
    // end_round chains straight into the next round.
    assert_eq!(current_drawer(&state, arena_id).await, b);

    {
        let mut arenas = state.arenas.write().await;
        let arena = arenas.get_mut(&arena_id).unwrap();
        end_round(arena, &state.settings, &state.words, EndReason::TimeUp);
    }
    assert_eq!(current_drawer(&state, arena_id).await, a, "rotation wraps");
}

#[tokio::test]
async fn ticker_ends_round_at_zero() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (_a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (_b, _rx_b) = join_client(&state, arena_id, "b").await;
    tick_all(&state).await;

    {
        let mut arenas = state.arenas.write().await;
        let round = arenas.get_mut(&arena_id).unwrap().round.as_mut().unwrap();
        round.seconds_left = 1;
    }
    tick_all(&state).await;

    let arenas = state.arenas.read().await;
    let arena = &arenas[&arena_id];
    assert_eq!(arena.rounds_played, 1);
    let next = arena.round.as_ref().expect("next round chained");
    assert_eq!(next.number, 2);
}

// =============================================================================
// GUESSING
// =============================================================================

#[tokio::test]
async fn correct_guess_awards_guesser_and_drawer() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (b, _rx_b) = join_client(&state, arena_id, "b").await;
    let (_c, _rx_c) = join_client(&state, arena_id, "c").await;
    tick_all(&state).await;

    let word = current_word(&state, arena_id).await;
    let seconds = state.settings.round_seconds;

    let outcome = guess(&state, arena_id, b, &format!("  {} ", word.to_uppercase()))
        .await
        .expect("arena exists");
    let GuessOutcome::Correct { award } = outcome else {
        panic!("trimmed case-insensitive match should be correct");
    };
    assert_eq!(award, 100 + i64::from(seconds));
    assert_eq!(score_of(&state, arena_id, b).await, award);
    assert_eq!(score_of(&state, arena_id, a).await, 25, "drawer cut");
}

#[tokio::test]
async fn later_guesses_decay_and_round_ends_when_all_guess() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (_a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (b, _rx_b) = join_client(&state, arena_id, "b").await;
    let (c, _rx_c) = join_client(&state, arena_id, "c").await;
    tick_all(&state).await;

    let word = current_word(&state, arena_id).await;
    let seconds = i64::from(state.settings.round_seconds);

    let first = guess(&state, arena_id, b, &word).await.unwrap();
    assert_eq!(first, GuessOutcome::Correct { award: 100 + seconds });

    let second = guess(&state, arena_id, c, &word).await.unwrap();
    assert_eq!(second, GuessOutcome::Correct { award: 90 + seconds });

    // Every guesser got it: the round ended and the next one began.
    let arenas = state.arenas.read().await;
    assert_eq!(arenas[&arena_id].rounds_played, 1);
}

#[tokio::test]
async fn drawer_guess_is_rejected() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (_b, _rx_b) = join_client(&state, arena_id, "b").await;
    tick_all(&state).await;

    let word = current_word(&state, arena_id).await;
    assert_eq!(guess(&state, arena_id, a, &word).await.unwrap(), GuessOutcome::Rejected);
}

#[tokio::test]
async fn wrong_guess_is_plain_chat() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (_a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (b, _rx_b) = join_client(&state, arena_id, "b").await;
    tick_all(&state).await;

    assert_eq!(
        guess(&state, arena_id, b, "definitely not it").await.unwrap(),
        GuessOutcome::Chat
    );
    assert_eq!(score_of(&state, arena_id, b).await, 0);
}

#[tokio::test]
async fn chat_without_a_round_is_plain_chat() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;

    assert_eq!(guess(&state, arena_id, a, "hello").await.unwrap(), GuessOutcome::Chat);
}

// =============================================================================
// GAME END
// =============================================================================

#[tokio::test]
async fn game_ends_after_configured_rounds_and_resets_scores() {
    let settings = GameSettings { min_players: 2, rounds_per_game: 1, ..GameSettings::default() };
    let state = AppState::new(settings, WordBank::from_words(["cat", "dog"]));
    let arena_id = seed_arena(&state).await;
    let (_a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (b, mut rx_b) = join_client(&state, arena_id, "b").await;
    tick_all(&state).await;

    let word = current_word(&state, arena_id).await;
    guess(&state, arena_id, b, &word).await.unwrap();

    // Round 1 was the whole game: standings went out, scores reset,
    // and a fresh game started.
    let mut saw_game_end = false;
    while let Ok(Some(frame)) = timeout(Duration::from_millis(100), rx_b.recv()).await {
        if frame.syscall == "game:end" {
            assert!(frame.data.contains_key("standings"));
            saw_game_end = true;
        }
    }
    assert!(saw_game_end);
    assert_eq!(score_of(&state, arena_id, b).await, 0);

    let arenas = state.arenas.read().await;
    assert_eq!(arenas[&arena_id].rounds_played, 0);
    assert!(arenas[&arena_id].round.is_some(), "new game chained");
}

#[tokio::test]
async fn drawer_disconnect_ends_round_with_reveal() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (_b, mut rx_b) = join_client(&state, arena_id, "b").await;
    let (_c, _rx_c) = join_client(&state, arena_id, "c").await;
    tick_all(&state).await;
    assert_eq!(current_drawer(&state, arena_id).await, a);
    let word = current_word(&state, arena_id).await;

    crate::services::arena::part_arena(&state, arena_id, a).await;

    let mut saw_reveal = false;
    while let Ok(Some(frame)) = timeout(Duration::from_millis(100), rx_b.recv()).await {
        if frame.syscall == "round:end" {
            assert_eq!(frame.data.get("word").and_then(|v| v.as_str()), Some(word.as_str()));
            assert_eq!(frame.data.get("reason").and_then(|v| v.as_str()), Some("drawer_left"));
            saw_reveal = true;
        }
    }
    assert!(saw_reveal);

    // The next round started with a remaining player drawing.
    let next_drawer = current_drawer(&state, arena_id).await;
    assert_ne!(next_drawer, a);
}
