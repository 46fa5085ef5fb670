use super::*;

#[test]
fn env_parse_falls_back_on_missing_or_garbage() {
    // Unique key per assertion so parallel tests never race on env state.
    assert_eq!(env_parse("DRAWARENA_TEST_MISSING_KEY", 7_i32), 7);

    unsafe { std::env::set_var("DRAWARENA_TEST_GARBAGE_KEY", "not a number") };
    assert_eq!(env_parse("DRAWARENA_TEST_GARBAGE_KEY", 7_i32), 7);

    unsafe { std::env::set_var("DRAWARENA_TEST_GOOD_KEY", "42") };
    assert_eq!(env_parse("DRAWARENA_TEST_GOOD_KEY", 7_i32), 42);
}

#[test]
fn default_settings_are_sane() {
    let settings = GameSettings::default();
    assert_eq!(settings.canvas_width, 32);
    assert_eq!(settings.canvas_height, 16);
    assert_eq!(settings.round_seconds, 90);
    assert_eq!(settings.min_players, 2);
    assert!(settings.words_file.is_none());
}

#[test]
fn new_players_start_blank() {
    let player = PlayerData::new("ada");
    assert_eq!(player.name, "ada");
    assert_eq!(player.score, 0);
    assert_eq!(player.selected_color, PaletteColor::BLANK);
    assert_eq!(player.tool_slot, 0);
    assert!(player.last_point.is_none());
}

#[test]
fn masked_word_hides_every_letter() {
    let round = RoundState {
        number: 1,
        drawer: Uuid::new_v4(),
        word: "house".into(),
        seconds_left: 90,
        guessed: Vec::new(),
    };
    assert_eq!(round.masked_word(), "_____");
}

#[tokio::test]
async fn arena_tracks_viewers_and_drawer() {
    let state = test_helpers::test_app_state();
    let arena_id = test_helpers::seed_arena(&state).await;
    let (a, _rx_a) = test_helpers::join_client(&state, arena_id, "a").await;
    let (b, _rx_b) = test_helpers::join_client(&state, arena_id, "b").await;

    let mut arenas = state.arenas.write().await;
    let arena = arenas.get_mut(&arena_id).unwrap();

    let mut viewers = arena.viewers();
    viewers.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(viewers, expected);

    assert!(!arena.is_drawer(a), "no round yet");
    arena.round = Some(RoundState {
        number: 1,
        drawer: a,
        word: "cat".into(),
        seconds_left: 30,
        guessed: Vec::new(),
    });
    assert!(arena.is_drawer(a));
    assert!(!arena.is_drawer(b));
}
