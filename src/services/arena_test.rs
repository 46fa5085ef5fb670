use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use super::*;
use crate::frame::Data;
use crate::state::test_helpers::{join_client, seed_arena, test_app_state};

async fn next_frame(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("frame receive timed out")
        .expect("channel closed")
}

#[tokio::test]
async fn create_arena_builds_canvas_and_palette() {
    let state = test_app_state();
    let arena_id = create_arena(&state, "atrium", 8, 4).await.expect("valid geometry");

    let arenas = state.arenas.read().await;
    let arena = arenas.get(&arena_id).expect("arena stored");
    assert_eq!(arena.canvas.max_point_x(), 7);
    assert_eq!(arena.canvas.max_point_y(), 3);
    assert_eq!(arena.canvas.points().len(), 32);
    assert_eq!(arena.palette.len(), 16, "one selection area per palette color");
}

#[tokio::test]
async fn create_arena_rejects_degenerate_geometry() {
    let state = test_app_state();
    let err = create_arena(&state, "broken", 1, 1).await.unwrap_err();
    assert!(matches!(err, ArenaError::Geometry(_)));
}

#[tokio::test]
async fn create_arena_bounds_wire_supplied_dimensions() {
    let state = test_app_state();

    let err = create_arena(&state, "huge", 100_000, 100_000).await.unwrap_err();
    assert!(matches!(err, ArenaError::Dimensions(100_000, 100_000)));

    let err = create_arena(&state, "empty", 0, 4).await.unwrap_err();
    assert!(matches!(err, ArenaError::Dimensions(0, 4)));
}

#[tokio::test]
async fn join_returns_summary_and_full_render() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;

    let client_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel(64);
    let summary = join_arena(&state, arena_id, client_id, "ada", tx)
        .await
        .expect("join succeeds");

    assert_eq!(summary.arena_id, arena_id);
    assert_eq!(summary.players.len(), 1);
    assert_eq!(summary.players[0].name, "ada");
    assert!(summary.round.is_none());

    // The joiner received the full canvas as canvas:patch frames.
    let mut rendered = 0usize;
    while let Ok(Some(frame)) = timeout(Duration::from_millis(100), rx.recv()).await {
        assert_eq!(frame.syscall, "canvas:patch");
        let changes = frame.data.get("changes").and_then(|v| v.as_array()).expect("changes");
        rendered += changes.len();
        if rendered >= 32 {
            break;
        }
    }
    assert_eq!(rendered, 32, "8×4 grid fully rendered to the joiner");
}

#[tokio::test]
async fn join_unknown_arena_is_not_found() {
    let state = test_app_state();
    let (tx, _rx) = mpsc::channel(8);
    let err = join_arena(&state, Uuid::new_v4(), Uuid::new_v4(), "ada", tx)
        .await
        .unwrap_err();
    assert!(matches!(err, ArenaError::NotFound(_)));
}

#[tokio::test]
async fn broadcast_skips_the_excluded_client() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, mut rx_a) = join_client(&state, arena_id, "a").await;
    let (_b, mut rx_b) = join_client(&state, arena_id, "b").await;

    // Drain join-time render frames.
    while timeout(Duration::from_millis(50), rx_a.recv()).await.is_ok() {}
    while timeout(Duration::from_millis(50), rx_b.recv()).await.is_ok() {}

    let frame = Frame::request("chat:message", Data::new()).with_arena_id(arena_id);
    broadcast(&state, arena_id, &frame, Some(a)).await;

    let got = next_frame(&mut rx_b).await;
    assert_eq!(got.syscall, "chat:message");
    assert!(
        timeout(Duration::from_millis(80), rx_a.recv()).await.is_err(),
        "excluded client stays silent"
    );
}

#[tokio::test]
async fn part_evicts_empty_arena() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (client, _rx) = join_client(&state, arena_id, "solo").await;

    part_arena(&state, arena_id, client).await;

    let arenas = state.arenas.read().await;
    assert!(!arenas.contains_key(&arena_id));
}

#[tokio::test]
async fn part_keeps_arena_with_remaining_clients() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (a, _rx_a) = join_client(&state, arena_id, "a").await;
    let (_b, _rx_b) = join_client(&state, arena_id, "b").await;

    part_arena(&state, arena_id, a).await;

    let arenas = state.arenas.read().await;
    let arena = arenas.get(&arena_id).expect("arena remains");
    assert_eq!(arena.clients.len(), 1);
    assert_eq!(arena.join_order.len(), 1);
}

#[tokio::test]
async fn list_reports_player_counts() {
    let state = test_app_state();
    let arena_id = seed_arena(&state).await;
    let (_a, _rx) = join_client(&state, arena_id, "a").await;

    let rows = list_arenas(&state).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].arena_id, arena_id);
    assert_eq!(rows[0].players, 1);
}
