//! WebSocket handler — bidirectional frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → parse + dispatch by syscall prefix
//! - Broadcast frames from arena peers → forward to client
//!
//! Handler functions are pure business logic — they validate, call into the
//! services, and return an `Outcome`. The dispatch layer owns all outbound
//! concerns: reply to sender and broadcast to peers. Canvas updates are the
//! one exception: the canvas fans those out itself while the stroke is
//! applied, so draw handlers only ever reply.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. Client sends frames → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply / broadcast / both)
//! 4. Close → broadcast `arena:part` → cleanup

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, FRAME_TEXT, Frame};
use crate::services::drawing::StrokeKind;
use crate::services::round::GuessOutcome;
use crate::services::{arena, drawing, round};
use crate::state::AppState;
use crate::world::WorldPosition;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what — handlers never send frames directly.
enum Outcome {
    /// Broadcast done+data to ALL arena clients including sender.
    /// Sender's copy carries `parent_id` for correlation.
    Broadcast(Data),
    /// Send done+data to sender only.
    Reply(Data),
    /// Send empty done to sender only.
    Done,
    /// Reply to sender with one payload, broadcast different data to peers.
    ReplyAndBroadcast { reply: Data, broadcast: Data },
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let name = params
        .get("name")
        .map_or_else(|| "player".to_string(), |n| n.trim().to_string());
    ws.on_upgrade(move |socket| run_ws(socket, state, name))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, name: String) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for receiving broadcast frames from peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(256);

    let welcome = Frame::request("session:connected", Data::new())
        .with_data("client_id", client_id.to_string())
        .with_data("name", name.clone());
    if send_frame(&mut socket, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, name = %name, "ws: client connected");

    // Track which arena this client has joined.
    let mut current_arena: Option<Uuid> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let frames = process_inbound_text(
                            &state, &mut current_arena, client_id, &name, &client_tx, &text,
                        ).await;
                        for frame in frames {
                            if send_frame(&mut socket, &frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    // Broadcast arena:part to peers BEFORE cleanup (part_arena may evict state).
    if let Some(arena_id) = current_arena {
        let mut part_data = Data::new();
        part_data.insert("client_id".into(), serde_json::json!(client_id));
        part_data.insert("name".into(), serde_json::json!(name));
        let part_frame = Frame::request("arena:part", part_data).with_arena_id(arena_id);
        arena::broadcast(&state, arena_id, &part_frame, Some(client_id)).await;

        arena::part_arena(&state, arena_id, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Parse and process one inbound text frame and return frames for the sender.
///
/// This keeps the websocket transport concerns separate from frame handling,
/// so tests can exercise dispatch and broadcast behavior end-to-end.
async fn process_inbound_text(
    state: &AppState,
    current_arena: &mut Option<Uuid>,
    client_id: Uuid,
    name: &str,
    client_tx: &mpsc::Sender<Frame>,
    text: &str,
) -> Vec<Frame> {
    let mut req: Frame = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            let err = Frame::request("gateway:error", Data::new())
                .with_data("message", format!("invalid json: {e}"));
            return vec![err];
        }
    };

    // Stamp the sender identity as `from`.
    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");

    let result = match req.prefix() {
        "arena" => handle_arena(state, current_arena, client_id, name, client_tx, &req).await,
        "draw" => handle_draw(state, *current_arena, client_id, &req).await,
        "chat" => handle_chat(state, *current_arena, client_id, name, &req).await,
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    // Apply outcome — the dispatch layer owns all outbound logic.
    let arena_id = *current_arena;
    match result {
        Ok(Outcome::Broadcast(data)) => {
            let sender_frame = req.done_with(data);
            // Peers get a copy without parent_id (they didn't originate it).
            let mut peer_frame = sender_frame.clone();
            peer_frame.id = Uuid::new_v4();
            peer_frame.parent_id = None;
            if let Some(aid) = arena_id {
                arena::broadcast(state, aid, &peer_frame, Some(client_id)).await;
            }
            vec![sender_frame]
        }
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Done) => vec![req.done()],
        Ok(Outcome::ReplyAndBroadcast { reply, broadcast }) => {
            let sender_frame = req.done_with(reply);
            if let Some(aid) = arena_id {
                let notif = Frame::request(&req.syscall, broadcast).with_arena_id(aid);
                arena::broadcast(state, aid, &notif, Some(client_id)).await;
            }
            vec![sender_frame]
        }
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// ARENA HANDLERS
// =============================================================================

async fn handle_arena(
    state: &AppState,
    current_arena: &mut Option<Uuid>,
    client_id: Uuid,
    name: &str,
    client_tx: &mpsc::Sender<Frame>,
    req: &Frame,
) -> Result<Outcome, Frame> {
    match req.op() {
        "create" => {
            let arena_name = req
                .data
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Untitled Arena");
            let width = int_field(req, "width").unwrap_or(state.settings.canvas_width);
            let height = int_field(req, "height").unwrap_or(state.settings.canvas_height);
            match arena::create_arena(state, arena_name, width, height).await {
                Ok(arena_id) => {
                    let mut data = Data::new();
                    data.insert("arena_id".into(), serde_json::json!(arena_id));
                    data.insert("name".into(), serde_json::json!(arena_name));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "list" => {
            let rows = arena::list_arenas(state).await;
            let mut data = Data::new();
            data.insert("arenas".into(), serde_json::json!(rows));
            Ok(Outcome::Reply(data))
        }
        "join" => {
            let Some(arena_id) = req.arena_id.or_else(|| uuid_field(req, "arena_id")) else {
                return Err(req.error("arena_id required"));
            };

            // Part the current arena if already joined somewhere. Peers there
            // get the same arena:part notification as an explicit part.
            if let Some(old) = current_arena.take() {
                let mut data = Data::new();
                data.insert("client_id".into(), serde_json::json!(client_id));
                data.insert("name".into(), serde_json::json!(name));
                let notif = Frame::request("arena:part", data).with_arena_id(old);
                arena::broadcast(state, old, &notif, Some(client_id)).await;
                arena::part_arena(state, old, client_id).await;
            }

            match arena::join_arena(state, arena_id, client_id, name, client_tx.clone()).await {
                Ok(summary) => {
                    *current_arena = Some(arena_id);

                    // Enough players may now be waiting — start right away
                    // instead of waiting out the ticker.
                    {
                        let mut arenas = state.arenas.write().await;
                        if let Some(arena_state) = arenas.get_mut(&arena_id) {
                            round::maybe_start_round(arena_state, &state.settings, &state.words);
                        }
                    }

                    let mut reply = Data::new();
                    reply.insert(
                        "arena".into(),
                        serde_json::to_value(&summary).unwrap_or_default(),
                    );

                    let mut broadcast = Data::new();
                    broadcast.insert("client_id".into(), serde_json::json!(client_id));
                    broadcast.insert("name".into(), serde_json::json!(name));

                    Ok(Outcome::ReplyAndBroadcast { reply, broadcast })
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "part" => {
            let Some(arena_id) = current_arena.take() else {
                return Err(req.error("not in an arena"));
            };
            let mut data = Data::new();
            data.insert("client_id".into(), serde_json::json!(client_id));
            data.insert("name".into(), serde_json::json!(name));
            let notif = Frame::request("arena:part", data).with_arena_id(arena_id);
            arena::broadcast(state, arena_id, &notif, Some(client_id)).await;
            arena::part_arena(state, arena_id, client_id).await;
            Ok(Outcome::Done)
        }
        op => Err(req.error(format!("unknown arena op: {op}"))),
    }
}

// =============================================================================
// DRAW HANDLERS
// =============================================================================

async fn handle_draw(
    state: &AppState,
    current_arena: Option<Uuid>,
    client_id: Uuid,
    req: &Frame,
) -> Result<Outcome, Frame> {
    let Some(arena_id) = current_arena else {
        return Err(req.error("join an arena first"));
    };

    match req.op() {
        "stroke" => {
            let Some(pos) = position_field(req) else {
                return Err(req.error("x, y, z required"));
            };
            let kind = match req.data.get("kind").and_then(|v| v.as_str()) {
                Some("drag") => StrokeKind::Drag,
                _ => StrokeKind::Press,
            };
            match drawing::stroke(state, arena_id, client_id, pos, kind).await {
                // Patches already went out through the canvas dispatcher.
                Ok(()) => Ok(Outcome::Done),
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "pick" => {
            let Some(pos) = position_field(req) else {
                return Err(req.error("x, y, z required"));
            };
            match drawing::pick_color(state, arena_id, client_id, pos).await {
                Ok(color) => {
                    let mut data = Data::new();
                    data.insert("color".into(), serde_json::json!(color));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "tool" => {
            let Some(slot) = int_field(req, "slot").and_then(|s| u8::try_from(s).ok()) else {
                return Err(req.error("slot required"));
            };
            match drawing::select_tool(state, arena_id, client_id, slot).await {
                Ok(item) => {
                    let mut data = Data::new();
                    data.insert("slot".into(), serde_json::json!(slot));
                    data.insert("id".into(), serde_json::json!(item.id));
                    data.insert("label".into(), serde_json::json!(item.label));
                    Ok(Outcome::Reply(data))
                }
                Err(e) => Err(req.error_from(&e)),
            }
        }
        "release" => {
            drawing::release(state, arena_id, client_id).await;
            Ok(Outcome::Done)
        }
        op => Err(req.error(format!("unknown draw op: {op}"))),
    }
}

// =============================================================================
// CHAT HANDLERS
// =============================================================================

/// Every chat message doubles as a guess. Correct guesses never echo the
/// word back to the room.
async fn handle_chat(
    state: &AppState,
    current_arena: Option<Uuid>,
    client_id: Uuid,
    name: &str,
    req: &Frame,
) -> Result<Outcome, Frame> {
    let Some(arena_id) = current_arena else {
        return Err(req.error("join an arena first"));
    };
    let Some(text) = req.data.get(FRAME_TEXT).and_then(|v| v.as_str()) else {
        return Err(req.error("text required"));
    };

    match round::guess(state, arena_id, client_id, text).await {
        Ok(GuessOutcome::Correct { award }) => {
            let mut reply = Data::new();
            reply.insert("correct".into(), serde_json::json!(true));
            reply.insert("award".into(), serde_json::json!(award));

            let mut broadcast = Data::new();
            broadcast.insert("client_id".into(), serde_json::json!(client_id));
            broadcast.insert("name".into(), serde_json::json!(name));
            let notif = Frame::request("chat:correct", broadcast).with_arena_id(arena_id);
            arena::broadcast(state, arena_id, &notif, Some(client_id)).await;

            Ok(Outcome::Reply(reply))
        }
        Ok(GuessOutcome::Chat) => {
            let mut data = Data::new();
            data.insert("client_id".into(), serde_json::json!(client_id));
            data.insert("name".into(), serde_json::json!(name));
            data.insert(FRAME_TEXT.into(), serde_json::json!(text));
            Ok(Outcome::Broadcast(data))
        }
        Ok(GuessOutcome::Rejected) => Err(req.error("the drawer cannot guess")),
        Err(e) => Err(req.error_from(&e)),
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

fn int_field(req: &Frame, key: &str) -> Option<i32> {
    req.data
        .get(key)
        .and_then(serde_json::Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

fn uuid_field(req: &Frame, key: &str) -> Option<Uuid> {
    req.data
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
}

fn position_field(req: &Frame) -> Option<WorldPosition> {
    Some(WorldPosition::new(
        int_field(req, "x")?,
        int_field(req, "y")?,
        int_field(req, "z")?,
    ))
}

// =============================================================================
// TRANSPORT
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: &Frame) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize frame");
            return Err(());
        }
    };
    if frame.status == crate::frame::Status::Error {
        let code = frame.data.get("code").and_then(|v| v.as_str()).unwrap_or("-");
        let message = frame.data.get("message").and_then(|v| v.as_str()).unwrap_or("-");
        warn!(syscall = %frame.syscall, code, message, "ws: send error frame");
    }
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
