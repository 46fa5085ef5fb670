//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP surface is deliberately small: a health probe, a lobby listing
//! for clients choosing an arena, and the websocket upgrade everything else
//! flows through. All game traffic is frames over the socket.

pub mod ws;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::arena::{self, ArenaRow};
use crate::state::AppState;

#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/arenas", get(list_arenas))
        .route("/api/ws", get(ws::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Lobby listing for clients choosing an arena.
async fn list_arenas(State(state): State<AppState>) -> Json<Vec<ArenaRow>> {
    Json(arena::list_arenas(&state).await)
}
