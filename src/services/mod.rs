//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own game logic and state mutation so route handlers can
//! stay focused on protocol translation. Everything that touches an arena's
//! canvas or round runs under the arenas write lock.

pub mod arena;
pub mod drawing;
pub mod round;
pub mod scoreboard;
