//! Update dispatch boundary — how canvas changes reach viewers.
//!
//! DESIGN
//! ======
//! The canvas never talks to the network. It produces one [`ChunkUpdate`]
//! per touched spatial cell and hands each one to an [`UpdateDispatcher`],
//! once per recipient viewer. The production dispatcher wraps the update in
//! a `canvas:patch` frame and pushes it onto the viewer's outbound channel;
//! a full or closed channel is that viewer's problem alone.

use std::collections::HashMap;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::color::PaletteColor;
use crate::frame::{Data, Frame};
use crate::world::{ChunkKey, WorldPosition};

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// One rendered cell change: where in the world, and the new color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockChange {
    pub position: WorldPosition,
    pub color: PaletteColor,
}

/// Batched visual update: every changed position inside one spatial cell.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChunkUpdate {
    pub chunk: ChunkKey,
    pub changes: Vec<BlockChange>,
}

// =============================================================================
// DISPATCHER
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("viewer {0} has no outbound channel")]
    UnknownViewer(Uuid),
    #[error("outbound channel for viewer {0} is full or closed")]
    ChannelUnavailable(Uuid),
}

/// The sole network-facing seam of the canvas subsystem.
pub trait UpdateDispatcher {
    /// Deliver one chunk update to one viewer.
    ///
    /// # Errors
    ///
    /// Returns an error when the viewer is unreachable. Callers log and
    /// continue with the remaining viewers; a send failure never aborts a
    /// batch or rolls back canvas state.
    fn send(&mut self, viewer: Uuid, update: &ChunkUpdate) -> Result<(), DispatchError>;
}

/// Production dispatcher: one `canvas:patch` frame per chunk per viewer,
/// pushed onto the per-client outbound channel without blocking.
pub struct FrameDispatcher<'a> {
    clients: &'a HashMap<Uuid, mpsc::Sender<Frame>>,
    arena_id: Uuid,
}

impl<'a> FrameDispatcher<'a> {
    #[must_use]
    pub fn new(clients: &'a HashMap<Uuid, mpsc::Sender<Frame>>, arena_id: Uuid) -> Self {
        Self { clients, arena_id }
    }
}

impl UpdateDispatcher for FrameDispatcher<'_> {
    fn send(&mut self, viewer: Uuid, update: &ChunkUpdate) -> Result<(), DispatchError> {
        let tx = self
            .clients
            .get(&viewer)
            .ok_or(DispatchError::UnknownViewer(viewer))?;

        let mut data = Data::new();
        data.insert("chunk".into(), serde_json::json!(update.chunk));
        data.insert("changes".into(), serde_json::json!(update.changes));
        let frame = Frame::request("canvas:patch", data).with_arena_id(self.arena_id);

        tx.try_send(frame)
            .map_err(|_| DispatchError::ChannelUnavailable(viewer))
    }
}

// =============================================================================
// TEST SUPPORT
// =============================================================================


#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
