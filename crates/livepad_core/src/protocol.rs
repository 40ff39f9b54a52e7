//! Protocol message types for the playground page.
//!
//! Defines the messages exchanged between the preview server and the page via
//! WebSocket, encoded as JSON objects tagged by `type`.

use crate::buffer::BufferKind;
use crate::document::RenderOp;
use crate::session::Snapshot;
use crate::splitter::PaneHeights;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full session state, sent on connect and whenever a client fell behind.
    ///
    /// The client rebuilds its preview from scratch by replaying `ops`.
    Snapshot {
        ops: Vec<RenderOp>,
        buffers: std::collections::BTreeMap<BufferKind, String>,
        layout: PaneHeights,
    },

    /// Mutations applied to the render target by one buffer change.
    Render { ops: Vec<RenderOp> },

    /// New text of a buffer.
    Buffer { buffer: BufferKind, text: String },

    /// New pane heights.
    Layout(PaneHeights),
}

impl From<Snapshot> for ServerMessage {
    fn from(snapshot: Snapshot) -> Self {
        Self::Snapshot {
            ops: snapshot.render.replay_ops(),
            buffers: snapshot.buffers,
            layout: snapshot.layout,
        }
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Messages sent from clients to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A buffer changed in the editor, carrying its full text.
    Edit { buffer: BufferKind, text: String },

    /// Pointer pressed on the splitter handle, with the pane heights measured
    /// at that moment.
    PointerDown {
        y: i32,
        code_height: i32,
        preview_height: i32,
    },

    /// Pointer moved while dragging.
    PointerMove { y: i32 },

    /// Pointer released.
    PointerUp,

    /// Request a fresh snapshot.
    RequestSnapshot,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
