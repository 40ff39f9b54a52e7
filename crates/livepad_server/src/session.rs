//! The task owning the playground session.
//!
//! Every mutation of the session goes through a single task which processes
//! messages one at a time, in arrival order, each to completion. The resulting
//! updates are fanned out to the attached clients through a broadcast channel.

use crate::ServerError;
use livepad_core::protocol::ServerMessage;
use livepad_core::watcher::read_source;
use livepad_core::{BufferKind, Document, PaneHeights, Session, Snapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Capacity of the update channel, a client falling further behind is
/// resynchronized with a fresh snapshot.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Identifies one connected client for the lifetime of its connection.
pub type ClientId = u64;

/// Attached client: the current state and the updates following it.
pub type Attachment = (Snapshot, broadcast::Receiver<Update>);

/// Message fanned out to every attached client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Client whose own edit produced this message. That client already shows
    /// the change and must not get it back.
    pub origin: Option<ClientId>,
    pub message: ServerMessage,
}

impl Update {
    fn new(message: ServerMessage) -> Self {
        Self {
            origin: None,
            message,
        }
    }

    /// Whether `client` should receive this update.
    pub fn is_for(&self, client: ClientId) -> bool {
        self.origin != Some(client)
    }
}

/// Worker message that the session task deals with.
#[derive(Debug)]
pub enum SessionMessage {
    /// A buffer was edited, carrying its full text and the editing client if any.
    Edit {
        buffer: BufferKind,
        text: String,
        origin: Option<ClientId>,
    },
    /// The file backing a buffer changed on disk.
    SourceChanged(BufferKind),
    /// Pointer pressed on the splitter handle.
    PointerDown { y: i32, heights: PaneHeights },
    /// Pointer moved while dragging.
    PointerMove { y: i32 },
    /// Pointer released.
    PointerUp,
    /// Attach a new client.
    Attach(oneshot::Sender<Attachment>),
}

/// Cheap handle to talk to the session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    msg_tx: mpsc::UnboundedSender<SessionMessage>,
    next_client_id: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Allocates the identifier of a new connection.
    pub fn register_client(&self) -> ClientId {
        self.next_client_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn send(&self, msg: SessionMessage) -> Result<(), ServerError> {
        self.msg_tx
            .send(msg)
            .map_err(|_| ServerError::SessionClosed)
    }

    /// Returns the current snapshot and a receiver of every update after it.
    pub async fn attach(&self) -> Result<Attachment, ServerError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionMessage::Attach(tx))?;
        rx.await.map_err(|_| ServerError::SessionClosed)
    }
}

struct SessionTask {
    session: Session<Document>,
    source_dir: Option<PathBuf>,
    updates: broadcast::Sender<Update>,
    msg_rx: mpsc::UnboundedReceiver<SessionMessage>,
}

/// Spawns the task owning `session`.
///
/// With `source_dir`, [`SessionMessage::SourceChanged`] re-reads the buffer from
/// the corresponding file in that directory.
pub fn spawn_session(session: Session<Document>, source_dir: Option<PathBuf>) -> SessionHandle {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

    let task = SessionTask {
        session,
        source_dir,
        updates,
        msg_rx,
    };

    tokio::spawn(task.run());

    SessionHandle {
        msg_tx,
        next_client_id: Arc::new(AtomicU64::new(1)),
    }
}

impl SessionTask {
    async fn run(mut self) {
        while let Some(msg) = self.msg_rx.recv().await {
            self.process_message(msg);
        }
        tracing::debug!("Session task exited");
    }

    fn process_message(&mut self, msg: SessionMessage) {
        match msg {
            SessionMessage::Edit {
                buffer,
                text,
                origin,
            } => self.apply_edit(buffer, text, origin),
            SessionMessage::SourceChanged(buffer) => {
                let Some(dir) = &self.source_dir else {
                    tracing::debug!(%buffer, "Ignoring source change without source directory");
                    return;
                };
                match read_source(dir, buffer) {
                    Ok(text) => self.apply_edit(buffer, text, None),
                    Err(err) => tracing::warn!(?err, %buffer, "Failed to read source file"),
                }
            }
            SessionMessage::PointerDown { y, heights } => self.session.pointer_down(y, heights),
            SessionMessage::PointerMove { y } => {
                if let Some(heights) = self.session.pointer_move(y) {
                    self.broadcast(Update::new(ServerMessage::Layout(heights)));
                }
            }
            SessionMessage::PointerUp => self.session.pointer_up(),
            SessionMessage::Attach(reply) => {
                let attachment = (self.session.snapshot(), self.updates.subscribe());
                if reply.send(attachment).is_err() {
                    tracing::debug!("Client went away before attaching");
                }
            }
        }
    }

    /// The editing client gets the render ops but not its own text back.
    fn apply_edit(&mut self, buffer: BufferKind, text: String, origin: Option<ClientId>) {
        let ops = self.session.edit(buffer, text.as_str());

        self.broadcast(Update {
            origin,
            message: ServerMessage::Buffer { buffer, text },
        });

        if !ops.is_empty() {
            self.broadcast(Update::new(ServerMessage::Render { ops }));
        }
    }

    fn broadcast(&self, update: Update) {
        // No receivers simply means no attached client.
        let _ = self.updates.send(update);
    }
}
