//! Core library of the livepad playground.
//!
//! Three source buffers (HTML, CSS and JavaScript) are kept in sync with a single
//! preview document. Every change to a buffer is a full replacement of the slot
//! that buffer owns in the document; nothing is diffed.
//!
//! # Modules
//!
//! - [`buffer`] - The three named source buffers
//! - [`document`] - Render target abstraction and the in-memory [`Document`]
//! - [`surface`] - [`PreviewSurface`], the mutation primitives over a render target
//! - [`sync`] - [`SyncController`], binding buffer changes to surface primitives
//! - [`session`] - [`Session`], the owner of all per-session state
//! - [`splitter`] - Drag-resize arithmetic for the editor/preview panes
//! - [`editor`] - Options handed to the browser-side editor widget
//! - [`protocol`] - WebSocket messages exchanged with the playground page
//! - [`watcher`] - File watching for buffers backed by files on disk
//! - [`assets`] - Embedded web assets (HTML, CSS, JS)

pub mod assets;
pub mod buffer;
pub mod document;
pub mod editor;
pub mod protocol;
pub mod session;
pub mod splitter;
pub mod surface;
pub mod sync;
pub mod watcher;

pub use buffer::{BufferKind, Buffers, SourceBuffer};
pub use document::{Document, RenderOp, RenderTarget};
pub use editor::EditorOptions;
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use session::{Session, Snapshot};
pub use splitter::{PaneHeights, Splitter};
pub use surface::{PreviewSurface, SurfaceError, SurfaceOptions};
pub use sync::{ChannelState, SyncController};
pub use watcher::{SourceWatcher, WatchEvent, WatcherConfig};
