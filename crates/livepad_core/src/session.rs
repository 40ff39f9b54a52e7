//! Owner of all the state of one playground session.

use crate::buffer::{BufferKind, Buffers};
use crate::document::{Document, RenderOp, RenderTarget};
use crate::splitter::{PaneHeights, Splitter};
use crate::surface::{PreviewSurface, SurfaceOptions};
use crate::sync::SyncController;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full state of a session, enough to bring a new client up to date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub render: Document,
    pub buffers: BTreeMap<BufferKind, String>,
    pub layout: PaneHeights,
}

/// Buffers, preview surface, sync controller and splitter of one session.
///
/// Created once at startup; the surface is initialized before any channel is
/// bound so that no edit reaches an uninitialized render target.
#[derive(Debug)]
pub struct Session<T> {
    buffers: Buffers,
    surface: PreviewSurface<T>,
    controller: SyncController<T>,
    splitter: Splitter,
    layout: PaneHeights,
}

impl<T: RenderTarget> Session<T> {
    /// Initializes the surface, then binds all the three buffers.
    ///
    /// Returns the session and the operations of the initialization.
    pub fn start(target: T, options: SurfaceOptions, layout: PaneHeights) -> (Self, Vec<RenderOp>) {
        let mut surface = PreviewSurface::new(target, options);
        let ops = surface.initialize();

        let mut controller = SyncController::new();
        for kind in BufferKind::ALL {
            controller.bind_default(kind);
        }

        let session = Self {
            buffers: Buffers::default(),
            surface,
            controller,
            splitter: Splitter::new(),
            layout,
        };

        (session, ops)
    }

    /// Replaces the full text of a buffer and propagates the change.
    pub fn edit(&mut self, kind: BufferKind, text: impl Into<String>) -> Vec<RenderOp> {
        self.buffers.set(kind, text);
        self.notify(kind)
    }

    /// Change notification of `kind`, re-rendering from the current buffer text.
    pub fn notify(&mut self, kind: BufferKind) -> Vec<RenderOp> {
        debug_assert!(
            self.surface.is_initialized(),
            "session surface must be initialized before any notification"
        );
        self.controller
            .notify(kind, &self.buffers, &mut self.surface)
    }

    pub fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    pub fn surface(&self) -> &PreviewSurface<T> {
        &self.surface
    }

    pub fn layout(&self) -> PaneHeights {
        self.layout
    }

    pub fn pointer_down(&mut self, y: i32, heights: PaneHeights) {
        self.splitter.pointer_down(y, heights);
    }

    /// Updates the layout while dragging, returns the new heights if any.
    pub fn pointer_move(&mut self, y: i32) -> Option<PaneHeights> {
        let heights = self.splitter.pointer_move(y)?;
        self.layout = heights;
        Some(heights)
    }

    pub fn pointer_up(&mut self) {
        self.splitter.pointer_up();
    }
}

impl Session<Document> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            render: self.surface.target().clone(),
            buffers: self
                .buffers
                .iter()
                .map(|buffer| (buffer.kind(), buffer.text().to_string()))
                .collect(),
            layout: self.layout,
        }
    }
}
