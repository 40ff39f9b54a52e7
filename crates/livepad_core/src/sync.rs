//! Binds buffer change notifications to preview surface primitives.

use crate::buffer::{BufferKind, Buffers};
use crate::document::{RenderOp, RenderTarget};
use crate::surface::{PreviewSurface, SurfaceError};

/// Handler invoked with the full current text of a changed buffer.
pub type ChangeHandler<T> =
    Box<dyn FnMut(&mut PreviewSurface<T>, &str) -> Result<Vec<RenderOp>, SurfaceError> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unbound,
    Bound,
}

/// Routes the change notification of each buffer to its handler.
///
/// A channel only ever moves from unbound to bound. Notifications are delivered
/// synchronously, one at a time, without debouncing or batching.
pub struct SyncController<T> {
    channels: [Option<ChangeHandler<T>>; 3],
}

impl<T> Default for SyncController<T> {
    fn default() -> Self {
        Self {
            channels: [None, None, None],
        }
    }
}

impl<T> std::fmt::Debug for SyncController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<_> = BufferKind::ALL
            .iter()
            .map(|kind| (kind.as_str(), self.channels[kind.index()].is_some()))
            .collect();
        f.debug_struct("SyncController")
            .field("bound", &states)
            .finish()
    }
}

impl<T: RenderTarget> SyncController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The primitive each buffer kind renders into.
    ///
    /// HTML replaces the body, CSS replaces the managed stylesheet and JS appends
    /// a new script fragment.
    pub fn default_handler(kind: BufferKind) -> ChangeHandler<T> {
        match kind {
            BufferKind::Html => {
                Box::new(|surface: &mut PreviewSurface<T>, text: &str| surface.set_body_markup(text))
            }
            BufferKind::Css => {
                Box::new(|surface: &mut PreviewSurface<T>, text: &str| surface.set_styles(text))
            }
            BufferKind::Js => {
                Box::new(|surface: &mut PreviewSurface<T>, text: &str| surface.append_script(text))
            }
        }
    }

    /// Subscribes `handler` to the change notifications of `kind`.
    ///
    /// Returns `false` and keeps the existing handler if the channel is bound
    /// already.
    pub fn bind(&mut self, kind: BufferKind, handler: ChangeHandler<T>) -> bool {
        let channel = &mut self.channels[kind.index()];
        if channel.is_some() {
            tracing::debug!(%kind, "Channel is already bound");
            return false;
        }
        *channel = Some(handler);
        true
    }

    pub fn bind_default(&mut self, kind: BufferKind) -> bool {
        self.bind(kind, Self::default_handler(kind))
    }

    pub fn state(&self, kind: BufferKind) -> ChannelState {
        if self.channels[kind.index()].is_some() {
            ChannelState::Bound
        } else {
            ChannelState::Unbound
        }
    }

    /// Delivers the change notification of `kind`.
    ///
    /// The handler always reads the full current text of the buffer. Failures
    /// are logged and yield no operations.
    pub fn notify(
        &mut self,
        kind: BufferKind,
        buffers: &Buffers,
        surface: &mut PreviewSurface<T>,
    ) -> Vec<RenderOp> {
        let Some(handler) = self.channels[kind.index()].as_mut() else {
            tracing::debug!(%kind, "Dropping change notification of unbound channel");
            return Vec::new();
        };

        let text = buffers.get(kind).text();

        match handler(surface, text) {
            Ok(ops) => {
                tracing::trace!(%kind, len = text.len(), "Applied buffer change");
                ops
            }
            Err(err) => {
                tracing::warn!(%kind, ?err, "Failed to apply buffer change");
                Vec::new()
            }
        }
    }
}
