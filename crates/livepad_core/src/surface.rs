//! Mutation primitives over the preview render target.

use crate::document::{RenderOp, RenderTarget};

pub const DEFAULT_STYLESHEET_ID: &str = "live-preview-style";

pub const PAGED_JS_POLYFILL: &str = "https://unpkg.com/pagedjs/dist/paged.legacy.polyfill.js";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// A primitive was used before [`PreviewSurface::initialize`].
    #[error("preview surface used before initialization")]
    Uninitialized,

    /// The managed stylesheet node is gone from the render target.
    #[error("stylesheet node `{0}` not found in the render target")]
    MissingStylesheet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Identifier of the single managed stylesheet node.
    pub stylesheet_id: String,
    /// External script referenced from the head on initialization.
    pub polyfill_url: Option<String>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            stylesheet_id: DEFAULT_STYLESHEET_ID.to_string(),
            polyfill_url: Some(PAGED_JS_POLYFILL.to_string()),
        }
    }
}

/// Owns the render target and exposes the three content slots.
///
/// Each primitive returns the [`RenderOp`]s it applied, so the caller can forward
/// them to remote renderers.
#[derive(Debug)]
pub struct PreviewSurface<T> {
    target: T,
    options: SurfaceOptions,
    initialized: bool,
}

impl<T: RenderTarget> PreviewSurface<T> {
    pub fn new(target: T, options: SurfaceOptions) -> Self {
        Self {
            target,
            options,
            initialized: false,
        }
    }

    /// Prepares the render target: clears the body, attaches the managed
    /// stylesheet and references the polyfill.
    ///
    /// Calling it again never duplicates the stylesheet or the loader.
    pub fn initialize(&mut self) -> Vec<RenderOp> {
        let mut ops = vec![RenderOp::ClearBody];

        if !self.target.has_style(&self.options.stylesheet_id) {
            ops.push(RenderOp::CreateStyle {
                id: self.options.stylesheet_id.clone(),
            });
        }

        if let Some(src) = &self.options.polyfill_url {
            if !self.target.has_loader(src) {
                ops.push(RenderOp::LoadScript { src: src.clone() });
            }
        }

        for op in &ops {
            self.target.apply(op);
        }

        self.initialized = true;

        tracing::debug!(stylesheet_id = %self.options.stylesheet_id, "Preview surface initialized");

        ops
    }

    /// Replaces the whole body markup. The markup is not sanitized.
    pub fn set_body_markup(&mut self, text: &str) -> Result<Vec<RenderOp>, SurfaceError> {
        self.ensure_initialized()?;
        self.target.set_body(text);
        Ok(vec![RenderOp::SetBody {
            markup: text.to_string(),
        }])
    }

    /// Replaces the text of the managed stylesheet node.
    pub fn set_styles(&mut self, text: &str) -> Result<Vec<RenderOp>, SurfaceError> {
        self.ensure_initialized()?;
        let id = &self.options.stylesheet_id;
        if !self.target.set_style_text(id, text) {
            return Err(SurfaceError::MissingStylesheet(id.clone()));
        }
        Ok(vec![RenderOp::SetStyle {
            id: id.clone(),
            text: text.to_string(),
        }])
    }

    /// Appends and executes a new script fragment. Earlier fragments stay.
    pub fn append_script(&mut self, text: &str) -> Result<Vec<RenderOp>, SurfaceError> {
        self.ensure_initialized()?;
        self.target.append_script(text);
        Ok(vec![RenderOp::AppendScript {
            text: text.to_string(),
        }])
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    fn ensure_initialized(&self) -> Result<(), SurfaceError> {
        if self.initialized {
            Ok(())
        } else {
            Err(SurfaceError::Uninitialized)
        }
    }
}
