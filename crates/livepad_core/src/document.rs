//! Render target abstraction.
//!
//! A render target is the isolated document the preview is drawn into. It has a
//! replaceable body, stylesheet nodes addressed by identifier, loader references
//! to external scripts and an append-only list of executed script fragments.
//!
//! Every mutation is expressible as a [`RenderOp`], which is also what remote
//! renderers (the preview iframe in the browser) replay.

use serde::{Deserialize, Serialize};

/// A single mutation of a render target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    /// Remove all body markup.
    ClearBody,
    /// Replace the whole body markup.
    SetBody { markup: String },
    /// Attach an empty stylesheet node with the given identifier.
    CreateStyle { id: String },
    /// Replace the text of the stylesheet node with the given identifier.
    SetStyle { id: String, text: String },
    /// Reference an external script from the document head.
    LoadScript { src: String },
    /// Append a new script fragment and execute it.
    AppendScript { text: String },
}

/// Primitive operations of a render target.
pub trait RenderTarget {
    fn clear_body(&mut self);

    fn set_body(&mut self, markup: &str);

    fn has_style(&self, id: &str) -> bool;

    fn create_style(&mut self, id: &str);

    /// Returns `false` if there is no stylesheet node with this identifier.
    fn set_style_text(&mut self, id: &str, text: &str) -> bool;

    fn has_loader(&self, src: &str) -> bool;

    fn load_script(&mut self, src: &str);

    fn append_script(&mut self, text: &str);

    /// Applies a [`RenderOp`] to this target.
    ///
    /// `CreateStyle` and `LoadScript` are no-ops when the node already exists.
    fn apply(&mut self, op: &RenderOp) {
        match op {
            RenderOp::ClearBody => self.clear_body(),
            RenderOp::SetBody { markup } => self.set_body(markup),
            RenderOp::CreateStyle { id } => {
                if !self.has_style(id) {
                    self.create_style(id);
                }
            }
            RenderOp::SetStyle { id, text } => {
                if !self.set_style_text(id, text) {
                    tracing::debug!(id = %id, "No stylesheet node to update");
                }
            }
            RenderOp::LoadScript { src } => {
                if !self.has_loader(src) {
                    self.load_script(src);
                }
            }
            RenderOp::AppendScript { text } => self.append_script(text),
        }
    }
}

/// Stylesheet node in a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleNode {
    pub id: String,
    pub text: String,
}

/// In-memory render target.
///
/// Script fragments are recorded in execution order; the document never runs
/// them itself. It is the session's authoritative copy of what every attached
/// preview shows, and doubles as the snapshot sent to late-joining clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    body: String,
    styles: Vec<StyleNode>,
    loaders: Vec<String>,
    scripts: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn style(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.text.as_str())
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    pub fn loaders(&self) -> &[String] {
        &self.loaders
    }

    /// Script fragments in the order they were executed.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    /// Operations rebuilding this document on an empty render target.
    ///
    /// Loaders and stylesheets come first, then the body, then every script
    /// fragment in its original order.
    pub fn replay_ops(&self) -> Vec<RenderOp> {
        let loaders = self
            .loaders
            .iter()
            .map(|src| RenderOp::LoadScript { src: src.clone() });

        let styles = self.styles.iter().flat_map(|node| {
            [
                RenderOp::CreateStyle {
                    id: node.id.clone(),
                },
                RenderOp::SetStyle {
                    id: node.id.clone(),
                    text: node.text.clone(),
                },
            ]
        });

        let body = std::iter::once(RenderOp::SetBody {
            markup: self.body.clone(),
        });

        let scripts = self
            .scripts
            .iter()
            .map(|text| RenderOp::AppendScript { text: text.clone() });

        loaders.chain(styles).chain(body).chain(scripts).collect()
    }
}

impl RenderTarget for Document {
    fn clear_body(&mut self) {
        self.body.clear();
    }

    fn set_body(&mut self, markup: &str) {
        self.body = markup.to_string();
    }

    fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|node| node.id == id)
    }

    fn create_style(&mut self, id: &str) {
        self.styles.push(StyleNode {
            id: id.to_string(),
            text: String::new(),
        });
    }

    fn set_style_text(&mut self, id: &str, text: &str) -> bool {
        match self.styles.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                node.text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn has_loader(&self, src: &str) -> bool {
        self.loaders.iter().any(|loader| loader == src)
    }

    fn load_script(&mut self, src: &str) {
        self.loaders.push(src.to_string());
    }

    fn append_script(&mut self, text: &str) {
        self.scripts.push(text.to_string());
    }
}
