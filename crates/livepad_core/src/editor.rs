//! Options handed to the editor widget of each pane.

use crate::buffer::BufferKind;
use serde_json::{json, Map, Value};

/// Presentation options shared by the three panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub line_numbers: bool,
    pub auto_close_tags: bool,
    pub auto_close_brackets: bool,
    pub theme: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            line_numbers: true,
            auto_close_tags: true,
            auto_close_brackets: true,
            theme: "panda-syntax".to_string(),
        }
    }
}

impl EditorOptions {
    fn defaults(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("lineNumbers".into(), self.line_numbers.into());
        defaults.insert("autoCloseTags".into(), self.auto_close_tags.into());
        defaults.insert("autoCloseBrackets".into(), self.auto_close_brackets.into());
        defaults.insert("theme".into(), self.theme.clone().into());
        defaults
    }

    fn overrides(kind: BufferKind) -> Map<String, Value> {
        let mut overrides = Map::new();
        overrides.insert("mode".into(), kind.mode().into());
        overrides.insert("value".into(), "".into());

        if kind == BufferKind::Css {
            overrides.insert("extraKeys".into(), json!({ "Ctrl-Space": "autocomplete" }));
            overrides.insert(
                "hintOptions".into(),
                json!({ "completeSingle": false, "closeOnUnfocus": false }),
            );
        }

        overrides
    }

    /// Widget options of one pane: the shared defaults with the pane specific
    /// overrides applied key by key.
    pub fn pane_options(&self, kind: BufferKind) -> Value {
        Value::Object(merge_options(self.defaults(), Self::overrides(kind)))
    }

    /// Widget options of all panes keyed by buffer name.
    pub fn all_panes(&self) -> Value {
        let panes = BufferKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str().to_string(), self.pane_options(kind)))
            .collect();
        Value::Object(panes)
    }
}

/// Returns `defaults` with every key of `overrides` set, overrides winning.
pub fn merge_options(
    mut defaults: Map<String, Value>,
    overrides: Map<String, Value>,
) -> Map<String, Value> {
    defaults.extend(overrides);
    defaults
}
