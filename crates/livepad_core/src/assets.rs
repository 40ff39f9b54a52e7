//! Embedded web assets for the playground page.

use crate::editor::EditorOptions;
use crate::splitter::PaneHeights;

/// HTML template with placeholders for CSS and JS.
pub const HTML_TEMPLATE: &str = include_str!("../web/index.html");

/// Page styles.
pub const STYLES_CSS: &str = include_str!("../web/styles.css");

/// Page script: editors, splitter and WebSocket client applying render ops.
pub const APP_JS: &str = include_str!("../web/app.js");

/// Options for building the HTML page.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub editor: EditorOptions,
    pub layout: PaneHeights,
}

/// Provides access to embedded assets.
pub struct Assets;

impl Assets {
    /// Build the complete HTML page with inlined CSS and JS.
    ///
    /// This replaces placeholder comments in the template with actual content:
    /// - `/*__STYLES_CSS__*/` -> styles.css content
    /// - `/*__PAGE_CONFIG__*/` -> `LIVEPAD_CONFIG` with editor options and layout
    /// - `/*__APP_JS__*/` -> app.js content
    pub fn build_html(options: &PageOptions) -> String {
        let page_config = serde_json::json!({
            "editors": options.editor.all_panes(),
            "layout": options.layout,
        });

        // `</` would terminate the inline script early.
        let page_config = page_config.to_string().replace("</", "<\\/");

        HTML_TEMPLATE
            .replace("/*__STYLES_CSS__*/", STYLES_CSS)
            .replace(
                "/*__PAGE_CONFIG__*/",
                &format!("const LIVEPAD_CONFIG = {page_config};"),
            )
            .replace("/*__APP_JS__*/", APP_JS)
    }
}
