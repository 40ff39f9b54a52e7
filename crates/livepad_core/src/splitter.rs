//! Drag-resize arithmetic for the splitter between the editors and the preview.

use serde::{Deserialize, Serialize};

/// Heights of the two panes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneHeights {
    pub code_height: i32,
    pub preview_height: i32,
}

impl PaneHeights {
    pub fn new(code_height: i32, preview_height: i32) -> Self {
        Self {
            code_height,
            preview_height,
        }
    }

    pub fn total(&self) -> i64 {
        i64::from(self.code_height) + i64::from(self.preview_height)
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_y: i32,
    start: PaneHeights,
}

/// Tracks one pointer drag at a time.
///
/// Both panes move by the vertical distance from the pointer-down position, in
/// opposite directions, so their sum never changes. Heights are not clamped.
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    drag: Option<Drag>,
}

impl Splitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag, `heights` being the pane heights measured at this moment.
    pub fn pointer_down(&mut self, y: i32, heights: PaneHeights) {
        self.drag = Some(Drag {
            start_y: y,
            start: heights,
        });
    }

    /// New pane heights for the pointer at `y`.
    ///
    /// `None` if no drag is active or if either height would not fit in an `i32`,
    /// in which case the drag goes on from the same pointer-down position.
    pub fn pointer_move(&self, y: i32) -> Option<PaneHeights> {
        let Drag { start_y, start } = self.drag?;
        let delta = i64::from(y) - i64::from(start_y);
        let code_height = i32::try_from(i64::from(start.code_height) + delta).ok()?;
        let preview_height = i32::try_from(i64::from(start.preview_height) - delta).ok()?;
        Some(PaneHeights {
            code_height,
            preview_height,
        })
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
