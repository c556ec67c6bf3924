//! Drag-and-drop state machine for upload targets.
//!
//! ```text
//!            Enter / Over                    Drop(files) ──▶ selection
//!   Idle ─────────────────▶ Dragging ───────────────────────────┐
//!    ▲                        │  │ Leave (outermost)            │
//!    │                        │  └──────────────┐               │
//!    └────────────────────────┴── Abort ◀───────┴───────────────┘
//! ```
//!
//! Browsers fire `dragenter`/`dragleave` for every child element the pointer
//! crosses, so a naive enter → dragging / leave → idle mapping flickers and
//! can get stuck. The zone counts nesting depth and only the leave that
//! matches the outermost enter returns it to `Idle`.
//!
//! A disabled zone is inert: it never leaves `Idle`, never asks the platform
//! to suppress its default behavior, and never yields files.

use crate::types::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Platform drag events delivered to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop(Vec<Candidate>),
    /// The drag ended without a drop on this target (Escape, window blur).
    Abort,
}

/// What the caller must do after an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragResponse {
    /// Suppress the platform default (opening the file in the browser).
    pub prevent_default: bool,
    /// Files to hand to selection.
    pub dropped: Option<Vec<Candidate>>,
}

#[derive(Debug, Default)]
pub struct DropZone {
    depth: u32,
    disabled: bool,
}

impl DropZone {
    pub fn new(disabled: bool) -> Self {
        Self { depth: 0, disabled }
    }

    pub fn state(&self) -> DragState {
        if self.depth > 0 {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state() == DragState::Dragging
    }

    pub fn handle(&mut self, event: DragEvent) -> DragResponse {
        if self.disabled {
            return DragResponse::default();
        }
        let before = self.state();
        let response = match event {
            DragEvent::Enter => {
                self.depth += 1;
                DragResponse {
                    prevent_default: true,
                    dropped: None,
                }
            }
            DragEvent::Over => {
                // `dragover` without a seen `dragenter` (e.g. drag started inside).
                if self.depth == 0 {
                    self.depth = 1;
                }
                DragResponse {
                    prevent_default: true,
                    dropped: None,
                }
            }
            DragEvent::Leave => {
                self.depth = self.depth.saturating_sub(1);
                DragResponse::default()
            }
            DragEvent::Drop(files) => {
                self.depth = 0;
                DragResponse {
                    prevent_default: true,
                    dropped: Some(files),
                }
            }
            DragEvent::Abort => {
                self.depth = 0;
                DragResponse::default()
            }
        };
        let after = self.state();
        if before != after {
            tracing::trace!(?before, ?after, "drop zone transition");
        }
        response
    }
}
