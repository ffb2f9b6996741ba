use serde::{Deserialize, Serialize};

use crate::coords::Point;

use super::state::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub active: bool,
    pub start_index: Option<usize>,
    pub current_position: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureOutcome {
    /// No drag was in progress, or the round was no longer active.
    Ignored,
    /// Released over empty space.
    NoTarget,
    Connected { from: usize, to: usize },
    Mismatch { from: usize, to: usize },
}

/// Tracks the drag gesture and the hovered drop target. Session state is only
/// touched through the `&mut Session` handed to [`InteractionHandler::gesture_end`].
#[derive(Debug, Clone, Default)]
pub struct InteractionHandler {
    drag: DragState,
    drag_over_target: Option<usize>,
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn drag_over_target(&self) -> Option<usize> {
        self.drag_over_target
    }

    /// Starts dragging from left slot `index`. `position` is already relative
    /// to the board origin.
    pub fn gesture_start(&mut self, session: &Session, index: usize, position: Point) -> bool {
        if !session.state().is_active || index >= session.cables().left.len() {
            return false;
        }
        self.drag = DragState {
            active: true,
            start_index: Some(index),
            current_position: Some(position),
        };
        true
    }

    pub fn gesture_move(&mut self, position: Point) {
        if self.drag.active {
            self.drag.current_position = Some(position);
        }
    }

    pub fn hover_enter(&mut self, session: &Session, index: usize) {
        if self.drag.active && index < session.cables().right.len() {
            self.drag_over_target = Some(index);
        }
    }

    pub fn hover_leave(&mut self) {
        self.drag_over_target = None;
    }

    /// Evaluates the drop, then returns to idle whatever the result.
    pub fn gesture_end(&mut self, session: &mut Session) -> GestureOutcome {
        let drag = std::mem::take(&mut self.drag);
        let target = self.drag_over_target.take();

        if !drag.active || !session.state().is_active {
            return GestureOutcome::Ignored;
        }
        let (Some(from), Some(to)) = (drag.start_index, target) else {
            return GestureOutcome::NoTarget;
        };
        if from >= session.cables().left.len() || to >= session.cables().right.len() {
            return GestureOutcome::Ignored;
        }

        if session.cables().colors_match(from, to) {
            session.commit_connection(from, to);
            GestureOutcome::Connected { from, to }
        } else {
            session.register_mismatch(from, to);
            GestureOutcome::Mismatch { from, to }
        }
    }

    pub fn reset(&mut self) {
        self.drag = DragState::default();
        self.drag_over_target = None;
    }
}
