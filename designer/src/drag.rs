//! Drag gesture state machine for repositioning slots.
//!
//! A gesture is pointer-down on a slot, any number of pointer-moves, then
//! pointer-up. The controller remembers where inside the block the pointer
//! grabbed it, so the block keeps that offset under the pointer for the
//! whole gesture instead of snapping its top-left corner to the pointer.
//!
//! The host installs its move/up listeners on the whole viewport, not on
//! the slot element, and also ends the gesture on pointer-leave and on
//! unmount. `end` is idempotent so those paths can overlap freely.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::layout::LayoutStore;
use crate::position::Position;
use crate::slot::Slot;

/// Active gesture, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A slot is following the pointer.
    Dragging {
        /// The slot being moved.
        slot: Slot,
        /// Pointer position minus slot position at pointer-down.
        grab_offset: Position,
    },
}

/// A position written to the layout store by a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub slot: Slot,
    pub position: Position,
}

/// Interprets pointer events against the layout store.
///
/// At most one slot drags at a time. Starting a drag while another is
/// active ends the previous one first.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// The slot currently being dragged.
    #[must_use]
    pub fn dragging(&self) -> Option<Slot> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { slot, .. } => Some(slot),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging().is_some()
    }

    /// Start dragging `slot` from `pointer`.
    ///
    /// Returns the slot whose drag was implicitly ended, if one was active.
    pub fn begin(&mut self, slot: Slot, pointer: Position, store: &LayoutStore) -> Option<Slot> {
        let ended = self.end();
        let grab_offset = pointer - store.position(slot);
        self.state = DragState::Dragging { slot, grab_offset };
        ended
    }

    /// Move the dragging slot so the grab offset stays under `pointer`.
    ///
    /// No-op when idle or when the pointer coordinates are not finite.
    pub fn update(&mut self, pointer: Position, store: &mut LayoutStore) -> Option<PositionUpdate> {
        let DragState::Dragging { slot, grab_offset } = self.state else {
            return None;
        };
        if !pointer.is_finite() {
            return None;
        }
        let position = pointer - grab_offset;
        store.set_position(slot, position);
        Some(PositionUpdate { slot, position })
    }

    /// Finish the gesture. Returns the slot that was being dragged.
    pub fn end(&mut self) -> Option<Slot> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging { slot, .. } => Some(slot),
        }
    }
}
