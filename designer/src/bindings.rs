//! Browser entry points.
//!
//! The host forwards DOM pointer events and control changes here and reads
//! back plain values to render. Errors cross the boundary as strings so the
//! same handle is usable from native tests.

use wasm_bindgen::prelude::wasm_bindgen;

use crate::content::{ContentField, escape_markup};
use crate::editor::{Action, Editor};
use crate::position::Position;
use crate::slot::Slot;

#[cfg(test)]
#[path = "bindings_test.rs"]
mod bindings_test;

#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct DesignerHandle {
    editor: Editor,
}

#[wasm_bindgen]
impl DesignerHandle {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if `slot` does not name a draggable slot.
    pub fn pointer_down(&mut self, slot: &str, x: f64, y: f64) -> Result<(), String> {
        self.editor
            .on_pointer_down_named(slot, Position::new(x, y))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Returns whether a slot moved and the canvas needs a repaint.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        matches!(self.editor.on_pointer_move(Position::new(x, y)), Action::PositionChanged { .. })
    }

    pub fn pointer_up(&mut self) {
        self.editor.on_pointer_up();
    }

    /// Pointer left the viewport or the dragged element went away.
    pub fn pointer_leave(&mut self) {
        self.editor.cancel_drag();
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.editor.drag.is_dragging()
    }

    /// Top-left of `slot` as `[x, y]`, or `None` for unknown slot names.
    #[must_use]
    pub fn slot_position(&self, slot: &str) -> Option<Vec<f64>> {
        let Ok(slot) = slot.parse::<Slot>() else {
            return None;
        };
        let position = self.editor.layout.position(slot);
        Some(vec![position.x, position.y])
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn set_slogan_size(&mut self, value: f64) -> u32 {
        self.editor.set_slogan_size(value.round() as i64);
        self.editor.layout.layout().slogan_text_size
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn set_signature_width(&mut self, value: f64) -> u32 {
        self.editor.set_signature_width(value.round() as i64);
        self.editor.layout.layout().signature_block_width
    }

    pub fn reset_layout(&mut self) {
        self.editor.reset_layout();
    }

    /// # Errors
    ///
    /// Returns an error if `field` is not a content field.
    pub fn set_field(&mut self, field: &str, value: String) -> Result<(), String> {
        let field = field.parse::<ContentField>().map_err(|e| e.to_string())?;
        self.editor.set_field(field, value);
        Ok(())
    }

    /// Escaped display text for `field`, falling back to its placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if `field` is not a content field.
    pub fn field_html(&self, field: &str) -> Result<String, String> {
        let field = field.parse::<ContentField>().map_err(|e| e.to_string())?;
        Ok(escape_markup(self.editor.content.display(field)))
    }

    /// Returns false and keeps the selection if `id` is unknown.
    pub fn select_background(&mut self, id: &str) -> bool {
        self.editor.select_background(id) == Action::RenderNeeded
    }

    /// # Errors
    ///
    /// Returns an error if the layout fails to serialize.
    pub fn layout_json(&self) -> Result<String, String> {
        serde_json::to_string(self.editor.layout.layout()).map_err(|e| e.to_string())
    }

    /// # Errors
    ///
    /// Returns an error if the design fails to serialize.
    pub fn snapshot_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.editor.snapshot()).map_err(|e| e.to_string())
    }

    /// Replace the live design with a serialized snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid snapshot; the design is unchanged.
    pub fn load_json(&mut self, json: &str) -> Result<(), String> {
        let snapshot = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.editor.load(snapshot);
        Ok(())
    }
}
