use serde::{Deserialize, Serialize};

use crate::background::{BackgroundAsset, presets};
use crate::content::{CertificateContent, ContentField};
use crate::drag::DragController;
use crate::layout::{Layout, LayoutStore};
use crate::position::Position;
use crate::slot::{Slot, UnknownSlot};

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

/// Actions returned from editor handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    DragStarted { slot: Slot },
    PositionChanged { slot: Slot, position: Position },
    DragEnded { slot: Slot },
    RenderNeeded,
}

/// By-value copy of everything a saved template captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    pub content: CertificateContent,
    pub layout: Layout,
    pub background: BackgroundAsset,
}

/// Live editor state: text, layout, drag gesture and background selection.
///
/// Holds no I/O handles so it can be driven from tests and from the wasm
/// host alike.
#[derive(Debug, Clone)]
pub struct Editor {
    pub content: CertificateContent,
    pub layout: LayoutStore,
    pub drag: DragController,
    backgrounds: Vec<BackgroundAsset>,
    selected: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            content: CertificateContent::default(),
            layout: LayoutStore::new(),
            drag: DragController::new(),
            backgrounds: presets().to_vec(),
            selected: 0,
        }
    }
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Pointer input ---

    /// Pointer-down on a slot's signature block.
    pub fn on_pointer_down(&mut self, slot: Slot, pointer: Position) -> Action {
        self.drag.begin(slot, pointer, &self.layout);
        Action::DragStarted { slot }
    }

    /// Pointer-down addressed by slot name, as delivered by the host.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSlot`] if `name` is not a slot; no state changes.
    pub fn on_pointer_down_named(&mut self, name: &str, pointer: Position) -> Result<Action, UnknownSlot> {
        let slot = name.parse::<Slot>()?;
        Ok(self.on_pointer_down(slot, pointer))
    }

    /// Pointer-move anywhere in the viewport.
    pub fn on_pointer_move(&mut self, pointer: Position) -> Action {
        match self.drag.update(pointer, &mut self.layout) {
            Some(update) => Action::PositionChanged { slot: update.slot, position: update.position },
            None => Action::None,
        }
    }

    /// Pointer-up anywhere in the viewport.
    pub fn on_pointer_up(&mut self) -> Action {
        self.cancel_drag()
    }

    /// End the gesture without a pointer-up: pointer left the viewport, or
    /// the slot element was unmounted.
    pub fn cancel_drag(&mut self) -> Action {
        match self.drag.end() {
            Some(slot) => Action::DragEnded { slot },
            None => Action::None,
        }
    }

    // --- Controls ---

    pub fn set_field(&mut self, field: ContentField, value: impl Into<String>) -> Action {
        self.content.set(field, value);
        Action::RenderNeeded
    }

    pub fn set_slogan_size(&mut self, raw: i64) -> Action {
        self.layout.set_slogan_size(raw);
        Action::RenderNeeded
    }

    pub fn set_signature_width(&mut self, raw: i64) -> Action {
        self.layout.set_signature_width(raw);
        Action::RenderNeeded
    }

    /// Restore the default layout. Any gesture in progress is ended first.
    pub fn reset_layout(&mut self) -> Action {
        self.drag.end();
        self.layout.reset();
        Action::RenderNeeded
    }

    // --- Backgrounds ---

    /// Backgrounds available for selection, generated ones first.
    #[must_use]
    pub fn backgrounds(&self) -> &[BackgroundAsset] {
        &self.backgrounds
    }

    #[must_use]
    pub fn selected_background(&self) -> &BackgroundAsset {
        &self.backgrounds[self.selected]
    }

    /// Select a background by id. Unknown ids leave the selection unchanged.
    pub fn select_background(&mut self, id: &str) -> Action {
        match self.backgrounds.iter().position(|asset| asset.id == id) {
            Some(index) => {
                self.selected = index;
                Action::RenderNeeded
            }
            None => Action::None,
        }
    }

    /// Prepend a generated background to the session list and select it.
    pub fn add_generated_background(&mut self, asset: BackgroundAsset) -> Action {
        self.selected = self.insert_front(asset);
        Action::RenderNeeded
    }

    fn insert_front(&mut self, asset: BackgroundAsset) -> usize {
        if let Some(index) = self.backgrounds.iter().position(|existing| existing.id == asset.id) {
            self.backgrounds[index] = asset;
            return index;
        }
        self.backgrounds.insert(0, asset);
        0
    }

    // --- Snapshots ---

    /// Copy the current design by value.
    #[must_use]
    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot {
            content: self.content.clone(),
            layout: *self.layout.layout(),
            background: self.selected_background().clone(),
        }
    }

    /// Replace the live design with a saved one.
    pub fn load(&mut self, snapshot: DesignSnapshot) -> Action {
        self.drag.end();
        self.content = snapshot.content;
        self.layout.replace(snapshot.layout);
        self.selected = self.insert_front(snapshot.background);
        Action::RenderNeeded
    }

    /// Slots whose top-left currently lies outside the printable canvas.
    #[must_use]
    pub fn slots_off_canvas(&self) -> Vec<Slot> {
        self.layout
            .layout()
            .positions
            .iter()
            .filter(|(_, position)| !position.within_canvas())
            .map(|(slot, _)| slot)
            .collect()
    }
}
