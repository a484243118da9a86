//! Layout value and its store.
//!
//! DESIGN
//! ======
//! `Layout` is a plain value: two scalar sizes plus one position per slot.
//! Positions are held in a struct with a field per slot rather than a map,
//! so a layout with a missing slot cannot be constructed or deserialized.
//!
//! `LayoutStore` is the single owner of the live layout. Positions change
//! through the drag controller; sizes through discrete control inputs,
//! which are clamped here even though the controls already bound them.

use serde::{Deserialize, Serialize};

use crate::consts::{
    BRIDE_SIGNATURE_DEFAULT, COUNSELOR_SIGNATURE_DEFAULT, GROOM_SIGNATURE_DEFAULT, SIGNATURE_WIDTH_DEFAULT,
    SIGNATURE_WIDTH_MAX, SIGNATURE_WIDTH_MIN, SLOGAN_SIZE_DEFAULT, SLOGAN_SIZE_MAX, SLOGAN_SIZE_MIN,
};
use crate::position::Position;
use crate::slot::Slot;

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

// =============================================================================
// SLOT POSITIONS
// =============================================================================

/// One position per slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPositions {
    pub bride_signature: Position,
    pub groom_signature: Position,
    pub counselor_signature: Position,
}

impl Default for SlotPositions {
    fn default() -> Self {
        Self {
            bride_signature: BRIDE_SIGNATURE_DEFAULT.into(),
            groom_signature: GROOM_SIGNATURE_DEFAULT.into(),
            counselor_signature: COUNSELOR_SIGNATURE_DEFAULT.into(),
        }
    }
}

impl SlotPositions {
    #[must_use]
    pub fn get(&self, slot: Slot) -> Position {
        match slot {
            Slot::BrideSignature => self.bride_signature,
            Slot::GroomSignature => self.groom_signature,
            Slot::CounselorSignature => self.counselor_signature,
        }
    }

    pub fn set(&mut self, slot: Slot, position: Position) {
        match slot {
            Slot::BrideSignature => self.bride_signature = position,
            Slot::GroomSignature => self.groom_signature = position,
            Slot::CounselorSignature => self.counselor_signature = position,
        }
    }

    /// Slot/position pairs in render order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Position)> + '_ {
        Slot::ALL.into_iter().map(|slot| (slot, self.get(slot)))
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// The complete set of adjustable visual parameters for one certificate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LayoutRepr")]
pub struct Layout {
    /// Slogan font size in pixels, within `[24, 96]`.
    pub slogan_text_size: u32,
    /// Width of each signature block in pixels, within `[150, 400]`.
    pub signature_block_width: u32,
    pub positions: SlotPositions,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            slogan_text_size: SLOGAN_SIZE_DEFAULT,
            signature_block_width: SIGNATURE_WIDTH_DEFAULT,
            positions: SlotPositions::default(),
        }
    }
}

impl Layout {
    #[must_use]
    pub fn position(&self, slot: Slot) -> Position {
        self.positions.get(slot)
    }

    /// Copy of this layout with sizes clamped to their ranges and any
    /// non-finite position replaced by that slot's default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.slogan_text_size = self.slogan_text_size.clamp(SLOGAN_SIZE_MIN, SLOGAN_SIZE_MAX);
        self.signature_block_width = self.signature_block_width.clamp(SIGNATURE_WIDTH_MIN, SIGNATURE_WIDTH_MAX);
        let defaults = SlotPositions::default();
        for slot in Slot::ALL {
            if !self.positions.get(slot).is_finite() {
                self.positions.set(slot, defaults.get(slot));
            }
        }
        self
    }
}

/// Accepted serialized shapes. Records written before slots were named carry
/// flat `*SigPos` keys and `sloganSize`/`signatureWidth`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutRepr {
    #[serde(rename_all = "camelCase")]
    Current { slogan_text_size: u32, signature_block_width: u32, positions: SlotPositions },
    #[serde(rename_all = "camelCase")]
    Legacy {
        slogan_size: f64,
        signature_width: f64,
        bride_sig_pos: Position,
        groom_sig_pos: Position,
        counselor_sig_pos: Position,
    },
}

impl From<LayoutRepr> for Layout {
    #[allow(clippy::cast_possible_truncation)]
    fn from(repr: LayoutRepr) -> Self {
        match repr {
            LayoutRepr::Current { slogan_text_size, signature_block_width, positions } => {
                Self { slogan_text_size, signature_block_width, positions }.sanitized()
            }
            LayoutRepr::Legacy { slogan_size, signature_width, bride_sig_pos, groom_sig_pos, counselor_sig_pos } => Self {
                slogan_text_size: clamp_slogan_size(slogan_size.round() as i64),
                signature_block_width: clamp_signature_width(signature_width.round() as i64),
                positions: SlotPositions {
                    bride_signature: bride_sig_pos,
                    groom_signature: groom_sig_pos,
                    counselor_signature: counselor_sig_pos,
                },
            },
        }
    }
}

/// Clamp a raw control value into the slogan size range.
#[must_use]
pub fn clamp_slogan_size(raw: i64) -> u32 {
    clamp_to(raw, SLOGAN_SIZE_MIN, SLOGAN_SIZE_MAX)
}

/// Clamp a raw control value into the signature width range.
#[must_use]
pub fn clamp_signature_width(raw: i64) -> u32 {
    clamp_to(raw, SIGNATURE_WIDTH_MIN, SIGNATURE_WIDTH_MAX)
}

fn clamp_to(raw: i64, min: u32, max: u32) -> u32 {
    let clamped = raw.clamp(i64::from(min), i64::from(max));
    u32::try_from(clamped).unwrap_or(min)
}

// =============================================================================
// STORE
// =============================================================================

/// Single source of truth for the live layout. Never fails and never persists.
#[derive(Debug, Clone, Default)]
pub struct LayoutStore {
    layout: Layout,
}

impl LayoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn position(&self, slot: Slot) -> Position {
        self.layout.position(slot)
    }

    /// Replace exactly one slot's position.
    pub fn set_position(&mut self, slot: Slot, position: Position) {
        self.layout.positions.set(slot, position);
    }

    /// Set the slogan size, returning the clamped value actually stored.
    pub fn set_slogan_size(&mut self, raw: i64) -> u32 {
        self.layout.slogan_text_size = clamp_slogan_size(raw);
        self.layout.slogan_text_size
    }

    /// Set the signature block width, returning the clamped value actually stored.
    pub fn set_signature_width(&mut self, raw: i64) -> u32 {
        self.layout.signature_block_width = clamp_signature_width(raw);
        self.layout.signature_block_width
    }

    /// Restore the documented default layout.
    pub fn reset(&mut self) {
        self.layout = Layout::default();
    }

    /// Replace the whole layout, e.g. when a saved template is opened.
    pub fn replace(&mut self, layout: Layout) {
        self.layout = layout.sanitized();
    }
}
