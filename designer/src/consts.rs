//! Shared numeric constants for the designer crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Logical canvas width (US Letter landscape at 96 dpi).
pub const CANVAS_WIDTH: f64 = 1056.0;

/// Logical canvas height.
pub const CANVAS_HEIGHT: f64 = 816.0;

// ── Slogan ──────────────────────────────────────────────────────

pub const SLOGAN_SIZE_MIN: u32 = 24;
pub const SLOGAN_SIZE_MAX: u32 = 96;
pub const SLOGAN_SIZE_DEFAULT: u32 = 48;

// ── Signature blocks ────────────────────────────────────────────

pub const SIGNATURE_WIDTH_MIN: u32 = 150;
pub const SIGNATURE_WIDTH_MAX: u32 = 400;
pub const SIGNATURE_WIDTH_DEFAULT: u32 = 250;

/// Default top-left of the bride's signature block.
pub const BRIDE_SIGNATURE_DEFAULT: (f64, f64) = (100.0, 650.0);

/// Default top-left of the groom's signature block.
pub const GROOM_SIGNATURE_DEFAULT: (f64, f64) = (750.0, 650.0);

/// Default top-left of the counselor's signature block, centered between the other two.
pub const COUNSELOR_SIGNATURE_DEFAULT: (f64, f64) = (428.0, 650.0);
