//! Background assets, presets and style themes.
//!
//! DESIGN
//! ======
//! Each background pairs an image reference with a [`Theme`], a closed set
//! of named color schemes for text, border and accent lines. The wire form
//! keeps the three concrete color strings so stored records stay readable
//! by any client; reading a record maps the triple back to its theme and
//! rejects triples that belong to no theme. Records from the previous
//! editor carry utility class names (`text-slate-900`, `text-white`)
//! instead of colors; those resolve by the text class's color family.
//!
//! Preset assets are a process-wide immutable table. Generated assets get
//! an id prefixed with [`GENERATED_ID_PREFIX`] and an inline `data:` image
//! until they are uploaded as part of a saved template.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

/// Id prefix marking assets produced by the image generator.
pub const GENERATED_ID_PREFIX: &str = "generated-";

/// Scheme prefix of an image held inline rather than at a network location.
pub const INLINE_IMAGE_PREFIX: &str = "data:";

// =============================================================================
// THEME
// =============================================================================

/// Named style-token sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark slate text for light, busy backgrounds.
    #[default]
    Ink,
    /// White text for dark photographic backgrounds.
    Ivory,
    /// Warm brown text with gold rules.
    Gilded,
    /// Deep green text for botanical backgrounds.
    Sage,
}

/// A color triple that matches no [`Theme`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown style tokens: text={text}, border={border}, accent={accent}")]
pub struct UnknownStyleTokens {
    pub text: String,
    pub border: String,
    pub accent: String,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Ink, Theme::Ivory, Theme::Gilded, Theme::Sage];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ink => "ink",
            Self::Ivory => "ivory",
            Self::Gilded => "gilded",
            Self::Sage => "sage",
        }
    }

    #[must_use]
    pub fn text_color(self) -> &'static str {
        match self {
            Self::Ink => "#0f172a",
            Self::Ivory => "#ffffff",
            Self::Gilded => "#422006",
            Self::Sage => "#14532d",
        }
    }

    #[must_use]
    pub fn border_color(self) -> &'static str {
        match self {
            Self::Ink => "#1e293b",
            Self::Ivory => "#f8fafc",
            Self::Gilded => "#a16207",
            Self::Sage => "#166534",
        }
    }

    #[must_use]
    pub fn accent_color(self) -> &'static str {
        match self {
            Self::Ink => "#334155",
            Self::Ivory => "#e2e8f0",
            Self::Gilded => "#ca8a04",
            Self::Sage => "#4d7c0f",
        }
    }

    /// Resolve a stored color triple back to its theme. Colors compare
    /// case-insensitively. A triple whose text token is a `text-*` class
    /// resolves through [`Theme::from_text_class`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStyleTokens`] when no theme uses exactly this triple.
    pub fn from_tokens(text: &str, border: &str, accent: &str) -> Result<Self, UnknownStyleTokens> {
        Self::ALL
            .into_iter()
            .find(|theme| {
                theme.text_color().eq_ignore_ascii_case(text.trim())
                    && theme.border_color().eq_ignore_ascii_case(border.trim())
                    && theme.accent_color().eq_ignore_ascii_case(accent.trim())
            })
            .or_else(|| Self::from_text_class(text))
            .ok_or_else(|| UnknownStyleTokens { text: text.to_owned(), border: border.to_owned(), accent: accent.to_owned() })
    }

    /// Theme for a utility text class such as `text-slate-900` or
    /// `text-white`. Unlisted color families get the default theme; `None`
    /// when `class` is not a text class at all.
    #[must_use]
    pub fn from_text_class(class: &str) -> Option<Self> {
        let family = class.trim().strip_prefix("text-")?.split('-').next()?;
        let theme = match family.to_ascii_lowercase().as_str() {
            "" => return None,
            "white" => Self::Ivory,
            "amber" | "yellow" | "orange" | "stone" => Self::Gilded,
            "green" | "emerald" | "teal" | "lime" => Self::Sage,
            _ => Self::Ink,
        };
        Some(theme)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown theme: {s}"))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// BACKGROUND ASSET
// =============================================================================

/// A selectable background image with its style theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BackgroundWire", into = "BackgroundWire")]
pub struct BackgroundAsset {
    pub id: String,
    pub name: String,
    /// Network URL, site-relative path, or inline `data:` URL.
    pub image_ref: String,
    pub theme: Theme,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackgroundWire {
    id: String,
    name: String,
    #[serde(alias = "url")]
    image_ref: String,
    text_color: String,
    border_color: String,
    accent_color: String,
}

impl TryFrom<BackgroundWire> for BackgroundAsset {
    type Error = UnknownStyleTokens;

    fn try_from(wire: BackgroundWire) -> Result<Self, Self::Error> {
        let theme = Theme::from_tokens(&wire.text_color, &wire.border_color, &wire.accent_color)?;
        Ok(Self { id: wire.id, name: wire.name, image_ref: wire.image_ref, theme })
    }
}

impl From<BackgroundAsset> for BackgroundWire {
    fn from(asset: BackgroundAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name,
            image_ref: asset.image_ref,
            text_color: asset.theme.text_color().to_owned(),
            border_color: asset.theme.border_color().to_owned(),
            accent_color: asset.theme.accent_color().to_owned(),
        }
    }
}

impl BackgroundAsset {
    /// Wrap a freshly generated image with a unique `generated-` id and the default theme.
    #[must_use]
    pub fn generated(name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id: format!("{GENERATED_ID_PREFIX}{}", Uuid::new_v4()),
            name: name.into(),
            image_ref: image_ref.into(),
            theme: Theme::default(),
        }
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.id.starts_with(GENERATED_ID_PREFIX)
    }

    /// Whether the image is held inline rather than at a durable location.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.image_ref.starts_with(INLINE_IMAGE_PREFIX)
    }
}

// =============================================================================
// PRESETS
// =============================================================================

const PRESET_TABLE: [(&str, &str, &str, Theme); 6] = [
    ("classic-parchment", "Classic Parchment", "/backgrounds/classic-parchment.jpg", Theme::Ink),
    ("ivory-lace", "Ivory Lace", "/backgrounds/ivory-lace.jpg", Theme::Ink),
    ("golden-filigree", "Golden Filigree", "/backgrounds/golden-filigree.jpg", Theme::Gilded),
    ("eucalyptus", "Eucalyptus", "/backgrounds/eucalyptus.jpg", Theme::Sage),
    ("midnight-roses", "Midnight Roses", "/backgrounds/midnight-roses.jpg", Theme::Ivory),
    ("chapel-window", "Chapel Window", "/backgrounds/chapel-window.jpg", Theme::Ivory),
];

static PRESETS: LazyLock<Vec<BackgroundAsset>> = LazyLock::new(|| {
    PRESET_TABLE
        .iter()
        .map(|(id, name, image_ref, theme)| BackgroundAsset {
            id: (*id).to_owned(),
            name: (*name).to_owned(),
            image_ref: (*image_ref).to_owned(),
            theme: *theme,
        })
        .collect()
});

/// The built-in backgrounds, in display order. Never empty.
#[must_use]
pub fn presets() -> &'static [BackgroundAsset] {
    &PRESETS
}

/// Look up a preset by id.
#[must_use]
pub fn preset(id: &str) -> Option<&'static BackgroundAsset> {
    presets().iter().find(|asset| asset.id == id)
}
