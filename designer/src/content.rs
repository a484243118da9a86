//! Certificate text fields.
//!
//! Content is free text with no validation. It is always rendered as a
//! literal string; hosts that build markup go through [`escape_markup`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

pub const DEFAULT_SLOGAN: &str = "Let no one split apart what God has joined together.";

/// The editable text of one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateContent {
    pub bride_name: String,
    pub groom_name: String,
    pub counselor_name: String,
    #[serde(alias = "date")]
    pub ceremony_date: String,
    #[serde(alias = "slogan")]
    pub slogan_text: String,
}

impl Default for CertificateContent {
    fn default() -> Self {
        Self {
            bride_name: String::new(),
            groom_name: String::new(),
            counselor_name: String::new(),
            ceremony_date: String::new(),
            slogan_text: DEFAULT_SLOGAN.to_owned(),
        }
    }
}

/// Names one text field of [`CertificateContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    BrideName,
    GroomName,
    CounselorName,
    CeremonyDate,
    SloganText,
}

/// A field name the host sent that is not a content field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content field: {0:?}")]
pub struct UnknownField(pub String);

impl ContentField {
    pub const ALL: [ContentField; 5] = [
        ContentField::BrideName,
        ContentField::GroomName,
        ContentField::CounselorName,
        ContentField::CeremonyDate,
        ContentField::SloganText,
    ];

    /// Text shown in place of an empty field.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::BrideName => "Bride Name",
            Self::GroomName => "Groom Name",
            Self::CounselorName => "Counselor Name",
            Self::CeremonyDate => "Month Day, Year",
            Self::SloganText => DEFAULT_SLOGAN,
        }
    }
}

impl FromStr for ContentField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brideName" => Ok(Self::BrideName),
            "groomName" => Ok(Self::GroomName),
            "counselorName" => Ok(Self::CounselorName),
            "ceremonyDate" | "date" => Ok(Self::CeremonyDate),
            "sloganText" | "slogan" => Ok(Self::SloganText),
            other => Err(UnknownField(other.to_owned())),
        }
    }
}

impl CertificateContent {
    #[must_use]
    pub fn get(&self, field: ContentField) -> &str {
        match field {
            ContentField::BrideName => &self.bride_name,
            ContentField::GroomName => &self.groom_name,
            ContentField::CounselorName => &self.counselor_name,
            ContentField::CeremonyDate => &self.ceremony_date,
            ContentField::SloganText => &self.slogan_text,
        }
    }

    pub fn set(&mut self, field: ContentField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContentField::BrideName => self.bride_name = value,
            ContentField::GroomName => self.groom_name = value,
            ContentField::CounselorName => self.counselor_name = value,
            ContentField::CeremonyDate => self.ceremony_date = value,
            ContentField::SloganText => self.slogan_text = value,
        }
    }

    /// The field's text, or its placeholder when blank.
    #[must_use]
    pub fn display(&self, field: ContentField) -> &str {
        let value = self.get(field);
        if value.trim().is_empty() { field.placeholder() } else { value }
    }
}

/// Escape text for literal inclusion in HTML element or attribute content.
#[must_use]
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() && c != '\n' && c != '\t' => {
                out.push_str(&format!("&#{};", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}
