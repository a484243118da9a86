//! Inline `data:` image URLs.
//!
//! Generated backgrounds travel as `data:{mime};base64,{payload}` until a
//! template is saved, at which point the bytes are uploaded and the URL is
//! replaced with a durable one.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[cfg(test)]
#[path = "data_url_test.rs"]
mod data_url_test;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is missing the payload separator")]
    MissingSeparator,
    #[error("data URL payload is not base64-encoded")]
    NotBase64,
    #[error("data URL media type is not an image: {0}")]
    NotImage(String),
    #[error("data URL payload failed to decode: {0}")]
    Decode(String),
    #[error("data URL payload is empty")]
    Empty,
}

/// A decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse and decode a base64 image data URL.
    ///
    /// # Errors
    ///
    /// Returns a [`DataUrlError`] naming the first thing wrong with `url`.
    pub fn parse(url: &str) -> Result<Self, DataUrlError> {
        let rest = url.strip_prefix(PREFIX).ok_or(DataUrlError::NotDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::MissingSeparator)?;
        let mime = meta.strip_suffix(BASE64_MARKER).ok_or(DataUrlError::NotBase64)?;
        let mime = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(DataUrlError::NotImage(mime));
        }
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact).map_err(|e| DataUrlError::Decode(e.to_string()))?;
        if bytes.is_empty() {
            return Err(DataUrlError::Empty);
        }
        Ok(Self { mime, bytes })
    }

    #[must_use]
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { mime: mime.into(), bytes }
    }

    /// Encode back into `data:{mime};base64,{payload}` form.
    #[must_use]
    pub fn to_url(&self) -> String {
        format!("{PREFIX}{}{BASE64_MARKER},{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// File extension for the blob path.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        extension_for(&self.mime)
    }
}

/// File extension for an image MIME type; PNG when unrecognized.
#[must_use]
pub fn extension_for(mime: &str) -> &'static str {
    match mime.split(';').next().unwrap_or_default().trim() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}

/// Whether `url` is an inline data URL rather than a network reference.
#[must_use]
pub fn is_data_url(url: &str) -> bool {
    url.starts_with(PREFIX)
}
