//! Image references accepted by the analyzer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One submitted image: either a remote URL or inline base64 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSource {
    Url(String),
    Inline {
        /// Base64 payload without any `data:` prefix.
        data: String,
        #[serde(rename = "mediaType")]
        media_type: String,
    },
}

impl ImageSource {
    /// Parse a string reference: an http(s) URL or a `data:image/...;base64,` URL.
    pub fn from_reference(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(ImageSource::Url(reference.to_string()));
        }
        if let Some(rest) = reference.strip_prefix("data:") {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidInput("Malformed data URL".into()))?;
            let media_type = header
                .strip_suffix(";base64")
                .ok_or_else(|| Error::InvalidInput("Data URL must be base64 encoded".into()))?;
            return Self::inline(data, media_type);
        }
        Err(Error::InvalidInput(
            "Image must be an http(s) URL or a base64 data URL".into(),
        ))
    }

    /// Build an inline image from a base64 payload and declared media type.
    ///
    /// A payload that is itself a URL or data URL is accepted and parsed as such.
    pub fn inline(data: &str, media_type: &str) -> Result<Self> {
        let data = data.trim();
        if data.starts_with("data:") || data.starts_with("http://") || data.starts_with("https://") {
            return Self::from_reference(data);
        }
        if !media_type.starts_with("image/") {
            return Err(Error::InvalidInput("Invalid image format".into()));
        }
        if data.is_empty() {
            return Err(Error::InvalidInput("No screenshot provided".into()));
        }
        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(&compact)
            .map_err(|_| Error::InvalidInput("Image data is not valid base64".into()))?;
        Ok(ImageSource::Inline {
            data: compact,
            media_type: media_type.to_string(),
        })
    }

    /// The URL form used by OpenAI-compatible vision APIs.
    pub fn as_url(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Inline { data, media_type } => {
                format!("data:{};base64,{}", media_type, data)
            }
        }
    }

    /// Remote URL, if this image is referenced rather than inlined.
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageSource::Url(url) => Some(url),
            ImageSource::Inline { .. } => None,
        }
    }
}
