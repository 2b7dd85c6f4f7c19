//! Content payload types produced by the external collaborators.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A single cited source from the research collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Human-readable title.
    pub title: String,
    /// Where the material came from.
    pub url: String,
}

impl Source {
    /// Creates a new source.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Structured result of the research stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Summary of the gathered material.
    pub summary: String,
    /// Cited sources, in the order the collaborator returned them.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// True when the collaborator fell back to a degraded summary
    /// because its upstream was unavailable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl ResearchResult {
    /// Creates a research result with a summary and sources.
    #[must_use]
    pub fn new(summary: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            summary: summary.into(),
            sources,
            degraded: false,
        }
    }

    /// Creates a degraded result produced without upstream material.
    #[must_use]
    pub fn degraded(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            sources: Vec::new(),
            degraded: true,
        }
    }
}

/// Structured result of the compose stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPost {
    /// The post body.
    pub text: String,
    /// Hashtags, each including the leading `#`.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Prompt text the visual stage feeds to image generation.
    #[serde(default)]
    pub image_prompt: String,
}

impl ComposedPost {
    /// Creates a composed post.
    #[must_use]
    pub fn new(text: impl Into<String>, hashtags: Vec<String>, image_prompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hashtags,
            image_prompt: image_prompt.into(),
        }
    }

    /// The publishable text: body plus hashtags on a trailing line.
    #[must_use]
    pub fn full_text(&self) -> String {
        if self.hashtags.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n\n{}", self.text, self.hashtags.join(" "))
        }
    }
}

/// A base64-encoded image payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// The image bytes, base64 encoded.
    pub base64: String,
    /// MIME type of the decoded bytes.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

impl ImageData {
    /// Wraps an already-encoded payload, validating the encoding.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the payload is not valid base64.
    pub fn from_base64(payload: impl Into<String>) -> Result<Self, base64::DecodeError> {
        let payload = payload.into();
        base64::engine::general_purpose::STANDARD.decode(&payload)?;
        Ok(Self {
            base64: payload,
            mime_type: default_mime_type(),
        })
    }

    /// Encodes raw bytes into a payload.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: default_mime_type(),
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Decodes the payload back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.base64)
    }
}

/// Confirmation returned by the social platform after posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Platform-assigned identifier of the post.
    pub external_id: String,
    /// Public URL of the post.
    pub url: String,
    /// Posted marker.
    pub posted: bool,
}

impl PublishReceipt {
    /// Creates a receipt for a successfully published post.
    #[must_use]
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
            posted: true,
        }
    }
}

/// Minimal identity of the authenticated social account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Platform-assigned account id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Account handle.
    pub handle: String,
}
