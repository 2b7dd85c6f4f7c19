//! The shared accumulator threaded through one run.

use crate::core::{ComposedPost, ImageData, ResearchResult};
use serde::{Deserialize, Serialize};

/// The single mutable record accumulating cross-stage data for one run.
///
/// The context is monotonically additive: stages only add fields, never
/// remove previously set ones, so a later stage may read anything an
/// earlier stage produced regardless of adjacency. It is created empty
/// at run start, owned exclusively by the sequencer while the run is in
/// flight, and handed back inside the run report. It is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContext {
    /// Free-text subject, seeded by the input stage.
    #[serde(default)]
    pub topic: String,
    /// Optional reference image, seeded by the input stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ImageData>,
    /// Opaque social credential, seeded by the input stage or read from
    /// the publish stage's own configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Research stage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_result: Option<ResearchResult>,
    /// Compose stage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composed_post: Option<ComposedPost>,
    /// Generated images, insertion order = generation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_images: Vec<ImageData>,
}

impl WorkflowContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clones the current state for a read-only payload.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// The text the compose stage should write from: the research
    /// summary when available, otherwise the raw topic.
    #[must_use]
    pub fn compose_source(&self) -> Option<&str> {
        self.research_result
            .as_ref()
            .map(|r| r.summary.as_str())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.topic.as_str()).filter(|s| !s.trim().is_empty()))
    }

    /// The prompt the visual stage should draw from: the composed
    /// post's image prompt when available, otherwise the raw topic.
    #[must_use]
    pub fn image_prompt(&self) -> Option<&str> {
        self.composed_post
            .as_ref()
            .map(|p| p.image_prompt.as_str())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.topic.as_str()).filter(|s| !s.trim().is_empty()))
    }

    /// Returns true once a topic has been seeded.
    #[must_use]
    pub fn has_topic(&self) -> bool {
        !self.topic.trim().is_empty()
    }
}
