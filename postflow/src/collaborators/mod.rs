//! Black-box interfaces to the external services.
//!
//! The engine treats content generation and social publishing as opaque
//! async calls: a collaborator either returns a structured payload or an
//! error. Whatever retry or fallback a collaborator performs internally
//! is invisible to the sequencer.

mod retry;

#[cfg(feature = "http")]
mod http;

pub use retry::{Backoff, Jitter, RetryPolicy, with_retry};

#[cfg(feature = "http")]
pub use http::{HttpClientConfig, HttpGenerativeClient, HttpSocialClient};

use crate::core::{ComposedPost, ImageData, PublishReceipt, ResearchResult, StageConfig, StageKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Planner output: which optional stages to enable and how to configure
/// each kind, derived from the user's free-text intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    /// Optional stage kinds the plan turns on.
    #[serde(default)]
    pub enabled_kinds: HashSet<StageKind>,
    /// Per-kind configuration overlays.
    #[serde(default)]
    pub per_kind_config: HashMap<StageKind, StageConfig>,
}

impl WorkflowPlan {
    /// Creates an empty plan: anchors only, no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a stage kind, builder style.
    #[must_use]
    pub fn with_kind(mut self, kind: StageKind) -> Self {
        self.enabled_kinds.insert(kind);
        self
    }

    /// Adds a configuration overlay for a kind, builder style.
    #[must_use]
    pub fn with_config(mut self, kind: StageKind, config: StageConfig) -> Self {
        self.per_kind_config.insert(kind, config);
        self
    }

    /// Whether the plan enables a kind. Anchors are always enabled.
    #[must_use]
    pub fn enables(&self, kind: StageKind) -> bool {
        kind.is_mandatory() || self.enabled_kinds.contains(&kind)
    }

    /// The configuration overlay for a kind, if the plan carries one.
    #[must_use]
    pub fn config_for(&self, kind: StageKind) -> Option<&StageConfig> {
        self.per_kind_config.get(&kind)
    }
}

/// Parameters for a compose call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeRequest {
    /// Source text to write from: a research summary or the raw topic.
    pub text: String,
    /// Writing tone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    /// Output language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Target length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    /// Optional reference image to write against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ImageData>,
}

impl ComposeRequest {
    /// Creates a request with just source text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: None,
            language: None,
            length: None,
            reference_image: None,
        }
    }
}

/// Parameters for a single image generation call. Each call requests
/// exactly one image; the visual stage issues one call per image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The prompt to draw.
    pub prompt: String,
    /// Optional reference image to condition on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<ImageData>,
    /// Optional style hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl ImageRequest {
    /// Creates a request with just a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_image: None,
            style: None,
        }
    }
}

/// The generative-AI backend: planning, research, writing, and image
/// generation.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Derives a workflow plan from the user's free-text intent.
    async fn plan_workflow(
        &self,
        intent: &str,
        has_reference_image: bool,
    ) -> anyhow::Result<WorkflowPlan>;

    /// Gathers background material for a topic. Implementations should
    /// degrade to a best-effort summary rather than failing when their
    /// upstream is merely unavailable.
    async fn research(&self, topic: &str) -> anyhow::Result<ResearchResult>;

    /// Writes a post from the given source text.
    async fn compose(&self, request: &ComposeRequest) -> anyhow::Result<ComposedPost>;

    /// Generates exactly one image.
    async fn generate_image(&self, request: &ImageRequest) -> anyhow::Result<ImageData>;
}

/// The social platform: publishing on behalf of an authenticated user.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Publishes a post under the given credential, optionally with one
    /// image attached.
    async fn publish(
        &self,
        token: &str,
        text: &str,
        image: Option<&ImageData>,
    ) -> anyhow::Result<PublishReceipt>;
}
