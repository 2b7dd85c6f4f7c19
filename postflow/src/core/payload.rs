//! Per-stage output payloads.

use super::{ComposedPost, ImageData, PublishReceipt, ResearchResult};
use crate::context::WorkflowContext;
use serde::{Deserialize, Serialize};

/// The result payload a stage leaves behind after a successful run.
///
/// Each stage kind produces exactly one variant; the sequencer merges it
/// into the shared [`WorkflowContext`] according to the field-ownership
/// rules and stores it on the stage for inspection. Stages without a
/// payload of their own (preview, output) snapshot the whole context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StagePayload {
    /// The input stage's seed values.
    Seed {
        /// The run topic.
        topic: String,
        /// Optional reference image.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_image: Option<ImageData>,
        /// Optional pre-set credential.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        auth_token: Option<String>,
    },
    /// Research stage output.
    Research(ResearchResult),
    /// Compose stage output.
    Post(ComposedPost),
    /// Visual stage output: generated images plus the number of
    /// tolerated per-image failures.
    Images {
        /// Successfully generated images, in request order.
        images: Vec<ImageData>,
        /// How many generation attempts failed.
        #[serde(default)]
        failed: usize,
    },
    /// A read-only snapshot of the whole context (preview, output).
    Snapshot(WorkflowContext),
    /// Publish stage output: the posted marker.
    Published(PublishReceipt),
}

impl StagePayload {
    /// Returns the generated images if this is a visual payload.
    #[must_use]
    pub fn images(&self) -> Option<&[ImageData]> {
        match self {
            Self::Images { images, .. } => Some(images),
            _ => None,
        }
    }

    /// Returns the publish receipt if this is a publish payload.
    #[must_use]
    pub fn receipt(&self) -> Option<&PublishReceipt> {
        match self {
            Self::Published(receipt) => Some(receipt),
            _ => None,
        }
    }

    /// Returns the context snapshot if this is a preview/output payload.
    #[must_use]
    pub fn snapshot(&self) -> Option<&WorkflowContext> {
        match self {
            Self::Snapshot(context) => Some(context),
            _ => None,
        }
    }
}
