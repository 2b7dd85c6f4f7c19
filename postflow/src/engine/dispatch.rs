//! Per-kind stage handlers.
//!
//! Dispatch is an exhaustive match over [`StageKind`]: each kind maps to
//! one handler that reads the shared context and the stage's own
//! configuration, calls its collaborator if it has one, and returns the
//! stage's payload. Merging payloads back into the context is the
//! sequencer's job.

use super::EngineConfig;
use crate::collaborators::{ComposeRequest, GenerativeClient, ImageRequest, SocialClient};
use crate::context::WorkflowContext;
use crate::core::{ImageData, StageConfig, StageKind, StagePayload};
use crate::errors::WorkflowError;
use crate::events::{names, EventSink};
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) struct StageCall<'a> {
    pub generative: &'a dyn GenerativeClient,
    pub social: &'a dyn SocialClient,
    pub engine: &'a EngineConfig,
    pub sink: &'a Arc<dyn EventSink>,
}

pub(crate) async fn run_stage(
    kind: StageKind,
    config: &StageConfig,
    context: &WorkflowContext,
    call: &StageCall<'_>,
) -> Result<StagePayload, WorkflowError> {
    match kind {
        StageKind::Input => input_stage(config),
        StageKind::Research => research_stage(context, call.generative).await,
        StageKind::Compose => compose_stage(config, context, call.generative).await,
        StageKind::Visual => visual_stage(config, context, call).await,
        StageKind::Preview => Ok(preview_stage(context)),
        StageKind::Publish => publish_stage(config, context, call.social).await,
        StageKind::Output => Ok(StagePayload::Snapshot(context.snapshot())),
    }
}

fn input_stage(config: &StageConfig) -> Result<StagePayload, WorkflowError> {
    let reference_image = match config.reference_image() {
        Some(payload) => Some(ImageData::from_base64(payload).map_err(|_| {
            WorkflowError::validation(StageKind::Input, "reference image is not valid base64")
        })?),
        None => None,
    };

    Ok(StagePayload::Seed {
        topic: config.topic().unwrap_or_default().to_string(),
        reference_image,
        auth_token: config.auth_token().map(str::to_string),
    })
}

async fn research_stage(
    context: &WorkflowContext,
    generative: &dyn GenerativeClient,
) -> Result<StagePayload, WorkflowError> {
    if !context.has_topic() {
        return Err(WorkflowError::missing_content(
            StageKind::Research,
            "a topic to research",
        ));
    }

    generative
        .research(&context.topic)
        .await
        .map(StagePayload::Research)
        .map_err(|e| WorkflowError::from_collaborator(StageKind::Research, &e))
}

async fn compose_stage(
    config: &StageConfig,
    context: &WorkflowContext,
    generative: &dyn GenerativeClient,
) -> Result<StagePayload, WorkflowError> {
    let source = context.compose_source().ok_or_else(|| {
        WorkflowError::missing_content(StageKind::Compose, "a research summary or a topic")
    })?;

    let request = ComposeRequest {
        text: source.to_string(),
        tone: config.tone().map(str::to_string),
        language: config.language().map(str::to_string),
        length: config.length().map(str::to_string),
        reference_image: context.reference_image.clone(),
    };

    generative
        .compose(&request)
        .await
        .map(StagePayload::Post)
        .map_err(|e| WorkflowError::from_collaborator(StageKind::Compose, &e))
}

/// Generates the requested number of images one call at a time, with a
/// fixed courtesy delay between calls. Individual failures are tolerated
/// as long as at least one image comes back.
async fn visual_stage(
    config: &StageConfig,
    context: &WorkflowContext,
    call: &StageCall<'_>,
) -> Result<StagePayload, WorkflowError> {
    let prompt = context.image_prompt().ok_or_else(|| {
        WorkflowError::missing_content(StageKind::Visual, "an image prompt or a topic")
    })?;

    let request = ImageRequest {
        prompt: prompt.to_string(),
        reference_image: context.reference_image.clone(),
        style: config.image_style().map(str::to_string),
    };
    let count = config.image_count();

    let mut images = Vec::with_capacity(count);
    let mut failed = 0;
    for index in 0..count {
        if index > 0 && call.engine.image_delay_ms > 0 {
            tokio::time::sleep(call.engine.image_delay()).await;
        }

        match call.generative.generate_image(&request).await {
            Ok(image) => images.push(image),
            Err(error) => {
                failed += 1;
                warn!(index, %error, "image generation attempt failed");
                call.sink.try_emit(
                    names::IMAGE_ATTEMPT_FAILED,
                    Some(serde_json::json!({
                        "index": index,
                        "error": error.to_string(),
                    })),
                );
            }
        }
    }

    if images.is_empty() {
        return Err(WorkflowError::AllImagesFailed { attempted: count });
    }

    Ok(StagePayload::Images { images, failed })
}

fn preview_stage(context: &WorkflowContext) -> StagePayload {
    if context.composed_post.is_none() {
        debug!("preview has no composed post yet, rendering awaiting-content state");
    }
    StagePayload::Snapshot(context.snapshot())
}

async fn publish_stage(
    config: &StageConfig,
    context: &WorkflowContext,
    social: &dyn SocialClient,
) -> Result<StagePayload, WorkflowError> {
    let token = context
        .auth_token
        .clone()
        .or_else(|| config.auth_token().map(str::to_string))
        .ok_or(WorkflowError::NotAuthenticated)?;

    let post = context
        .composed_post
        .as_ref()
        .ok_or_else(|| WorkflowError::missing_content(StageKind::Publish, "a composed post"))?;

    social
        .publish(&token, &post.full_text(), context.generated_images.first())
        .await
        .map(StagePayload::Published)
        .map_err(|e| WorkflowError::from_collaborator(StageKind::Publish, &e))
}
