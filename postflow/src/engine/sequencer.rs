//! The sequencer: drives one run across the active stage order.

use super::dispatch::{run_stage, StageCall};
use super::EngineConfig;
use crate::collaborators::{GenerativeClient, SocialClient, WorkflowPlan};
use crate::context::WorkflowContext;
use crate::core::{keys, StageKind, StagePayload, StageStatus};
use crate::errors::WorkflowError;
use crate::events::{get_event_sink, names, EventSink};
use crate::registry::StageRegistry;
use crate::utils::iso_timestamp;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Status of one stage at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatusEntry {
    /// The stage id.
    pub id: Uuid,
    /// The stage kind.
    pub kind: StageKind,
    /// The stage's final status for this run.
    pub status: StageStatus,
}

/// The explicit result of one run.
///
/// The report owns the context the run accumulated; nothing about a run
/// lives in ambient state. The registry the run executed against keeps
/// the per-stage statuses, outputs, and error annotations for the UI.
#[derive(Debug)]
pub struct RunReport {
    /// Identifier of this run.
    pub run_id: Uuid,
    /// Whether every active stage completed.
    pub success: bool,
    /// The originating error message when the run failed.
    pub error: Option<String>,
    /// Final status of every registry stage, in registry order.
    /// Disabled stages stay idle.
    pub statuses: Vec<StageStatusEntry>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: f64,
    /// The context accumulated by the run.
    pub context: WorkflowContext,
}

impl RunReport {
    /// The final status of the first stage of a kind, if present.
    #[must_use]
    pub fn status_of(&self, kind: StageKind) -> Option<StageStatus> {
        self.statuses
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.status)
    }
}

/// Walks the active stage order, dispatching each stage to its
/// collaborator and threading the shared context between them.
///
/// A run is strictly sequential: every collaborator call is awaited to
/// completion before the next stage starts, and the first stage error
/// aborts everything after it. Re-running always starts over from the
/// input stage.
pub struct Sequencer {
    generative: Arc<dyn GenerativeClient>,
    social: Arc<dyn SocialClient>,
    config: EngineConfig,
    event_sink: Arc<dyn EventSink>,
}

impl Sequencer {
    /// Creates a sequencer with the default configuration and the
    /// globally registered event sink.
    #[must_use]
    pub fn new(generative: Arc<dyn GenerativeClient>, social: Arc<dyn SocialClient>) -> Self {
        Self {
            generative,
            social,
            config: EngineConfig::default(),
            event_sink: get_event_sink(),
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Auto-configures the registry from the user's free-text intent.
    ///
    /// Asks the planner collaborator which optional stages to enable and
    /// how to configure each kind, applies the answer, and seeds the
    /// input stage's topic with the intent. Called once, before a run.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error when the planner call fails; the
    /// registry is left untouched in that case.
    pub async fn plan(
        &self,
        registry: &mut StageRegistry,
        intent: &str,
        has_reference_image: bool,
    ) -> Result<WorkflowPlan, WorkflowError> {
        let plan = self
            .generative
            .plan_workflow(intent, has_reference_image)
            .await
            .map_err(|e| WorkflowError::from_collaborator(StageKind::Input, &e))?;

        registry.apply_plan(&plan);
        if let Some(stage) = registry.stage_of_kind_mut(StageKind::Input) {
            stage
                .config
                .set(keys::TOPIC, serde_json::Value::String(intent.to_string()));
        }
        Ok(plan)
    }

    /// Executes one run against the registry.
    ///
    /// The registry is exclusively owned by the sequencer for the
    /// duration of the call; per-stage statuses, outputs, and error
    /// annotations are written back into it as the run progresses.
    pub async fn run(&self, registry: &mut StageRegistry) -> RunReport {
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        // Step 1: fail fast before touching any stage state.
        if let Err(validation) = validate_input(registry) {
            error!(%run_id, %validation, "run rejected");
            if let Some(stage) = registry.stage_of_kind_mut(StageKind::Input) {
                stage.error = Some(validation.to_string());
            }
            self.event_sink.try_emit(
                names::RUN_FAILED,
                Some(serde_json::json!({
                    "run_id": run_id,
                    "error": validation.to_string(),
                })),
            );
            return self.report(registry, run_id, false, Some(validation), start, WorkflowContext::new());
        }

        // Step 2: clean slate for statuses, outputs, errors, context.
        registry.reset_run_state();
        let mut context = WorkflowContext::new();

        // Step 3: the active order is fixed for the whole run.
        let order = registry.active_order();

        info!(%run_id, stages = order.len(), "run started");
        self.event_sink.try_emit(
            names::RUN_STARTED,
            Some(serde_json::json!({
                "run_id": run_id,
                "stages": order.len(),
                "timestamp": iso_timestamp(),
            })),
        );

        let call = StageCall {
            generative: self.generative.as_ref(),
            social: self.social.as_ref(),
            engine: &self.config,
            sink: &self.event_sink,
        };

        // Step 4: walk the order, aborting on the first stage error.
        for (index, stage_id) in order.iter().enumerate() {
            if index >= self.config.stage_limit {
                let limit_error = WorkflowError::StageLimitExceeded {
                    limit: self.config.stage_limit,
                };
                return self.fail_run(registry, run_id, limit_error, start, context);
            }

            let (kind, stage_config) = match registry.get_mut(*stage_id) {
                Some(stage) if !stage.enabled => {
                    let inconsistency = WorkflowError::RegistryInconsistency { kind: stage.kind };
                    return self.fail_run(registry, run_id, inconsistency, start, context);
                }
                Some(stage) => {
                    stage.status = StageStatus::Running;
                    (stage.kind, stage.config.clone())
                }
                None => {
                    let unknown = WorkflowError::UnknownStage { id: *stage_id };
                    return self.fail_run(registry, run_id, unknown, start, context);
                }
            };

            debug!(%run_id, stage = %kind, "stage started");
            self.event_sink.try_emit(
                names::STAGE_STARTED,
                Some(serde_json::json!({ "stage": kind.to_string() })),
            );

            let stage_start = Instant::now();
            match run_stage(kind, &stage_config, &context, &call).await {
                Ok(payload) => {
                    merge_payload(&mut context, &payload);
                    if let Some(stage) = registry.get_mut(*stage_id) {
                        stage.status = StageStatus::Completed;
                        stage.output = Some(payload);
                    }
                    self.event_sink.try_emit(
                        names::STAGE_COMPLETED,
                        Some(serde_json::json!({
                            "stage": kind.to_string(),
                            "duration_ms": stage_start.elapsed().as_secs_f64() * 1000.0,
                        })),
                    );
                }
                Err(stage_error) => {
                    if let Some(stage) = registry.get_mut(*stage_id) {
                        stage.status = StageStatus::Error;
                        stage.error = Some(stage_error.to_string());
                    }
                    self.event_sink.try_emit(
                        names::STAGE_FAILED,
                        Some(serde_json::json!({
                            "stage": kind.to_string(),
                            "error": stage_error.to_string(),
                        })),
                    );
                    return self.fail_run(registry, run_id, stage_error, start, context);
                }
            }

            // Rate-limit courtesy toward the external APIs; not after
            // the last stage.
            if index + 1 < order.len() && self.config.stage_delay_ms > 0 {
                tokio::time::sleep(self.config.stage_delay()).await;
            }
        }

        info!(%run_id, "run completed");
        self.event_sink.try_emit(
            names::RUN_COMPLETED,
            Some(serde_json::json!({
                "run_id": run_id,
                "duration_ms": start.elapsed().as_secs_f64() * 1000.0,
                "timestamp": iso_timestamp(),
            })),
        );
        self.report(registry, run_id, true, None, start, context)
    }

    fn fail_run(
        &self,
        registry: &StageRegistry,
        run_id: Uuid,
        run_error: WorkflowError,
        start: Instant,
        context: WorkflowContext,
    ) -> RunReport {
        error!(%run_id, %run_error, "run failed");
        self.event_sink.try_emit(
            names::RUN_FAILED,
            Some(serde_json::json!({
                "run_id": run_id,
                "error": run_error.to_string(),
            })),
        );
        self.report(registry, run_id, false, Some(run_error), start, context)
    }

    #[allow(clippy::unused_self)]
    fn report(
        &self,
        registry: &StageRegistry,
        run_id: Uuid,
        success: bool,
        run_error: Option<WorkflowError>,
        start: Instant,
        context: WorkflowContext,
    ) -> RunReport {
        RunReport {
            run_id,
            success,
            error: run_error.map(|e| e.to_string()),
            statuses: registry
                .stages()
                .iter()
                .map(|stage| StageStatusEntry {
                    id: stage.id,
                    kind: stage.kind,
                    status: stage.status,
                })
                .collect(),
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
            context,
        }
    }
}

/// Rejects the run before any stage state changes: the input stage must
/// be present and enabled, and must carry a topic or a reference image.
fn validate_input(registry: &StageRegistry) -> Result<(), WorkflowError> {
    let input = registry
        .stage_of_kind(StageKind::Input)
        .filter(|stage| stage.enabled)
        .ok_or_else(|| {
            WorkflowError::validation(StageKind::Input, "the pipeline has no enabled input stage")
        })?;

    if input.config.topic().is_none() && input.config.reference_image().is_none() {
        return Err(WorkflowError::validation(
            StageKind::Input,
            "provide a topic or a reference image before running",
        ));
    }

    Ok(())
}

/// Merges a stage's payload into the shared context according to the
/// field-ownership rules. The context only ever gains data.
fn merge_payload(context: &mut WorkflowContext, payload: &StagePayload) {
    match payload {
        StagePayload::Seed {
            topic,
            reference_image,
            auth_token,
        } => {
            if !topic.trim().is_empty() {
                context.topic = topic.clone();
            }
            if let Some(image) = reference_image {
                context.reference_image = Some(image.clone());
            }
            if let Some(token) = auth_token {
                context.auth_token = Some(token.clone());
            }
        }
        StagePayload::Research(result) => {
            context.research_result = Some(result.clone());
        }
        StagePayload::Post(post) => {
            context.composed_post = Some(post.clone());
        }
        StagePayload::Images { images, .. } => {
            context.generated_images.extend(images.iter().cloned());
        }
        // Read-only stages contribute nothing to the context.
        StagePayload::Snapshot(_) | StagePayload::Published(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ComposedPost, ImageData, ResearchResult};

    #[test]
    fn test_merge_seed_payload() {
        let mut context = WorkflowContext::new();
        merge_payload(
            &mut context,
            &StagePayload::Seed {
                topic: "launch week".to_string(),
                reference_image: Some(ImageData::from_bytes(b"ref")),
                auth_token: Some("token-1".to_string()),
            },
        );

        assert_eq!(context.topic, "launch week");
        assert!(context.reference_image.is_some());
        assert_eq!(context.auth_token.as_deref(), Some("token-1"));
    }

    #[test]
    fn test_merge_is_additive() {
        let mut context = WorkflowContext::new();
        context.topic = "kept".to_string();
        context.research_result = Some(ResearchResult::new("summary", Vec::new()));

        merge_payload(
            &mut context,
            &StagePayload::Post(ComposedPost::new("text", Vec::new(), "prompt")),
        );

        assert_eq!(context.topic, "kept");
        assert!(context.research_result.is_some());
        assert!(context.composed_post.is_some());
    }

    #[test]
    fn test_merge_images_appends_in_order() {
        let mut context = WorkflowContext::new();
        context.generated_images.push(ImageData::from_bytes(b"one"));

        merge_payload(
            &mut context,
            &StagePayload::Images {
                images: vec![ImageData::from_bytes(b"two"), ImageData::from_bytes(b"three")],
                failed: 0,
            },
        );

        let decoded: Vec<Vec<u8>> = context
            .generated_images
            .iter()
            .map(|i| i.decode().unwrap())
            .collect();
        assert_eq!(decoded, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_merge_snapshot_contributes_nothing() {
        let mut context = WorkflowContext::new();
        context.topic = "before".to_string();

        let mut foreign = WorkflowContext::new();
        foreign.topic = "other".to_string();
        merge_payload(&mut context, &StagePayload::Snapshot(foreign));

        assert_eq!(context.topic, "before");
    }
}
