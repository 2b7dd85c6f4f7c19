//! The ordered stage collection and its enable/config state.

use crate::collaborators::WorkflowPlan;
use crate::core::{Stage, StageConfig, StageKind};
use crate::errors::WorkflowError;
use uuid::Uuid;

/// Holds the pipeline's stages in execution order.
///
/// The registry owns the user-facing state between runs (enabled flags
/// and per-stage configuration) and the run-time state the sequencer
/// writes during a run (status, output, error). The stage set is fixed
/// at construction; stages are never created or destroyed per run.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Creates the full default pipeline: every stage kind, in order,
    /// enabled, with its declared default configuration.
    #[must_use]
    pub fn default_pipeline() -> Self {
        Self {
            stages: StageKind::ALL.iter().map(|kind| Stage::new(*kind)).collect(),
        }
    }

    /// Creates a registry from an explicit stage list.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the list starts with the input
    /// anchor and ends with the output anchor.
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self, WorkflowError> {
        match (stages.first(), stages.last()) {
            (Some(first), Some(last))
                if first.kind == StageKind::Input && last.kind == StageKind::Output =>
            {
                Ok(Self { stages })
            }
            _ => Err(WorkflowError::validation(
                StageKind::Input,
                "a pipeline must start with an input stage and end with an output stage",
            )),
        }
    }

    /// All stages in registry order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the registry holds no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Looks up a stage by id, mutably.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.id == id)
    }

    /// The first stage of a given kind.
    #[must_use]
    pub fn stage_of_kind(&self, kind: StageKind) -> Option<&Stage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    /// The first stage of a given kind, mutably.
    pub fn stage_of_kind_mut(&mut self, kind: StageKind) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.kind == kind)
    }

    /// Flips the enabled flag of a non-mandatory stage and returns the
    /// new value. The input and output anchors are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::MandatoryStage`] for the anchors and
    /// [`WorkflowError::UnknownStage`] for ids not in the registry.
    pub fn toggle(&mut self, id: Uuid) -> Result<bool, WorkflowError> {
        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(WorkflowError::UnknownStage { id })?;

        if stage.kind.is_mandatory() {
            return Err(WorkflowError::MandatoryStage { kind: stage.kind });
        }

        stage.enabled = !stage.enabled;
        Ok(stage.enabled)
    }

    /// Merges a partial configuration into a stage's config map. Status
    /// and output are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownStage`] for ids not in the
    /// registry.
    pub fn update_config(&mut self, id: Uuid, partial: &StageConfig) -> Result<(), WorkflowError> {
        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(WorkflowError::UnknownStage { id })?;
        stage.config.merge(partial);
        Ok(())
    }

    /// Restores every stage to its declared defaults, discarding all
    /// outputs. Idempotent.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.restore_defaults();
        }
    }

    /// Clears run-time state on every stage without touching the
    /// user-facing configuration. Called by the sequencer at run start.
    pub fn reset_run_state(&mut self) {
        for stage in &mut self.stages {
            stage.reset_run_state();
        }
    }

    /// The ids of enabled stages, in registry order. Since the anchors
    /// cannot be disabled, the order always starts at input and ends at
    /// output.
    #[must_use]
    pub fn active_order(&self) -> Vec<Uuid> {
        self.stages
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.id)
            .collect()
    }

    /// Adjacent pairs of the active order, for UI connectors. A pure
    /// function of the enabled set.
    #[must_use]
    pub fn connectors(&self) -> Vec<(Uuid, Uuid)> {
        let order = self.active_order();
        order.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Applies a planner result: enables or disables each non-mandatory
    /// stage according to the plan and overlays the plan's per-kind
    /// configuration. The anchors stay enabled regardless of the plan.
    pub fn apply_plan(&mut self, plan: &WorkflowPlan) {
        for stage in &mut self.stages {
            if !stage.kind.is_mandatory() {
                stage.enabled = plan.enables(stage.kind);
            }
            if let Some(partial) = plan.config_for(stage.kind) {
                stage.config.merge(partial);
            }
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{keys, StageStatus};

    #[test]
    fn test_default_pipeline_shape() {
        let registry = StageRegistry::default_pipeline();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.stages()[0].kind, StageKind::Input);
        assert_eq!(registry.stages()[6].kind, StageKind::Output);
        assert!(registry.stages().iter().all(|s| s.enabled));
    }

    #[test]
    fn test_from_stages_requires_anchors() {
        let missing_output = vec![Stage::new(StageKind::Input), Stage::new(StageKind::Compose)];
        assert!(StageRegistry::from_stages(missing_output).is_err());

        let valid = vec![Stage::new(StageKind::Input), Stage::new(StageKind::Output)];
        assert!(StageRegistry::from_stages(valid).is_ok());
    }

    #[test]
    fn test_toggle_flips_non_mandatory() {
        let mut registry = StageRegistry::default_pipeline();
        let id = registry.stage_of_kind(StageKind::Research).unwrap().id;

        assert!(!registry.toggle(id).unwrap());
        assert!(!registry.get(id).unwrap().enabled);
        assert!(registry.toggle(id).unwrap());
    }

    #[test]
    fn test_toggle_rejects_mandatory() {
        let mut registry = StageRegistry::default_pipeline();
        for kind in [StageKind::Input, StageKind::Output] {
            let id = registry.stage_of_kind(kind).unwrap().id;
            let result = registry.toggle(id);
            assert!(matches!(result, Err(WorkflowError::MandatoryStage { .. })));
            assert!(registry.get(id).unwrap().enabled);
        }
    }

    #[test]
    fn test_toggle_unknown_stage() {
        let mut registry = StageRegistry::default_pipeline();
        assert!(matches!(
            registry.toggle(Uuid::new_v4()),
            Err(WorkflowError::UnknownStage { .. })
        ));
    }

    #[test]
    fn test_update_config_merges() {
        let mut registry = StageRegistry::default_pipeline();
        let id = registry.stage_of_kind(StageKind::Compose).unwrap().id;

        let partial = StageConfig::new().with_str(keys::TONE, "Casual");
        registry.update_config(id, &partial).unwrap();

        let stage = registry.get(id).unwrap();
        assert_eq!(stage.config.tone(), Some("Casual"));
        assert_eq!(stage.config.language(), Some("en"));
        assert_eq!(stage.status, StageStatus::Idle);
    }

    #[test]
    fn test_active_order_skips_disabled() {
        let mut registry = StageRegistry::default_pipeline();
        let research = registry.stage_of_kind(StageKind::Research).unwrap().id;
        let visual = registry.stage_of_kind(StageKind::Visual).unwrap().id;
        registry.toggle(research).unwrap();
        registry.toggle(visual).unwrap();

        let order = registry.active_order();
        assert_eq!(order.len(), 5);
        assert!(!order.contains(&research));
        assert!(!order.contains(&visual));
        assert_eq!(order.first(), Some(&registry.stages()[0].id));
        assert_eq!(order.last(), Some(&registry.stages()[6].id));
    }

    #[test]
    fn test_connectors_are_adjacent_pairs() {
        let mut registry = StageRegistry::default_pipeline();
        let research = registry.stage_of_kind(StageKind::Research).unwrap().id;
        registry.toggle(research).unwrap();

        let order = registry.active_order();
        let connectors = registry.connectors();
        assert_eq!(connectors.len(), order.len() - 1);
        for (i, (from, to)) in connectors.iter().enumerate() {
            assert_eq!(*from, order[i]);
            assert_eq!(*to, order[i + 1]);
        }
    }

    #[test]
    fn test_reset_restores_defaults_and_is_idempotent() {
        let mut registry = StageRegistry::default_pipeline();
        let compose = registry.stage_of_kind(StageKind::Compose).unwrap().id;
        let research = registry.stage_of_kind(StageKind::Research).unwrap().id;

        registry.toggle(research).unwrap();
        registry
            .update_config(compose, &StageConfig::new().with_str(keys::TONE, "Edgy"))
            .unwrap();
        registry.stage_of_kind_mut(StageKind::Compose).unwrap().status = StageStatus::Error;

        registry.reset();
        let once = registry.clone();
        registry.reset();

        assert_eq!(registry, once);
        for stage in registry.stages() {
            assert!(stage.enabled);
            assert_eq!(stage.status, StageStatus::Idle);
            assert!(stage.output.is_none());
            assert!(stage.error.is_none());
            assert_eq!(stage.config, Stage::default_config(stage.kind));
        }
    }

    #[test]
    fn test_apply_plan_respects_anchors() {
        let mut registry = StageRegistry::default_pipeline();
        let plan = WorkflowPlan::new(); // enables nothing optional

        registry.apply_plan(&plan);

        assert!(registry.stage_of_kind(StageKind::Input).unwrap().enabled);
        assert!(registry.stage_of_kind(StageKind::Output).unwrap().enabled);
        assert!(!registry.stage_of_kind(StageKind::Research).unwrap().enabled);
        assert!(!registry.stage_of_kind(StageKind::Publish).unwrap().enabled);
    }

    #[test]
    fn test_apply_plan_overlays_config() {
        let mut registry = StageRegistry::default_pipeline();
        let plan = WorkflowPlan::new()
            .with_kind(StageKind::Compose)
            .with_config(
                StageKind::Compose,
                StageConfig::new().with_str(keys::TONE, "Founder Story"),
            );

        registry.apply_plan(&plan);

        let compose = registry.stage_of_kind(StageKind::Compose).unwrap();
        assert!(compose.enabled);
        assert_eq!(compose.config.tone(), Some("Founder Story"));
        assert_eq!(compose.config.language(), Some("en"));
    }
}
