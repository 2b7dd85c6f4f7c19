//! The stage record held by the registry.

use super::config::{keys, StageConfig};
use super::{StageKind, StagePayload, StageStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One step of the content pipeline.
///
/// Stages are created once at workflow-definition time and live across
/// runs; only `status`, `output`, and `error` change during a run, and
/// only `config` and `enabled` change between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Stable identifier.
    pub id: Uuid,
    /// What this stage does.
    pub kind: StageKind,
    /// Whether the stage participates in the active order. Always true
    /// for the input and output anchors.
    pub enabled: bool,
    /// Stage-specific parameters.
    pub config: StageConfig,
    /// Run-time status.
    #[serde(default)]
    pub status: StageStatus,
    /// Last successful result, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<StagePayload>,
    /// Last error message, cleared at the start of each run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Stage {
    /// Creates a stage of the given kind with its declared defaults.
    #[must_use]
    pub fn new(kind: StageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            enabled: true,
            config: Self::default_config(kind),
            status: StageStatus::Idle,
            output: None,
            error: None,
        }
    }

    /// The declared default configuration for a stage kind.
    #[must_use]
    pub fn default_config(kind: StageKind) -> StageConfig {
        match kind {
            StageKind::Compose => StageConfig::new()
                .with_str(keys::TONE, "Professional")
                .with_str(keys::LANGUAGE, "en")
                .with_str(keys::LENGTH, "medium"),
            StageKind::Visual => StageConfig::new()
                .with(keys::IMAGE_COUNT, serde_json::json!(4))
                .with_str(keys::IMAGE_STYLE, "natural"),
            _ => StageConfig::new(),
        }
    }

    /// Clears run-time state (status, output, error) without touching
    /// the user-facing configuration.
    pub fn reset_run_state(&mut self) {
        self.status = StageStatus::Idle;
        self.output = None;
        self.error = None;
    }

    /// Restores the declared defaults: enabled, default config, and a
    /// clean run state.
    pub fn restore_defaults(&mut self) {
        self.enabled = true;
        self.config = Self::default_config(self.kind);
        self.reset_run_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stage_defaults() {
        let stage = Stage::new(StageKind::Compose);
        assert!(stage.enabled);
        assert_eq!(stage.status, StageStatus::Idle);
        assert!(stage.output.is_none());
        assert!(stage.error.is_none());
        assert_eq!(stage.config.tone(), Some("Professional"));
        assert_eq!(stage.config.length(), Some("medium"));
    }

    #[test]
    fn test_visual_default_image_count() {
        let stage = Stage::new(StageKind::Visual);
        assert_eq!(stage.config.image_count(), 4);
        assert_eq!(stage.config.image_style(), Some("natural"));
    }

    #[test]
    fn test_input_defaults_empty() {
        let stage = Stage::new(StageKind::Input);
        assert!(stage.config.is_empty());
    }

    #[test]
    fn test_reset_run_state_keeps_config() {
        let mut stage = Stage::new(StageKind::Research);
        stage.config.set(keys::TOPIC, serde_json::json!("rust"));
        stage.status = StageStatus::Error;
        stage.error = Some("boom".to_string());

        stage.reset_run_state();

        assert_eq!(stage.status, StageStatus::Idle);
        assert!(stage.error.is_none());
        assert_eq!(stage.config.topic(), Some("rust"));
    }

    #[test]
    fn test_restore_defaults() {
        let mut stage = Stage::new(StageKind::Compose);
        stage.enabled = false;
        stage.config.set(keys::TONE, serde_json::json!("Casual"));
        stage.status = StageStatus::Completed;

        stage.restore_defaults();

        assert!(stage.enabled);
        assert_eq!(stage.config.tone(), Some("Professional"));
        assert_eq!(stage.status, StageStatus::Idle);
    }

    #[test]
    fn test_stage_ids_are_unique() {
        let a = Stage::new(StageKind::Preview);
        let b = Stage::new(StageKind::Preview);
        assert_ne!(a.id, b.id);
    }
}
