//! Stage status and kind enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of work a pipeline stage performs.
///
/// The registry always carries the stages in this declaration order:
/// input first, output last, everything else in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Seeds the run with the user's topic, reference image, and credentials.
    Input,
    /// Gathers background material for the topic.
    Research,
    /// Writes the post text, hashtags, and an image prompt.
    Compose,
    /// Generates images for the post.
    Visual,
    /// Renders the accumulated content for inspection.
    Preview,
    /// Posts the content to the social platform.
    Publish,
    /// Aggregates the final context for display.
    Output,
}

impl StageKind {
    /// All kinds in registry order.
    pub const ALL: [Self; 7] = [
        Self::Input,
        Self::Research,
        Self::Compose,
        Self::Visual,
        Self::Preview,
        Self::Publish,
        Self::Output,
    ];

    /// Returns true for the anchor stages that cannot be disabled.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Research => write!(f, "research"),
            Self::Compose => write!(f, "compose"),
            Self::Visual => write!(f, "visual"),
            Self::Preview => write!(f, "preview"),
            Self::Publish => write!(f, "publish"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// The execution status of a stage within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage has not run yet (initial and post-reset state).
    Idle,
    /// Stage is currently executing.
    Running,
    /// Stage finished successfully.
    Completed,
    /// Stage failed and aborted the run.
    Error,
}

impl Default for StageStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status is terminal for the current run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns true if the stage finished successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_display() {
        assert_eq!(StageKind::Input.to_string(), "input");
        assert_eq!(StageKind::Research.to_string(), "research");
        assert_eq!(StageKind::Visual.to_string(), "visual");
        assert_eq!(StageKind::Output.to_string(), "output");
    }

    #[test]
    fn test_stage_kind_mandatory() {
        assert!(StageKind::Input.is_mandatory());
        assert!(StageKind::Output.is_mandatory());
        assert!(!StageKind::Research.is_mandatory());
        assert!(!StageKind::Publish.is_mandatory());
    }

    #[test]
    fn test_all_kinds_ordered() {
        assert_eq!(StageKind::ALL.first(), Some(&StageKind::Input));
        assert_eq!(StageKind::ALL.last(), Some(&StageKind::Output));
        assert_eq!(StageKind::ALL.len(), 7);
    }

    #[test]
    fn test_stage_status_default() {
        assert_eq!(StageStatus::default(), StageStatus::Idle);
    }

    #[test]
    fn test_stage_status_is_terminal() {
        assert!(StageStatus::Completed.is_terminal());
        assert!(StageStatus::Error.is_terminal());
        assert!(!StageStatus::Idle.is_terminal());
        assert!(!StageStatus::Running.is_terminal());
    }

    #[test]
    fn test_stage_status_serialize() {
        let status = StageStatus::Completed;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#""completed""#);

        let deserialized: StageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, StageStatus::Completed);
    }

    #[test]
    fn test_stage_kind_serialize() {
        let kind = StageKind::Visual;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#""visual""#);
    }
}
