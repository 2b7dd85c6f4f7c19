//! Error types for the workflow engine.
//!
//! The taxonomy distinguishes validation failures (caught before a stage
//! runs), collaborator failures (surfaced from the external services),
//! and run-level safety violations. Quota and rate-limit phrasing coming
//! back from a collaborator is rewritten into a clearer user-facing
//! message.

use crate::core::StageKind;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for workflow operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    /// Required input was missing before a stage ran.
    #[error("{message}")]
    Validation {
        /// The stage the message is attached to.
        kind: StageKind,
        /// Human-readable description.
        message: String,
    },

    /// An external collaborator call failed.
    #[error("{kind} stage failed: {message}")]
    Collaborator {
        /// The stage that made the call.
        kind: StageKind,
        /// The collaborator's error text.
        message: String,
    },

    /// A collaborator reported a quota or rate limit problem.
    #[error("The {kind} provider is rate limited or out of quota; wait a moment and re-run")]
    QuotaExceeded {
        /// The stage that made the call.
        kind: StageKind,
    },

    /// Publish was attempted without a credential anywhere in context.
    #[error("Not authenticated: connect a social account before publishing")]
    NotAuthenticated,

    /// A stage's fallback chain found nothing to work from.
    #[error("{kind} stage has no usable input: {needed}")]
    MissingContent {
        /// The stage missing its input.
        kind: StageKind,
        /// What the stage needed.
        needed: String,
    },

    /// Every image generation attempt failed.
    #[error("all {attempted} image generation attempts failed")]
    AllImagesFailed {
        /// How many attempts were made.
        attempted: usize,
    },

    /// A disabled stage appeared in the active order. Defensive; should
    /// be unreachable when the order comes from the registry.
    #[error("registry inconsistency: disabled {kind} stage reached during a run")]
    RegistryInconsistency {
        /// The stage that was reached.
        kind: StageKind,
    },

    /// The run processed more stages than the safety counter allows.
    #[error("run exceeded the stage safety limit of {limit}")]
    StageLimitExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// The authentication flow did not finish within its window.
    #[error("authentication timed out after {seconds} seconds")]
    AuthTimeout {
        /// The configured timeout.
        seconds: f64,
    },

    /// The authentication flow failed outright.
    #[error("authentication failed: {message}")]
    Auth {
        /// The provider's error text.
        message: String,
    },

    /// Attempted to toggle an anchor stage.
    #[error("the {kind} stage is mandatory and cannot be disabled")]
    MandatoryStage {
        /// The anchor kind.
        kind: StageKind,
    },

    /// No stage with the given id exists in the registry.
    #[error("unknown stage: {id}")]
    UnknownStage {
        /// The requested id.
        id: Uuid,
    },
}

impl WorkflowError {
    /// Creates a validation error attached to a stage.
    #[must_use]
    pub fn validation(kind: StageKind, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Creates a missing-content error for a stage.
    #[must_use]
    pub fn missing_content(kind: StageKind, needed: impl Into<String>) -> Self {
        Self::MissingContent {
            kind,
            needed: needed.into(),
        }
    }

    /// Wraps a collaborator failure, rewriting quota phrasing into a
    /// clearer user-facing message.
    #[must_use]
    pub fn from_collaborator(kind: StageKind, error: &anyhow::Error) -> Self {
        let message = error.to_string();
        if is_quota_message(&message) {
            Self::QuotaExceeded { kind }
        } else {
            Self::Collaborator { kind, message }
        }
    }

    /// The stage this error annotates, if it belongs to one.
    #[must_use]
    pub fn stage_kind(&self) -> Option<StageKind> {
        match self {
            Self::Validation { kind, .. }
            | Self::Collaborator { kind, .. }
            | Self::QuotaExceeded { kind }
            | Self::MissingContent { kind, .. }
            | Self::RegistryInconsistency { kind }
            | Self::MandatoryStage { kind } => Some(*kind),
            Self::NotAuthenticated | Self::Auth { .. } | Self::AuthTimeout { .. } => {
                Some(StageKind::Publish)
            }
            Self::AllImagesFailed { .. } => Some(StageKind::Visual),
            Self::StageLimitExceeded { .. } | Self::UnknownStage { .. } => None,
        }
    }
}

fn quota_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"(?i)quota|rate.?limit|too many requests|\b429\b").unwrap()
    })
}

/// Returns true if the error text looks like a quota or rate limit
/// failure from an upstream service.
#[must_use]
pub fn is_quota_message(message: &str) -> bool {
    quota_pattern().is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_detection() {
        assert!(is_quota_message("429 Too Many Requests"));
        assert!(is_quota_message("Quota exceeded for project"));
        assert!(is_quota_message("rate-limited, retry later"));
        assert!(is_quota_message("Rate limit reached"));
        assert!(!is_quota_message("connection refused"));
        assert!(!is_quota_message("invalid api key"));
    }

    #[test]
    fn test_from_collaborator_rewrites_quota() {
        let err = anyhow::anyhow!("upstream said: 429 Too Many Requests");
        let wrapped = WorkflowError::from_collaborator(StageKind::Research, &err);
        assert_eq!(
            wrapped,
            WorkflowError::QuotaExceeded {
                kind: StageKind::Research
            }
        );
        assert!(wrapped.to_string().contains("rate limited or out of quota"));
    }

    #[test]
    fn test_from_collaborator_passes_through_other_errors() {
        let err = anyhow::anyhow!("connection reset by peer");
        let wrapped = WorkflowError::from_collaborator(StageKind::Compose, &err);
        assert!(matches!(
            wrapped,
            WorkflowError::Collaborator {
                kind: StageKind::Compose,
                ..
            }
        ));
        assert!(wrapped.to_string().contains("connection reset"));
    }

    #[test]
    fn test_stage_kind_annotation() {
        assert_eq!(
            WorkflowError::NotAuthenticated.stage_kind(),
            Some(StageKind::Publish)
        );
        assert_eq!(
            WorkflowError::AllImagesFailed { attempted: 4 }.stage_kind(),
            Some(StageKind::Visual)
        );
        assert_eq!(
            WorkflowError::StageLimitExceeded { limit: 16 }.stage_kind(),
            None
        );
    }

    #[test]
    fn test_not_authenticated_is_distinct() {
        let auth = WorkflowError::NotAuthenticated.to_string();
        let content = WorkflowError::missing_content(StageKind::Publish, "a composed post").to_string();
        assert_ne!(auth, content);
        assert!(auth.contains("Not authenticated"));
    }
}
