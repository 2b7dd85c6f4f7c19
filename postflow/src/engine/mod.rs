//! The sequential workflow execution engine.
//!
//! This module provides:
//! - The engine configuration (delays and the stage safety limit)
//! - Per-kind stage dispatch
//! - The sequencer that drives a run from input to output

mod dispatch;
mod sequencer;


pub use sequencer::{RunReport, Sequencer, StageStatusEntry};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and safety configuration for the sequencer.
///
/// All delays are configurable rather than hard-coded so tests can run
/// the engine without waiting out rate-limit courtesy pauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause between consecutive stages, in milliseconds.
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,
    /// Pause between per-image generation calls, in milliseconds.
    #[serde(default = "default_image_delay_ms")]
    pub image_delay_ms: u64,
    /// Safety ceiling on stages processed in one run. Guarantees
    /// termination even under a corrupted registry.
    #[serde(default = "default_stage_limit")]
    pub stage_limit: usize,
}

fn default_stage_delay_ms() -> u64 {
    1000
}

fn default_image_delay_ms() -> u64 {
    1500
}

fn default_stage_limit() -> usize {
    16
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stage_delay_ms: default_stage_delay_ms(),
            image_delay_ms: default_image_delay_ms(),
            stage_limit: default_stage_limit(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with no delays, for tests and local tooling.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            stage_delay_ms: 0,
            image_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Sets the inter-stage delay.
    #[must_use]
    pub fn with_stage_delay_ms(mut self, millis: u64) -> Self {
        self.stage_delay_ms = millis;
        self
    }

    /// Sets the per-image delay.
    #[must_use]
    pub fn with_image_delay_ms(mut self, millis: u64) -> Self {
        self.image_delay_ms = millis;
        self
    }

    /// Sets the stage safety limit.
    #[must_use]
    pub fn with_stage_limit(mut self, limit: usize) -> Self {
        self.stage_limit = limit;
        self
    }

    /// The inter-stage delay as a [`Duration`].
    #[must_use]
    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }

    /// The per-image delay as a [`Duration`].
    #[must_use]
    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }
}
