//! Testing utilities for workflow pipelines.
//!
//! This module provides:
//! - Scripted mock collaborators
//! - Assertion helpers for run reports

mod assertions;
mod mocks;

pub use assertions::{
    assert_run_failed, assert_run_succeeded, assert_stage_status, assert_stages_idle_after,
};
pub use mocks::{MockAuthProvider, MockGenerativeClient, MockSocialClient, PublishedCall};
