//! Assertion helpers for run reports.

use crate::core::{StageKind, StageStatus};
use crate::engine::RunReport;

/// Asserts that a run completed successfully.
///
/// # Panics
///
/// Panics if the run failed.
#[track_caller]
pub fn assert_run_succeeded(report: &RunReport) {
    assert!(
        report.success,
        "expected run to succeed, but it failed with: {:?}",
        report.error
    );
    assert!(report.error.is_none());
}

/// Asserts that a run failed and the error mentions the fragment.
///
/// # Panics
///
/// Panics if the run succeeded or the error does not match.
#[track_caller]
pub fn assert_run_failed(report: &RunReport, fragment: &str) {
    assert!(!report.success, "expected run to fail, but it succeeded");
    let message = report
        .error
        .as_deref()
        .unwrap_or_else(|| panic!("failed run has no error message"));
    assert!(
        message.contains(fragment),
        "expected error containing {fragment:?}, got {message:?}"
    );
}

/// Asserts the final status of a stage kind.
///
/// # Panics
///
/// Panics if the stage is missing or its status differs.
#[track_caller]
pub fn assert_stage_status(report: &RunReport, kind: StageKind, status: StageStatus) {
    let actual = report
        .status_of(kind)
        .unwrap_or_else(|| panic!("no {kind} stage in report"));
    assert_eq!(
        actual, status,
        "expected {kind} stage to be {status}, got {actual}"
    );
}

/// Asserts that every stage after the given kind (in registry order)
/// stayed idle, i.e. never executed.
///
/// # Panics
///
/// Panics if the stage is missing or a later stage left idle state.
#[track_caller]
pub fn assert_stages_idle_after(report: &RunReport, kind: StageKind) {
    let position = report
        .statuses
        .iter()
        .position(|entry| entry.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} stage in report"));

    for entry in &report.statuses[position + 1..] {
        assert_eq!(
            entry.status,
            StageStatus::Idle,
            "expected {} stage to stay idle after {kind} aborted the run",
            entry.kind
        );
    }
}
