// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{JobEvent, JobId, JobStatus};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for the lifecycle types.
pub mod strategies {
    use crate::JobStatus;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = JobStatus> {
        proptest::sample::select(JobStatus::ALL.to_vec())
    }

    /// Any status a backend can report (everything except the synthetic `IDLE`).
    pub fn arb_reported_status() -> impl Strategy<Value = JobStatus> {
        proptest::sample::select(JobStatus::ALL[1..].to_vec())
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn status_event(recipe: &str, job: &str, status: JobStatus) -> JobEvent {
    JobEvent::status(recipe, Some(JobId::new(job)), status)
}

pub fn status_event_seq(recipe: &str, job: &str, status: JobStatus, seq: u64) -> JobEvent {
    JobEvent::Status {
        recipe_id: recipe.into(),
        job_id: Some(JobId::new(job)),
        status,
        seq: Some(seq),
    }
}

pub fn log_event(recipe: &str, job: Option<&str>, lines: &[&str]) -> JobEvent {
    JobEvent::log(recipe, job.map(JobId::new), lines.iter().copied())
}

/// Wire-format JSON for a status message, as the push channel delivers it.
pub fn status_message(recipe: &str, job: &str, status: JobStatus) -> String {
    format!(r#"{{"kind":"status","recipeId":"{recipe}","jobId":"{job}","payload":"{status}"}}"#)
}

/// Wire-format JSON for a log message.
pub fn log_message(recipe: &str, job: &str, lines: &[&str]) -> String {
    let payload = serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string());
    format!(r#"{{"kind":"log","recipeId":"{recipe}","jobId":"{job}","payload":{payload}}}"#)
}
