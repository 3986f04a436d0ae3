// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of job records, one per recipe.

mod record;

pub use record::{ApplyOutcome, JobRecord, JobSnapshot, Rejection, RETIRED_JOB_MEMORY};

use rj_core::{JobEvent, JobId, RecipeId, UpdateSource, DEFAULT_LOG_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Counters describing what the engine did with incoming updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub accepted: u64,
    pub superseded: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub log_lines: u64,
    pub dropped_log_lines: u64,
    pub malformed: u64,
}

/// In-memory state of every tracked recipe.
///
/// Records are created on first reference and never removed; a new job for a
/// recipe replaces the record's contents in place.
#[derive(Debug, Clone)]
pub struct JobState {
    records: HashMap<RecipeId, JobRecord>,
    log_capacity: usize,
    diagnostics: Diagnostics,
}

impl Default for JobState {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl JobState {
    pub fn new(log_capacity: usize) -> Self {
        Self { records: HashMap::new(), log_capacity, diagnostics: Diagnostics::default() }
    }

    pub fn get(&self, recipe_id: &str) -> Option<&JobRecord> {
        self.records.get(recipe_id)
    }

    /// Snapshot of a recipe's record; an idle snapshot if it was never referenced.
    pub fn snapshot(&self, recipe_id: &RecipeId) -> JobSnapshot {
        self.records
            .get(recipe_id)
            .map(JobRecord::snapshot)
            .unwrap_or_else(|| JobSnapshot::idle(recipe_id.clone()))
    }

    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.records.values()
    }

    /// Recipes whose current job is known and not terminal.
    pub fn active_jobs(&self) -> Vec<(RecipeId, JobId)> {
        self.records
            .values()
            .filter(|r| r.status().is_active())
            .filter_map(|r| r.job_id().map(|j| (r.recipe_id().clone(), j.clone())))
            .collect()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Apply an event through the conflict-resolution rules.
    ///
    /// Snapshot entries, stream messages, and command responses all land here.
    /// The outcome is returned for observers and tests; rejections are never
    /// errors.
    pub fn apply_event(&mut self, event: &JobEvent, source: UpdateSource) -> ApplyOutcome {
        let log_capacity = self.log_capacity;
        let record = self
            .records
            .entry(event.recipe_id().clone())
            .or_insert_with(|| JobRecord::new(event.recipe_id().clone(), log_capacity));

        let outcome = match event {
            JobEvent::Status { job_id, status, seq, .. } => {
                record.apply_status(job_id.as_ref(), *status, *seq)
            }
            JobEvent::Log { job_id, lines, .. } => record.append_log(job_id.as_ref(), lines),
        };
        self.record_outcome(event, source, &outcome);
        outcome
    }

    /// Register a job created by a start command for `recipe_id`.
    pub fn begin_job(&mut self, recipe_id: &RecipeId, job_id: JobId) -> ApplyOutcome {
        let log_capacity = self.log_capacity;
        let record = self
            .records
            .entry(recipe_id.clone())
            .or_insert_with(|| JobRecord::new(recipe_id.clone(), log_capacity));
        let outcome = record.begin_job(job_id);
        let event = JobEvent::status(recipe_id.clone(), record.job_id().cloned(), record.status());
        self.record_outcome(&event, UpdateSource::Command, &outcome);
        outcome
    }

    /// Count a push message that could not be decoded.
    pub fn note_malformed(&mut self) {
        self.diagnostics.malformed += 1;
    }

    fn record_outcome(&mut self, event: &JobEvent, source: UpdateSource, outcome: &ApplyOutcome) {
        let d = &mut self.diagnostics;
        match outcome {
            ApplyOutcome::Applied { from, to } => {
                d.accepted += 1;
                if !from.can_transition_to(*to) {
                    debug!(%source, event = %event.log_summary(), %from, %to, "accepted transition skips states");
                }
            }
            ApplyOutcome::Superseded { previous, job_id, status } => {
                d.accepted += 1;
                d.superseded += 1;
                info!(
                    %source,
                    recipe_id = %event.recipe_id(),
                    previous = previous.as_ref().map(|p| p.as_str()).unwrap_or("-"),
                    %job_id,
                    %status,
                    "new job instance"
                );
            }
            ApplyOutcome::Appended { lines, evicted } => {
                d.accepted += 1;
                d.log_lines += *lines as u64;
                if *evicted > 0 {
                    debug!(recipe_id = %event.recipe_id(), evicted, "log buffer full, evicted oldest lines");
                }
            }
            ApplyOutcome::Duplicate => d.duplicates += 1,
            ApplyOutcome::Rejected(reason) => {
                d.rejected += 1;
                if let JobEvent::Log { lines, .. } = event {
                    d.dropped_log_lines += lines.len() as u64;
                }
                debug!(%source, event = %event.log_summary(), ?reason, "update rejected");
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
