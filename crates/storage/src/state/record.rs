// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-recipe job record and the conflict-resolution rules.
//!
//! Every status update, whatever its source, goes through
//! [`JobRecord::apply_status`]. The rules, in order:
//!
//! 1. an update for a job id this record has superseded is dropped;
//! 2. an update for an unknown job id is adopted while the record is `IDLE`
//!    or has no job id, is stale or sticky against a terminal record, and is
//!    foreign otherwise;
//! 3. a sequence hint not newer than the last one seen for the job is a replay;
//! 4. the same status again is a duplicate;
//! 5. a lower rank is stale;
//! 6. a terminal record keeps its status.
//!
//! Anything else is accepted. Only [`JobRecord::begin_job`] replaces a job
//! instance. Log lines bypass the rank rules and are only filtered by job
//! identity; an id learned from log lines on an `IDLE` record gives way to
//! the first status update naming another job.

use rj_core::{JobId, JobStatus, LogRingBuffer, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of superseded job ids remembered per record.
pub const RETIRED_JOB_MEMORY: usize = 32;

/// Why an update was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Incoming rank is below the current rank
    Stale { current: JobStatus, incoming: JobStatus },
    /// The job already reached a terminal status
    TerminalSticky { current: JobStatus, incoming: JobStatus },
    /// The update names a job other than the record's current, non-terminal job
    ForeignJob { current: Option<JobId>, incoming: JobId },
    /// The update names a job instance this record has superseded
    RetiredJob { job_id: JobId },
    /// The sequence hint is not newer than one already applied
    ReplayedSeq { hint: u64, last: u64 },
}

rj_core::simple_display! {
    Rejection {
        Stale { .. } => "stale",
        TerminalSticky { .. } => "terminal",
        ForeignJob { .. } => "foreign-job",
        RetiredJob { .. } => "retired-job",
        ReplayedSeq { .. } => "replayed-seq",
    }
}

/// Result of applying one update to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Status advanced within the same job instance
    Applied { from: JobStatus, to: JobStatus },
    /// A new job instance replaced the previous one (log cleared)
    Superseded { previous: Option<JobId>, job_id: JobId, status: JobStatus },
    /// Log lines were appended
    Appended { lines: usize, evicted: usize },
    /// Nothing new: same status, or an empty log batch
    Duplicate,
    Rejected(Rejection),
}

impl ApplyOutcome {
    /// Whether observers should be notified.
    pub fn is_change(&self) -> bool {
        match self {
            ApplyOutcome::Applied { .. } | ApplyOutcome::Superseded { .. } => true,
            ApplyOutcome::Appended { lines, .. } => *lines > 0,
            ApplyOutcome::Duplicate | ApplyOutcome::Rejected(_) => false,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ApplyOutcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Read-only view of a record handed to display consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub recipe_id: RecipeId,
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub log: Vec<String>,
    /// Count of accepted updates; changes whenever the snapshot does.
    pub seq: u64,
}

impl JobSnapshot {
    /// Snapshot of a recipe that has never had a job.
    pub fn idle(recipe_id: RecipeId) -> Self {
        Self { recipe_id, job_id: None, status: JobStatus::Idle, log: Vec::new(), seq: 0 }
    }
}

/// Authoritative state of the current job for one recipe.
#[derive(Debug, Clone)]
pub struct JobRecord {
    recipe_id: RecipeId,
    job_id: Option<JobId>,
    status: JobStatus,
    status_rank: u8,
    log: LogRingBuffer,
    last_applied_seq: u64,
    last_seq_hint: Option<u64>,
    retired: VecDeque<JobId>,
}

impl JobRecord {
    pub fn new(recipe_id: RecipeId, log_capacity: usize) -> Self {
        Self {
            recipe_id,
            job_id: None,
            status: JobStatus::Idle,
            status_rank: JobStatus::Idle.rank(),
            log: LogRingBuffer::new(log_capacity),
            last_applied_seq: 0,
            last_seq_hint: None,
            retired: VecDeque::new(),
        }
    }

    pub fn recipe_id(&self) -> &RecipeId {
        &self.recipe_id
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn status_rank(&self) -> u8 {
        self.status_rank
    }

    pub fn log(&self) -> &LogRingBuffer {
        &self.log
    }

    pub fn last_applied_seq(&self) -> u64 {
        self.last_applied_seq
    }

    pub fn is_retired(&self, job_id: &JobId) -> bool {
        self.retired.contains(job_id)
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            recipe_id: self.recipe_id.clone(),
            job_id: self.job_id.clone(),
            status: self.status,
            log: self.log.to_vec(),
            seq: self.last_applied_seq,
        }
    }

    /// Apply a status update.
    pub(crate) fn apply_status(
        &mut self,
        job_id: Option<&JobId>,
        status: JobStatus,
        seq_hint: Option<u64>,
    ) -> ApplyOutcome {
        if let Some(incoming) = job_id {
            if self.is_retired(incoming) {
                return ApplyOutcome::Rejected(Rejection::RetiredJob { job_id: incoming.clone() });
            }
            if self.job_id.as_ref() != Some(incoming) {
                if self.status.is_terminal() {
                    return ApplyOutcome::Rejected(self.rank_rejection(status));
                }
                if self.job_id.is_some() && self.status != JobStatus::Idle {
                    return ApplyOutcome::Rejected(Rejection::ForeignJob {
                        current: self.job_id.clone(),
                        incoming: incoming.clone(),
                    });
                }
                // An id picked up from log lines alone is provisional until a status arrives
                if self.job_id.replace(incoming.clone()).is_some() {
                    self.log.clear();
                }
            }
        }

        if let (Some(hint), Some(last)) = (seq_hint, self.last_seq_hint) {
            if hint <= last {
                return ApplyOutcome::Rejected(Rejection::ReplayedSeq { hint, last });
            }
        }

        if status == self.status {
            return ApplyOutcome::Duplicate;
        }
        if status.rank() < self.status_rank || self.status.is_terminal() {
            return ApplyOutcome::Rejected(self.rank_rejection(status));
        }

        let from = self.status;
        self.set_status(status);
        self.note_seq_hint(seq_hint);
        self.last_applied_seq += 1;
        ApplyOutcome::Applied { from, to: status }
    }

    /// Append log lines for the current job instance.
    pub(crate) fn append_log(&mut self, job_id: Option<&JobId>, lines: &[String]) -> ApplyOutcome {
        if let Some(incoming) = job_id {
            if self.is_retired(incoming) {
                return ApplyOutcome::Rejected(Rejection::RetiredJob { job_id: incoming.clone() });
            }
            if self.job_id.as_ref() != Some(incoming) {
                if self.job_id.is_some() || self.status.is_terminal() {
                    return ApplyOutcome::Rejected(Rejection::ForeignJob {
                        current: self.job_id.clone(),
                        incoming: incoming.clone(),
                    });
                }
                self.job_id = Some(incoming.clone());
            }
        }

        if lines.is_empty() {
            return ApplyOutcome::Duplicate;
        }
        let evicted = self.log.extend(lines.iter().cloned());
        self.last_applied_seq += 1;
        ApplyOutcome::Appended { lines: lines.len(), evicted }
    }

    /// Register a job created by a start command.
    ///
    /// The record is replaced at `QUEUED` unless the stream already delivered
    /// events for this very job, in which case the creation is applied as an
    /// ordinary (most likely stale) update.
    pub(crate) fn begin_job(&mut self, job_id: JobId) -> ApplyOutcome {
        if self.job_id.as_ref() == Some(&job_id) {
            return self.apply_status(Some(&job_id), JobStatus::Queued, None);
        }
        self.supersede(job_id)
    }

    fn rank_rejection(&self, incoming: JobStatus) -> Rejection {
        if incoming.rank() < self.status_rank {
            Rejection::Stale { current: self.status, incoming }
        } else {
            Rejection::TerminalSticky { current: self.status, incoming }
        }
    }

    fn supersede(&mut self, job_id: JobId) -> ApplyOutcome {
        let status = JobStatus::Queued;
        let previous = self.job_id.take();
        if let Some(old) = &previous {
            if self.retired.len() == RETIRED_JOB_MEMORY {
                self.retired.pop_front();
            }
            self.retired.push_back(old.clone());
        }
        self.job_id = Some(job_id.clone());
        self.log.clear();
        self.set_status(status);
        self.last_seq_hint = None;
        self.last_applied_seq += 1;
        ApplyOutcome::Superseded { previous, job_id, status }
    }

    fn set_status(&mut self, status: JobStatus) {
        self.status = status;
        self.status_rank = status.rank();
    }

    fn note_seq_hint(&mut self, seq_hint: Option<u64>) {
        if let Some(hint) = seq_hint {
            self.last_seq_hint = Some(self.last_seq_hint.map_or(hint, |last| last.max(hint)));
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
