// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle state machine.
//!
//! ```text
//! IDLE ─► QUEUED ─► INITIALIZING ─► RUNNING ─► DONE | ERROR | CANCELED
//!            │            │
//!            └────────────┴──► CANCELED | ERROR
//! ```
//!
//! `IDLE` is synthetic: it is the state of a recipe before any job exists.
//! The three terminal states share the maximum rank.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a reduction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Idle,
    Queued,
    Initializing,
    Running,
    Done,
    Error,
    Canceled,
}

impl JobStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Idle,
        JobStatus::Queued,
        JobStatus::Initializing,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Error,
        JobStatus::Canceled,
    ];

    /// Ordering rank used to detect stale updates.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Idle => 0,
            JobStatus::Queued => 1,
            JobStatus::Initializing => 2,
            JobStatus::Running => 3,
            JobStatus::Done | JobStatus::Error | JobStatus::Canceled => 4,
        }
    }

    /// Whether this status is terminal (no further transitions for the job instance)
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error | JobStatus::Canceled)
    }

    /// Whether a job in this status can be stopped.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Initializing | JobStatus::Running)
    }

    /// Whether a new job may be started from this status.
    pub fn is_startable(self) -> bool {
        self == JobStatus::Idle || self.is_terminal()
    }

    /// Whether `self -> next` is a direct edge of the lifecycle.
    ///
    /// Out-of-order delivery means the engine regularly observes jumps that
    /// are not direct edges; acceptance is decided by rank, this is only used
    /// for diagnostics.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Idle, Queued)
                | (Queued, Initializing)
                | (Initializing, Running)
                | (Running, Done | Error | Canceled)
                | (Queued | Initializing, Canceled | Error)
        )
    }
}

crate::simple_display! {
    JobStatus {
        Idle => "IDLE",
        Queued => "QUEUED",
        Initializing => "INITIALIZING",
        Running => "RUNNING",
        Done => "DONE",
        Error => "ERROR",
        Canceled => "CANCELED",
    }
}

/// Error returned when a status string is not part of the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; accepts the British `CANCELLED` spelling as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDLE" => Ok(JobStatus::Idle),
            "QUEUED" => Ok(JobStatus::Queued),
            "INITIALIZING" => Ok(JobStatus::Initializing),
            "RUNNING" => Ok(JobStatus::Running),
            "DONE" => Ok(JobStatus::Done),
            "ERROR" => Ok(JobStatus::Error),
            "CANCELED" | "CANCELLED" => Ok(JobStatus::Canceled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
