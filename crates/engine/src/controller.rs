// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-recipe command and observation façade.

use crate::store::{JobStateStore, Subscription};
use rj_adapters::{CommandTransport, TransportError};
use rj_core::{FileSelection, JobEvent, JobId, JobStatus, RecipeId, UpdateSource};
use rj_storage::JobSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// A command called in a state that does not allow it. No request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionViolation {
    #[error("cannot start {recipe_id}: job is {status}")]
    StartWhileActive { recipe_id: RecipeId, status: JobStatus },
    #[error("cannot stop {recipe_id}: job is {status}")]
    StopWhileInactive { recipe_id: RecipeId, status: JobStatus },
    #[error("cannot stop {recipe_id}: current job id is unknown")]
    MissingJobId { recipe_id: RecipeId },
    #[error("a command for {recipe_id} is already in flight")]
    CommandInFlight { recipe_id: RecipeId },
}

/// Errors surfaced to callers of [`JobController`] commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Handle for issuing commands and observing one recipe's job.
///
/// Clones share the same in-flight guard.
pub struct JobController<T> {
    recipe_id: RecipeId,
    store: JobStateStore,
    transport: Arc<T>,
    in_flight: Arc<AtomicBool>,
}

impl<T> Clone for JobController<T> {
    fn clone(&self) -> Self {
        Self {
            recipe_id: self.recipe_id.clone(),
            store: self.store.clone(),
            transport: Arc::clone(&self.transport),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T: CommandTransport> JobController<T> {
    pub fn new(recipe_id: RecipeId, store: JobStateStore, transport: Arc<T>) -> Self {
        Self { recipe_id, store, transport, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    pub fn recipe_id(&self) -> &RecipeId {
        &self.recipe_id
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.store.snapshot(&self.recipe_id)
    }

    pub fn status(&self) -> JobStatus {
        self.snapshot().status
    }

    /// Whether a start or stop request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Call `callback` with a fresh snapshot after every accepted change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&JobSnapshot) + Send + Sync + 'static,
    {
        self.store.subscribe(&self.recipe_id, callback)
    }

    /// Start a new job over `files`.
    ///
    /// Allowed from `IDLE` or a terminal status. On success the recipe's
    /// record is replaced by the new job at `QUEUED` and the new job id is
    /// returned; on failure the record is left as it was.
    pub async fn start(&self, files: FileSelection) -> Result<JobId, ControllerError> {
        let _guard = self.acquire()?;
        let status = self.status();
        if !status.is_startable() {
            return Err(PreconditionViolation::StartWhileActive {
                recipe_id: self.recipe_id.clone(),
                status,
            }
            .into());
        }

        tracing::info!(recipe_id = %self.recipe_id, files = files.files().len(), "starting job");
        let created = self.transport.create_job(&self.recipe_id, &files).await.map_err(|e| {
            tracing::warn!(recipe_id = %self.recipe_id, error = %e, "create job failed");
            e
        })?;

        self.store.begin_job(&self.recipe_id, created.job_id.clone());
        if created.status != JobStatus::Queued {
            let event = JobEvent::status(
                self.recipe_id.clone(),
                Some(created.job_id.clone()),
                created.status,
            );
            self.store.apply(&event, UpdateSource::Command);
        }
        Ok(created.job_id)
    }

    /// Request cancellation of the current job.
    ///
    /// Allowed from `QUEUED`, `INITIALIZING`, or `RUNNING`. A status in the
    /// response is applied like any other update; the job may keep reporting
    /// until the backend settles it.
    pub async fn stop(&self) -> Result<(), ControllerError> {
        let _guard = self.acquire()?;
        let snapshot = self.snapshot();
        if !snapshot.status.is_active() {
            return Err(PreconditionViolation::StopWhileInactive {
                recipe_id: self.recipe_id.clone(),
                status: snapshot.status,
            }
            .into());
        }
        let job_id = snapshot
            .job_id
            .ok_or_else(|| PreconditionViolation::MissingJobId { recipe_id: self.recipe_id.clone() })?;

        tracing::info!(recipe_id = %self.recipe_id, %job_id, "cancelling job");
        let outcome = self.transport.cancel_job(&job_id).await.map_err(|e| {
            tracing::warn!(recipe_id = %self.recipe_id, %job_id, error = %e, "cancel job failed");
            e
        })?;

        if let Some(status) = outcome.status {
            let event = JobEvent::status(self.recipe_id.clone(), Some(job_id), status);
            self.store.apply(&event, UpdateSource::Command);
        }
        Ok(())
    }

    fn acquire(&self) -> Result<InFlight<'_>, PreconditionViolation> {
        InFlight::acquire(&self.in_flight)
            .ok_or_else(|| PreconditionViolation::CommandInFlight { recipe_id: self.recipe_id.clone() })
    }
}

/// Marks a command as outstanding until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
