// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response command transport to the reduction backend.
//!
//! The concrete HTTP client lives with the embedding application; the
//! coordinator only depends on this trait.

use async_trait::async_trait;
use rj_core::{FileSelection, JobId, JobStatus, RecipeId, ScopeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from command transport requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("backend unavailable")]
    Unavailable,
}

/// Response to a create-job command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Response to a cancel command. The backend may or may not report a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcome {
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// One entry of the active-jobs listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJob {
    pub job_id: JobId,
    pub recipe_id: RecipeId,
    pub status: JobStatus,
}

impl ActiveJob {
    pub fn new(recipe_id: impl Into<RecipeId>, job_id: impl Into<JobId>, status: JobStatus) -> Self {
        Self { job_id: job_id.into(), recipe_id: recipe_id.into(), status }
    }
}

/// Adapter for issuing commands to the backend
#[async_trait]
pub trait CommandTransport: Send + Sync + 'static {
    /// Create a job running `recipe_id` over the selected files.
    async fn create_job(
        &self,
        recipe_id: &RecipeId,
        files: &FileSelection,
    ) -> Result<CreatedJob, TransportError>;

    /// Ask the backend to cancel a job. Cancellation is a request; the job
    /// may keep running briefly.
    async fn cancel_job(&self, job_id: &JobId) -> Result<CancelOutcome, TransportError>;

    /// List jobs under `scope_id` that have not reached a terminal status.
    async fn list_active_jobs(&self, scope_id: &ScopeId) -> Result<Vec<ActiveJob>, TransportError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ActiveJob, CancelOutcome, CommandTransport, CreatedJob, TransportError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rj_core::{FileSelection, JobId, JobStatus, RecipeId, ScopeId};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// Recorded transport call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TransportCall {
        CreateJob { recipe_id: RecipeId, files: FileSelection },
        CancelJob { job_id: JobId },
        ListActiveJobs { scope_id: ScopeId },
    }

    #[derive(Default)]
    struct FakeTransportState {
        calls: Vec<TransportCall>,
        next_job: u64,
        create_results: VecDeque<Result<CreatedJob, TransportError>>,
        cancel_results: VecDeque<Result<CancelOutcome, TransportError>>,
        list_results: VecDeque<Result<Vec<ActiveJob>, TransportError>>,
        active_jobs: Vec<ActiveJob>,
        delay: Option<Duration>,
    }

    /// Fake command transport for testing.
    ///
    /// Scripted responses are consumed in order; once they run out, creates
    /// return `job-N` at `QUEUED`, cancels return no status, and listings
    /// return whatever [`FakeCommandTransport::set_active_jobs`] configured.
    #[derive(Clone, Default)]
    pub struct FakeCommandTransport {
        inner: Arc<Mutex<FakeTransportState>>,
    }

    impl FakeCommandTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<TransportCall> {
            self.inner.lock().calls.clone()
        }

        pub fn create_count(&self) -> usize {
            self.count(|c| matches!(c, TransportCall::CreateJob { .. }))
        }

        pub fn cancel_count(&self) -> usize {
            self.count(|c| matches!(c, TransportCall::CancelJob { .. }))
        }

        pub fn list_count(&self) -> usize {
            self.count(|c| matches!(c, TransportCall::ListActiveJobs { .. }))
        }

        fn count(&self, f: impl Fn(&TransportCall) -> bool) -> usize {
            self.inner.lock().calls.iter().filter(|c| f(c)).count()
        }

        pub fn respond_create(&self, job_id: impl Into<JobId>, status: JobStatus) {
            self.inner
                .lock()
                .create_results
                .push_back(Ok(CreatedJob { job_id: job_id.into(), status }));
        }

        pub fn fail_next_create(&self, error: TransportError) {
            self.inner.lock().create_results.push_back(Err(error));
        }

        pub fn respond_cancel(&self, status: Option<JobStatus>) {
            self.inner.lock().cancel_results.push_back(Ok(CancelOutcome { status }));
        }

        pub fn fail_next_cancel(&self, error: TransportError) {
            self.inner.lock().cancel_results.push_back(Err(error));
        }

        pub fn fail_next_list(&self, error: TransportError) {
            self.inner.lock().list_results.push_back(Err(error));
        }

        /// Jobs returned by listings once scripted results run out.
        pub fn set_active_jobs(&self, jobs: Vec<ActiveJob>) {
            self.inner.lock().active_jobs = jobs;
        }

        /// Delay every response by `delay` (calls are recorded before the wait).
        pub fn set_delay(&self, delay: Duration) {
            self.inner.lock().delay = Some(delay);
        }

        async fn respond<T>(
            &self,
            call: TransportCall,
            pick: impl FnOnce(&mut FakeTransportState) -> T,
        ) -> T {
            let delay = {
                let mut state = self.inner.lock();
                state.calls.push(call);
                state.delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            pick(&mut *self.inner.lock())
        }
    }

    #[async_trait]
    impl CommandTransport for FakeCommandTransport {
        async fn create_job(
            &self,
            recipe_id: &RecipeId,
            files: &FileSelection,
        ) -> Result<CreatedJob, TransportError> {
            let call =
                TransportCall::CreateJob { recipe_id: recipe_id.clone(), files: files.clone() };
            self.respond(call, |state| {
                state.create_results.pop_front().unwrap_or_else(|| {
                    state.next_job += 1;
                    Ok(CreatedJob {
                        job_id: JobId::new(format!("job-{}", state.next_job)),
                        status: JobStatus::Queued,
                    })
                })
            })
            .await
        }

        async fn cancel_job(&self, job_id: &JobId) -> Result<CancelOutcome, TransportError> {
            let call = TransportCall::CancelJob { job_id: job_id.clone() };
            self.respond(call, |state| {
                state.cancel_results.pop_front().unwrap_or_else(|| Ok(CancelOutcome::default()))
            })
            .await
        }

        async fn list_active_jobs(
            &self,
            scope_id: &ScopeId,
        ) -> Result<Vec<ActiveJob>, TransportError> {
            let call = TransportCall::ListActiveJobs { scope_id: scope_id.clone() };
            self.respond(call, |state| {
                state.list_results.pop_front().unwrap_or_else(|| Ok(state.active_jobs.clone()))
            })
            .await
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCommandTransport, TransportCall};

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
