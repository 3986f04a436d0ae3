// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot reconciliation against the backend's active-job listing.

use crate::store::JobStateStore;
use rj_adapters::{CommandTransport, TransportError};
use rj_core::{JobEvent, RecipeId, ScopeId, UpdateSource};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Listed jobs that changed a record
    pub applied: usize,
    /// Listed jobs that matched what the store already had
    pub unchanged: usize,
    /// Listed jobs rejected by the conflict rules (usually stale)
    pub rejected: usize,
    /// Recipes tracked as active locally but missing from the listing
    pub unlisted: Vec<RecipeId>,
}

/// Feeds the backend's active-job listing through the same rules as the stream.
pub struct ReconciliationService<T> {
    transport: Arc<T>,
    store: JobStateStore,
    scope_id: ScopeId,
}

impl<T> Clone for ReconciliationService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            store: self.store.clone(),
            scope_id: self.scope_id.clone(),
        }
    }
}

impl<T: CommandTransport> ReconciliationService<T> {
    pub fn new(transport: Arc<T>, store: JobStateStore, scope_id: ScopeId) -> Self {
        Self { transport, store, scope_id }
    }

    pub fn scope_id(&self) -> &ScopeId {
        &self.scope_id
    }

    /// Fetch the listing and apply every entry as a snapshot update.
    ///
    /// A failed fetch leaves the store untouched. Locally active jobs missing
    /// from the listing are reported but not changed; the stream or a later
    /// pass settles them.
    pub async fn reconcile(&self) -> Result<ReconcileReport, TransportError> {
        let jobs = match self.transport.list_active_jobs(&self.scope_id).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(scope_id = %self.scope_id, error = %e, "active job listing failed");
                return Err(e);
            }
        };

        let mut report = ReconcileReport::default();
        let mut listed = HashSet::with_capacity(jobs.len());
        for job in jobs {
            listed.insert(job.recipe_id.clone());
            let event = JobEvent::status(job.recipe_id, Some(job.job_id), job.status);
            let outcome = self.store.apply(&event, UpdateSource::Snapshot);
            if outcome.is_change() {
                report.applied += 1;
            } else if outcome.rejection().is_some() {
                report.rejected += 1;
            } else {
                report.unchanged += 1;
            }
        }

        report.unlisted = self
            .store
            .active_jobs()
            .into_iter()
            .filter(|(recipe_id, _)| !listed.contains(recipe_id))
            .map(|(recipe_id, _)| recipe_id)
            .collect();
        report.unlisted.sort();

        if !report.unlisted.is_empty() {
            tracing::debug!(unlisted = ?report.unlisted, "active jobs missing from listing");
        }
        tracing::info!(
            scope_id = %self.scope_id,
            applied = report.applied,
            unchanged = report.unchanged,
            rejected = report.rejected,
            unlisted = report.unlisted.len(),
            "reconciled active jobs"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
