// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared handle to the job state plus change observers.
//!
//! Every mutation goes through [`JobState`] under one lock, so updates from
//! the stream, snapshot fetches, and command responses serialize no matter
//! which task delivers them. Observers run after the lock is released and
//! may read the store from inside their callback.

use parking_lot::Mutex;
use rj_core::{JobEvent, JobId, RecipeId, UpdateSource};
use rj_storage::{ApplyOutcome, Diagnostics, JobSnapshot, JobState};
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn(&JobSnapshot) + Send + Sync>;

struct Listener {
    id: u64,
    /// `None` observes every recipe
    recipe_id: Option<RecipeId>,
    callback: Callback,
}

struct Inner {
    state: JobState,
    listeners: Vec<Listener>,
    next_listener: u64,
}

/// Cloneable handle to the session's job state.
#[derive(Clone)]
pub struct JobStateStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for JobStateStore {
    fn default() -> Self {
        Self::new(JobState::default())
    }
}

impl JobStateStore {
    pub fn new(state: JobState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { state, listeners: Vec::new(), next_listener: 0 })),
        }
    }

    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self::new(JobState::new(log_capacity))
    }

    /// Apply an event and notify observers of the recipe if it changed anything.
    pub fn apply(&self, event: &JobEvent, source: UpdateSource) -> ApplyOutcome {
        self.mutate(event.recipe_id(), |state| state.apply_event(event, source))
    }

    /// Register a job returned by a create command.
    pub fn begin_job(&self, recipe_id: &RecipeId, job_id: JobId) -> ApplyOutcome {
        self.mutate(recipe_id, |state| state.begin_job(recipe_id, job_id))
    }

    pub fn note_malformed(&self) {
        self.inner.lock().state.note_malformed();
    }

    pub fn snapshot(&self, recipe_id: &RecipeId) -> JobSnapshot {
        self.inner.lock().state.snapshot(recipe_id)
    }

    /// Snapshots of every tracked recipe, sorted by recipe id.
    pub fn snapshots(&self) -> Vec<JobSnapshot> {
        let mut all: Vec<_> = self.inner.lock().state.records().map(|r| r.snapshot()).collect();
        all.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));
        all
    }

    /// Recipes whose current job is known and not terminal.
    pub fn active_jobs(&self) -> Vec<(RecipeId, JobId)> {
        self.inner.lock().state.active_jobs()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.inner.lock().state.diagnostics()
    }

    /// Observe accepted changes to one recipe.
    pub fn subscribe<F>(&self, recipe_id: &RecipeId, callback: F) -> Subscription
    where
        F: Fn(&JobSnapshot) + Send + Sync + 'static,
    {
        self.add_listener(Some(recipe_id.clone()), Arc::new(callback))
    }

    /// Observe accepted changes to any recipe.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&JobSnapshot) + Send + Sync + 'static,
    {
        self.add_listener(None, Arc::new(callback))
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn add_listener(&self, recipe_id: Option<RecipeId>, callback: Callback) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push(Listener { id, recipe_id, callback });
        Subscription { store: Arc::downgrade(&self.inner), id }
    }

    fn mutate(
        &self,
        recipe_id: &RecipeId,
        f: impl FnOnce(&mut JobState) -> ApplyOutcome,
    ) -> ApplyOutcome {
        let (outcome, notify) = {
            let mut inner = self.inner.lock();
            let outcome = f(&mut inner.state);
            if !outcome.is_change() {
                return outcome;
            }
            let snapshot = inner.state.snapshot(recipe_id);
            let callbacks: Vec<Callback> = inner
                .listeners
                .iter()
                .filter(|l| l.recipe_id.as_ref().is_none_or(|r| r == recipe_id))
                .map(|l| Arc::clone(&l.callback))
                .collect();
            (outcome, (snapshot, callbacks))
        };

        let (snapshot, callbacks) = notify;
        for callback in callbacks {
            callback(&snapshot);
        }
        outcome
    }
}

/// Keeps a store observer registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.lock().listeners.retain(|l| l.id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
