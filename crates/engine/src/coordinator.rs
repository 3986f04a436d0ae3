// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session coordinator: owns the store, the stream subscriber, the
//! reconciliation service, and the per-recipe controllers for one scope.

use crate::backoff::Backoff;
use crate::controller::JobController;
use crate::env::SessionConfig;
use crate::reconcile::{ReconcileReport, ReconciliationService};
use crate::store::JobStateStore;
use crate::subscriber::{Connectivity, StreamSubscriber};
use parking_lot::Mutex;
use rj_adapters::{CommandTransport, PushChannel, TransportError};
use rj_core::{RecipeId, ScopeId};
use rj_storage::{Diagnostics, JobSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Notify};
use tokio::task::JoinHandle;

struct Background {
    shutdown: Vec<oneshot::Sender<()>>,
    tasks: Vec<JoinHandle<()>>,
}

/// One live session over a scope (e.g. a run with several recipes).
///
/// Dropping the coordinator stops its background tasks; jobs on the backend
/// are never cancelled by teardown.
pub struct ReductionSessionCoordinator<T> {
    config: SessionConfig,
    store: JobStateStore,
    transport: Arc<T>,
    reconciler: ReconciliationService<T>,
    controllers: Mutex<HashMap<RecipeId, JobController<T>>>,
    connectivity: Arc<watch::Sender<Connectivity>>,
    background: Mutex<Option<Background>>,
}

impl<T: CommandTransport> ReductionSessionCoordinator<T> {
    pub fn new(scope_id: impl Into<ScopeId>, transport: T, config: SessionConfig) -> Self {
        let store = JobStateStore::with_log_capacity(config.log_capacity);
        let transport = Arc::new(transport);
        let reconciler =
            ReconciliationService::new(Arc::clone(&transport), store.clone(), scope_id.into());
        let (connectivity, _) = watch::channel(Connectivity::Closed);
        Self {
            config,
            store,
            transport,
            reconciler,
            controllers: Mutex::new(HashMap::new()),
            connectivity: Arc::new(connectivity),
            background: Mutex::new(None),
        }
    }

    pub fn scope_id(&self) -> &ScopeId {
        self.reconciler.scope_id()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &JobStateStore {
        &self.store
    }

    /// Open the push channel, then take the initial snapshot.
    ///
    /// The subscription starts first so nothing published between the fetch
    /// and the first stream message is lost. A failed fetch is returned but
    /// leaves the stream running; call [`Self::refresh`] to retry. Calling
    /// `start` on a running session only reconciles.
    pub async fn start<P: PushChannel>(
        &self,
        channel: P,
    ) -> Result<ReconcileReport, TransportError> {
        self.spawn_background(channel);
        self.refresh().await
    }

    /// Re-fetch the active-job listing and merge it.
    pub async fn refresh(&self) -> Result<ReconcileReport, TransportError> {
        self.reconciler.reconcile().await
    }

    /// Controller for `recipe_id`, created on first use and shared afterwards.
    pub fn controller(&self, recipe_id: impl Into<RecipeId>) -> JobController<T> {
        let recipe_id = recipe_id.into();
        self.controllers
            .lock()
            .entry(recipe_id.clone())
            .or_insert_with(|| {
                JobController::new(recipe_id, self.store.clone(), Arc::clone(&self.transport))
            })
            .clone()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.lock().len()
    }

    pub fn snapshot(&self, recipe_id: &RecipeId) -> JobSnapshot {
        self.store.snapshot(recipe_id)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.store.diagnostics()
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity.borrow().clone()
    }

    pub fn watch_connectivity(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.background.lock().is_some()
    }

    /// Close the push channel and stop resyncing. Backend jobs keep running;
    /// a later session can reattach to them through reconciliation.
    pub async fn shutdown(&self) {
        let background = self.background.lock().take();
        let Some(background) = background else {
            return;
        };
        for tx in background.shutdown {
            let _ = tx.send(());
        }
        for task in background.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "session task ended abnormally");
            }
        }
        self.connectivity.send_replace(Connectivity::Closed);
        tracing::info!(scope_id = %self.scope_id(), "session closed");
    }

    fn spawn_background<P: PushChannel>(&self, channel: P) {
        let mut background = self.background.lock();
        if background.is_some() {
            tracing::debug!(scope_id = %self.scope_id(), "session already started");
            return;
        }

        let subscriber = StreamSubscriber::new(
            channel,
            self.store.clone(),
            Backoff::new(self.config.reconnect_base, self.config.reconnect_max),
            Arc::clone(&self.connectivity),
        );
        let recovered = subscriber.recovered();
        let (stream_tx, stream_rx) = oneshot::channel();
        let (resync_tx, resync_rx) = oneshot::channel();

        let tasks = vec![
            tokio::spawn(subscriber.run(stream_rx)),
            tokio::spawn(resync_loop(
                self.reconciler.clone(),
                self.connectivity.subscribe(),
                recovered,
                self.config.resync_interval,
                resync_rx,
            )),
        ];
        tracing::info!(scope_id = %self.scope_id(), "session started");
        *background = Some(Background { shutdown: vec![stream_tx, resync_tx], tasks });
    }
}

impl<T> Drop for ReductionSessionCoordinator<T> {
    fn drop(&mut self) {
        if let Some(background) = self.background.get_mut().take() {
            for task in background.tasks {
                task.abort();
            }
        }
    }
}

/// Re-reconcile after the stream recovers from a gap, and every `interval`
/// while it stays degraded.
async fn resync_loop<T: CommandTransport>(
    reconciler: ReconciliationService<T>,
    mut connectivity: watch::Receiver<Connectivity>,
    recovered: Arc<Notify>,
    interval: Option<Duration>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let interval = interval.filter(|d| !d.is_zero());
    // Placeholder period when periodic resync is off; the tick branch is disabled then
    let period = interval.unwrap_or(Duration::from_secs(3600));
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut degraded = connectivity.borrow_and_update().is_degraded();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = recovered.notified() => resync(&reconciler, "stream recovered").await,
            _ = ticker.tick(), if degraded && interval.is_some() => {
                resync(&reconciler, "stream degraded").await;
            }
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                let now_degraded = connectivity.borrow_and_update().is_degraded();
                if now_degraded && !degraded {
                    ticker.reset();
                }
                degraded = now_degraded;
            }
        }
    }
}

async fn resync(reconciler: &ReconciliationService<impl CommandTransport>, reason: &str) {
    match reconciler.reconcile().await {
        Ok(report) => tracing::debug!(reason, applied = report.applied, "resync complete"),
        Err(e) => tracing::warn!(reason, error = %e, "resync failed"),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
