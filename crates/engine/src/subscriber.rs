// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel lifecycle: connect, decode, dispatch, reconnect.

use crate::backoff::Backoff;
use crate::store::JobStateStore;
use rj_adapters::{PushChannel, PushStream};
use rj_core::{JobEvent, UpdateSource};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Notify};

/// Health of the push channel as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Connectivity {
    /// First connection attempt in progress
    Connecting,
    Connected,
    /// Connection lost or never established; reconnecting with backoff
    Degraded { attempt: u32, reason: String },
    /// No connection is open or being attempted
    Closed,
}

rj_core::simple_display! {
    Connectivity {
        Connecting => "connecting",
        Connected => "connected",
        Degraded { .. } => "degraded",
        Closed => "closed",
    }
}

impl Connectivity {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Connectivity::Degraded { .. })
    }
}

enum StreamEnd {
    Lost(String),
    Shutdown,
}

/// Background task feeding push messages into the store.
pub struct StreamSubscriber<P> {
    channel: P,
    store: JobStateStore,
    backoff: Backoff,
    connectivity: Arc<watch::Sender<Connectivity>>,
    recovered: Arc<Notify>,
}

impl<P: PushChannel> StreamSubscriber<P> {
    pub fn new(
        channel: P,
        store: JobStateStore,
        backoff: Backoff,
        connectivity: Arc<watch::Sender<Connectivity>>,
    ) -> Self {
        Self { channel, store, backoff, connectivity, recovered: Arc::new(Notify::new()) }
    }

    /// Signalled whenever a connection opens after a gap (a reconnect, or a
    /// first connect that only succeeded after failures).
    pub fn recovered(&self) -> Arc<Notify> {
        Arc::clone(&self.recovered)
    }

    /// Run until `shutdown` fires (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut connected_before = false;
        self.publish(Connectivity::Connecting);

        loop {
            let connect = tokio::select! {
                result = self.channel.connect() => result,
                _ = &mut shutdown => break,
            };

            let reason = match connect {
                Ok(mut stream) => {
                    let after_gap = connected_before || self.backoff.attempt() > 0;
                    self.backoff.reset();
                    connected_before = true;
                    tracing::info!(reconnect = after_gap, "push channel connected");
                    self.publish(Connectivity::Connected);
                    if after_gap {
                        self.recovered.notify_one();
                    }
                    match self.pump(stream.as_mut(), &mut shutdown).await {
                        StreamEnd::Shutdown => break,
                        StreamEnd::Lost(reason) => reason,
                    }
                }
                Err(e) => e.to_string(),
            };

            let delay = self.backoff.next_delay();
            let attempt = self.backoff.attempt();
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %reason,
                "push channel unavailable, reconnecting"
            );
            self.publish(Connectivity::Degraded { attempt, reason });

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("push channel closed");
        self.publish(Connectivity::Closed);
    }

    async fn pump(
        &self,
        stream: &mut dyn PushStream,
        shutdown: &mut oneshot::Receiver<()>,
    ) -> StreamEnd {
        loop {
            tokio::select! {
                msg = stream.next_message() => match msg {
                    Some(Ok(text)) => self.dispatch(&text),
                    Some(Err(e)) => return StreamEnd::Lost(e.to_string()),
                    None => return StreamEnd::Lost("stream ended".to_string()),
                },
                _ = &mut *shutdown => return StreamEnd::Shutdown,
            }
        }
    }

    /// Decode one message and apply it. Bad messages never end the stream.
    fn dispatch(&self, text: &str) {
        match JobEvent::decode(text) {
            Ok(event) => {
                let outcome = self.store.apply(&event, UpdateSource::Stream);
                tracing::trace!(event = %event.log_summary(), ?outcome, "push event applied");
            }
            Err(e) => {
                tracing::warn!(error = %e, len = text.len(), "dropping malformed push message");
                self.store.note_malformed();
            }
        }
    }

    fn publish(&self, state: Connectivity) {
        self.connectivity.send_replace(state);
    }
}

#[cfg(test)]
#[path = "subscriber_tests.rs"]
mod tests;
