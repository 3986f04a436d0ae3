// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ChannelError, PushChannel, PushStream};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

type Frame = Result<String, ChannelError>;

#[derive(Default)]
struct FakePushState {
    attempts: u32,
    connections: u32,
    connect_failures: VecDeque<ChannelError>,
    sender: Option<mpsc::UnboundedSender<Frame>>,
}

/// Fake push channel driven by the test.
///
/// Each successful connect opens a fresh in-memory stream; messages pushed by
/// the test go to the most recent one.
#[derive(Clone, Default)]
pub struct FakePushChannel {
    inner: Arc<Mutex<FakePushState>>,
    connected: Arc<Notify>,
}

impl FakePushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next connect attempt fail. Failures queue up.
    pub fn fail_next_connect(&self, error: ChannelError) {
        self.inner.lock().connect_failures.push_back(error);
    }

    /// Send a raw text message on the open connection.
    ///
    /// Returns false when no connection is open.
    pub fn push(&self, text: impl Into<String>) -> bool {
        match &self.inner.lock().sender {
            Some(tx) => tx.send(Ok(text.into())).is_ok(),
            None => false,
        }
    }

    /// Break the open connection with an error.
    pub fn break_connection(&self, error: ChannelError) {
        if let Some(tx) = self.inner.lock().sender.take() {
            let _ = tx.send(Err(error));
        }
    }

    /// Close the open connection cleanly.
    pub fn close_connection(&self) {
        self.inner.lock().sender = None;
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().sender.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Connect attempts so far, failed ones included.
    pub fn attempts(&self) -> u32 {
        self.inner.lock().attempts
    }

    /// Successful connects so far.
    pub fn connections(&self) -> u32 {
        self.inner.lock().connections
    }

    /// Wait until at least `n` connects have succeeded.
    pub async fn wait_for_connections(&self, n: u32) {
        loop {
            if self.connections() >= n {
                return;
            }
            self.connected.notified().await;
        }
    }
}

#[async_trait]
impl PushChannel for FakePushChannel {
    async fn connect(&self) -> Result<Box<dyn PushStream>, ChannelError> {
        let rx = {
            let mut state = self.inner.lock();
            state.attempts += 1;
            if let Some(error) = state.connect_failures.pop_front() {
                return Err(error);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            state.sender = Some(tx);
            state.connections += 1;
            rx
        };
        self.connected.notify_one();
        Ok(Box::new(FakePushStream { rx }))
    }
}

struct FakePushStream {
    rx: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl PushStream for FakePushStream {
    async fn next_message(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}
