// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server push channel carrying job events.

#[cfg(any(test, feature = "test-support"))]
mod fake;
mod ws;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePushChannel;
pub use ws::WsPushChannel;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the push channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("channel closed: {0}")]
    Closed(String),
}

/// Factory for push connections. Each call opens a fresh connection.
#[async_trait]
pub trait PushChannel: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn PushStream>, ChannelError>;
}

/// One open push connection.
#[async_trait]
pub trait PushStream: Send {
    /// Next text message.
    ///
    /// `None` means the connection ended cleanly; an error means it broke.
    /// Either way the stream is finished.
    async fn next_message(&mut self) -> Option<Result<String, ChannelError>>;
}
