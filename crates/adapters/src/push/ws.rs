// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket push channel.

use super::{ChannelError, PushChannel, PushStream};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Push channel backed by a WebSocket endpoint that sends one JSON event per
/// text frame.
#[derive(Debug, Clone)]
pub struct WsPushChannel {
    url: String,
    connect_timeout: Duration,
}

impl WsPushChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PushChannel for WsPushChannel {
    async fn connect(&self) -> Result<Box<dyn PushStream>, ChannelError> {
        let connect = tokio_tungstenite::connect_async(self.url.as_str());
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok((ws, _))) => {
                tracing::debug!(url = %self.url, "push channel connected");
                Ok(Box::new(WsPushStream { ws }))
            }
            Ok(Err(e)) => Err(ChannelError::Connect(e.to_string())),
            Err(_) => Err(ChannelError::Connect(format!(
                "timed out after {}ms",
                self.connect_timeout.as_millis()
            ))),
        }
    }
}

struct WsPushStream {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// What to do with one frame read from the socket.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Frame {
    Message(String),
    End,
    Skip,
}

pub(crate) fn classify(msg: Message) -> Frame {
    match msg {
        Message::Text(text) => Frame::Message(text.as_str().to_owned()),
        Message::Close(frame) => {
            tracing::debug!(?frame, "push channel received close frame");
            Frame::End
        }
        // Ping/Pong/Binary/raw frames
        _ => Frame::Skip,
    }
}

#[async_trait]
impl PushStream for WsPushStream {
    async fn next_message(&mut self) -> Option<Result<String, ChannelError>> {
        loop {
            match self.ws.next().await {
                Some(Ok(msg)) => match classify(msg) {
                    Frame::Message(text) => return Some(Ok(text)),
                    Frame::End => return None,
                    Frame::Skip => continue,
                },
                Some(Err(e)) => return Some(Err(ChannelError::Protocol(e.to_string()))),
                None => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
