// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-adapters: backend command transport and push channel

pub mod push;
pub mod transport;

pub use push::{ChannelError, PushChannel, PushStream, WsPushChannel};
pub use transport::{ActiveJob, CancelOutcome, CommandTransport, CreatedJob, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use push::FakePushChannel;
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeCommandTransport, TransportCall};
