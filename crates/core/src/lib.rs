// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-core: shared types for the reduction job coordinator

pub mod macros;

pub mod event;
pub mod id;
pub mod log_buffer;
pub mod status;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use event::{FileSelection, JobEvent, MalformedEvent, UpdateSource};
pub use id::{short, JobId, RecipeId, ScopeId};
pub use log_buffer::{LogRingBuffer, DEFAULT_LOG_CAPACITY};
pub use status::{JobStatus, UnknownStatus};
