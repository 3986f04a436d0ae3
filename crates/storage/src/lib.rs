// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-storage: job records and the conflict-resolution engine

pub mod state;

pub use state::{
    ApplyOutcome, Diagnostics, JobRecord, JobSnapshot, JobState, Rejection, RETIRED_JOB_MEMORY,
};
