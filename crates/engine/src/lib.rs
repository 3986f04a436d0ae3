// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rj-engine: keeps a session's job view in sync with the backend
//!
//! A [`ReductionSessionCoordinator`] ties together the shared
//! [`JobStateStore`], a [`StreamSubscriber`] on the push channel, the
//! [`ReconciliationService`] for snapshot fetches, and one
//! [`JobController`] per recipe.

mod backoff;
mod controller;
mod coordinator;
pub mod env;
mod reconcile;
mod store;
mod subscriber;

pub use backoff::Backoff;
pub use controller::{ControllerError, JobController, PreconditionViolation};
pub use coordinator::ReductionSessionCoordinator;
pub use env::SessionConfig;
pub use reconcile::{ReconcileReport, ReconciliationService};
pub use store::{JobStateStore, Subscription};
pub use subscriber::{Connectivity, StreamSubscriber};

pub use rj_storage::{ApplyOutcome, Diagnostics, JobSnapshot, Rejection};
