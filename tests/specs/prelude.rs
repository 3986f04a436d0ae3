// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for session specs.

pub use rj_adapters::{ActiveJob, ChannelError, FakeCommandTransport, FakePushChannel};
pub use rj_core::test_support::{log_message, status_message};
pub use rj_core::{FileSelection, JobId, JobStatus, RecipeId};
pub use rj_engine::{
    Connectivity, ControllerError, JobSnapshot, PreconditionViolation, ReductionSessionCoordinator,
    SessionConfig,
};
pub use std::time::Duration;

/// Route engine logs to the test output; `RUST_LOG=rj_engine=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A started session wired to fakes.
pub struct Session {
    pub transport: FakeCommandTransport,
    pub channel: FakePushChannel,
    pub coordinator: ReductionSessionCoordinator<FakeCommandTransport>,
}

impl Session {
    /// Start a session whose initial listing is `active`, and wait for the
    /// push channel to connect.
    pub async fn start(active: Vec<ActiveJob>) -> Self {
        Self::start_with(SessionConfig::default(), active).await
    }

    pub async fn start_with(config: SessionConfig, active: Vec<ActiveJob>) -> Self {
        init_tracing();
        let transport = FakeCommandTransport::new();
        transport.set_active_jobs(active);
        let channel = FakePushChannel::new();
        let coordinator = ReductionSessionCoordinator::new("run-1", transport.clone(), config);
        coordinator.start(channel.clone()).await.unwrap();
        channel.wait_for_connections(1).await;
        Self { transport, channel, coordinator }
    }

    /// Deliver raw push messages and let the subscriber process them.
    pub async fn push(&self, messages: &[String]) {
        for message in messages {
            assert!(self.channel.push(message.clone()), "push channel is not connected");
        }
        settle().await;
    }

    pub fn snapshot(&self, recipe: &str) -> JobSnapshot {
        self.coordinator.snapshot(&RecipeId::new(recipe))
    }

    pub fn status(&self, recipe: &str) -> JobStatus {
        self.snapshot(recipe).status
    }
}

/// Let spawned tasks drain ready work.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn files(names: &[&str]) -> FileSelection {
    FileSelection::new(names.iter().copied())
}
