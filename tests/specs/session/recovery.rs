// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel loss and session teardown specs

use crate::prelude::*;

fn fast_reconnect() -> SessionConfig {
    SessionConfig::default()
        .reconnect_base(Duration::from_millis(100))
        .reconnect_max(Duration::from_secs(2))
}

#[tokio::test(start_paused = true)]
async fn reconnect_never_resets_jobs() {
    let session = Session::start_with(fast_reconnect(), vec![]).await;
    session.push(&[status_message("R1", "J1", JobStatus::Running)]).await;

    session.channel.break_connection(ChannelError::Protocol("connection reset".into()));
    settle().await;
    assert!(session.coordinator.connectivity().is_degraded());
    assert_eq!(session.status("R1"), JobStatus::Running);

    session.channel.wait_for_connections(2).await;
    settle().await;
    assert_eq!(session.coordinator.connectivity(), Connectivity::Connected);
    assert_eq!(session.status("R1"), JobStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn commands_work_while_channel_is_down() {
    let session = Session::start_with(fast_reconnect(), vec![]).await;
    for _ in 0..5 {
        session.channel.fail_next_connect(ChannelError::Connect("refused".into()));
    }
    session.channel.close_connection();
    settle().await;

    let controller = session.coordinator.controller("R1");
    controller.start(files(&[])).await.unwrap();
    session.transport.respond_cancel(Some(JobStatus::Canceled));
    controller.stop().await.unwrap();
    assert_eq!(controller.status(), JobStatus::Canceled);
}

#[tokio::test(start_paused = true)]
async fn malformed_messages_are_dropped_and_counted() {
    let session = Session::start(vec![]).await;
    session
        .push(&[
            "not json".to_string(),
            r#"{"kind":"status","recipeId":"R1","payload":"SLEEPING"}"#.to_string(),
            r#"{"kind":"status","recipeId":"","payload":"RUNNING"}"#.to_string(),
            status_message("R1", "J1", JobStatus::Running),
        ])
        .await;

    assert_eq!(session.coordinator.diagnostics().malformed, 3);
    assert_eq!(session.status("R1"), JobStatus::Running);
    assert_eq!(session.channel.connections(), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_leaves_jobs_running_and_new_session_reattaches() {
    let session = Session::start(vec![]).await;
    let job_id = session.coordinator.controller("R1").start(files(&[])).await.unwrap();
    session.push(&[status_message("R1", job_id.as_str(), JobStatus::Running)]).await;

    session.coordinator.shutdown().await;
    assert_eq!(session.coordinator.connectivity(), Connectivity::Closed);
    assert_eq!(session.transport.cancel_count(), 0);

    // The backend still lists the job; a fresh session picks it up
    let listed = ActiveJob::new("R1", job_id.as_str(), JobStatus::Running);
    let next = Session::start(vec![listed]).await;
    let snap = next.snapshot("R1");
    assert_eq!(snap.status, JobStatus::Running);
    assert_eq!(snap.job_id, Some(job_id));
    assert!(matches!(
        next.coordinator.controller("R1").start(files(&[])).await,
        Err(ControllerError::Precondition(PreconditionViolation::StartWhileActive { .. }))
    ));
}
