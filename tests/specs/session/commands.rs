// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start/stop command specs

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn stop_while_queued_then_restart() {
    let session = Session::start(vec![]).await;
    let controller = session.coordinator.controller("R1");
    controller.start(files(&["run_1.nxs"])).await.unwrap();
    assert_eq!(controller.status(), JobStatus::Queued);

    session.transport.respond_cancel(Some(JobStatus::Canceled));
    controller.stop().await.unwrap();
    assert_eq!(controller.status(), JobStatus::Canceled);

    let job_id = controller.start(files(&["run_1.nxs"])).await.unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.status, JobStatus::Queued);
    assert_eq!(snap.job_id, Some(job_id));
}

#[tokio::test(start_paused = true)]
async fn start_while_running_is_rejected_locally() {
    let session = Session::start(vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;
    let calls_before = session.transport.calls().len();

    let err = session.coordinator.controller("R1").start(files(&[])).await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Precondition(PreconditionViolation::StartWhileActive {
            status: JobStatus::Running,
            ..
        })
    ));
    assert_eq!(session.transport.calls().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn stop_while_idle_is_rejected_locally() {
    let session = Session::start(vec![]).await;
    let err = session.coordinator.controller("R9").stop().await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Precondition(PreconditionViolation::StopWhileInactive {
            status: JobStatus::Idle,
            ..
        })
    ));
    assert_eq!(session.transport.cancel_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_create_surfaces_error_and_keeps_state() {
    let session = Session::start(vec![]).await;
    session
        .transport
        .fail_next_create(rj_adapters::TransportError::Request("connection refused".into()));

    let err = session.coordinator.controller("R1").start(files(&[])).await.unwrap_err();
    assert!(matches!(err, ControllerError::Transport(_)));
    assert_eq!(session.status("R1"), JobStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn stream_may_beat_the_create_response() {
    let session = Session::start(vec![]).await;
    session.transport.respond_create("J7", JobStatus::Queued);
    session.transport.set_delay(Duration::from_millis(100));
    let controller = session.coordinator.controller("R1");

    let start = controller.start(files(&[]));
    let stream = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.push(&[status_message("R1", "J7", JobStatus::Initializing)]).await;
    };
    let (job_id, ()) = tokio::join!(start, stream);

    assert_eq!(job_id.unwrap(), JobId::new("J7"));
    assert_eq!(controller.status(), JobStatus::Initializing);
}

#[tokio::test(start_paused = true)]
async fn subscriber_is_notified_on_each_accepted_change() {
    let session = Session::start(vec![]).await;
    let controller = session.coordinator.controller("R1");
    let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = controller.subscribe(move |snap| sink.lock().push(snap.status));

    let job_id = controller.start(files(&[])).await.unwrap();
    session
        .push(&[
            status_message("R1", job_id.as_str(), JobStatus::Initializing),
            status_message("R1", job_id.as_str(), JobStatus::Initializing),
            status_message("R1", job_id.as_str(), JobStatus::Running),
        ])
        .await;
    subscription.unsubscribe();
    session.push(&[status_message("R1", job_id.as_str(), JobStatus::Done)]).await;

    assert_eq!(
        *seen.lock(),
        vec![JobStatus::Queued, JobStatus::Initializing, JobStatus::Running]
    );
    assert_eq!(session.status("R1"), JobStatus::Done);
}
